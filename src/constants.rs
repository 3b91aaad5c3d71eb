//! Application constants
//!
//! Centralized location for magic strings and configuration defaults.

use std::time::Duration;

/// Maximum number of entries kept in each execution history
pub const MAX_HISTORY: usize = 100;

/// Hard deadline for an outbound HTTP request
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// How long a transient status notice stays on screen
pub const NOTICE_TTL: Duration = Duration::from_secs(4);

/// Current on-disk document format version
pub const DOCUMENT_VERSION: &str = "2";

/// Directory under the user's home that holds all documents
pub const CONFIG_DIR_NAME: &str = ".courier";

/// Application name
pub const APP_NAME: &str = "Courier";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
