//! Best-effort clipboard sink. Failure is logged, never fatal.

use tracing::warn;

/// Copy `text` to the system clipboard. Returns false when the clipboard is
/// unavailable (headless session, missing display server).
pub fn write(text: &str) -> bool {
    match arboard::Clipboard::new() {
        Ok(mut clipboard) => match clipboard.set_text(text.to_owned()) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "clipboard write failed");
                false
            }
        },
        Err(e) => {
            warn!(error = %e, "clipboard unavailable");
            false
        }
    }
}
