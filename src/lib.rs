//! Courier - a terminal client for HTTP requests and SQL queries
//!
//! Architecture:
//! - UI layer (ratatui) - synchronous terminal rendering
//! - App layer - central state machine processing events
//! - Gateway layer (tokio) - async HTTP and PostgreSQL execution

pub mod app;
pub mod clipboard;
pub mod constants;
pub mod error;
pub mod export;
pub mod gateway;
pub mod messages;
pub mod models;
pub mod storage;
pub mod template;
pub mod ui;
