//! Gateway messages - communication between the app and gateway layers
//!
//! A command describes a pending asynchronous effect; its eventual result
//! re-enters the app loop as an event carrying the same token. The app
//! discards events whose token no longer matches the in-flight one.

use crate::error::{DatabaseError, HttpError};
use crate::models::{ConnectionConfig, ResultTable, SavedRequest, StatusBand};

/// Commands sent from the app layer to the gateway layer.
#[derive(Debug, Clone)]
pub enum GatewayCommand {
    /// Execute an HTTP request. The request is already resolved and
    /// validated; the gateway only builds and sends it.
    SendRequest { token: u64, request: SavedRequest },

    /// Open (or replace) the single database session.
    Connect {
        token: u64,
        config: ConnectionConfig,
    },

    /// Run a SQL query on the current session.
    ExecuteQuery { token: u64, query: String },

    /// Schema introspection.
    ListTables { token: u64 },
    ListColumns { token: u64, table: String },

    /// Shutdown the gateway actor.
    Shutdown,
}

/// Successful HTTP completion data.
#[derive(Debug, Clone)]
pub struct HttpOutcome {
    pub status_code: u16,
    pub status_text: String,
    pub band: StatusBand,
    pub body: String,
    pub size_bytes: usize,
}

/// Result shape of a SQL execution: a row set for SELECT-like queries,
/// a count for mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    Rows(ResultTable),
    RowsAffected(u64),
}

/// Completion events sent from the gateway layer back to the app layer.
#[derive(Debug, Clone)]
pub enum GatewayEvent {
    HttpDone {
        token: u64,
        time_ms: u64,
        result: Result<HttpOutcome, HttpError>,
    },
    Connected {
        token: u64,
        result: Result<(), DatabaseError>,
    },
    QueryDone {
        token: u64,
        time_ms: u64,
        result: Result<QueryOutcome, DatabaseError>,
    },
    Tables {
        token: u64,
        result: Result<Vec<String>, DatabaseError>,
    },
    Columns {
        token: u64,
        table: String,
        result: Result<Vec<String>, DatabaseError>,
    },
    /// The connection task ended; not tied to any command.
    ConnectionLost { message: String },
}
