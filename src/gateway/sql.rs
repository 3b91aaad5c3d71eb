//! PostgreSQL session - connect, execute and introspect over tokio-postgres
//!
//! One session at a time. The simple-query protocol returns every value as
//! text, which is exactly what a terminal table wants.

use tokio::sync::mpsc;
use tokio_postgres::{NoTls, SimpleQueryMessage};
use tracing::{info, warn};

use crate::error::DatabaseError;
use crate::messages::{GatewayEvent, QueryOutcome};
use crate::models::{ConnectionConfig, ResultTable, SslMode};

/// How to run a statement and shape its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Rows,
    Mutation,
}

/// Classify by the first keyword. Anything unrecognized is treated as a
/// mutation and reported as a row count.
pub fn classify(query: &str) -> QueryKind {
    let first = query
        .trim()
        .split_whitespace()
        .next()
        .unwrap_or("")
        .to_ascii_uppercase();
    match first.as_str() {
        "SELECT" | "WITH" | "SHOW" | "EXPLAIN" | "VALUES" | "TABLE" => QueryKind::Rows,
        _ => QueryKind::Mutation,
    }
}

/// An open database session.
pub struct DbSession {
    client: tokio_postgres::Client,
}

/// Open a connection and spawn its driver task. The driver reports an
/// unexpected end of connection through the event channel.
pub async fn connect(
    config: &ConnectionConfig,
    event_tx: mpsc::UnboundedSender<GatewayEvent>,
) -> Result<DbSession, DatabaseError> {
    let mut pg = tokio_postgres::Config::new();
    pg.host(&config.host)
        .port(config.port)
        .dbname(&config.database)
        .user(&config.user);
    if !config.password.is_empty() {
        pg.password(&config.password);
    }
    // TLS is not negotiated; a server demanding it will refuse the session.
    if config.ssl_mode != SslMode::Disable {
        warn!(mode = config.ssl_mode.as_str(), "SSL mode stored but not negotiated");
    }

    let (client, connection) = pg
        .connect(NoTls)
        .await
        .map_err(|e| DatabaseError::Connect(e.to_string()))?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            let _ = event_tx.send(GatewayEvent::ConnectionLost {
                message: e.to_string(),
            });
        }
    });

    info!(host = %config.host, database = %config.database, "database session opened");
    Ok(DbSession { client })
}

impl DbSession {
    /// Run one statement. Row-shaped statements go through the simple-query
    /// protocol; mutations report the affected-row count.
    pub async fn execute(&self, query: &str) -> Result<QueryOutcome, DatabaseError> {
        match classify(query) {
            QueryKind::Mutation => {
                let affected = self
                    .client
                    .execute(query, &[])
                    .await
                    .map_err(map_query_error)?;
                Ok(QueryOutcome::RowsAffected(affected))
            }
            QueryKind::Rows => {
                let messages = self
                    .client
                    .simple_query(query)
                    .await
                    .map_err(map_query_error)?;

                let mut columns: Vec<String> = Vec::new();
                let mut rows: Vec<Vec<String>> = Vec::new();
                for message in messages {
                    match message {
                        SimpleQueryMessage::RowDescription(desc) => {
                            if columns.is_empty() {
                                columns = desc.iter().map(|c| c.name().to_owned()).collect();
                            }
                        }
                        SimpleQueryMessage::Row(row) => {
                            if columns.is_empty() {
                                columns = row
                                    .columns()
                                    .iter()
                                    .map(|c| c.name().to_owned())
                                    .collect();
                            }
                            let mut cells = Vec::with_capacity(row.len());
                            for i in 0..row.len() {
                                cells.push(row.get(i).unwrap_or("NULL").to_owned());
                            }
                            rows.push(cells);
                        }
                        SimpleQueryMessage::CommandComplete(_) => {}
                        _ => {}
                    }
                }
                Ok(QueryOutcome::Rows(ResultTable { columns, rows }))
            }
        }
    }

    /// Table names in the public schema, sorted.
    pub async fn list_tables(&self) -> Result<Vec<String>, DatabaseError> {
        let messages = self
            .client
            .simple_query(
                "SELECT table_name FROM information_schema.tables \
                 WHERE table_schema = 'public' ORDER BY table_name",
            )
            .await
            .map_err(map_query_error)?;
        Ok(first_column(messages))
    }

    /// Column names and types of one table, sorted by name.
    pub async fn list_columns(&self, table: &str) -> Result<Vec<String>, DatabaseError> {
        let messages = self
            .client
            .simple_query(&columns_query(table))
            .await
            .map_err(map_query_error)?;

        let mut columns = Vec::new();
        for message in messages {
            if let SimpleQueryMessage::Row(row) = message {
                let name = row.get(0).unwrap_or("");
                let data_type = row.get(1).unwrap_or("");
                columns.push(format!("{name} ({data_type})"));
            }
        }
        Ok(columns)
    }
}

fn columns_query(table: &str) -> String {
    let escaped = table.replace('\'', "''");
    format!(
        "SELECT column_name, data_type FROM information_schema.columns \
         WHERE table_schema = 'public' AND table_name = '{escaped}' \
         ORDER BY column_name"
    )
}

fn first_column(messages: Vec<SimpleQueryMessage>) -> Vec<String> {
    let mut values = Vec::new();
    for message in messages {
        if let SimpleQueryMessage::Row(row) = message {
            if let Some(value) = row.get(0) {
                values.push(value.to_owned());
            }
        }
    }
    values
}

fn map_query_error(e: tokio_postgres::Error) -> DatabaseError {
    if e.is_closed() {
        DatabaseError::ConnectionLost(e.to_string())
    } else {
        DatabaseError::Query(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_like_statements_are_row_shaped() {
        assert_eq!(classify("SELECT 1"), QueryKind::Rows);
        assert_eq!(classify("  select * from users"), QueryKind::Rows);
        assert_eq!(classify("WITH t AS (SELECT 1) SELECT * FROM t"), QueryKind::Rows);
        assert_eq!(classify("show search_path"), QueryKind::Rows);
        assert_eq!(classify("EXPLAIN SELECT 1"), QueryKind::Rows);
        assert_eq!(classify("TABLE users"), QueryKind::Rows);
    }

    #[test]
    fn everything_else_is_a_mutation() {
        assert_eq!(classify("INSERT INTO t VALUES (1)"), QueryKind::Mutation);
        assert_eq!(classify("UPDATE t SET a = 1"), QueryKind::Mutation);
        assert_eq!(classify("delete from t"), QueryKind::Mutation);
        assert_eq!(classify("CREATE TABLE t (a int)"), QueryKind::Mutation);
        assert_eq!(classify(""), QueryKind::Mutation);
    }

    #[test]
    fn column_introspection_sorts_by_name_and_escapes_quotes() {
        let q = columns_query("o'brien");
        assert!(q.contains("table_name = 'o''brien'"));
        assert!(q.ends_with("ORDER BY column_name"));
    }
}
