use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// HTTP Method enum
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    GET,
    POST,
    PUT,
    DELETE,
    PATCH,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::PATCH => "PATCH",
        }
    }

    pub fn next(&self) -> HttpMethod {
        match self {
            HttpMethod::GET => HttpMethod::POST,
            HttpMethod::POST => HttpMethod::PUT,
            HttpMethod::PUT => HttpMethod::DELETE,
            HttpMethod::DELETE => HttpMethod::PATCH,
            HttpMethod::PATCH => HttpMethod::GET,
        }
    }

    pub fn has_body(&self) -> bool {
        matches!(self, HttpMethod::POST | HttpMethod::PUT | HttpMethod::PATCH)
    }
}

/// An ordered key/value pair, used for headers, query parameters and
/// environment variables. Key uniqueness is enforced by the editor upsert,
/// not by the type itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        KeyValue {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A saved HTTP request. Identity is the id; duplicate names are allowed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavedRequest {
    pub id: Uuid,
    pub name: String,
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<KeyValue>,
    pub body: String,
    #[serde(default)]
    pub query_params: Vec<KeyValue>,
    pub created_at: DateTime<Utc>,
    pub last_used: DateTime<Utc>,
}

impl Default for SavedRequest {
    fn default() -> Self {
        let now = Utc::now();
        SavedRequest {
            id: Uuid::new_v4(),
            name: String::new(),
            method: HttpMethod::GET,
            url: String::new(),
            headers: vec![KeyValue::new("Content-Type", "application/json")],
            body: String::new(),
            query_params: Vec::new(),
            created_at: now,
            last_used: now,
        }
    }
}

/// Immutable snapshot of one send attempt, success or failure.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RequestExecution {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<KeyValue>,
    pub body: String,
    #[serde(default)]
    pub query_params: Vec<KeyValue>,
    pub status_code: Option<u16>,
    pub status_text: String,
    pub response_body: String,
    pub response_time_ms: u64,
    pub error: Option<String>,
}

/// A saved SQL query, mirroring [`SavedRequest`] for the database domain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavedQuery {
    pub id: Uuid,
    pub name: String,
    pub query: String,
    pub created_at: DateTime<Utc>,
    pub last_used: DateTime<Utc>,
}

impl SavedQuery {
    pub fn new(name: impl Into<String>, query: impl Into<String>) -> Self {
        let now = Utc::now();
        SavedQuery {
            id: Uuid::new_v4(),
            name: name.into(),
            query: query.into(),
            created_at: now,
            last_used: now,
        }
    }
}

/// Immutable snapshot of one query execution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QueryExecution {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub query: String,
    pub row_count: Option<u64>,
    pub rows_affected: Option<u64>,
    pub execution_time_ms: u64,
    pub error: Option<String>,
}

/// Postgres SSL mode. Stored verbatim; the session itself is established
/// without TLS, so anything other than `Disable` is passed through to the
/// server and may be rejected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SslMode {
    #[default]
    Disable,
    Require,
    VerifyCa,
    VerifyFull,
}

impl SslMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SslMode::Disable => "disable",
            SslMode::Require => "require",
            SslMode::VerifyCa => "verify-ca",
            SslMode::VerifyFull => "verify-full",
        }
    }

    pub fn next(&self) -> SslMode {
        match self {
            SslMode::Disable => SslMode::Require,
            SslMode::Require => SslMode::VerifyCa,
            SslMode::VerifyCa => SslMode::VerifyFull,
            SslMode::VerifyFull => SslMode::Disable,
        }
    }
}

/// Database connection parameters. Stored in plain JSON, password included;
/// documented limitation of the tool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
    #[serde(default)]
    pub ssl_mode: SslMode,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        ConnectionConfig {
            host: String::from("localhost"),
            port: 5432,
            database: String::new(),
            user: String::new(),
            password: String::new(),
            ssl_mode: SslMode::Disable,
        }
    }
}

/// A named set of template variables.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub name: String,
    #[serde(default)]
    pub variables: Vec<KeyValue>,
}

impl Environment {
    pub fn new(name: impl Into<String>) -> Self {
        Environment {
            name: name.into(),
            variables: Vec::new(),
        }
    }
}

/// Display band for a status code. Classification only; never drives
/// control flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusBand {
    Success,
    Redirect,
    ClientError,
    ServerError,
    Unknown,
}

impl StatusBand {
    pub fn from_code(code: Option<u16>) -> StatusBand {
        match code {
            Some(c) if (200..300).contains(&c) => StatusBand::Success,
            Some(c) if (300..400).contains(&c) => StatusBand::Redirect,
            Some(c) if (400..500).contains(&c) => StatusBand::ClientError,
            Some(c) if (500..600).contains(&c) => StatusBand::ServerError,
            _ => StatusBand::Unknown,
        }
    }
}

/// Tabular result of a row-returning query.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResultTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_cycle_covers_all_variants() {
        let mut m = HttpMethod::GET;
        for _ in 0..5 {
            m = m.next();
        }
        assert_eq!(m, HttpMethod::GET);
    }

    #[test]
    fn status_band_classification() {
        assert_eq!(StatusBand::from_code(Some(204)), StatusBand::Success);
        assert_eq!(StatusBand::from_code(Some(301)), StatusBand::Redirect);
        assert_eq!(StatusBand::from_code(Some(404)), StatusBand::ClientError);
        assert_eq!(StatusBand::from_code(Some(503)), StatusBand::ServerError);
        assert_eq!(StatusBand::from_code(None), StatusBand::Unknown);
    }
}
