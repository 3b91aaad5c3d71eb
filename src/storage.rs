//! Persistence store - versioned JSON documents with migration
//!
//! Each document is one JSON file under the config directory. Every save is a
//! full-document overwrite; the store never merges. A failed directory
//! creation at startup degrades the whole store to in-memory-only operation,
//! which the app surfaces as a persistent warning.

use std::fs;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::constants::{CONFIG_DIR_NAME, DOCUMENT_VERSION, MAX_HISTORY};
use crate::error::{ConfigError, StorageError};
use crate::models::{
    ConnectionConfig, Environment, QueryExecution, RequestExecution, SavedQuery, SavedRequest,
};

/// A versioned document the store knows how to load, migrate and save.
pub trait Document: Serialize + DeserializeOwned + Default {
    const FILE_NAME: &'static str;
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RequestsDocument {
    pub version: String,
    #[serde(default)]
    pub requests: Vec<SavedRequest>,
    #[serde(default)]
    pub history: Vec<RequestExecution>,
}

impl Default for RequestsDocument {
    fn default() -> Self {
        RequestsDocument {
            version: DOCUMENT_VERSION.to_owned(),
            requests: Vec::new(),
            history: Vec::new(),
        }
    }
}

impl Document for RequestsDocument {
    const FILE_NAME: &'static str = "requests.json";
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DatabaseDocument {
    pub version: String,
    #[serde(default)]
    pub saved_queries: Vec<SavedQuery>,
    #[serde(default)]
    pub query_history: Vec<QueryExecution>,
    #[serde(default)]
    pub saved_connections: Vec<ConnectionConfig>,
}

impl Default for DatabaseDocument {
    fn default() -> Self {
        DatabaseDocument {
            version: DOCUMENT_VERSION.to_owned(),
            saved_queries: Vec::new(),
            query_history: Vec::new(),
            saved_connections: Vec::new(),
        }
    }
}

impl Document for DatabaseDocument {
    const FILE_NAME: &'static str = "database.json";
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EnvironmentsDocument {
    pub version: String,
    #[serde(default)]
    pub environments: Vec<Environment>,
    #[serde(default)]
    pub active_environment: Option<String>,
}

impl Default for EnvironmentsDocument {
    fn default() -> Self {
        EnvironmentsDocument {
            version: DOCUMENT_VERSION.to_owned(),
            environments: Vec::new(),
            active_environment: None,
        }
    }
}

impl EnvironmentsDocument {
    /// Invariant: `active_environment` names an existing environment or is
    /// `None`. Called after every mutation of the environment list.
    pub fn enforce_active(&mut self) {
        if let Some(name) = &self.active_environment {
            if !self.environments.iter().any(|e| &e.name == name) {
                self.active_environment = None;
            }
        }
    }
}

impl Document for EnvironmentsDocument {
    const FILE_NAME: &'static str = "environments.json";
}

/// Pure, version-dispatching migration. Documents without a `version` field
/// or with version "1" are upgraded in place (new optional fields default to
/// empty) and flagged for rewrite. Unknown versions are refused rather than
/// silently truncated.
pub fn migrate<D: Document>(mut raw: Value) -> Result<(D, bool), StorageError> {
    let version = raw
        .get("version")
        .and_then(Value::as_str)
        .map(str::to_owned);

    match version.as_deref() {
        Some(DOCUMENT_VERSION) => Ok((serde_json::from_value(raw)?, false)),
        None | Some("1") => {
            if let Some(obj) = raw.as_object_mut() {
                obj.insert(
                    "version".to_owned(),
                    Value::String(DOCUMENT_VERSION.to_owned()),
                );
            }
            Ok((serde_json::from_value(raw)?, true))
        }
        Some(other) => Err(StorageError::UnsupportedVersion(other.to_owned())),
    }
}

/// Insert an execution at the front (newest-first) and evict the oldest
/// entries beyond the cap.
pub fn push_history<T>(history: &mut Vec<T>, entry: T) {
    history.insert(0, entry);
    history.truncate(MAX_HISTORY);
}

/// Case-insensitive substring match across the given fields. An empty query
/// matches everything.
pub fn matches_filter(query: &str, fields: &[&str]) -> bool {
    if query.is_empty() {
        return true;
    }
    let q = query.to_lowercase();
    fields.iter().any(|f| f.to_lowercase().contains(&q))
}

pub fn filter_requests<'a>(items: &'a [SavedRequest], query: &str) -> Vec<&'a SavedRequest> {
    items
        .iter()
        .filter(|r| matches_filter(query, &[&r.name, r.method.as_str(), &r.url]))
        .collect()
}

pub fn filter_request_history<'a>(
    items: &'a [RequestExecution],
    query: &str,
) -> Vec<&'a RequestExecution> {
    items
        .iter()
        .filter(|e| matches_filter(query, &[e.method.as_str(), &e.url]))
        .collect()
}

pub fn filter_queries<'a>(items: &'a [SavedQuery], query: &str) -> Vec<&'a SavedQuery> {
    items
        .iter()
        .filter(|q| matches_filter(query, &[&q.name, &q.query]))
        .collect()
}

pub fn filter_query_history<'a>(
    items: &'a [QueryExecution],
    query: &str,
) -> Vec<&'a QueryExecution> {
    items
        .iter()
        .filter(|e| matches_filter(query, &[&e.query]))
        .collect()
}

/// File-backed document store. `dir == None` means in-memory-only: loads
/// return defaults and saves succeed without touching disk.
pub struct Store {
    dir: Option<PathBuf>,
}

impl Store {
    /// Open the default store under the user's home directory. Directory
    /// creation failure is non-fatal: the store degrades to in-memory mode.
    pub fn open() -> Result<Self, ConfigError> {
        let base = dirs::home_dir()
            .ok_or(ConfigError::NoHomeDir)?
            .join(CONFIG_DIR_NAME);

        match fs::create_dir_all(&base) {
            Ok(()) => {
                let store = Store { dir: Some(base) };
                store.adopt_legacy_files();
                Ok(store)
            }
            Err(e) => {
                warn!(error = %e, "config directory unavailable, running in-memory only");
                Ok(Store { dir: None })
            }
        }
    }

    /// Store rooted at an explicit directory.
    pub fn with_dir(dir: PathBuf) -> Result<Self, StorageError> {
        fs::create_dir_all(&dir)?;
        Ok(Store { dir: Some(dir) })
    }

    /// In-memory-only store; used when persistence is unavailable and in
    /// tests.
    pub fn in_memory() -> Self {
        Store { dir: None }
    }

    pub fn is_persistent(&self) -> bool {
        self.dir.is_some()
    }

    /// One-time adoption of documents written by older releases under the
    /// XDG config directory. Only copies a file when the current-location
    /// document is absent; migration to the current shape happens on load.
    fn adopt_legacy_files(&self) {
        let Some(dir) = &self.dir else { return };
        let Some(old_dir) = dirs::config_dir().map(|d| d.join("courier")) else {
            return;
        };
        for name in [
            RequestsDocument::FILE_NAME,
            DatabaseDocument::FILE_NAME,
            EnvironmentsDocument::FILE_NAME,
        ] {
            let old = old_dir.join(name);
            let new = dir.join(name);
            if old.exists() && !new.exists() {
                if let Err(e) = fs::copy(&old, &new) {
                    warn!(file = name, error = %e, "failed to adopt legacy document");
                }
            }
        }
    }

    /// Load a document, migrating older shapes. A missing file yields the
    /// default document; a migrated document is rewritten best-effort.
    pub fn load<D: Document>(&self) -> Result<D, StorageError> {
        let Some(dir) = &self.dir else {
            return Ok(D::default());
        };
        let path = dir.join(D::FILE_NAME);
        if !path.exists() {
            return Ok(D::default());
        }

        let raw: Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
        let (doc, rewrite) = migrate::<D>(raw)?;
        if rewrite {
            if let Err(e) = self.save(&doc) {
                warn!(file = D::FILE_NAME, error = %e, "failed to rewrite migrated document");
            }
        }
        Ok(doc)
    }

    /// Full-document overwrite.
    pub fn save<D: Document>(&self, doc: &D) -> Result<(), StorageError> {
        let Some(dir) = &self.dir else { return Ok(()) };
        let contents = serde_json::to_string_pretty(doc)?;
        fs::write(dir.join(D::FILE_NAME), contents)?;
        Ok(())
    }

    /// Write an export file next to the documents, returning its path.
    pub fn write_export(&self, file_name: &str, contents: &str) -> Result<PathBuf, StorageError> {
        let Some(dir) = &self.dir else {
            return Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                "persistence is disabled",
            )));
        };
        let path = dir.join(file_name);
        fs::write(&path, contents)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HttpMethod, KeyValue};
    use chrono::Utc;
    use uuid::Uuid;

    fn execution(url: &str) -> RequestExecution {
        RequestExecution {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            method: HttpMethod::GET,
            url: url.to_owned(),
            headers: Vec::new(),
            body: String::new(),
            query_params: Vec::new(),
            status_code: Some(200),
            status_text: String::from("OK"),
            response_body: String::new(),
            response_time_ms: 1,
            error: None,
        }
    }

    #[test]
    fn history_never_exceeds_cap_and_stays_newest_first() {
        let mut history = Vec::new();
        for i in 0..250 {
            push_history(&mut history, execution(&format!("http://a/{i}")));
        }
        assert_eq!(history.len(), MAX_HISTORY);
        assert_eq!(history[0].url, "http://a/249");
        assert_eq!(history[MAX_HISTORY - 1].url, "http://a/150");
    }

    #[test]
    fn filter_is_case_insensitive_substring() {
        let mut req = SavedRequest::default();
        req.name = String::from("Get Users");
        req.url = String::from("http://a");
        let items = vec![req];

        assert_eq!(filter_requests(&items, "get").len(), 1);
        assert_eq!(filter_requests(&items, "USERS").len(), 1);
        assert_eq!(filter_requests(&items, "http://a").len(), 1);
        assert_eq!(filter_requests(&items, "nope").len(), 0);
    }

    #[test]
    fn empty_filter_returns_everything_in_order() {
        let mut a = SavedRequest::default();
        a.name = String::from("first");
        let mut b = SavedRequest::default();
        b.name = String::from("second");
        let items = vec![a, b];

        let out = filter_requests(&items, "");
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].name, "first");
        assert_eq!(out[1].name, "second");
    }

    #[test]
    fn saved_request_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::with_dir(dir.path().to_path_buf()).unwrap();

        let mut req = SavedRequest::default();
        req.name = String::from("list users");
        req.method = HttpMethod::POST;
        req.url = String::from("https://api.example.com/users");
        req.headers = vec![
            KeyValue::new("Content-Type", "application/json"),
            KeyValue::new("Accept", "application/json"),
        ];
        req.query_params = vec![KeyValue::new("page", "2"), KeyValue::new("limit", "10")];
        req.body = String::from("{\"active\":true}");

        let mut doc = RequestsDocument::default();
        doc.requests.push(req.clone());
        store.save(&doc).unwrap();

        let loaded: RequestsDocument = store.load().unwrap();
        assert_eq!(loaded.requests.len(), 1);
        assert_eq!(loaded.requests[0], req);
    }

    #[test]
    fn missing_file_loads_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::with_dir(dir.path().to_path_buf()).unwrap();
        let doc: RequestsDocument = store.load().unwrap();
        assert!(doc.requests.is_empty());
        assert_eq!(doc.version, DOCUMENT_VERSION);
    }

    #[test]
    fn v1_document_is_migrated_and_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::with_dir(dir.path().to_path_buf()).unwrap();

        // A v1 request predates query_params.
        let v1 = serde_json::json!({
            "version": "1",
            "requests": [{
                "id": Uuid::new_v4(),
                "name": "old",
                "method": "GET",
                "url": "http://a",
                "headers": [],
                "body": "",
                "created_at": Utc::now(),
                "last_used": Utc::now(),
            }],
            "history": [],
        });
        fs::write(
            dir.path().join(RequestsDocument::FILE_NAME),
            serde_json::to_string(&v1).unwrap(),
        )
        .unwrap();

        let doc: RequestsDocument = store.load().unwrap();
        assert_eq!(doc.version, DOCUMENT_VERSION);
        assert!(doc.requests[0].query_params.is_empty());

        // The file was rewritten in the current shape.
        let on_disk: Value = serde_json::from_str(
            &fs::read_to_string(dir.path().join(RequestsDocument::FILE_NAME)).unwrap(),
        )
        .unwrap();
        assert_eq!(on_disk["version"], DOCUMENT_VERSION);
    }

    #[test]
    fn unknown_version_is_refused() {
        let raw = serde_json::json!({"version": "99", "requests": [], "history": []});
        let err = migrate::<RequestsDocument>(raw).unwrap_err();
        assert!(matches!(err, StorageError::UnsupportedVersion(v) if v == "99"));
    }

    #[test]
    fn in_memory_store_loads_defaults_and_saves_quietly() {
        let store = Store::in_memory();
        assert!(!store.is_persistent());
        let mut doc: EnvironmentsDocument = store.load().unwrap();
        doc.environments.push(Environment::new("dev"));
        assert!(store.save(&doc).is_ok());
    }

    #[test]
    fn active_environment_invariant_clears_dangling_reference() {
        let mut doc = EnvironmentsDocument::default();
        doc.environments.push(Environment::new("dev"));
        doc.active_environment = Some(String::from("dev"));

        doc.environments.clear();
        doc.enforce_active();
        assert_eq!(doc.active_environment, None);
    }
}
