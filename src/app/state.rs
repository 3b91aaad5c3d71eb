//! App state - pure data structure with no I/O logic beyond document saves

use std::time::Instant;

use tracing::error;

use crate::app::editor::{PairEditor, TextPrompt};
use crate::constants::NOTICE_TTL;
use crate::messages::ui_events::{InputMode, Screen};
use crate::messages::QueryOutcome;
use crate::models::{ConnectionConfig, KeyValue, SavedRequest, SslMode, StatusBand};
use crate::storage::{DatabaseDocument, EnvironmentsDocument, RequestsDocument, Store};

/// Navigable fields of the request builder.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum BuilderField {
    #[default]
    Method,
    Url,
    Headers,
    Body,
    Params,
}

impl BuilderField {
    pub fn next(&self) -> BuilderField {
        match self {
            BuilderField::Method => BuilderField::Url,
            BuilderField::Url => BuilderField::Headers,
            BuilderField::Headers => BuilderField::Body,
            BuilderField::Body => BuilderField::Params,
            BuilderField::Params => BuilderField::Method,
        }
    }

    pub fn prev(&self) -> BuilderField {
        match self {
            BuilderField::Method => BuilderField::Params,
            BuilderField::Url => BuilderField::Method,
            BuilderField::Headers => BuilderField::Url,
            BuilderField::Body => BuilderField::Headers,
            BuilderField::Params => BuilderField::Body,
        }
    }
}

/// Fields of the database connect form.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum ConnectField {
    #[default]
    Host,
    Port,
    Database,
    User,
    Password,
    SslMode,
}

impl ConnectField {
    pub const ALL: [ConnectField; 6] = [
        ConnectField::Host,
        ConnectField::Port,
        ConnectField::Database,
        ConnectField::User,
        ConnectField::Password,
        ConnectField::SslMode,
    ];

    pub fn next(&self) -> ConnectField {
        let i = Self::ALL.iter().position(|f| f == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> ConnectField {
        let i = Self::ALL.iter().position(|f| f == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|f| f == self).unwrap_or(0)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConnectField::Host => "Host",
            ConnectField::Port => "Port",
            ConnectField::Database => "Database",
            ConnectField::User => "User",
            ConnectField::Password => "Password",
            ConnectField::SslMode => "SSL mode",
        }
    }
}

/// Export format for query results.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NoticeLevel {
    Info,
    Warn,
    Error,
}

/// Transient status message with an expiry; the first render past the
/// deadline clears it.
#[derive(Clone, Debug)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
    pub expires_at: Instant,
}

/// Edit buffers for the connect form. Committed into a [`ConnectionConfig`]
/// when the user connects.
#[derive(Clone, Debug)]
pub struct ConnectionForm {
    pub host: String,
    pub port: String,
    pub database: String,
    pub user: String,
    pub password: String,
    pub ssl_mode: SslMode,
}

impl Default for ConnectionForm {
    fn default() -> Self {
        ConnectionForm::from_config(&ConnectionConfig::default())
    }
}

impl ConnectionForm {
    pub fn from_config(config: &ConnectionConfig) -> Self {
        ConnectionForm {
            host: config.host.clone(),
            port: config.port.to_string(),
            database: config.database.clone(),
            user: config.user.clone(),
            password: config.password.clone(),
            ssl_mode: config.ssl_mode,
        }
    }

    pub fn to_config(&self) -> ConnectionConfig {
        ConnectionConfig {
            host: self.host.clone(),
            port: self.port.trim().parse().unwrap_or(5432),
            database: self.database.clone(),
            user: self.user.clone(),
            password: self.password.clone(),
            ssl_mode: self.ssl_mode,
        }
    }

    pub fn field_mut(&mut self, field: ConnectField) -> Option<&mut String> {
        match field {
            ConnectField::Host => Some(&mut self.host),
            ConnectField::Port => Some(&mut self.port),
            ConnectField::Database => Some(&mut self.database),
            ConnectField::User => Some(&mut self.user),
            ConnectField::Password => Some(&mut self.password),
            ConnectField::SslMode => None,
        }
    }

    /// Display value for rendering; the password is masked.
    pub fn display(&self, field: ConnectField) -> String {
        match field {
            ConnectField::Host => self.host.clone(),
            ConnectField::Port => self.port.clone(),
            ConnectField::Database => self.database.clone(),
            ConnectField::User => self.user.clone(),
            ConnectField::Password => "*".repeat(self.password.chars().count()),
            ConnectField::SslMode => self.ssl_mode.as_str().to_owned(),
        }
    }
}

/// Everything the response screen shows about the last send.
#[derive(Clone, Debug)]
pub struct ResponseView {
    pub status_code: Option<u16>,
    pub status_text: String,
    pub band: StatusBand,
    pub body: String,
    pub time_ms: u64,
    pub size_bytes: usize,
    pub error: Option<String>,
}

impl Default for ResponseView {
    fn default() -> Self {
        ResponseView {
            status_code: None,
            status_text: String::new(),
            band: StatusBand::Unknown,
            body: String::from("No request sent yet.\nPress 's' in the builder to send."),
            time_ms: 0,
            size_bytes: 0,
            error: None,
        }
    }
}

/// What a committed modal prompt means.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PromptKind {
    SaveRequest,
    SaveQuery,
    NewEnvironment,
}

/// Main application state - exclusively owned by the app actor.
pub struct AppState {
    pub screen: Screen,
    nav: Vec<Screen>,
    pub input_mode: InputMode,
    pub notice: Option<Notice>,
    pub storage_warning: bool,

    // Persisted documents; every mutation goes through these and is saved
    // back as a full-document overwrite.
    pub store: Store,
    pub requests_doc: RequestsDocument,
    pub database_doc: DatabaseDocument,
    pub environments_doc: EnvironmentsDocument,

    // In-flight command tracking. One HTTP and one SQL command at most;
    // completions with a stale token are discarded.
    next_token: u64,
    pub pending_http: Option<u64>,
    pub pending_db: Option<u64>,
    pub pending_request: Option<SavedRequest>,
    pub pending_query: Option<String>,
    pub last_sent: Option<SavedRequest>,

    // Request builder
    pub draft: SavedRequest,
    pub builder_focus: BuilderField,
    pub cursor: usize,

    // Response view
    pub response: ResponseView,
    pub response_scroll: u16,
    pub loading: bool,

    // List screens share one selection/filter slot, reset on entry
    pub selected: usize,
    pub filter: String,
    pub filtering: bool,
    pub confirm_delete: bool,

    // Sub-editors
    pub editor: PairEditor,
    pub prompt: Option<TextPrompt>,
    pub prompt_kind: Option<PromptKind>,
    pub editing_env: Option<usize>,

    // Database mode
    pub connection: ConnectionForm,
    pub connect_focus: ConnectField,
    pub db_connected: bool,
    pub query_text: String,
    pub db_result: Option<QueryOutcome>,
    pub db_result_time_ms: u64,
    pub db_error: Option<String>,
    pub tables: Vec<String>,
    pub columns: Vec<String>,
    pub schema_table: Option<String>,
    pub export_format: ExportFormat,
}

impl AppState {
    pub fn new(store: Store) -> Self {
        let mut load_failed = false;

        let requests_doc: RequestsDocument = store.load().unwrap_or_else(|e| {
            error!(error = %e, "failed to load requests document");
            load_failed = true;
            RequestsDocument::default()
        });
        let database_doc: DatabaseDocument = store.load().unwrap_or_else(|e| {
            error!(error = %e, "failed to load database document");
            load_failed = true;
            DatabaseDocument::default()
        });
        let mut environments_doc: EnvironmentsDocument = store.load().unwrap_or_else(|e| {
            error!(error = %e, "failed to load environments document");
            load_failed = true;
            EnvironmentsDocument::default()
        });
        environments_doc.enforce_active();

        // An unreadable document must not be clobbered by a later save:
        // stop persisting for the whole session.
        let store = if load_failed { Store::in_memory() } else { store };
        let storage_warning = load_failed || !store.is_persistent();

        let connection = database_doc
            .saved_connections
            .first()
            .map(ConnectionForm::from_config)
            .unwrap_or_default();

        AppState {
            screen: Screen::Home,
            nav: Vec::new(),
            input_mode: InputMode::Normal,
            notice: None,
            storage_warning,
            store,
            requests_doc,
            database_doc,
            environments_doc,
            next_token: 1,
            pending_http: None,
            pending_db: None,
            pending_request: None,
            pending_query: None,
            last_sent: None,
            draft: SavedRequest::default(),
            builder_focus: BuilderField::default(),
            cursor: 0,
            response: ResponseView::default(),
            response_scroll: 0,
            loading: false,
            selected: 0,
            filter: String::new(),
            filtering: false,
            confirm_delete: false,
            editor: PairEditor::default(),
            prompt: None,
            prompt_kind: None,
            editing_env: None,
            connection,
            connect_focus: ConnectField::default(),
            db_connected: false,
            query_text: String::new(),
            db_result: None,
            db_result_time_ms: 0,
            db_error: None,
            tables: Vec::new(),
            columns: Vec::new(),
            schema_table: None,
            export_format: ExportFormat::default(),
        }
    }

    /// Mint a token for the next outbound command.
    pub fn next_token(&mut self) -> u64 {
        let token = self.next_token;
        self.next_token += 1;
        token
    }

    pub fn notify(&mut self, level: NoticeLevel, text: impl Into<String>) {
        self.notice = Some(Notice {
            level,
            text: text.into(),
            expires_at: Instant::now() + NOTICE_TTL,
        });
    }

    /// Drop the notice once its deadline has passed; called before render.
    pub fn expire_notice(&mut self) {
        if let Some(notice) = &self.notice {
            if Instant::now() >= notice.expires_at {
                self.notice = None;
            }
        }
    }

    /// Push the current screen and enter a new one.
    pub fn go(&mut self, screen: Screen) {
        self.nav.push(self.screen);
        self.enter(screen);
    }

    /// Enter a screen without touching the navigation stack; used when a
    /// completion replaces Loading with the result screen.
    pub fn replace(&mut self, screen: Screen) {
        self.enter(screen);
    }

    /// Pop back to the previous screen, or Home when the stack is empty.
    pub fn back(&mut self) {
        let target = self.nav.pop().unwrap_or(Screen::Home);
        self.enter(target);
    }

    fn enter(&mut self, screen: Screen) {
        self.screen = screen;
        self.selected = 0;
        self.filter.clear();
        self.filtering = false;
        self.confirm_delete = false;
        self.response_scroll = 0;

        match screen {
            Screen::HeaderEditor | Screen::QueryParamEditor | Screen::EnvironmentEditor => {
                self.editor.reset();
                self.input_mode = InputMode::Normal;
            }
            // The body editor drops straight into editing
            Screen::BodyEditor => {
                self.input_mode = InputMode::Editing;
                self.cursor = self.draft.body.len();
            }
            _ => self.input_mode = InputMode::Normal,
        }
    }

    /// Variables of the active environment, if any.
    pub fn active_variables(&self) -> &[KeyValue] {
        match &self.environments_doc.active_environment {
            Some(name) => self
                .environments_doc
                .environments
                .iter()
                .find(|e| &e.name == name)
                .map(|e| e.variables.as_slice())
                .unwrap_or(&[]),
            None => &[],
        }
    }
}
