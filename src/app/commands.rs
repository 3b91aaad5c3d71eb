//! Command handlers - business logic for processing UI events
//!
//! Every handler is pure state mutation plus, at most, one command value
//! describing an effect for the gateway to run. Nothing here blocks on I/O
//! except best-effort document saves.

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::app::editor::{self, EditorMode, PairEditor, TextPrompt};
use crate::app::state::{
    AppState, BuilderField, ConnectField, ExportFormat, NoticeLevel, PromptKind, ResponseView,
};
use crate::clipboard;
use crate::error::{DatabaseError, ValidationError};
use crate::export;
use crate::gateway::http;
use crate::messages::render::{ListEntry, RenderState};
use crate::messages::ui_events::{InputMode, Screen, UiEvent};
use crate::messages::{GatewayCommand, GatewayEvent, QueryOutcome};
use crate::models::{Environment, KeyValue, RequestExecution, SavedQuery, SavedRequest, StatusBand};
use crate::storage;
use crate::template;

/// Home menu entries, in order.
const HOME_MENU: [(&str, &str); 6] = [
    ("New Request", "build and send an HTTP request"),
    ("Saved Requests", "browse saved requests"),
    ("Request History", "replay past executions"),
    ("Environments", "manage template variables"),
    ("Database", "SQL query mode"),
    ("Help", "keyboard reference"),
];

/// Database menu entries, in order.
const DB_MENU: [(&str, &str); 6] = [
    ("Connect", "open a PostgreSQL session"),
    ("Query Editor", "write and execute SQL"),
    ("Saved Queries", "browse saved queries"),
    ("Query History", "replay past queries"),
    ("Schema Browser", "tables and columns"),
    ("Export Last Result", "write rows to CSV or JSON"),
];

impl AppState {
    // ========================
    // Event entry points
    // ========================

    /// Handle one user-input event, returning an effect for the gateway when
    /// one is needed. Quit is handled by the actor, not here.
    pub fn handle_ui_event(&mut self, event: UiEvent) -> Option<GatewayCommand> {
        if event == UiEvent::Quit {
            return None;
        }
        if self.prompt.is_some() {
            self.handle_prompt(event);
            return None;
        }
        if event == UiEvent::OpenHelp {
            self.go(Screen::Help);
            return None;
        }

        match self.screen {
            Screen::Home => {
                self.handle_home(event);
                None
            }
            Screen::RequestBuilder => self.handle_builder(event),
            Screen::Loading => None,
            Screen::ViewResponse => {
                self.handle_view_response(event);
                None
            }
            Screen::RequestList => {
                self.handle_request_list(event);
                None
            }
            Screen::History => {
                self.handle_history(event);
                None
            }
            Screen::HeaderEditor | Screen::QueryParamEditor | Screen::EnvironmentEditor => {
                self.handle_pair_editor(event);
                None
            }
            Screen::BodyEditor => {
                self.handle_body_editor(event);
                None
            }
            Screen::Help => {
                if event == UiEvent::Back {
                    self.back();
                }
                None
            }
            Screen::Database => self.handle_db_menu(event),
            Screen::DatabaseConnect => self.handle_db_connect(event),
            Screen::DatabaseQueryEditor => self.handle_query_editor(event),
            Screen::DatabaseResult => {
                self.handle_db_result(event);
                None
            }
            Screen::DatabaseQueryList => {
                self.handle_query_list(event);
                None
            }
            Screen::DatabaseQueryHistory => {
                self.handle_query_history(event);
                None
            }
            Screen::DatabaseSchema => self.handle_schema(event),
            Screen::DatabaseExport => {
                self.handle_export(event);
                None
            }
            Screen::Environments => {
                self.handle_environments(event);
                None
            }
        }
    }

    /// Merge a gateway completion into state. Completions whose token does
    /// not match the in-flight one are discarded; that is the whole
    /// cancellation story.
    pub fn handle_gateway_event(&mut self, event: GatewayEvent) {
        match event {
            GatewayEvent::HttpDone {
                token,
                time_ms,
                result,
            } => {
                if self.pending_http != Some(token) {
                    debug!(token, "discarding stale HTTP completion");
                    return;
                }
                self.pending_http = None;
                self.loading = false;

                let sent = self
                    .pending_request
                    .take()
                    .unwrap_or_else(|| self.draft.clone());

                self.response = match result {
                    Ok(outcome) => ResponseView {
                        status_code: Some(outcome.status_code),
                        status_text: outcome.status_text,
                        band: outcome.band,
                        body: outcome.body,
                        time_ms,
                        size_bytes: outcome.size_bytes,
                        error: None,
                    },
                    Err(e) => ResponseView {
                        status_code: None,
                        status_text: String::new(),
                        band: StatusBand::Unknown,
                        body: e.to_string(),
                        time_ms,
                        size_bytes: 0,
                        error: Some(e.to_string()),
                    },
                };

                let execution = RequestExecution {
                    id: Uuid::new_v4(),
                    timestamp: Utc::now(),
                    method: sent.method,
                    url: sent.url.clone(),
                    headers: sent.headers.clone(),
                    body: sent.body.clone(),
                    query_params: sent.query_params.clone(),
                    status_code: self.response.status_code,
                    status_text: self.response.status_text.clone(),
                    response_body: self.response.body.clone(),
                    response_time_ms: time_ms,
                    error: self.response.error.clone(),
                };
                storage::push_history(&mut self.requests_doc.history, execution);
                self.persist_requests();

                self.last_sent = Some(sent);
                self.replace(Screen::ViewResponse);
            }

            GatewayEvent::Connected { token, result } => {
                if self.pending_db != Some(token) {
                    debug!(token, "discarding stale connect completion");
                    return;
                }
                self.pending_db = None;
                match result {
                    Ok(()) => {
                        self.db_connected = true;
                        self.notify(NoticeLevel::Info, "connected");
                        let config = self.connection.to_config();
                        if !self.database_doc.saved_connections.contains(&config) {
                            self.database_doc.saved_connections.insert(0, config);
                            self.persist_database();
                        }
                        if self.screen == Screen::DatabaseConnect {
                            self.back();
                        }
                    }
                    Err(e) => {
                        self.db_connected = false;
                        self.notify(NoticeLevel::Error, e.to_string());
                    }
                }
            }

            GatewayEvent::QueryDone {
                token,
                time_ms,
                result,
            } => {
                if self.pending_db != Some(token) {
                    debug!(token, "discarding stale query completion");
                    return;
                }
                self.pending_db = None;
                self.loading = false;

                let query = self.pending_query.take().unwrap_or_default();
                let (row_count, rows_affected, error) = match &result {
                    Ok(QueryOutcome::Rows(table)) => (Some(table.rows.len() as u64), None, None),
                    Ok(QueryOutcome::RowsAffected(n)) => (None, Some(*n), None),
                    Err(e) => (None, None, Some(e.to_string())),
                };
                storage::push_history(
                    &mut self.database_doc.query_history,
                    crate::models::QueryExecution {
                        id: Uuid::new_v4(),
                        timestamp: Utc::now(),
                        query,
                        row_count,
                        rows_affected,
                        execution_time_ms: time_ms,
                        error: error.clone(),
                    },
                );
                self.persist_database();

                match result {
                    Ok(outcome) => {
                        self.db_result = Some(outcome);
                        self.db_result_time_ms = time_ms;
                        self.db_error = None;
                    }
                    Err(e) => {
                        if matches!(e, DatabaseError::ConnectionLost(_)) {
                            self.db_connected = false;
                        }
                        self.db_result = None;
                        self.db_error = Some(e.to_string());
                    }
                }
                self.replace(Screen::DatabaseResult);
            }

            GatewayEvent::Tables { token, result } => {
                if self.pending_db != Some(token) {
                    return;
                }
                self.pending_db = None;
                match result {
                    Ok(tables) => {
                        self.tables = tables;
                        self.columns.clear();
                        self.schema_table = None;
                    }
                    Err(e) => self.notify(NoticeLevel::Error, e.to_string()),
                }
            }

            GatewayEvent::Columns {
                token,
                table,
                result,
            } => {
                if self.pending_db != Some(token) {
                    return;
                }
                self.pending_db = None;
                match result {
                    Ok(columns) => {
                        self.columns = columns;
                        self.schema_table = Some(table);
                    }
                    Err(e) => self.notify(NoticeLevel::Error, e.to_string()),
                }
            }

            GatewayEvent::ConnectionLost { message } => {
                self.db_connected = false;
                self.notify(NoticeLevel::Error, format!("connection lost: {message}"));
            }
        }
    }

    // ========================
    // Home and database menus
    // ========================

    fn handle_home(&mut self, event: UiEvent) {
        match event {
            UiEvent::Up => self.selected = self.selected.saturating_sub(1),
            UiEvent::Down => {
                if self.selected + 1 < HOME_MENU.len() {
                    self.selected += 1;
                }
            }
            UiEvent::Select => match self.selected {
                0 => {
                    self.draft = SavedRequest::default();
                    self.go(Screen::RequestBuilder);
                }
                1 => self.go(Screen::RequestList),
                2 => self.go(Screen::History),
                3 => self.go(Screen::Environments),
                4 => self.go(Screen::Database),
                5 => self.go(Screen::Help),
                _ => {}
            },
            _ => {}
        }
    }

    fn handle_db_menu(&mut self, event: UiEvent) -> Option<GatewayCommand> {
        match event {
            UiEvent::Up => self.selected = self.selected.saturating_sub(1),
            UiEvent::Down => {
                if self.selected + 1 < DB_MENU.len() {
                    self.selected += 1;
                }
            }
            UiEvent::Back => self.back(),
            UiEvent::Select => match self.selected {
                0 => self.go(Screen::DatabaseConnect),
                1 => self.go(Screen::DatabaseQueryEditor),
                2 => self.go(Screen::DatabaseQueryList),
                3 => self.go(Screen::DatabaseQueryHistory),
                4 => {
                    if !self.db_connected {
                        self.notify(NoticeLevel::Warn, "connect to a database first");
                    } else if self.pending_db.is_some() {
                        self.notify(NoticeLevel::Warn, "a database command is already in flight");
                    } else {
                        let token = self.next_token();
                        self.pending_db = Some(token);
                        self.go(Screen::DatabaseSchema);
                        return Some(GatewayCommand::ListTables { token });
                    }
                }
                5 => {
                    if matches!(self.db_result, Some(QueryOutcome::Rows(_))) {
                        self.go(Screen::DatabaseExport);
                        self.selected = match self.export_format {
                            ExportFormat::Csv => 0,
                            ExportFormat::Json => 1,
                        };
                    } else {
                        self.notify(NoticeLevel::Warn, "no result rows to export");
                    }
                }
                _ => {}
            },
            _ => {}
        }
        None
    }

    // ========================
    // Request builder
    // ========================

    fn handle_builder(&mut self, event: UiEvent) -> Option<GatewayCommand> {
        if self.input_mode == InputMode::Editing {
            // Inline URL editing
            match event {
                UiEvent::CharInput(c) => {
                    self.cursor = editor::insert_char(&mut self.draft.url, self.cursor, c);
                }
                UiEvent::Backspace => {
                    self.cursor = editor::delete_char(&mut self.draft.url, self.cursor);
                }
                UiEvent::CursorLeft => self.cursor = editor::cursor_left(&self.draft.url, self.cursor),
                UiEvent::CursorRight => {
                    self.cursor = editor::cursor_right(&self.draft.url, self.cursor)
                }
                UiEvent::StopEditing | UiEvent::Select | UiEvent::NextField => {
                    self.input_mode = InputMode::Normal;
                }
                _ => {}
            }
            return None;
        }

        match event {
            UiEvent::NextField | UiEvent::Down => self.builder_focus = self.builder_focus.next(),
            UiEvent::Up => self.builder_focus = self.builder_focus.prev(),
            UiEvent::CycleMethod => {
                if !self.loading {
                    self.draft.method = self.draft.method.next();
                }
            }
            UiEvent::EditItem => match self.builder_focus {
                BuilderField::Method => self.draft.method = self.draft.method.next(),
                BuilderField::Url => {
                    self.input_mode = InputMode::Editing;
                    self.cursor = self.draft.url.len();
                }
                BuilderField::Headers => self.go(Screen::HeaderEditor),
                BuilderField::Body => self.go(Screen::BodyEditor),
                BuilderField::Params => self.go(Screen::QueryParamEditor),
            },
            UiEvent::Send => return self.send_draft(),
            UiEvent::SaveItem => {
                self.open_prompt(PromptKind::SaveRequest, "Save request as", self.draft.name.clone());
            }
            UiEvent::Back => self.back(),
            _ => {}
        }
        None
    }

    /// Validation gate, busy gate, then hand the resolved request to the
    /// gateway. The stored draft is never mutated by substitution.
    fn send_draft(&mut self) -> Option<GatewayCommand> {
        if self.pending_http.is_some() {
            self.notify(NoticeLevel::Warn, "a request is already in flight");
            return None;
        }

        let variables = self.active_variables().to_vec();
        let resolved = template::resolve_request(&self.draft, &variables);

        if let Err(e) = http::validate_url(&resolved.url) {
            self.notify(NoticeLevel::Error, e.to_string());
            return None;
        }

        let token = self.next_token();
        self.pending_http = Some(token);
        self.pending_request = Some(resolved.clone());
        self.loading = true;
        self.draft.last_used = Utc::now();
        self.go(Screen::Loading);

        Some(GatewayCommand::SendRequest {
            token,
            request: resolved,
        })
    }

    // ========================
    // Response view
    // ========================

    fn handle_view_response(&mut self, event: UiEvent) {
        match event {
            UiEvent::Up => self.response_scroll = self.response_scroll.saturating_sub(1),
            UiEvent::Down => self.response_scroll = self.response_scroll.saturating_add(1),
            UiEvent::CopyBody => {
                if clipboard::write(&self.response.body) {
                    self.notify(NoticeLevel::Info, "response body copied to clipboard");
                } else {
                    self.notify(NoticeLevel::Warn, "clipboard unavailable");
                }
            }
            UiEvent::Export => self.export_curl(),
            UiEvent::Back => self.back(),
            _ => {}
        }
    }

    fn export_curl(&mut self) {
        let Some(sent) = &self.last_sent else {
            self.notify(NoticeLevel::Warn, "nothing to export");
            return;
        };
        let final_url = http::build_final_url(&sent.url, &sent.query_params);
        let command = export::to_curl(sent, &final_url);
        if clipboard::write(&command) {
            self.notify(NoticeLevel::Info, "curl command copied to clipboard");
        } else {
            self.notify(NoticeLevel::Warn, "clipboard unavailable");
        }
    }

    // ========================
    // Saved requests and history
    // ========================

    fn filtered_request_indices(&self) -> Vec<usize> {
        self.requests_doc
            .requests
            .iter()
            .enumerate()
            .filter(|(_, r)| {
                storage::matches_filter(&self.filter, &[&r.name, r.method.as_str(), &r.url])
            })
            .map(|(i, _)| i)
            .collect()
    }

    fn filtered_history_indices(&self) -> Vec<usize> {
        self.requests_doc
            .history
            .iter()
            .enumerate()
            .filter(|(_, e)| storage::matches_filter(&self.filter, &[e.method.as_str(), &e.url]))
            .map(|(i, _)| i)
            .collect()
    }

    fn filtered_query_indices(&self) -> Vec<usize> {
        self.database_doc
            .saved_queries
            .iter()
            .enumerate()
            .filter(|(_, q)| storage::matches_filter(&self.filter, &[&q.name, &q.query]))
            .map(|(i, _)| i)
            .collect()
    }

    fn filtered_query_history_indices(&self) -> Vec<usize> {
        self.database_doc
            .query_history
            .iter()
            .enumerate()
            .filter(|(_, e)| storage::matches_filter(&self.filter, &[&e.query]))
            .map(|(i, _)| i)
            .collect()
    }

    /// Shared filter-input handling for the list screens. Returns true when
    /// the event was consumed by the filter editor.
    fn handle_filter_event(&mut self, event: &UiEvent) -> bool {
        if !self.filtering {
            return false;
        }
        match event {
            UiEvent::CharInput(c) => {
                self.filter.push(*c);
                self.selected = 0;
            }
            UiEvent::Backspace => {
                self.filter.pop();
                self.selected = 0;
            }
            UiEvent::StopEditing | UiEvent::Select => {
                self.filtering = false;
                self.input_mode = InputMode::Normal;
            }
            _ => {}
        }
        true
    }

    fn start_filter(&mut self) {
        self.filtering = true;
        self.input_mode = InputMode::Editing;
    }

    fn nav_list(&mut self, event: &UiEvent, len: usize) -> bool {
        match event {
            UiEvent::Up => {
                self.selected = self.selected.saturating_sub(1);
                true
            }
            UiEvent::Down => {
                if self.selected + 1 < len {
                    self.selected += 1;
                }
                true
            }
            _ => false,
        }
    }

    fn handle_request_list(&mut self, event: UiEvent) {
        if self.handle_filter_event(&event) {
            return;
        }
        let indices = self.filtered_request_indices();
        if self.confirm_delete {
            match event {
                UiEvent::Confirm => {
                    if let Some(&i) = indices.get(self.selected) {
                        self.requests_doc.requests.remove(i);
                        self.persist_requests();
                        self.selected = self.selected.saturating_sub(1);
                    }
                    self.confirm_delete = false;
                }
                UiEvent::Back => self.confirm_delete = false,
                _ => {}
            }
            return;
        }
        if self.nav_list(&event, indices.len()) {
            return;
        }
        match event {
            UiEvent::Select => {
                if let Some(&i) = indices.get(self.selected) {
                    let mut request = self.requests_doc.requests[i].clone();
                    request.last_used = Utc::now();
                    self.requests_doc.requests[i].last_used = request.last_used;
                    self.persist_requests();
                    self.draft = request;
                    self.go(Screen::RequestBuilder);
                }
            }
            UiEvent::DeleteItem => {
                if !indices.is_empty() {
                    self.confirm_delete = true;
                }
            }
            UiEvent::StartFilter => self.start_filter(),
            UiEvent::Back => self.back(),
            _ => {}
        }
    }

    fn handle_history(&mut self, event: UiEvent) {
        if self.handle_filter_event(&event) {
            return;
        }
        let indices = self.filtered_history_indices();
        if self.nav_list(&event, indices.len()) {
            return;
        }
        match event {
            UiEvent::Select => {
                if let Some(&i) = indices.get(self.selected) {
                    let entry = &self.requests_doc.history[i];
                    let now = Utc::now();
                    self.draft = SavedRequest {
                        id: Uuid::new_v4(),
                        name: String::new(),
                        method: entry.method,
                        url: entry.url.clone(),
                        headers: entry.headers.clone(),
                        body: entry.body.clone(),
                        query_params: entry.query_params.clone(),
                        created_at: now,
                        last_used: now,
                    };
                    self.go(Screen::RequestBuilder);
                }
            }
            UiEvent::StartFilter => self.start_filter(),
            UiEvent::Back => self.back(),
            _ => {}
        }
    }

    // ========================
    // Pair editors (headers, params, environment variables)
    // ========================

    pub(crate) fn editor_items(&self) -> &[KeyValue] {
        match self.screen {
            Screen::HeaderEditor => &self.draft.headers,
            Screen::QueryParamEditor => &self.draft.query_params,
            Screen::EnvironmentEditor => self
                .editing_env
                .and_then(|i| self.environments_doc.environments.get(i))
                .map(|e| e.variables.as_slice())
                .unwrap_or(&[]),
            _ => &[],
        }
    }

    fn editor_items_mut(&mut self) -> Option<&mut Vec<KeyValue>> {
        match self.screen {
            Screen::HeaderEditor => Some(&mut self.draft.headers),
            Screen::QueryParamEditor => Some(&mut self.draft.query_params),
            Screen::EnvironmentEditor => self
                .editing_env
                .and_then(|i| self.environments_doc.environments.get_mut(i))
                .map(|e| &mut e.variables),
            _ => None,
        }
    }

    fn with_editor_items(&mut self, f: impl FnOnce(&mut PairEditor, &mut Vec<KeyValue>)) {
        let mut editor = std::mem::take(&mut self.editor);
        if let Some(items) = self.editor_items_mut() {
            f(&mut editor, items);
        }
        self.editor = editor;
    }

    fn persist_editor_target(&mut self) {
        if self.screen == Screen::EnvironmentEditor {
            self.persist_environments();
        }
    }

    fn handle_pair_editor(&mut self, event: UiEvent) {
        match self.editor.mode {
            EditorMode::Browsing => match event {
                UiEvent::Up => self.editor.prev(),
                UiEvent::Down => {
                    let len = self.editor_items().len();
                    self.editor.next(len);
                }
                UiEvent::AddItem => {
                    self.editor.start_add();
                    self.input_mode = InputMode::Editing;
                }
                UiEvent::EditItem => {
                    let mut editor = std::mem::take(&mut self.editor);
                    editor.start_edit(self.editor_items());
                    self.editor = editor;
                    if self.editor.is_editing() {
                        self.input_mode = InputMode::Editing;
                    }
                }
                UiEvent::DeleteItem => {
                    let mut editor = std::mem::take(&mut self.editor);
                    editor.start_delete(self.editor_items());
                    self.editor = editor;
                }
                UiEvent::Back => self.back(),
                _ => {}
            },
            EditorMode::AddingNew | EditorMode::EditingExisting => match event {
                UiEvent::CharInput(c) => self.editor.insert(c),
                UiEvent::Backspace => self.editor.backspace(),
                UiEvent::CursorLeft => self.editor.left(),
                UiEvent::CursorRight => self.editor.right(),
                UiEvent::NextField => self.editor.cycle_field(),
                UiEvent::Select => {
                    let mut committed = false;
                    self.with_editor_items(|editor, items| committed = editor.commit(items));
                    if committed {
                        self.input_mode = InputMode::Normal;
                        self.persist_editor_target();
                    } else {
                        self.notify(NoticeLevel::Warn, "key must not be empty");
                    }
                }
                UiEvent::StopEditing | UiEvent::Back => {
                    self.editor.cancel();
                    self.input_mode = InputMode::Normal;
                }
                _ => {}
            },
            EditorMode::ConfirmingDelete => match event {
                UiEvent::Confirm => {
                    self.with_editor_items(|editor, items| editor.confirm_delete(items));
                    self.persist_editor_target();
                }
                UiEvent::Back => self.editor.cancel(),
                _ => {}
            },
        }
    }

    fn handle_body_editor(&mut self, event: UiEvent) {
        match event {
            UiEvent::CharInput(c) => {
                self.cursor = editor::insert_char(&mut self.draft.body, self.cursor, c);
            }
            UiEvent::NewLine => {
                self.cursor = editor::insert_char(&mut self.draft.body, self.cursor, '\n');
            }
            UiEvent::Backspace => {
                self.cursor = editor::delete_char(&mut self.draft.body, self.cursor);
            }
            UiEvent::CursorLeft => self.cursor = editor::cursor_left(&self.draft.body, self.cursor),
            UiEvent::CursorRight => {
                self.cursor = editor::cursor_right(&self.draft.body, self.cursor)
            }
            UiEvent::StopEditing | UiEvent::Back => self.back(),
            _ => {}
        }
    }

    // ========================
    // Modal prompts (save dialogs)
    // ========================

    fn open_prompt(&mut self, kind: PromptKind, title: &str, initial: String) {
        self.prompt = Some(TextPrompt::new(title, initial));
        self.prompt_kind = Some(kind);
    }

    fn handle_prompt(&mut self, event: UiEvent) {
        match event {
            UiEvent::CharInput(c) => {
                if let Some(p) = self.prompt.as_mut() {
                    p.insert(c);
                }
            }
            UiEvent::Backspace => {
                if let Some(p) = self.prompt.as_mut() {
                    p.backspace();
                }
            }
            UiEvent::CursorLeft => {
                if let Some(p) = self.prompt.as_mut() {
                    p.left();
                }
            }
            UiEvent::CursorRight => {
                if let Some(p) = self.prompt.as_mut() {
                    p.right();
                }
            }
            UiEvent::Back => {
                self.prompt = None;
                self.prompt_kind = None;
            }
            UiEvent::Select => self.commit_prompt(),
            _ => {}
        }
    }

    /// Save gate: a committed name must be non-empty. Duplicate names are
    /// allowed; identity is the id.
    fn commit_prompt(&mut self) {
        let Some(prompt) = self.prompt.take() else { return };
        let kind = self.prompt_kind.take();
        let name = prompt.buffer.trim().to_owned();

        if name.is_empty() {
            self.notify(NoticeLevel::Warn, ValidationError::EmptyName.to_string());
            self.prompt = Some(prompt);
            self.prompt_kind = kind;
            return;
        }

        match kind {
            Some(PromptKind::SaveRequest) => {
                self.draft.name = name;
                self.draft.last_used = Utc::now();
                let draft = self.draft.clone();
                match self
                    .requests_doc
                    .requests
                    .iter_mut()
                    .find(|r| r.id == draft.id)
                {
                    Some(existing) => *existing = draft,
                    None => self.requests_doc.requests.push(draft),
                }
                self.persist_requests();
                self.notify(NoticeLevel::Info, "request saved");
            }
            Some(PromptKind::SaveQuery) => {
                self.database_doc
                    .saved_queries
                    .push(SavedQuery::new(name, self.query_text.clone()));
                self.persist_database();
                self.notify(NoticeLevel::Info, "query saved");
            }
            Some(PromptKind::NewEnvironment) => {
                if self
                    .environments_doc
                    .environments
                    .iter()
                    .any(|e| e.name == name)
                {
                    self.notify(NoticeLevel::Warn, "an environment with that name already exists");
                    self.prompt = Some(prompt);
                    self.prompt_kind = Some(PromptKind::NewEnvironment);
                    return;
                }
                self.environments_doc.environments.push(Environment::new(name));
                self.persist_environments();
                self.selected = self.environments_doc.environments.len() - 1;
            }
            None => {}
        }
    }

    // ========================
    // Environments
    // ========================

    fn handle_environments(&mut self, event: UiEvent) {
        let len = self.environments_doc.environments.len();
        if self.confirm_delete {
            match event {
                UiEvent::Confirm => {
                    if self.selected < len {
                        self.environments_doc.environments.remove(self.selected);
                        // Invariant: the active name must keep referencing an
                        // existing environment or be cleared.
                        self.environments_doc.enforce_active();
                        self.persist_environments();
                        self.selected = self.selected.saturating_sub(1);
                        self.editing_env = None;
                    }
                    self.confirm_delete = false;
                }
                UiEvent::Back => self.confirm_delete = false,
                _ => {}
            }
            return;
        }
        if self.nav_list(&event, len) {
            return;
        }
        match event {
            UiEvent::AddItem => {
                self.open_prompt(PromptKind::NewEnvironment, "New environment", String::new());
            }
            UiEvent::Select => {
                if self.selected < len {
                    self.editing_env = Some(self.selected);
                    self.go(Screen::EnvironmentEditor);
                }
            }
            UiEvent::Activate => {
                if let Some(env) = self.environments_doc.environments.get(self.selected) {
                    let name = env.name.clone();
                    self.environments_doc.active_environment =
                        if self.environments_doc.active_environment.as_deref() == Some(&name) {
                            None
                        } else {
                            Some(name)
                        };
                    self.persist_environments();
                }
            }
            UiEvent::DeleteItem => {
                if len > 0 {
                    self.confirm_delete = true;
                }
            }
            UiEvent::Back => self.back(),
            _ => {}
        }
    }

    // ========================
    // Database mode
    // ========================

    fn handle_db_connect(&mut self, event: UiEvent) -> Option<GatewayCommand> {
        if self.input_mode == InputMode::Editing {
            let field = self.connect_focus;
            match event {
                UiEvent::CharInput(c) => {
                    let cursor = self.cursor;
                    if let Some(buf) = self.connection.field_mut(field) {
                        self.cursor = editor::insert_char(buf, cursor, c);
                    }
                }
                UiEvent::Backspace => {
                    let cursor = self.cursor;
                    if let Some(buf) = self.connection.field_mut(field) {
                        self.cursor = editor::delete_char(buf, cursor);
                    }
                }
                UiEvent::CursorLeft => {
                    if let Some(buf) = self.connection.field_mut(field) {
                        self.cursor = editor::cursor_left(buf, self.cursor);
                    }
                }
                UiEvent::CursorRight => {
                    if let Some(buf) = self.connection.field_mut(field) {
                        self.cursor = editor::cursor_right(buf, self.cursor);
                    }
                }
                UiEvent::NextField => {
                    self.connect_focus = self.connect_focus.next();
                    match self.connection.field_mut(self.connect_focus) {
                        Some(buf) => self.cursor = buf.len(),
                        None => self.input_mode = InputMode::Normal,
                    }
                }
                UiEvent::StopEditing | UiEvent::Select => self.input_mode = InputMode::Normal,
                _ => {}
            }
            return None;
        }

        match event {
            UiEvent::NextField | UiEvent::Down => self.connect_focus = self.connect_focus.next(),
            UiEvent::Up => self.connect_focus = self.connect_focus.prev(),
            UiEvent::EditItem => match self.connect_focus {
                ConnectField::SslMode => {
                    self.connection.ssl_mode = self.connection.ssl_mode.next();
                }
                field => {
                    self.input_mode = InputMode::Editing;
                    self.cursor = self
                        .connection
                        .field_mut(field)
                        .map(|b| b.len())
                        .unwrap_or(0);
                }
            },
            UiEvent::Send => return self.connect_db(),
            UiEvent::Back => self.back(),
            _ => {}
        }
        None
    }

    fn connect_db(&mut self) -> Option<GatewayCommand> {
        if self.pending_db.is_some() {
            self.notify(NoticeLevel::Warn, "a database command is already in flight");
            return None;
        }
        let config = self.connection.to_config();
        if config.host.trim().is_empty() {
            self.notify(NoticeLevel::Error, "host must not be empty");
            return None;
        }
        if config.database.trim().is_empty() {
            self.notify(NoticeLevel::Error, "database must not be empty");
            return None;
        }
        let token = self.next_token();
        self.pending_db = Some(token);
        self.notify(NoticeLevel::Info, format!("connecting to {}...", config.host));
        Some(GatewayCommand::Connect { token, config })
    }

    fn handle_query_editor(&mut self, event: UiEvent) -> Option<GatewayCommand> {
        if self.input_mode == InputMode::Editing {
            match event {
                UiEvent::CharInput(c) => {
                    self.cursor = editor::insert_char(&mut self.query_text, self.cursor, c);
                }
                UiEvent::NewLine => {
                    self.cursor = editor::insert_char(&mut self.query_text, self.cursor, '\n');
                }
                UiEvent::Backspace => {
                    self.cursor = editor::delete_char(&mut self.query_text, self.cursor);
                }
                UiEvent::CursorLeft => {
                    self.cursor = editor::cursor_left(&self.query_text, self.cursor)
                }
                UiEvent::CursorRight => {
                    self.cursor = editor::cursor_right(&self.query_text, self.cursor)
                }
                UiEvent::StopEditing => self.input_mode = InputMode::Normal,
                _ => {}
            }
            return None;
        }

        match event {
            UiEvent::EditItem => {
                self.input_mode = InputMode::Editing;
                self.cursor = self.query_text.len();
            }
            UiEvent::Execute => return self.execute_query(),
            UiEvent::SaveItem => {
                if self.query_text.trim().is_empty() {
                    self.notify(NoticeLevel::Error, ValidationError::EmptyQuery.to_string());
                } else {
                    self.open_prompt(PromptKind::SaveQuery, "Save query as", String::new());
                }
            }
            UiEvent::Back => self.back(),
            _ => {}
        }
        None
    }

    /// Empty queries are rejected before any connection use.
    fn execute_query(&mut self) -> Option<GatewayCommand> {
        if self.query_text.trim().is_empty() {
            self.notify(NoticeLevel::Error, ValidationError::EmptyQuery.to_string());
            return None;
        }
        if !self.db_connected {
            self.notify(NoticeLevel::Error, DatabaseError::NotConnected.to_string());
            return None;
        }
        if self.pending_db.is_some() {
            self.notify(NoticeLevel::Warn, "a query is already in flight");
            return None;
        }
        let token = self.next_token();
        self.pending_db = Some(token);
        self.pending_query = Some(self.query_text.clone());
        self.loading = true;
        self.go(Screen::Loading);
        Some(GatewayCommand::ExecuteQuery {
            token,
            query: self.query_text.clone(),
        })
    }

    fn handle_db_result(&mut self, event: UiEvent) {
        match event {
            UiEvent::Up => self.response_scroll = self.response_scroll.saturating_sub(1),
            UiEvent::Down => self.response_scroll = self.response_scroll.saturating_add(1),
            UiEvent::CopyBody => {
                let text = match &self.db_result {
                    Some(QueryOutcome::Rows(table)) => export::table_to_csv(table),
                    Some(QueryOutcome::RowsAffected(n)) => format!("{n} rows affected"),
                    None => match &self.db_error {
                        Some(e) => e.clone(),
                        None => return,
                    },
                };
                if clipboard::write(&text) {
                    self.notify(NoticeLevel::Info, "result copied to clipboard");
                } else {
                    self.notify(NoticeLevel::Warn, "clipboard unavailable");
                }
            }
            UiEvent::Export => {
                if matches!(self.db_result, Some(QueryOutcome::Rows(_))) {
                    self.go(Screen::DatabaseExport);
                    self.selected = match self.export_format {
                        ExportFormat::Csv => 0,
                        ExportFormat::Json => 1,
                    };
                } else {
                    self.notify(NoticeLevel::Warn, "no result rows to export");
                }
            }
            UiEvent::Back => self.back(),
            _ => {}
        }
    }

    fn handle_query_list(&mut self, event: UiEvent) {
        if self.handle_filter_event(&event) {
            return;
        }
        let indices = self.filtered_query_indices();
        if self.confirm_delete {
            match event {
                UiEvent::Confirm => {
                    if let Some(&i) = indices.get(self.selected) {
                        self.database_doc.saved_queries.remove(i);
                        self.persist_database();
                        self.selected = self.selected.saturating_sub(1);
                    }
                    self.confirm_delete = false;
                }
                UiEvent::Back => self.confirm_delete = false,
                _ => {}
            }
            return;
        }
        if self.nav_list(&event, indices.len()) {
            return;
        }
        match event {
            UiEvent::Select => {
                if let Some(&i) = indices.get(self.selected) {
                    let now = Utc::now();
                    self.database_doc.saved_queries[i].last_used = now;
                    self.query_text = self.database_doc.saved_queries[i].query.clone();
                    self.persist_database();
                    self.go(Screen::DatabaseQueryEditor);
                }
            }
            UiEvent::DeleteItem => {
                if !indices.is_empty() {
                    self.confirm_delete = true;
                }
            }
            UiEvent::StartFilter => self.start_filter(),
            UiEvent::Back => self.back(),
            _ => {}
        }
    }

    fn handle_query_history(&mut self, event: UiEvent) {
        if self.handle_filter_event(&event) {
            return;
        }
        let indices = self.filtered_query_history_indices();
        if self.nav_list(&event, indices.len()) {
            return;
        }
        match event {
            UiEvent::Select => {
                if let Some(&i) = indices.get(self.selected) {
                    self.query_text = self.database_doc.query_history[i].query.clone();
                    self.go(Screen::DatabaseQueryEditor);
                }
            }
            UiEvent::StartFilter => self.start_filter(),
            UiEvent::Back => self.back(),
            _ => {}
        }
    }

    fn handle_schema(&mut self, event: UiEvent) -> Option<GatewayCommand> {
        if self.nav_list(&event, self.tables.len()) {
            return None;
        }
        match event {
            UiEvent::Select => {
                if let Some(table) = self.tables.get(self.selected).cloned() {
                    if self.pending_db.is_some() {
                        self.notify(NoticeLevel::Warn, "a database command is already in flight");
                        return None;
                    }
                    let token = self.next_token();
                    self.pending_db = Some(token);
                    return Some(GatewayCommand::ListColumns { token, table });
                }
            }
            UiEvent::Back => self.back(),
            _ => {}
        }
        None
    }

    fn handle_export(&mut self, event: UiEvent) {
        match event {
            UiEvent::Up => {
                self.selected = 0;
                self.export_format = ExportFormat::Csv;
            }
            UiEvent::Down => {
                self.selected = 1;
                self.export_format = ExportFormat::Json;
            }
            UiEvent::Select => self.perform_export(),
            UiEvent::Back => self.back(),
            _ => {}
        }
    }

    fn perform_export(&mut self) {
        let contents = match (&self.db_result, self.export_format) {
            (Some(QueryOutcome::Rows(table)), ExportFormat::Csv) => export::table_to_csv(table),
            (Some(QueryOutcome::Rows(table)), ExportFormat::Json) => export::table_to_json(table),
            _ => {
                self.notify(NoticeLevel::Warn, "no result rows to export");
                return;
            }
        };
        let ext = match self.export_format {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        };
        let file = format!("export-{}.{ext}", Utc::now().format("%Y%m%d-%H%M%S"));
        match self.store.write_export(&file, &contents) {
            Ok(path) => self.notify(NoticeLevel::Info, format!("exported to {}", path.display())),
            Err(e) => self.notify(NoticeLevel::Error, format!("export failed: {e}")),
        }
    }

    // ========================
    // Persistence (best-effort; failure never loses in-memory state)
    // ========================

    fn persist_requests(&mut self) {
        if let Err(e) = self.store.save(&self.requests_doc) {
            self.notify(NoticeLevel::Error, format!("save failed: {e}"));
        }
    }

    fn persist_database(&mut self) {
        if let Err(e) = self.store.save(&self.database_doc) {
            self.notify(NoticeLevel::Error, format!("save failed: {e}"));
        }
    }

    fn persist_environments(&mut self) {
        self.environments_doc.enforce_active();
        if let Err(e) = self.store.save(&self.environments_doc) {
            self.notify(NoticeLevel::Error, format!("save failed: {e}"));
        }
    }

    // ========================
    // Render projection
    // ========================

    /// Convert state to a RenderState snapshot for the UI. Pure projection;
    /// the only state it observes is what it copies.
    pub fn to_render_state(&self) -> RenderState {
        let (list_title, list) = self.current_list();
        let len = list.len();
        RenderState {
            screen: self.screen,
            input_mode: self.input_mode,
            confirming: self.confirm_delete || self.editor.mode == EditorMode::ConfirmingDelete,
            prompting: self.prompt.is_some(),
            notice: self.notice.as_ref().map(|n| (n.level, n.text.clone())),
            storage_warning: self.storage_warning,
            draft: self.draft.clone(),
            builder_focus: self.builder_focus,
            cursor: self.cursor,
            response: self.response.clone(),
            response_scroll: self.response_scroll,
            loading: self.loading,
            list_title,
            list,
            selected: self.selected.min(len.saturating_sub(1)),
            filter: self.filter.clone(),
            filtering: self.filtering,
            editor: self.editor.clone(),
            editor_items: self.editor_items().to_vec(),
            prompt: self.prompt.clone(),
            connect_fields: ConnectField::ALL
                .iter()
                .map(|f| (f.label().to_owned(), self.connection.display(*f)))
                .collect(),
            connect_focus: self.connect_focus.index(),
            db_connected: self.db_connected,
            query_text: self.query_text.clone(),
            db_result: self.db_result.clone(),
            db_result_time_ms: self.db_result_time_ms,
            db_error: self.db_error.clone(),
            schema_table: self.schema_table.clone(),
            columns: self.columns.clone(),
        }
    }

    fn current_list(&self) -> (String, Vec<ListEntry>) {
        match self.screen {
            Screen::Home => (
                String::from("Courier"),
                HOME_MENU
                    .iter()
                    .map(|(label, hint)| ListEntry::new(*label, *hint))
                    .collect(),
            ),
            Screen::Database => (
                String::from("Database"),
                DB_MENU
                    .iter()
                    .map(|(label, hint)| ListEntry::new(*label, *hint))
                    .collect(),
            ),
            Screen::RequestList => (
                String::from("Saved Requests"),
                self.filtered_request_indices()
                    .into_iter()
                    .map(|i| {
                        let r = &self.requests_doc.requests[i];
                        ListEntry::new(
                            if r.name.is_empty() { "(unnamed)" } else { &r.name },
                            format!("{} {}", r.method.as_str(), r.url),
                        )
                    })
                    .collect(),
            ),
            Screen::History => (
                String::from("Request History"),
                self.filtered_history_indices()
                    .into_iter()
                    .map(|i| {
                        let e = &self.requests_doc.history[i];
                        let outcome = match (e.status_code, &e.error) {
                            (Some(code), _) => format!("{code} · {}ms", e.response_time_ms),
                            (None, Some(err)) => err.clone(),
                            (None, None) => String::from("-"),
                        };
                        ListEntry::new(
                            format!("{} {}", e.method.as_str(), e.url),
                            format!("{} · {}", e.timestamp.format("%Y-%m-%d %H:%M:%S"), outcome),
                        )
                    })
                    .collect(),
            ),
            Screen::DatabaseQueryList => (
                String::from("Saved Queries"),
                self.filtered_query_indices()
                    .into_iter()
                    .map(|i| {
                        let q = &self.database_doc.saved_queries[i];
                        ListEntry::new(q.name.clone(), truncate(&q.query, 60))
                    })
                    .collect(),
            ),
            Screen::DatabaseQueryHistory => (
                String::from("Query History"),
                self.filtered_query_history_indices()
                    .into_iter()
                    .map(|i| {
                        let e = &self.database_doc.query_history[i];
                        ListEntry::new(truncate(&e.query, 60), export::query_summary(e))
                    })
                    .collect(),
            ),
            Screen::DatabaseSchema => (
                String::from("Tables"),
                self.tables
                    .iter()
                    .map(|t| ListEntry::new(t.clone(), String::new()))
                    .collect(),
            ),
            Screen::DatabaseExport => (
                String::from("Export Format"),
                vec![
                    ListEntry::new("CSV", "comma-separated values"),
                    ListEntry::new("JSON", "array of row objects"),
                ],
            ),
            Screen::Environments => (
                String::from("Environments"),
                self.environments_doc
                    .environments
                    .iter()
                    .map(|e| {
                        let active = self.environments_doc.active_environment.as_deref()
                            == Some(e.name.as_str());
                        ListEntry::new(
                            if active {
                                format!("{} (active)", e.name)
                            } else {
                                e.name.clone()
                            },
                            format!("{} variables", e.variables.len()),
                        )
                    })
                    .collect(),
            ),
            _ => (String::new(), Vec::new()),
        }
    }
}

/// Char-boundary-safe truncation for list display.
fn truncate(s: &str, max_chars: usize) -> String {
    let flat = s.replace('\n', " ");
    if flat.chars().count() <= max_chars {
        flat
    } else {
        let cut: String = flat.chars().take(max_chars).collect();
        format!("{cut}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HttpError;
    use crate::messages::HttpOutcome;
    use crate::models::ResultTable;
    use crate::storage::Store;

    fn state() -> AppState {
        AppState::new(Store::in_memory())
    }

    fn builder_state(url: &str) -> AppState {
        let mut s = state();
        s.go(Screen::RequestBuilder);
        s.draft.url = url.to_owned();
        s
    }

    fn ok_outcome(body: &str) -> HttpOutcome {
        HttpOutcome {
            status_code: 200,
            status_text: String::from("OK"),
            band: StatusBand::Success,
            body: body.to_owned(),
            size_bytes: body.len(),
        }
    }

    #[test]
    fn send_with_invalid_url_shows_violation_and_no_command() {
        let mut s = builder_state("");
        assert!(s.handle_ui_event(UiEvent::Send).is_none());
        assert!(s.notice.as_ref().unwrap().text.contains("empty"));
        assert_eq!(s.screen, Screen::RequestBuilder);

        let mut s = builder_state("example.com");
        assert!(s.handle_ui_event(UiEvent::Send).is_none());
        assert!(s.notice.as_ref().unwrap().text.contains("scheme"));
    }

    #[test]
    fn send_while_in_flight_is_rejected_with_busy_notice() {
        let mut s = builder_state("http://example.com");
        let first = s.handle_ui_event(UiEvent::Send);
        assert!(matches!(first, Some(GatewayCommand::SendRequest { .. })));
        assert_eq!(s.screen, Screen::Loading);

        // The loading screen swallows input, so drive the gate directly.
        let second = s.send_draft();
        assert!(second.is_none());
        assert!(s.notice.as_ref().unwrap().text.contains("in flight"));
        assert!(s.pending_http.is_some());
    }

    #[test]
    fn stale_http_completion_is_discarded() {
        let mut s = builder_state("http://example.com");
        let cmd = s.handle_ui_event(UiEvent::Send).unwrap();
        let GatewayCommand::SendRequest { token, .. } = cmd else {
            panic!("expected a send command");
        };

        s.handle_gateway_event(GatewayEvent::HttpDone {
            token: token + 99,
            time_ms: 5,
            result: Ok(ok_outcome("nope")),
        });
        assert!(s.requests_doc.history.is_empty());
        assert_eq!(s.screen, Screen::Loading);
        assert_eq!(s.pending_http, Some(token));
    }

    #[test]
    fn completed_send_records_execution_and_shows_response() {
        let mut s = builder_state("http://example.com/users");
        s.draft.headers = vec![KeyValue::new("Accept", "application/json")];
        s.draft.query_params = vec![KeyValue::new("page", "2")];

        let cmd = s.handle_ui_event(UiEvent::Send).unwrap();
        let GatewayCommand::SendRequest { token, request } = cmd else {
            panic!("expected a send command");
        };
        assert_eq!(request.url, "http://example.com/users");

        s.handle_gateway_event(GatewayEvent::HttpDone {
            token,
            time_ms: 12,
            result: Ok(ok_outcome("{\"ok\":true}")),
        });

        assert_eq!(s.screen, Screen::ViewResponse);
        assert_eq!(s.response.status_code, Some(200));
        let entry = &s.requests_doc.history[0];
        assert_eq!(entry.method, crate::models::HttpMethod::GET);
        assert_eq!(entry.url, "http://example.com/users");
        assert_eq!(entry.headers, vec![KeyValue::new("Accept", "application/json")]);
        assert_eq!(entry.query_params, vec![KeyValue::new("page", "2")]);
        assert_eq!(entry.status_code, Some(200));
        assert_eq!(entry.response_time_ms, 12);
        assert!(entry.error.is_none());
        assert!(s.pending_http.is_none());
    }

    #[test]
    fn failed_send_is_still_recorded_in_history() {
        let mut s = builder_state("http://example.com");
        let cmd = s.handle_ui_event(UiEvent::Send).unwrap();
        let GatewayCommand::SendRequest { token, .. } = cmd else {
            panic!("expected a send command");
        };

        s.handle_gateway_event(GatewayEvent::HttpDone {
            token,
            time_ms: 30_000,
            result: Err(HttpError::Timeout(30)),
        });
        let entry = &s.requests_doc.history[0];
        assert_eq!(entry.status_code, None);
        assert!(entry.error.as_ref().unwrap().contains("timed out"));
        assert_eq!(s.screen, Screen::ViewResponse);
    }

    #[test]
    fn substitution_is_applied_at_dispatch_without_mutating_the_draft() {
        let mut s = builder_state("{{BASE}}/users");
        let mut env = Environment::new("dev");
        env.variables = vec![KeyValue::new("BASE", "http://example.com")];
        s.environments_doc.environments.push(env);
        s.environments_doc.active_environment = Some(String::from("dev"));

        let cmd = s.handle_ui_event(UiEvent::Send).unwrap();
        let GatewayCommand::SendRequest { request, .. } = cmd else {
            panic!("expected a send command");
        };
        assert_eq!(request.url, "http://example.com/users");
        assert_eq!(s.draft.url, "{{BASE}}/users");
    }

    #[test]
    fn save_prompt_rejects_empty_name() {
        let mut s = builder_state("http://example.com");
        s.handle_ui_event(UiEvent::SaveItem);
        assert!(s.prompt.is_some());
        s.handle_ui_event(UiEvent::Select);
        assert!(s.prompt.is_some(), "prompt stays open on empty name");
        assert!(s.requests_doc.requests.is_empty());
    }

    #[test]
    fn saving_twice_updates_in_place_by_id() {
        let mut s = builder_state("http://example.com");
        s.handle_ui_event(UiEvent::SaveItem);
        for c in "users".chars() {
            s.handle_ui_event(UiEvent::CharInput(c));
        }
        s.handle_ui_event(UiEvent::Select);
        assert_eq!(s.requests_doc.requests.len(), 1);

        s.draft.url = String::from("http://example.com/v2");
        s.handle_ui_event(UiEvent::SaveItem);
        s.handle_ui_event(UiEvent::Select);
        assert_eq!(s.requests_doc.requests.len(), 1);
        assert_eq!(s.requests_doc.requests[0].url, "http://example.com/v2");
    }

    #[test]
    fn deleting_active_environment_clears_the_reference() {
        let mut s = state();
        s.environments_doc.environments.push(Environment::new("dev"));
        s.environments_doc.active_environment = Some(String::from("dev"));
        s.go(Screen::Environments);

        s.handle_ui_event(UiEvent::DeleteItem);
        assert!(s.confirm_delete);
        s.handle_ui_event(UiEvent::Confirm);

        assert!(s.environments_doc.environments.is_empty());
        assert_eq!(s.environments_doc.active_environment, None);
    }

    #[test]
    fn environment_names_must_be_unique() {
        let mut s = state();
        s.environments_doc.environments.push(Environment::new("dev"));
        s.go(Screen::Environments);
        s.handle_ui_event(UiEvent::AddItem);
        for c in "dev".chars() {
            s.handle_ui_event(UiEvent::CharInput(c));
        }
        s.handle_ui_event(UiEvent::Select);
        assert_eq!(s.environments_doc.environments.len(), 1);
        assert!(s.prompt.is_some());
    }

    #[test]
    fn empty_query_rejected_before_any_connection_use() {
        let mut s = state();
        s.go(Screen::Database);
        s.go(Screen::DatabaseQueryEditor);
        s.query_text = String::from("   \n ");
        assert!(s.handle_ui_event(UiEvent::Execute).is_none());
        assert!(s.notice.as_ref().unwrap().text.contains("empty"));
    }

    #[test]
    fn query_requires_connection_then_respects_busy_gate() {
        let mut s = state();
        s.go(Screen::DatabaseQueryEditor);
        s.query_text = String::from("SELECT 1");
        assert!(s.handle_ui_event(UiEvent::Execute).is_none());
        assert!(s.notice.as_ref().unwrap().text.contains("not connected"));

        s.db_connected = true;
        let cmd = s.handle_ui_event(UiEvent::Execute);
        assert!(matches!(cmd, Some(GatewayCommand::ExecuteQuery { .. })));
        assert_eq!(s.screen, Screen::Loading);
        assert!(s.execute_query().is_none());
    }

    #[test]
    fn query_completion_records_history_and_result() {
        let mut s = state();
        s.go(Screen::DatabaseQueryEditor);
        s.db_connected = true;
        s.query_text = String::from("SELECT name FROM users");
        let cmd = s.handle_ui_event(UiEvent::Execute).unwrap();
        let GatewayCommand::ExecuteQuery { token, .. } = cmd else {
            panic!("expected an execute command");
        };

        let table = ResultTable {
            columns: vec![String::from("name")],
            rows: vec![vec![String::from("ada")]],
        };
        s.handle_gateway_event(GatewayEvent::QueryDone {
            token,
            time_ms: 7,
            result: Ok(QueryOutcome::Rows(table)),
        });

        assert_eq!(s.screen, Screen::DatabaseResult);
        let entry = &s.database_doc.query_history[0];
        assert_eq!(entry.query, "SELECT name FROM users");
        assert_eq!(entry.row_count, Some(1));
        assert!(entry.error.is_none());
        assert!(matches!(s.db_result, Some(QueryOutcome::Rows(_))));
    }

    #[test]
    fn filter_narrows_saved_request_list() {
        let mut s = state();
        let mut a = SavedRequest::default();
        a.name = String::from("Get Users");
        a.url = String::from("http://a");
        let mut b = SavedRequest::default();
        b.name = String::from("Delete Post");
        b.url = String::from("http://b");
        s.requests_doc.requests = vec![a, b];
        s.go(Screen::RequestList);

        s.handle_ui_event(UiEvent::StartFilter);
        for c in "users".chars() {
            s.handle_ui_event(UiEvent::CharInput(c));
        }
        let render = s.to_render_state();
        assert_eq!(render.list.len(), 1);
        assert_eq!(render.list[0].primary, "Get Users");
    }

    #[test]
    fn header_editor_commit_updates_draft() {
        let mut s = state();
        s.go(Screen::RequestBuilder);
        s.draft.headers.clear();
        s.go(Screen::HeaderEditor);

        s.handle_ui_event(UiEvent::AddItem);
        for c in "Accept".chars() {
            s.handle_ui_event(UiEvent::CharInput(c));
        }
        s.handle_ui_event(UiEvent::NextField);
        for c in "text/html".chars() {
            s.handle_ui_event(UiEvent::CharInput(c));
        }
        s.handle_ui_event(UiEvent::Select);

        assert_eq!(s.draft.headers, vec![KeyValue::new("Accept", "text/html")]);
        assert_eq!(s.input_mode, InputMode::Normal);
    }

    #[test]
    fn back_returns_to_previous_screen() {
        let mut s = state();
        s.go(Screen::Database);
        s.go(Screen::DatabaseQueryEditor);
        s.handle_ui_event(UiEvent::Back);
        assert_eq!(s.screen, Screen::Database);
        s.handle_ui_event(UiEvent::Back);
        assert_eq!(s.screen, Screen::Home);
    }
}
