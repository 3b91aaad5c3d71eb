//! Render state - snapshot sent from the app layer to the UI for drawing
//!
//! Rendering is a pure projection of this struct; the UI layer holds no
//! state of its own beyond the latest snapshot.

use crate::app::editor::{PairEditor, TextPrompt};
use crate::app::state::{BuilderField, NoticeLevel, ResponseView};
use crate::messages::ui_events::{InputMode, Screen};
use crate::messages::QueryOutcome;
use crate::models::{KeyValue, SavedRequest};

/// One row of a list screen: a primary label and a dimmed detail column.
#[derive(Debug, Clone, Default)]
pub struct ListEntry {
    pub primary: String,
    pub secondary: String,
}

impl ListEntry {
    pub fn new(primary: impl Into<String>, secondary: impl Into<String>) -> Self {
        ListEntry {
            primary: primary.into(),
            secondary: secondary.into(),
        }
    }
}

/// Complete state needed by the UI to render.
#[derive(Debug, Clone)]
pub struct RenderState {
    pub screen: Screen,
    pub input_mode: InputMode,
    /// A delete confirmation is pending (list screens or pair editor).
    pub confirming: bool,
    /// A modal name prompt is open.
    pub prompting: bool,
    pub notice: Option<(NoticeLevel, String)>,
    pub storage_warning: bool,

    // Request builder
    pub draft: SavedRequest,
    pub builder_focus: BuilderField,
    pub cursor: usize,

    // Response view
    pub response: ResponseView,
    pub response_scroll: u16,
    pub loading: bool,

    // Current list screen contents (already filtered)
    pub list_title: String,
    pub list: Vec<ListEntry>,
    pub selected: usize,
    pub filter: String,
    pub filtering: bool,

    // Pair editor overlay
    pub editor: PairEditor,
    pub editor_items: Vec<KeyValue>,

    // Modal prompt overlay
    pub prompt: Option<TextPrompt>,

    // Database mode
    pub connect_fields: Vec<(String, String)>,
    pub connect_focus: usize,
    pub db_connected: bool,
    pub query_text: String,
    pub db_result: Option<QueryOutcome>,
    pub db_result_time_ms: u64,
    pub db_error: Option<String>,
    pub schema_table: Option<String>,
    pub columns: Vec<String>,
}

impl Default for RenderState {
    fn default() -> Self {
        RenderState {
            screen: Screen::Home,
            input_mode: InputMode::Normal,
            confirming: false,
            prompting: false,
            notice: None,
            storage_warning: false,
            draft: SavedRequest::default(),
            builder_focus: BuilderField::default(),
            cursor: 0,
            response: ResponseView::default(),
            response_scroll: 0,
            loading: false,
            list_title: String::new(),
            list: Vec::new(),
            selected: 0,
            filter: String::new(),
            filtering: false,
            editor: PairEditor::default(),
            editor_items: Vec::new(),
            prompt: None,
            connect_fields: Vec::new(),
            connect_focus: 0,
            db_connected: false,
            query_text: String::new(),
            db_result: None,
            db_result_time_ms: 0,
            db_error: None,
            schema_table: None,
            columns: Vec::new(),
        }
    }
}
