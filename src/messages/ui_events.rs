//! UI events - messages from the UI layer to the app layer

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// One modal mode of the interface; exactly one is active at a time.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Screen {
    #[default]
    Home,
    RequestBuilder,
    Loading,
    ViewResponse,
    RequestList,
    HeaderEditor,
    BodyEditor,
    QueryParamEditor,
    Help,
    History,
    Database,
    DatabaseConnect,
    DatabaseQueryEditor,
    DatabaseResult,
    DatabaseQueryList,
    DatabaseSchema,
    DatabaseQueryHistory,
    DatabaseExport,
    Environments,
    EnvironmentEditor,
}

/// Input mode
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Editing,
}

/// Events generated from user input in the UI layer. The app layer
/// interprets them in the context of the current screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    // Navigation
    Up,
    Down,
    Select,
    Back,
    NextField,

    // Text editing
    StopEditing,
    CharInput(char),
    Backspace,
    CursorLeft,
    CursorRight,
    NewLine,

    // Actions
    CycleMethod,
    Send,
    Execute,
    SaveItem,
    AddItem,
    EditItem,
    DeleteItem,
    Confirm,
    Activate,
    StartFilter,
    CopyBody,
    Export,
    OpenHelp,

    // System
    Quit,
}

/// Convert a key event to a UiEvent based on current UI context.
pub fn key_to_ui_event(
    key: KeyEvent,
    screen: Screen,
    input_mode: InputMode,
    confirming: bool,
    prompting: bool,
) -> Option<UiEvent> {
    use crossterm::event::KeyEventKind;

    if key.kind != KeyEventKind::Press {
        return None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        if let KeyCode::Char('c') = key.code {
            return Some(UiEvent::Quit);
        }
    }

    // Modal prompt (name dialogs) swallows everything
    if prompting {
        return match key.code {
            KeyCode::Esc => Some(UiEvent::Back),
            KeyCode::Enter => Some(UiEvent::Select),
            KeyCode::Backspace => Some(UiEvent::Backspace),
            KeyCode::Left => Some(UiEvent::CursorLeft),
            KeyCode::Right => Some(UiEvent::CursorRight),
            KeyCode::Char(c) => Some(UiEvent::CharInput(c)),
            _ => None,
        };
    }

    // Delete confirmation
    if confirming {
        return match key.code {
            KeyCode::Char('y') | KeyCode::Enter => Some(UiEvent::Confirm),
            KeyCode::Char('n') | KeyCode::Esc => Some(UiEvent::Back),
            _ => None,
        };
    }

    if input_mode == InputMode::Editing {
        return match key.code {
            KeyCode::Esc => Some(UiEvent::StopEditing),
            KeyCode::Left => Some(UiEvent::CursorLeft),
            KeyCode::Right => Some(UiEvent::CursorRight),
            KeyCode::Backspace => Some(UiEvent::Backspace),
            KeyCode::Tab => Some(UiEvent::NextField),
            KeyCode::Enter => {
                // Multiline editors insert, everything else commits
                if matches!(screen, Screen::BodyEditor | Screen::DatabaseQueryEditor) {
                    Some(UiEvent::NewLine)
                } else {
                    Some(UiEvent::Select)
                }
            }
            KeyCode::Char(c) => Some(UiEvent::CharInput(c)),
            _ => None,
        };
    }

    // Any key dismisses the help screen
    if screen == Screen::Help {
        return Some(UiEvent::Back);
    }

    if key.code == KeyCode::Char('?') {
        return Some(UiEvent::OpenHelp);
    }

    match screen {
        Screen::Home => match key.code {
            KeyCode::Up => Some(UiEvent::Up),
            KeyCode::Down => Some(UiEvent::Down),
            KeyCode::Enter => Some(UiEvent::Select),
            KeyCode::Char('q') => Some(UiEvent::Quit),
            _ => None,
        },

        Screen::RequestBuilder => match key.code {
            KeyCode::Tab => Some(UiEvent::NextField),
            KeyCode::Up => Some(UiEvent::Up),
            KeyCode::Down => Some(UiEvent::Down),
            KeyCode::Char('m') => Some(UiEvent::CycleMethod),
            KeyCode::Char('e') | KeyCode::Enter => Some(UiEvent::EditItem),
            KeyCode::Char('s') => Some(UiEvent::Send),
            KeyCode::Char('w') => Some(UiEvent::SaveItem),
            KeyCode::Esc => Some(UiEvent::Back),
            _ => None,
        },

        // Only the global quit works while a command is in flight
        Screen::Loading => None,

        Screen::ViewResponse | Screen::DatabaseResult => match key.code {
            KeyCode::Up => Some(UiEvent::Up),
            KeyCode::Down => Some(UiEvent::Down),
            KeyCode::Char('c') => Some(UiEvent::CopyBody),
            KeyCode::Char('x') => Some(UiEvent::Export),
            KeyCode::Esc => Some(UiEvent::Back),
            _ => None,
        },

        Screen::RequestList
        | Screen::History
        | Screen::DatabaseQueryList
        | Screen::DatabaseQueryHistory => match key.code {
            KeyCode::Up => Some(UiEvent::Up),
            KeyCode::Down => Some(UiEvent::Down),
            KeyCode::Enter => Some(UiEvent::Select),
            KeyCode::Char('d') => Some(UiEvent::DeleteItem),
            KeyCode::Char('/') => Some(UiEvent::StartFilter),
            KeyCode::Esc => Some(UiEvent::Back),
            _ => None,
        },

        Screen::HeaderEditor | Screen::QueryParamEditor | Screen::EnvironmentEditor => {
            match key.code {
                KeyCode::Up => Some(UiEvent::Up),
                KeyCode::Down => Some(UiEvent::Down),
                KeyCode::Char('a') => Some(UiEvent::AddItem),
                KeyCode::Char('e') | KeyCode::Enter => Some(UiEvent::EditItem),
                KeyCode::Char('d') => Some(UiEvent::DeleteItem),
                KeyCode::Esc => Some(UiEvent::Back),
                _ => None,
            }
        }

        // The body editor is always in editing mode; handled above
        Screen::BodyEditor => match key.code {
            KeyCode::Esc => Some(UiEvent::Back),
            _ => None,
        },

        Screen::Help => Some(UiEvent::Back),

        Screen::Database => match key.code {
            KeyCode::Up => Some(UiEvent::Up),
            KeyCode::Down => Some(UiEvent::Down),
            KeyCode::Enter => Some(UiEvent::Select),
            KeyCode::Esc => Some(UiEvent::Back),
            _ => None,
        },

        Screen::DatabaseConnect => match key.code {
            KeyCode::Tab => Some(UiEvent::NextField),
            KeyCode::Up => Some(UiEvent::Up),
            KeyCode::Down => Some(UiEvent::Down),
            KeyCode::Char('e') | KeyCode::Enter => Some(UiEvent::EditItem),
            KeyCode::Char('s') => Some(UiEvent::Send),
            KeyCode::Esc => Some(UiEvent::Back),
            _ => None,
        },

        Screen::DatabaseQueryEditor => match key.code {
            KeyCode::Char('e') | KeyCode::Enter => Some(UiEvent::EditItem),
            KeyCode::Char('x') => Some(UiEvent::Execute),
            KeyCode::Char('w') => Some(UiEvent::SaveItem),
            KeyCode::Esc => Some(UiEvent::Back),
            _ => None,
        },

        Screen::DatabaseSchema => match key.code {
            KeyCode::Up => Some(UiEvent::Up),
            KeyCode::Down => Some(UiEvent::Down),
            KeyCode::Enter => Some(UiEvent::Select),
            KeyCode::Esc => Some(UiEvent::Back),
            _ => None,
        },

        Screen::DatabaseExport => match key.code {
            KeyCode::Up => Some(UiEvent::Up),
            KeyCode::Down => Some(UiEvent::Down),
            KeyCode::Enter => Some(UiEvent::Select),
            KeyCode::Esc => Some(UiEvent::Back),
            _ => None,
        },

        Screen::Environments => match key.code {
            KeyCode::Up => Some(UiEvent::Up),
            KeyCode::Down => Some(UiEvent::Down),
            KeyCode::Char('a') => Some(UiEvent::AddItem),
            KeyCode::Enter => Some(UiEvent::Select),
            KeyCode::Char(' ') => Some(UiEvent::Activate),
            KeyCode::Char('d') => Some(UiEvent::DeleteItem),
            KeyCode::Esc => Some(UiEvent::Back),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEvent, KeyEventKind};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn release_events_are_ignored() {
        let mut key = press(KeyCode::Char('s'));
        key.kind = KeyEventKind::Release;
        assert_eq!(
            key_to_ui_event(key, Screen::RequestBuilder, InputMode::Normal, false, false),
            None
        );
    }

    #[test]
    fn send_key_maps_only_in_builder_normal_mode() {
        let key = press(KeyCode::Char('s'));
        assert_eq!(
            key_to_ui_event(key, Screen::RequestBuilder, InputMode::Normal, false, false),
            Some(UiEvent::Send)
        );
        assert_eq!(
            key_to_ui_event(key, Screen::RequestBuilder, InputMode::Editing, false, false),
            Some(UiEvent::CharInput('s'))
        );
        assert_eq!(
            key_to_ui_event(key, Screen::Loading, InputMode::Normal, false, false),
            None
        );
    }

    #[test]
    fn enter_inserts_newline_in_multiline_editors() {
        let key = press(KeyCode::Enter);
        assert_eq!(
            key_to_ui_event(key, Screen::BodyEditor, InputMode::Editing, false, false),
            Some(UiEvent::NewLine)
        );
        assert_eq!(
            key_to_ui_event(
                key,
                Screen::DatabaseQueryEditor,
                InputMode::Editing,
                false,
                false
            ),
            Some(UiEvent::NewLine)
        );
        assert_eq!(
            key_to_ui_event(key, Screen::HeaderEditor, InputMode::Editing, false, false),
            Some(UiEvent::Select)
        );
    }

    #[test]
    fn confirm_swallows_other_keys() {
        assert_eq!(
            key_to_ui_event(
                press(KeyCode::Char('y')),
                Screen::RequestList,
                InputMode::Normal,
                true,
                false
            ),
            Some(UiEvent::Confirm)
        );
        assert_eq!(
            key_to_ui_event(
                press(KeyCode::Char('d')),
                Screen::RequestList,
                InputMode::Normal,
                true,
                false
            ),
            None
        );
    }
}
