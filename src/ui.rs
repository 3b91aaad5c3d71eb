//! UI rendering - pure projection of a RenderState snapshot
//!
//! Drawing never touches application state; everything it needs is in the
//! snapshot it was handed.

use ratatui::{prelude::*, widgets::*};

use crate::app::editor::{EditorMode, PairField};
use crate::app::state::{BuilderField, NoticeLevel};
use crate::constants::{APP_NAME, APP_VERSION};
use crate::messages::ui_events::{InputMode, Screen};
use crate::messages::{QueryOutcome, RenderState};
use crate::models::StatusBand;

/// Status band color
pub fn band_color(band: StatusBand) -> Color {
    match band {
        StatusBand::Success => Color::Green,
        StatusBand::Redirect => Color::Cyan,
        StatusBand::ClientError => Color::Red,
        StatusBand::ServerError => Color::Magenta,
        StatusBand::Unknown => Color::Yellow,
    }
}

/// Method color
pub fn method_color(method: &str) -> Color {
    match method {
        "GET" => Color::Green,
        "POST" => Color::Yellow,
        "PUT" => Color::Blue,
        "PATCH" => Color::Cyan,
        "DELETE" => Color::Red,
        _ => Color::White,
    }
}

fn body_lines(text: &str) -> Vec<Line<'_>> {
    text.lines().map(Line::from).collect()
}

pub fn draw_ui(f: &mut Frame, state: &RenderState) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title bar
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    draw_title_bar(f, state, chunks[0]);

    match state.screen {
        Screen::Home
        | Screen::Database
        | Screen::RequestList
        | Screen::History
        | Screen::DatabaseQueryList
        | Screen::DatabaseQueryHistory
        | Screen::DatabaseExport
        | Screen::Environments => draw_list_screen(f, state, chunks[1]),
        Screen::RequestBuilder => draw_builder(f, state, chunks[1]),
        Screen::Loading => draw_loading(f, chunks[1]),
        Screen::ViewResponse => draw_response(f, state, chunks[1]),
        Screen::HeaderEditor | Screen::QueryParamEditor | Screen::EnvironmentEditor => {
            draw_pair_list(f, state, chunks[1])
        }
        Screen::BodyEditor => draw_text_editor(f, state, chunks[1], " Body "),
        Screen::Help => draw_help(f, chunks[1]),
        Screen::DatabaseConnect => draw_connect_form(f, state, chunks[1]),
        Screen::DatabaseQueryEditor => draw_text_editor(f, state, chunks[1], " SQL Query "),
        Screen::DatabaseResult => draw_db_result(f, state, chunks[1]),
        Screen::DatabaseSchema => draw_schema(f, state, chunks[1]),
    }

    draw_status_bar(f, state, chunks[2]);

    // Overlays
    if state.editor.is_editing() {
        draw_editor_popup(f, state, area);
    }
    if let Some(prompt) = &state.prompt {
        draw_prompt_popup(f, &prompt.title, &prompt.buffer, area);
    }
    if state.confirming {
        draw_confirm_popup(f, area);
    }
}

fn draw_title_bar(f: &mut Frame, state: &RenderState, area: Rect) {
    let mut spans = vec![
        Span::styled(
            format!(" {APP_NAME} "),
            Style::default().fg(Color::Black).bg(Color::Cyan).bold(),
        ),
        Span::raw(" "),
        Span::styled(screen_title(state.screen), Style::default().fg(Color::Gray)),
    ];
    if state.db_connected {
        spans.push(Span::styled(" [db]", Style::default().fg(Color::Green)));
    }
    if state.storage_warning {
        spans.push(Span::styled(
            " [not persisted]",
            Style::default().fg(Color::Red),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn screen_title(screen: Screen) -> &'static str {
    match screen {
        Screen::Home => "Home",
        Screen::RequestBuilder => "Request Builder",
        Screen::Loading => "Working...",
        Screen::ViewResponse => "Response",
        Screen::RequestList => "Saved Requests",
        Screen::HeaderEditor => "Headers",
        Screen::BodyEditor => "Body",
        Screen::QueryParamEditor => "Query Parameters",
        Screen::Help => "Help",
        Screen::History => "Request History",
        Screen::Database => "Database",
        Screen::DatabaseConnect => "Connect",
        Screen::DatabaseQueryEditor => "Query Editor",
        Screen::DatabaseResult => "Query Result",
        Screen::DatabaseQueryList => "Saved Queries",
        Screen::DatabaseSchema => "Schema",
        Screen::DatabaseQueryHistory => "Query History",
        Screen::DatabaseExport => "Export",
        Screen::Environments => "Environments",
        Screen::EnvironmentEditor => "Environment Variables",
    }
}

// ============================================================================
// List screens
// ============================================================================

fn draw_list_screen(f: &mut Frame, state: &RenderState, area: Rect) {
    let show_filter = state.filtering || !state.filter.is_empty();
    let list_area = if show_filter {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);
        let style = if state.filtering {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let filter = Paragraph::new(state.filter.as_str()).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(style)
                .title(" Filter "),
        );
        f.render_widget(filter, chunks[0]);
        chunks[1]
    } else {
        area
    };

    let items: Vec<ListItem> = state
        .list
        .iter()
        .map(|entry| {
            let mut spans = vec![Span::raw(entry.primary.clone())];
            if !entry.secondary.is_empty() {
                spans.push(Span::styled(
                    format!("  {}", entry.secondary),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let empty = items.is_empty();
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", state.list_title)),
        )
        .highlight_style(Style::default().fg(Color::Yellow).bold())
        .highlight_symbol("> ");

    let mut list_state = ListState::default();
    if !empty {
        list_state.select(Some(state.selected));
    }
    f.render_stateful_widget(list, list_area, &mut list_state);

    if empty {
        let hint = Paragraph::new("Nothing here yet.")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        let inner = list_area.inner(Margin::new(1, 1));
        if inner.height > 0 {
            f.render_widget(hint, inner);
        }
    }
}

// ============================================================================
// Request builder and response
// ============================================================================

fn draw_builder(f: &mut Frame, state: &RenderState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Method + URL
            Constraint::Length(6), // Headers
            Constraint::Min(4),    // Body
            Constraint::Length(6), // Query params
        ])
        .split(area);

    // Method + URL bar
    let url_focused = state.builder_focus == BuilderField::Url;
    let mcolor = method_color(state.draft.method.as_str());
    let border_style = if url_focused && state.input_mode == InputMode::Editing {
        Style::default().fg(Color::Yellow)
    } else if url_focused || state.builder_focus == BuilderField::Method {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let name = if state.draft.name.is_empty() {
        String::new()
    } else {
        format!(" [{}]", state.draft.name)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(format!(" {}{} ", state.draft.method.as_str(), name))
        .title_style(Style::default().fg(mcolor).bold());
    f.render_widget(Paragraph::new(state.draft.url.as_str()).block(block), chunks[0]);
    if url_focused && state.input_mode == InputMode::Editing {
        set_line_cursor(f, chunks[0], &state.draft.url, state.cursor);
    }

    // Headers summary
    let headers: Vec<ListItem> = state
        .draft
        .headers
        .iter()
        .map(|h| ListItem::new(format!("{}: {}", h.key, h.value)))
        .collect();
    let headers_block = Block::default()
        .borders(Borders::ALL)
        .border_style(focus_style(state.builder_focus == BuilderField::Headers))
        .title(format!(" Headers ({}) ", state.draft.headers.len()));
    f.render_widget(List::new(headers).block(headers_block), chunks[1]);

    // Body summary
    let body_title = if state.draft.method.has_body() {
        " Body "
    } else {
        " Body (not sent for this method) "
    };
    let body_block = Block::default()
        .borders(Borders::ALL)
        .border_style(focus_style(state.builder_focus == BuilderField::Body))
        .title(body_title);
    f.render_widget(
        Paragraph::new(state.draft.body.as_str())
            .block(body_block)
            .wrap(Wrap { trim: false }),
        chunks[2],
    );

    // Query params summary
    let params: Vec<ListItem> = state
        .draft
        .query_params
        .iter()
        .map(|p| ListItem::new(format!("{}={}", p.key, p.value)))
        .collect();
    let params_block = Block::default()
        .borders(Borders::ALL)
        .border_style(focus_style(state.builder_focus == BuilderField::Params))
        .title(format!(" Query Params ({}) ", state.draft.query_params.len()));
    f.render_widget(List::new(params).block(params_block), chunks[3]);
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}

fn draw_loading(f: &mut Frame, area: Rect) {
    let popup = centered_rect(40, 20, area);
    let text = Paragraph::new("Working...")
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(Clear, popup);
    f.render_widget(text, popup);
}

fn draw_response(f: &mut Frame, state: &RenderState, area: Rect) {
    let title = match state.response.status_code {
        Some(code) => Span::styled(
            format!(" {} {} ", code, state.response.status_text),
            Style::default().fg(band_color(state.response.band)).bold(),
        ),
        None => match &state.response.error {
            Some(_) => Span::styled(" Error ", Style::default().fg(Color::Red).bold()),
            None => Span::raw(" Response "),
        },
    };

    let meta = if state.response.time_ms > 0 || state.response.size_bytes > 0 {
        format!(" {}ms · {}B ", state.response.time_ms, state.response.size_bytes)
    } else {
        String::new()
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_bottom(Line::from(meta).right_aligned());

    let response = Paragraph::new(body_lines(&state.response.body))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((state.response_scroll, 0));
    f.render_widget(response, area);
}

// ============================================================================
// Editors
// ============================================================================

fn draw_pair_list(f: &mut Frame, state: &RenderState, area: Rect) {
    let items: Vec<ListItem> = state
        .editor_items
        .iter()
        .map(|kv| ListItem::new(format!("{}: {}", kv.key, kv.value)))
        .collect();
    let empty = items.is_empty();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} (a:add e:edit d:delete) ", screen_title(state.screen))),
        )
        .highlight_style(Style::default().fg(Color::Yellow).bold())
        .highlight_symbol("> ");

    let mut list_state = ListState::default();
    if !empty {
        list_state.select(Some(state.editor.selected));
    }
    f.render_stateful_widget(list, area, &mut list_state);
}

fn draw_editor_popup(f: &mut Frame, state: &RenderState, area: Rect) {
    let popup = centered_rect(60, 30, area);
    let title = match state.editor.mode {
        EditorMode::AddingNew => " Add (Tab:switch field, Enter:save, Esc:cancel) ",
        _ => " Edit (Tab:switch field, Enter:save, Esc:cancel) ",
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .style(Style::default().bg(Color::Black));
    f.render_widget(Clear, popup);
    f.render_widget(block, popup);

    let inner = popup.inner(Margin::new(1, 1));
    let fields = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(3)])
        .split(inner);

    let key_focused = state.editor.field == PairField::Key;
    let key = Paragraph::new(state.editor.key_buf.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(focus_style(key_focused))
            .title(" Key "),
    );
    f.render_widget(key, fields[0]);

    let value = Paragraph::new(state.editor.value_buf.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(focus_style(!key_focused))
            .title(" Value "),
    );
    f.render_widget(value, fields[1]);

    let (field_area, field_text) = if key_focused {
        (fields[0], state.editor.key_buf.as_str())
    } else {
        (fields[1], state.editor.value_buf.as_str())
    };
    set_line_cursor(f, field_area, field_text, state.editor.cursor);
}

fn draw_text_editor(f: &mut Frame, state: &RenderState, area: Rect, title: &str) {
    let (text, editing) = match state.screen {
        Screen::DatabaseQueryEditor => (state.query_text.as_str(), state.input_mode == InputMode::Editing),
        _ => (state.draft.body.as_str(), true),
    };
    let border_style = if editing {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title.to_owned());
    f.render_widget(
        Paragraph::new(text).block(block).wrap(Wrap { trim: false }),
        area,
    );

    if editing {
        // Cursor from byte offset: count lines and the column on the last one
        let before = &text[..state.cursor.min(text.len())];
        let row = before.matches('\n').count() as u16;
        let col = before.rsplit('\n').next().unwrap_or("").chars().count() as u16;
        let max_x = area.x + area.width.saturating_sub(2);
        let max_y = area.y + area.height.saturating_sub(2);
        f.set_cursor_position(Position::new(
            (area.x + col + 1).min(max_x),
            (area.y + row + 1).min(max_y),
        ));
    }
}

fn draw_prompt_popup(f: &mut Frame, title: &str, buffer: &str, area: Rect) {
    let popup = centered_rect(50, 15, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {title} (Enter:confirm, Esc:cancel) "))
        .border_style(Style::default().fg(Color::Yellow))
        .style(Style::default().bg(Color::Black));
    f.render_widget(Clear, popup);
    f.render_widget(Paragraph::new(buffer).block(block), popup);
}

fn draw_confirm_popup(f: &mut Frame, area: Rect) {
    let popup = centered_rect(40, 15, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Confirm ")
        .border_style(Style::default().fg(Color::Red))
        .style(Style::default().bg(Color::Black));
    let text = Paragraph::new("Delete? (y/n)")
        .alignment(Alignment::Center)
        .block(block);
    f.render_widget(Clear, popup);
    f.render_widget(text, popup);
}

// ============================================================================
// Database screens
// ============================================================================

fn draw_connect_form(f: &mut Frame, state: &RenderState, area: Rect) {
    let constraints: Vec<Constraint> = state
        .connect_fields
        .iter()
        .map(|_| Constraint::Length(3))
        .chain([Constraint::Min(0)])
        .collect();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (i, (label, value)) in state.connect_fields.iter().enumerate() {
        let focused = i == state.connect_focus;
        let style = if focused && state.input_mode == InputMode::Editing {
            Style::default().fg(Color::Yellow)
        } else if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        let field = Paragraph::new(value.as_str()).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(style)
                .title(format!(" {label} ")),
        );
        f.render_widget(field, chunks[i]);
        if focused && state.input_mode == InputMode::Editing {
            set_line_cursor(f, chunks[i], value, state.cursor);
        }
    }
}

fn draw_db_result(f: &mut Frame, state: &RenderState, area: Rect) {
    match &state.db_result {
        Some(QueryOutcome::Rows(table)) => {
            let widths: Vec<Constraint> = table
                .columns
                .iter()
                .enumerate()
                .map(|(i, col)| {
                    let cells = table.rows.iter().map(|r| r.get(i).map_or(0, |c| c.chars().count()));
                    let max = cells.max().unwrap_or(0).max(col.chars().count()).min(40);
                    Constraint::Length(max as u16 + 1)
                })
                .collect();

            let header = Row::new(table.columns.iter().map(|c| c.as_str()))
                .style(Style::default().fg(Color::Cyan).bold());
            let rows = table
                .rows
                .iter()
                .map(|r| Row::new(r.iter().map(|c| c.as_str())));

            let title = format!(
                " {} rows · {}ms (c:copy x:export) ",
                table.rows.len(),
                state.db_result_time_ms
            );
            let widget = Table::new(rows, widths)
                .header(header)
                .block(Block::default().borders(Borders::ALL).title(title));
            f.render_widget(widget, area);
        }
        Some(QueryOutcome::RowsAffected(n)) => {
            let text = Paragraph::new(format!(
                "{n} rows affected · {}ms",
                state.db_result_time_ms
            ))
            .block(Block::default().borders(Borders::ALL).title(" Result "));
            f.render_widget(text, area);
        }
        None => {
            let message = state.db_error.as_deref().unwrap_or("No result.");
            let text = Paragraph::new(message)
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: false })
                .block(Block::default().borders(Borders::ALL).title(" Error "));
            f.render_widget(text, area);
        }
    }
}

fn draw_schema(f: &mut Frame, state: &RenderState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    let tables: Vec<ListItem> = state
        .list
        .iter()
        .map(|entry| ListItem::new(entry.primary.clone()))
        .collect();
    let empty = tables.is_empty();
    let list = List::new(tables)
        .block(Block::default().borders(Borders::ALL).title(" Tables "))
        .highlight_style(Style::default().fg(Color::Yellow).bold())
        .highlight_symbol("> ");
    let mut list_state = ListState::default();
    if !empty {
        list_state.select(Some(state.selected));
    }
    f.render_stateful_widget(list, chunks[0], &mut list_state);

    let title = match &state.schema_table {
        Some(table) => format!(" Columns of {table} "),
        None => String::from(" Columns "),
    };
    let columns: Vec<ListItem> = state
        .columns
        .iter()
        .map(|c| ListItem::new(c.as_str()))
        .collect();
    let columns_list =
        List::new(columns).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(columns_list, chunks[1]);
}

// ============================================================================
// Help and status
// ============================================================================

fn draw_help(f: &mut Frame, area: Rect) {
    let text = format!(
        r#"
 {APP_NAME} {APP_VERSION} - Keyboard Reference

 GLOBAL
   ?                  Open this help
   Esc                Back / cancel
   q / Ctrl+C         Quit (from Home)

 LISTS
   Up / Down          Move selection
   Enter              Open selected item
   /                  Filter (type, then Enter)
   a / d              Add / delete (where supported)

 REQUEST BUILDER
   Tab                Next field
   e                  Edit focused field
   m                  Cycle HTTP method
   s                  Send request
   w                  Save request (prompts for a name)

 RESPONSE
   Up / Down          Scroll body
   c                  Copy body to clipboard
   x                  Copy as cURL

 DATABASE
   s                  Connect (from the connect form)
   x                  Execute query
   w                  Save query
   a                  Toggle active (environments)

 Press any key to close.
"#
    );
    let help = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title(" Help "))
        .wrap(Wrap { trim: false });
    f.render_widget(help, area);
}

fn draw_status_bar(f: &mut Frame, state: &RenderState, area: Rect) {
    if let Some((level, text)) = &state.notice {
        let color = match level {
            NoticeLevel::Info => Color::Green,
            NoticeLevel::Warn => Color::Yellow,
            NoticeLevel::Error => Color::Red,
        };
        let bar = Paragraph::new(format!(" {text} ")).style(Style::default().fg(color));
        f.render_widget(bar, area);
        return;
    }

    let hints = if state.loading {
        " Working... "
    } else if state.prompting {
        " Enter:confirm | Esc:cancel "
    } else if state.confirming {
        " y:confirm | n:cancel "
    } else if state.input_mode == InputMode::Editing {
        " Esc:done | arrows:move | Tab:next field "
    } else {
        match state.screen {
            Screen::Home => " Up/Down:navigate | Enter:open | ?:help | q:quit ",
            Screen::RequestBuilder => " Tab:field | e:edit | m:method | s:send | w:save | Esc:back ",
            Screen::ViewResponse => " Up/Down:scroll | c:copy | x:curl | Esc:back ",
            Screen::DatabaseQueryEditor => " e:edit | x:execute | w:save | Esc:back ",
            Screen::DatabaseConnect => " Tab:field | e:edit | s:connect | Esc:back ",
            Screen::DatabaseResult => " c:copy | x:export | Esc:back ",
            Screen::Environments => " Enter:edit | a:add | Space:activate | d:delete | Esc:back ",
            _ => " Up/Down:navigate | Enter:select | Esc:back | ?:help ",
        }
    };
    let bar = Paragraph::new(hints).style(Style::default().fg(Color::DarkGray));
    f.render_widget(bar, area);
}

/// Place the terminal cursor inside a single-line bordered field. The
/// cursor is a byte offset into `text`; the terminal column is in chars.
fn set_line_cursor(f: &mut Frame, area: Rect, text: &str, cursor: usize) {
    let col = cursor_column(text, cursor);
    let max_x = area.x + area.width.saturating_sub(2);
    let cursor_x = (area.x + col + 1).min(max_x);
    f.set_cursor_position(Position::new(cursor_x, area.y + 1));
}

fn cursor_column(text: &str, cursor: usize) -> u16 {
    text[..cursor.min(text.len())].chars().count() as u16
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_column_counts_chars_not_bytes() {
        let text = "héllo";
        assert_eq!(cursor_column(text, 0), 0);
        // byte 3 sits after 'h' and the two-byte 'é'
        assert_eq!(cursor_column(text, 3), 2);
        assert_eq!(cursor_column(text, text.len()), 5);
        assert_eq!(cursor_column(text, 999), 5);
    }

    #[test]
    fn band_colors_match_status_families() {
        assert_eq!(band_color(StatusBand::Success), Color::Green);
        assert_eq!(band_color(StatusBand::ClientError), Color::Red);
        assert_eq!(band_color(StatusBand::ServerError), Color::Magenta);
        assert_eq!(band_color(StatusBand::Unknown), Color::Yellow);
    }
}
