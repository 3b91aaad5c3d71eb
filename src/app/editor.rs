//! Generic list-CRUD sub-machine
//!
//! One editor is reused for headers, query parameters and environment
//! variables. It owns the transient edit buffers; ownership of the committed
//! value transfers to the owning list on commit.

use crate::models::KeyValue;

/// Byte-position cursor helpers shared by every text buffer in the app.
/// Positions always sit on char boundaries.
pub(crate) fn insert_char(buf: &mut String, cursor: usize, c: char) -> usize {
    if cursor <= buf.len() {
        buf.insert(cursor, c);
        cursor + c.len_utf8()
    } else {
        buf.push(c);
        buf.len()
    }
}

pub(crate) fn delete_char(buf: &mut String, cursor: usize) -> usize {
    if cursor == 0 || cursor > buf.len() {
        return cursor;
    }
    let prev = buf[..cursor]
        .char_indices()
        .last()
        .map(|(i, _)| i)
        .unwrap_or(0);
    buf.remove(prev);
    prev
}

pub(crate) fn cursor_left(buf: &str, cursor: usize) -> usize {
    if cursor == 0 {
        return 0;
    }
    buf[..cursor]
        .char_indices()
        .last()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

pub(crate) fn cursor_right(buf: &str, cursor: usize) -> usize {
    if cursor >= buf.len() {
        return buf.len();
    }
    buf[cursor..]
        .char_indices()
        .nth(1)
        .map(|(i, _)| cursor + i)
        .unwrap_or(buf.len())
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum EditorMode {
    #[default]
    Browsing,
    AddingNew,
    EditingExisting,
    ConfirmingDelete,
}

/// Which of the two sub-fields has input focus.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum PairField {
    #[default]
    Key,
    Value,
}

/// State machine for editing one ordered key/value list.
#[derive(Clone, Debug, Default)]
pub struct PairEditor {
    pub mode: EditorMode,
    pub selected: usize,
    pub field: PairField,
    pub key_buf: String,
    pub value_buf: String,
    pub cursor: usize,
}

impl PairEditor {
    pub fn reset(&mut self) {
        *self = PairEditor::default();
    }

    /// List navigation; wrap disabled.
    pub fn next(&mut self, len: usize) {
        if self.mode == EditorMode::Browsing && self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn prev(&mut self) {
        if self.mode == EditorMode::Browsing {
            self.selected = self.selected.saturating_sub(1);
        }
    }

    pub fn start_add(&mut self) {
        self.mode = EditorMode::AddingNew;
        self.field = PairField::Key;
        self.key_buf.clear();
        self.value_buf.clear();
        self.cursor = 0;
    }

    pub fn start_edit(&mut self, items: &[KeyValue]) {
        if let Some(item) = items.get(self.selected) {
            self.mode = EditorMode::EditingExisting;
            self.field = PairField::Key;
            self.key_buf = item.key.clone();
            self.value_buf = item.value.clone();
            self.cursor = self.key_buf.len();
        }
    }

    pub fn start_delete(&mut self, items: &[KeyValue]) {
        if self.selected < items.len() {
            self.mode = EditorMode::ConfirmingDelete;
        }
    }

    pub fn cancel(&mut self) {
        self.mode = EditorMode::Browsing;
        self.key_buf.clear();
        self.value_buf.clear();
        self.cursor = 0;
    }

    /// Commit the edit buffers into the owning list. Keys are unique:
    /// committing a duplicate key overwrites the prior value silently.
    /// Returns false (and stays in the edit state) when the key is empty.
    pub fn commit(&mut self, items: &mut Vec<KeyValue>) -> bool {
        let key = self.key_buf.trim().to_owned();
        if key.is_empty() {
            return false;
        }
        let value = self.value_buf.clone();

        if self.mode == EditorMode::EditingExisting && self.selected < items.len() {
            if items[self.selected].key == key {
                items[self.selected].value = value;
                self.cancel();
                return true;
            }
            items.remove(self.selected);
        }

        match items.iter_mut().find(|kv| kv.key == key) {
            Some(existing) => existing.value = value,
            None => items.push(KeyValue { key, value }),
        }

        self.selected = self.selected.min(items.len().saturating_sub(1));
        self.cancel();
        true
    }

    pub fn confirm_delete(&mut self, items: &mut Vec<KeyValue>) {
        if self.selected < items.len() {
            items.remove(self.selected);
            if self.selected > 0 {
                self.selected -= 1;
            }
        }
        self.mode = EditorMode::Browsing;
    }

    pub fn cycle_field(&mut self) {
        self.field = match self.field {
            PairField::Key => PairField::Value,
            PairField::Value => PairField::Key,
        };
        self.cursor = self.active_buf().len();
    }

    fn active_buf(&self) -> &String {
        match self.field {
            PairField::Key => &self.key_buf,
            PairField::Value => &self.value_buf,
        }
    }

    fn active_buf_mut(&mut self) -> &mut String {
        match self.field {
            PairField::Key => &mut self.key_buf,
            PairField::Value => &mut self.value_buf,
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, EditorMode::AddingNew | EditorMode::EditingExisting)
    }

    pub fn insert(&mut self, c: char) {
        let cursor = self.cursor;
        let buf = self.active_buf_mut();
        self.cursor = insert_char(buf, cursor, c);
    }

    pub fn backspace(&mut self) {
        let cursor = self.cursor;
        let buf = self.active_buf_mut();
        self.cursor = delete_char(buf, cursor);
    }

    pub fn left(&mut self) {
        self.cursor = cursor_left(self.active_buf(), self.cursor);
    }

    pub fn right(&mut self) {
        self.cursor = cursor_right(self.active_buf(), self.cursor);
    }
}

/// Single-line modal prompt backing name dialogs.
#[derive(Clone, Debug, Default)]
pub struct TextPrompt {
    pub title: String,
    pub buffer: String,
    pub cursor: usize,
}

impl TextPrompt {
    pub fn new(title: impl Into<String>, initial: impl Into<String>) -> Self {
        let buffer = initial.into();
        let cursor = buffer.len();
        TextPrompt {
            title: title.into(),
            buffer,
            cursor,
        }
    }

    pub fn insert(&mut self, c: char) {
        self.cursor = insert_char(&mut self.buffer, self.cursor, c);
    }

    pub fn backspace(&mut self) {
        self.cursor = delete_char(&mut self.buffer, self.cursor);
    }

    pub fn left(&mut self) {
        self.cursor = cursor_left(&self.buffer, self.cursor);
    }

    pub fn right(&mut self) {
        self.cursor = cursor_right(&self.buffer, self.cursor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<KeyValue> {
        items.iter().map(|(k, v)| KeyValue::new(*k, *v)).collect()
    }

    #[test]
    fn add_commits_new_pair() {
        let mut items = Vec::new();
        let mut editor = PairEditor::default();
        editor.start_add();
        for c in "Accept".chars() {
            editor.insert(c);
        }
        editor.cycle_field();
        for c in "text/html".chars() {
            editor.insert(c);
        }
        assert!(editor.commit(&mut items));
        assert_eq!(items, pairs(&[("Accept", "text/html")]));
        assert_eq!(editor.mode, EditorMode::Browsing);
    }

    #[test]
    fn empty_key_is_rejected_and_editor_stays_open() {
        let mut items = Vec::new();
        let mut editor = PairEditor::default();
        editor.start_add();
        assert!(!editor.commit(&mut items));
        assert_eq!(editor.mode, EditorMode::AddingNew);
        assert!(items.is_empty());
    }

    #[test]
    fn duplicate_key_overwrites_silently() {
        let mut items = pairs(&[("Accept", "a"), ("Host", "h")]);
        let mut editor = PairEditor::default();
        editor.start_add();
        for c in "Accept".chars() {
            editor.insert(c);
        }
        editor.cycle_field();
        for c in "b".chars() {
            editor.insert(c);
        }
        assert!(editor.commit(&mut items));
        assert_eq!(items, pairs(&[("Accept", "b"), ("Host", "h")]));
    }

    #[test]
    fn editing_value_preserves_position() {
        let mut items = pairs(&[("A", "1"), ("B", "2")]);
        let mut editor = PairEditor::default();
        editor.start_edit(&items);
        editor.cycle_field();
        editor.backspace();
        editor.insert('9');
        assert!(editor.commit(&mut items));
        assert_eq!(items, pairs(&[("A", "9"), ("B", "2")]));
    }

    #[test]
    fn renaming_onto_existing_key_merges() {
        let mut items = pairs(&[("A", "1"), ("B", "2")]);
        let mut editor = PairEditor::default();
        editor.start_edit(&items); // editing "A"
        editor.backspace();
        editor.insert('B');
        assert!(editor.commit(&mut items));
        assert_eq!(items, pairs(&[("B", "1")]));
    }

    #[test]
    fn delete_requires_confirmation() {
        let mut items = pairs(&[("A", "1")]);
        let mut editor = PairEditor::default();
        editor.start_delete(&items);
        assert_eq!(editor.mode, EditorMode::ConfirmingDelete);
        editor.cancel();
        assert_eq!(items.len(), 1);

        editor.start_delete(&items);
        editor.confirm_delete(&mut items);
        assert!(items.is_empty());
        assert_eq!(editor.mode, EditorMode::Browsing);
    }

    #[test]
    fn navigation_does_not_wrap() {
        let items = pairs(&[("A", "1"), ("B", "2")]);
        let mut editor = PairEditor::default();
        editor.prev();
        assert_eq!(editor.selected, 0);
        editor.next(items.len());
        editor.next(items.len());
        assert_eq!(editor.selected, 1);
    }

    #[test]
    fn cursor_handles_multibyte_chars() {
        let mut buf = String::from("aé");
        let mut cursor = buf.len();
        cursor = delete_char(&mut buf, cursor);
        assert_eq!(buf, "a");
        cursor = insert_char(&mut buf, cursor, 'ß');
        assert_eq!(buf, "aß");
        assert_eq!(cursor_left(&buf, cursor), 1);
        assert_eq!(cursor_right(&buf, 0), 1);
    }
}
