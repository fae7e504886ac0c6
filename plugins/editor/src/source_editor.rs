//! Raw HTML source editor

use crate::byte_offset;
use crate::keyboard::{Key, KeyOutcome, TextSelection};

/// Plain-text editor over the marker-free HTML source.
///
/// Positions are character offsets, not bytes.
#[derive(Debug, Clone)]
pub struct SourceEditor {
    value: String,
    selection: TextSelection,
    tab_text: String,
}

impl SourceEditor {
    pub fn new(value: impl Into<String>) -> Self {
        Self::with_tab_text(value, "\t")
    }

    pub fn with_tab_text(value: impl Into<String>, tab_text: &str) -> Self {
        let value = value.into();
        let end = value.chars().count();
        Self {
            value,
            selection: TextSelection::caret(end),
            tab_text: tab_text.to_string(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn selection(&self) -> TextSelection {
        self.selection
    }

    /// Select `start..end`, clamped to the value
    pub fn select(&mut self, start: usize, end: usize) {
        self.selection = TextSelection::new(start, end).clamped(self.char_len());
    }

    /// The host replaced the whole value (typing, paste)
    pub fn on_input(&mut self, value: &str) -> String {
        self.value = value.to_string();
        self.selection = self.selection.clamped(self.char_len());
        self.value.clone()
    }

    /// Replace the selection with `text`, leaving the caret right after it
    pub fn insert_text(&mut self, text: &str) -> String {
        let start = byte_offset(&self.value, self.selection.start);
        let end = byte_offset(&self.value, self.selection.end);
        self.value.replace_range(start..end, text);

        let caret = self.selection.start + text.chars().count();
        self.selection = TextSelection::caret(caret);
        self.value.clone()
    }

    pub fn handle_key(&mut self, key: &Key) -> KeyOutcome {
        match key {
            Key::Tab => {
                let tab = self.tab_text.clone();
                KeyOutcome::handled(Some(self.insert_text(&tab)))
            }
            _ => KeyOutcome::ignored(),
        }
    }

    fn char_len(&self) -> usize {
        self.value.chars().count()
    }
}

impl Default for SourceEditor {
    fn default() -> Self {
        Self::new("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_replaces_selection() {
        let mut editor = SourceEditor::new("<p>abcd</p>");
        editor.select(4, 6);

        let outcome = editor.handle_key(&Key::Tab);
        assert!(outcome.prevent_default);
        assert_eq!(outcome.value.as_deref(), Some("<p>a\td</p>"));
        assert_eq!(editor.selection(), TextSelection::caret(5));
    }

    #[test]
    fn test_tab_at_caret() {
        let mut editor = SourceEditor::new("ab");
        editor.select(1, 1);
        editor.handle_key(&Key::Tab);
        assert_eq!(editor.value(), "a\tb");
        assert_eq!(editor.selection().start, 2);
    }

    #[test]
    fn test_custom_tab_text() {
        let mut editor = SourceEditor::with_tab_text("", "    ");
        editor.handle_key(&Key::Tab);
        assert_eq!(editor.value(), "    ");
        assert_eq!(editor.selection(), TextSelection::caret(4));
    }

    #[test]
    fn test_other_keys_ignored() {
        let mut editor = SourceEditor::new("x");
        assert!(!editor.handle_key(&Key::Character('a')).is_handled());
        assert_eq!(editor.value(), "x");
    }

    #[test]
    fn test_on_input_clamps_selection() {
        let mut editor = SourceEditor::new("long value");
        assert_eq!(editor.selection(), TextSelection::caret(10));
        editor.on_input("ab");
        assert_eq!(editor.selection(), TextSelection::caret(2));
    }

    #[test]
    fn test_multibyte_positions() {
        let mut editor = SourceEditor::new("é€x");
        editor.select(2, 2);
        editor.insert_text("\t");
        assert_eq!(editor.value(), "é€\tx");
    }
}
