//! Editor plugin for Forge: rich-text surface, raw source editor and the
//! dual-mode controller that switches between them

use forge_core::{EditorMode, ForgeError};

pub mod controller;
pub mod document;
pub mod keyboard;
pub mod source_editor;
pub mod surface;

pub use controller::DualModeController;
pub use document::{import_bytes, read_document, ExportedFile, ImportedDocument};
pub use keyboard::{Key, KeyOutcome, TextSelection};
pub use source_editor::SourceEditor;
pub use surface::{Caret, EditingSurface};

/// Editor-specific errors
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("Unknown block element: <{0}>")]
    UnknownBlock(String),

    #[error("Operation requires {expected} mode, editor is in {actual} mode")]
    WrongMode {
        expected: EditorMode,
        actual: EditorMode,
    },
}

impl From<EditorError> for ForgeError {
    fn from(err: EditorError) -> Self {
        ForgeError::Validation(err.to_string())
    }
}

/// Byte index of the `chars`-th character of `text` (its length when past the end)
pub(crate) fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editor_error_conversion() {
        let err: ForgeError = EditorError::UnknownBlock("ul".to_string()).into();
        assert_eq!(err.to_string(), "Validation error: Unknown block element: <ul>");

        let err = EditorError::WrongMode {
            expected: EditorMode::Rich,
            actual: EditorMode::Source,
        };
        assert_eq!(
            err.to_string(),
            "Operation requires rich mode, editor is in source mode"
        );
    }

    #[test]
    fn test_byte_offset() {
        assert_eq!(byte_offset("héllo", 2), 3);
        assert_eq!(byte_offset("abc", 10), 3);
    }
}
