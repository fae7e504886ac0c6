//! Key events delivered to the sub-editors

use serde::{Deserialize, Serialize};

/// A key press as seen by an editor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    Tab,
    Enter,
    Character(char),
    /// Any other key, by name; editors leave these to the host
    Other(String),
}

/// What an editor did with a key press
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyOutcome {
    /// The host must suppress its default handling (focus navigation for Tab)
    pub prevent_default: bool,
    /// New editor value when the key changed it
    pub value: Option<String>,
}

impl KeyOutcome {
    /// The editor did not handle the key
    pub fn ignored() -> Self {
        Self {
            prevent_default: false,
            value: None,
        }
    }

    pub fn handled(value: Option<String>) -> Self {
        Self {
            prevent_default: true,
            value,
        }
    }

    pub fn is_handled(&self) -> bool {
        self.prevent_default
    }
}

/// Selection range in characters, always ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TextSelection {
    pub start: usize,
    pub end: usize,
}

impl TextSelection {
    /// Create a new text selection
    pub fn new(start: usize, end: usize) -> Self {
        // Ensure start is always before end
        let (start, end) = if start <= end {
            (start, end)
        } else {
            (end, start)
        };
        Self { start, end }
    }

    /// Collapsed selection (caret) at `position`
    pub fn caret(position: usize) -> Self {
        Self::new(position, position)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Clamp both ends to `max`
    pub fn clamped(&self, max: usize) -> Self {
        Self::new(self.start.min(max), self.end.min(max))
    }
}
