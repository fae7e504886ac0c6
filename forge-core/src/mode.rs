//! Editor modes

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{ForgeError, Result};

/// Which sub-editor is mounted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EditorMode {
    /// Interactive rich-text surface working on annotated markup
    #[default]
    Rich,
    /// Raw HTML source editor working on marker-free markup
    Source,
}

impl EditorMode {
    /// The mode a toggle switches to
    pub fn toggled(self) -> Self {
        match self {
            EditorMode::Rich => EditorMode::Source,
            EditorMode::Source => EditorMode::Rich,
        }
    }
}

impl std::fmt::Display for EditorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EditorMode::Rich => write!(f, "rich"),
            EditorMode::Source => write!(f, "source"),
        }
    }
}

impl FromStr for EditorMode {
    type Err = ForgeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rich" => Ok(EditorMode::Rich),
            "source" | "raw" | "html" => Ok(EditorMode::Source),
            other => Err(ForgeError::validation(format!("Unknown editor mode: {}", other))),
        }
    }
}
