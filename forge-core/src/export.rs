//! Export targets and the import filter for puzzle description files

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

use crate::error::{ForgeError, Result};

/// File extensions accepted on import (without the dot)
pub const IMPORT_EXTENSIONS: &[&str] = &["html", "alghive"];

/// Which half of a puzzle description is being saved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportTarget {
    /// First part of the puzzle
    Cipher,
    /// Second part of the puzzle
    Unveil,
}

impl ExportTarget {
    pub fn file_name(&self) -> &'static str {
        match self {
            ExportTarget::Cipher => "cipher.html",
            ExportTarget::Unveil => "unveil.html",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExportTarget::Cipher => "First part",
            ExportTarget::Unveil => "Second part",
        }
    }

    pub fn all() -> [ExportTarget; 2] {
        [ExportTarget::Cipher, ExportTarget::Unveil]
    }
}

impl std::fmt::Display for ExportTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportTarget::Cipher => write!(f, "cipher"),
            ExportTarget::Unveil => write!(f, "unveil"),
        }
    }
}

impl FromStr for ExportTarget {
    type Err = ForgeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cipher" | "cipher.html" => Ok(ExportTarget::Cipher),
            "unveil" | "unveil.html" => Ok(ExportTarget::Unveil),
            other => Err(ForgeError::export(format!(
                "Unknown export target '{}', expected 'cipher' or 'unveil'",
                other
            ))),
        }
    }
}

/// Reject file names whose extension is not `.html` or `.alghive`
pub fn check_import_name(file_name: &str) -> Result<()> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension {
        Some(ext) if IMPORT_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        Some(ext) => Err(ForgeError::import(format!(
            "Unsupported file extension '.{}' for {}, expected .html or .alghive",
            ext, file_name
        ))),
        None => Err(ForgeError::import(format!(
            "File {} has no extension, expected .html or .alghive",
            file_name
        ))),
    }
}

/// Decode imported bytes as UTF-8 text
pub fn decode_import(bytes: &[u8]) -> Result<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|e| ForgeError::import(format!("File is not valid UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_target_names() {
        assert_eq!(ExportTarget::Cipher.file_name(), "cipher.html");
        assert_eq!(ExportTarget::Unveil.file_name(), "unveil.html");
        assert_eq!(ExportTarget::Unveil.label(), "Second part");
        assert_eq!("Unveil".parse::<ExportTarget>().unwrap(), ExportTarget::Unveil);
        assert!("third".parse::<ExportTarget>().is_err());
        assert_eq!(
            serde_json::to_string(&ExportTarget::Cipher).unwrap(),
            "\"cipher\""
        );
    }

    #[test]
    fn test_import_filter() {
        assert!(check_import_name("cipher.html").is_ok());
        assert!(check_import_name("puzzle.ALGHIVE").is_ok());
        assert!(check_import_name("notes.txt").is_err());
        assert!(check_import_name("README").is_err());
    }

    #[test]
    fn test_decode_import() {
        assert_eq!(decode_import("<p>é</p>".as_bytes()).unwrap(), "<p>é</p>");
        let err = decode_import(&[0xff, 0xfe, 0x00]).unwrap_err();
        assert!(matches!(err, ForgeError::Import(_)));
    }
}
