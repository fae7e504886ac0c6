//! Importing and exporting puzzle description files

use std::path::{Path, PathBuf};

use forge_core::export::{check_import_name, decode_import, ExportTarget};
use forge_core::normalizer::to_canonical_form;
use forge_core::{ForgeError, Result};

/// A description file accepted for import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedDocument {
    pub file_name: String,
    pub content: String,
}

/// Bytes ready to be offered as a download or written to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub target: ExportTarget,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ExportedFile {
    /// Wrap `canonical` in the container if needed and encode it as UTF-8
    pub fn from_canonical(canonical: &str, target: ExportTarget) -> Self {
        Self {
            target,
            file_name: target.file_name().to_string(),
            bytes: to_canonical_form(canonical).into_bytes(),
        }
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }

    /// Write into `dir` under the target's file name
    pub fn write_to_dir(&self, dir: &Path) -> Result<PathBuf> {
        if !dir.is_dir() {
            return Err(ForgeError::export(format!(
                "Export directory does not exist: {}",
                dir.display()
            )));
        }
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes)
            .map_err(|e| ForgeError::export(format!("Failed to write {}: {}", path.display(), e)))?;
        tracing::info!("Exported {} ({} bytes)", path.display(), self.bytes.len());
        Ok(path)
    }
}

/// Accept uploaded bytes named `file_name`
pub fn import_bytes(file_name: &str, bytes: &[u8]) -> Result<ImportedDocument> {
    check_import_name(file_name)?;
    let content = decode_import(bytes)?;
    Ok(ImportedDocument {
        file_name: file_name.to_string(),
        content,
    })
}

/// Read a description file from disk
pub fn read_document(path: &Path) -> Result<ImportedDocument> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| ForgeError::import(format!("Invalid file path: {}", path.display())))?;
    check_import_name(file_name)?;

    let bytes = std::fs::read(path)?;
    tracing::debug!("Read {} bytes from {}", bytes.len(), path.display());
    import_bytes(file_name, &bytes)
}
