//! Error handling for the Forge authoring system

use thiserror::Error;

/// Result type alias for Forge operations
pub type Result<T> = std::result::Result<T, ForgeError>;

/// Main error type for the Forge system
///
/// The HTML conversion and sanitization functions never fail; these variants
/// cover the boundaries around them (files, configuration, the HTTP API).
#[derive(Error, Debug)]
pub enum ForgeError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A document could not be imported
    #[error("Import error: {0}")]
    Import(String),

    /// A document could not be exported
    #[error("Export error: {0}")]
    Export(String),

    /// User supplied data failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Network/server errors
    #[error("Server error: {0}")]
    Server(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors
    #[error("Error: {0}")]
    Generic(String),
}

impl ForgeError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new import error
    pub fn import<S: Into<String>>(msg: S) -> Self {
        Self::Import(msg.into())
    }

    /// Create a new export error
    pub fn export<S: Into<String>>(msg: S) -> Self {
        Self::Export(msg.into())
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new server error
    pub fn server<S: Into<String>>(msg: S) -> Self {
        Self::Server(msg.into())
    }

    /// Create a generic error
    pub fn generic<S: Into<String>>(msg: S) -> Self {
        Self::Generic(msg.into())
    }

    /// Check if this is a recoverable error
    pub fn is_recoverable(&self) -> bool {
        match self {
            ForgeError::Config(_) => false,
            ForgeError::Import(_) => true,
            ForgeError::Export(_) => true,
            ForgeError::Validation(_) => true,
            ForgeError::Server(_) => true,
            ForgeError::Io(_) => true,
            ForgeError::Json(_) => false,
            ForgeError::Generic(_) => true,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ForgeError::Config(_) => ErrorSeverity::High,
            ForgeError::Import(_) => ErrorSeverity::Medium,
            ForgeError::Export(_) => ErrorSeverity::Medium,
            ForgeError::Validation(_) => ErrorSeverity::Low,
            ForgeError::Server(_) => ErrorSeverity::High,
            ForgeError::Io(_) => ErrorSeverity::Medium,
            ForgeError::Json(_) => ErrorSeverity::Low,
            ForgeError::Generic(_) => ErrorSeverity::Low,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Low => write!(f, "LOW"),
            ErrorSeverity::Medium => write!(f, "MEDIUM"),
            ErrorSeverity::High => write!(f, "HIGH"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ForgeError::import("unsupported extension: .txt");
        assert_eq!(err.to_string(), "Import error: unsupported extension: .txt");
    }

    #[test]
    fn test_severity_and_recoverability() {
        assert!(!ForgeError::config("bad port").is_recoverable());
        assert_eq!(ForgeError::config("bad port").severity(), ErrorSeverity::High);
        assert!(ForgeError::validation("author required").is_recoverable());
        assert_eq!(ErrorSeverity::Medium.to_string(), "MEDIUM");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ForgeError = io.into();
        assert!(matches!(err, ForgeError::Io(_)));
    }
}
