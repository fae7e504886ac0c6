//! Configuration management for the Forge system

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{ForgeError, Result};
use crate::export::ExportTarget;

/// Main system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub global_settings: HashMap<String, serde_json::Value>,
}

impl Config {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self {
            server: ServerConfig::default(),
            editor: EditorConfig::default(),
            global_settings: HashMap::new(),
        }
    }

    /// Load configuration from a file
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ForgeError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| ForgeError::Config(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ForgeError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| ForgeError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(ForgeError::Config("Invalid port number".to_string()));
        }

        if self.server.hostname.trim().is_empty() {
            return Err(ForgeError::Config("Hostname cannot be empty".to_string()));
        }

        if self.editor.tab_text.is_empty() {
            return Err(ForgeError::Config(
                "editor.tab_text cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Apply CLI argument overrides (`server.hostname`, `server.port`, `global.*`)
    pub fn apply_cli_overrides(
        &mut self,
        cli_overrides: &HashMap<String, serde_json::Value>,
    ) -> Result<()> {
        for (key, value) in cli_overrides {
            match key.as_str() {
                "server.hostname" => {
                    if let serde_json::Value::String(hostname) = value {
                        self.server.hostname = hostname.clone();
                    }
                }
                "server.port" => {
                    let port = value
                        .as_u64()
                        .and_then(|port| u16::try_from(port).ok())
                        .ok_or_else(|| {
                            ForgeError::Config(format!("Invalid port override: {}", value))
                        })?;
                    self.server.port = port;
                }
                key => {
                    if let Some(setting_key) = key.strip_prefix("global.") {
                        self.global_settings
                            .insert(setting_key.to_string(), value.clone());
                    }
                }
            }
        }
        Ok(())
    }

    /// Get global setting value
    pub fn get_global_setting<T>(&self, key: &str) -> Option<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        self.global_settings
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Set global setting value
    pub fn set_global_setting<T>(&mut self, key: String, value: T) -> Result<()>
    where
        T: Serialize,
    {
        let json_value = serde_json::to_value(value).map_err(|e| {
            ForgeError::Config(format!("Failed to serialize global setting: {}", e))
        })?;

        self.global_settings.insert(key, json_value);
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub hostname: String,
    pub port: u16,
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            hostname: "127.0.0.1".to_string(),
            port: 3000,
            enable_cors: true,
        }
    }
}

/// Editor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Export target used when none is given
    pub default_export: ExportTarget,
    /// Text inserted by the Tab key
    pub tab_text: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            default_export: ExportTarget::Cipher,
            tab_text: "\t".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_creation_and_validation() {
        let config = Config::new();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.hostname, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.editor.default_export, ExportTarget::Cipher);
        assert_eq!(config.editor.tab_text, "\t");
        assert!(config.global_settings.is_empty());
    }

    #[test]
    fn test_invalid_configs() {
        let mut config = Config::new();
        config.server.port = 0;
        assert!(config.validate().is_err());

        let mut config = Config::new();
        config.server.hostname = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::new();
        config.editor.tab_text.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_file_operations() {
        let mut config = Config::new();
        config.editor.default_export = ExportTarget::Unveil;

        let temp_file = NamedTempFile::new().unwrap();
        assert!(config.save_to_file(temp_file.path()).is_ok());

        let loaded_config = Config::from_file(temp_file.path()).unwrap();
        assert_eq!(config.server.hostname, loaded_config.server.hostname);
        assert_eq!(loaded_config.editor.default_export, ExportTarget::Unveil);
    }

    #[test]
    fn test_partial_config_file_uses_defaults() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(
            temp_file.path(),
            r#"{"server": {"hostname": "0.0.0.0", "port": 8080, "enable_cors": false}}"#,
        )
        .unwrap();

        let config = Config::from_file(temp_file.path()).unwrap();
        assert_eq!(config.server.port, 8080);
        assert!(!config.server.enable_cors);
        assert_eq!(config.editor.tab_text, "\t");
    }

    #[test]
    fn test_malformed_config_file() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), "not json").unwrap();
        let err = Config::from_file(temp_file.path()).unwrap_err();
        assert!(matches!(err, ForgeError::Config(_)));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = Config::new();
        let mut overrides = HashMap::new();
        overrides.insert(
            "server.hostname".to_string(),
            serde_json::Value::String("0.0.0.0".to_string()),
        );
        overrides.insert("server.port".to_string(), serde_json::json!(9000));
        overrides.insert("global.theme".to_string(), serde_json::json!("dark"));

        config.apply_cli_overrides(&overrides).unwrap();
        assert_eq!(config.server.hostname, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert_eq!(
            config.get_global_setting::<String>("theme"),
            Some("dark".to_string())
        );

        let mut bad = HashMap::new();
        bad.insert("server.port".to_string(), serde_json::json!(70000));
        assert!(config.apply_cli_overrides(&bad).is_err());
    }

    #[test]
    fn test_global_settings() {
        let mut config = Config::new();
        config
            .set_global_setting("autosave".to_string(), true)
            .unwrap();
        assert_eq!(config.get_global_setting::<bool>("autosave"), Some(true));
        assert_eq!(config.get_global_setting::<bool>("missing"), None);
    }
}
