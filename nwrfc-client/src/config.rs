//! Client configuration.
//!
//! Configuration is loaded in the following order (later overrides earlier):
//! 1. Default values
//! 2. YAML config file (if specified via NWRFC_CONFIG)
//! 3. Environment variables

use crate::binding::BindingConfig;
use nwrfc_types::{CallOptions, ConnectionParameters, TraceLevel};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where to find the SDK library.
    pub binding: BindingConfig,
    /// Default connection parameters.
    pub connection: ConnectionParameters,
    /// Default call options.
    pub call: CallOptions,
}

impl Config {
    /// Loads configuration from file, then applies environment variable overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("NWRFC_CONFIG") {
            config = Self::from_file(&path)?;
        }

        config.apply_env_overrides();

        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(path.to_path_buf(), e))?;
        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))?;
        Ok(config)
    }

    /// Loads configuration from environment variables only.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    /// Saves configuration to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = serde_yaml::to_string(self)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))?;
        std::fs::write(path, content).map_err(|e| ConfigError::IoError(path.to_path_buf(), e))?;
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = var("NWRFC_LIBRARY_PATH") {
            self.binding.library_path = Some(PathBuf::from(path));
        }

        let conn = &mut self.connection;
        if let Some(client) = var("NWRFC_CLIENT") {
            conn.client = client;
        }
        for (key, field) in [
            ("NWRFC_ASHOST", &mut conn.ashost),
            ("NWRFC_SYSNR", &mut conn.sysnr),
            ("NWRFC_USER", &mut conn.user),
            ("NWRFC_PASSWD", &mut conn.passwd),
            ("NWRFC_LANG", &mut conn.lang),
            ("NWRFC_DEST", &mut conn.dest),
            ("NWRFC_MSHOST", &mut conn.mshost),
            ("NWRFC_GROUP", &mut conn.group),
            ("NWRFC_SYSID", &mut conn.sysid),
            ("NWRFC_SAPROUTER", &mut conn.saprouter),
        ] {
            if let Some(value) = var(key) {
                *field = Some(value);
            }
        }

        if let Some(trace) = var("NWRFC_TRACE") {
            match TraceLevel::parse(&trace) {
                Some(level) => conn.trace = Some(level),
                None => tracing::warn!("Ignoring invalid NWRFC_TRACE value: {}", trace),
            }
        }

        if let Some(timeout) = var("NWRFC_TIMEOUT") {
            if let Ok(secs) = timeout.parse() {
                self.call.timeout = Some(secs);
            }
        }
    }
}

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {}", .0.display(), .1)]
    IoError(PathBuf, #[source] std::io::Error),

    #[error("failed to parse config file '{}': {}", .0.display(), .1)]
    ParseError(PathBuf, String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn with_vars(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let mut config = Config::default();
        config.apply_overrides(|k| vars.get(k).cloned());
        config
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.binding.search_defaults);
        assert!(config.binding.library_path.is_none());
        assert!(config.connection.client.is_empty());
        assert!(config.call.timeout.is_none());
    }

    #[test]
    fn test_env_overrides() {
        let config = with_vars(&[
            ("NWRFC_LIBRARY_PATH", "/opt/nwrfcsdk/lib"),
            ("NWRFC_CLIENT", "620"),
            ("NWRFC_ASHOST", "10.68.110.51"),
            ("NWRFC_SYSNR", "00"),
            ("NWRFC_USER", "demo"),
            ("NWRFC_PASSWD", "welcome"),
            ("NWRFC_LANG", "EN"),
            ("NWRFC_TRACE", "2"),
            ("NWRFC_TIMEOUT", "30"),
        ]);

        assert_eq!(
            config.binding.library_path,
            Some(PathBuf::from("/opt/nwrfcsdk/lib"))
        );
        assert_eq!(config.connection.client, "620");
        assert_eq!(config.connection.ashost.as_deref(), Some("10.68.110.51"));
        assert_eq!(config.connection.user.as_deref(), Some("demo"));
        assert_eq!(config.connection.trace, Some(TraceLevel::parse("2").unwrap()));
        assert_eq!(config.call.timeout, Some(30));
        assert!(config.connection.mshost.is_none());
    }

    #[test]
    fn test_invalid_env_values_ignored() {
        let config = with_vars(&[("NWRFC_TRACE", "verbose"), ("NWRFC_TIMEOUT", "soon")]);
        assert!(config.connection.trace.is_none());
        assert!(config.call.timeout.is_none());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nwrfc.yaml");
        std::fs::write(
            &path,
            "connection:\n  client: \"100\"\n  dest: MME\ncall:\n  notRequested: [ET_RETURN]\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.connection.client, "100");
        assert_eq!(config.connection.dest.as_deref(), Some("MME"));
        assert!(!config.call.is_requested("ET_RETURN"));
        assert!(config.binding.search_defaults);
    }

    #[test]
    fn test_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = Config::from_file(dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(missing, ConfigError::IoError(..)));

        let path = dir.path().join("broken.yaml");
        std::fs::write(&path, "connection: [not, a, map]\n").unwrap();
        let broken = Config::from_file(&path).unwrap_err();
        assert!(matches!(broken, ConfigError::ParseError(..)));
        assert!(broken.to_string().contains("broken.yaml"));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.yaml");

        let mut config = Config::default();
        config.connection = ConnectionParameters::new("001").with_application_server("host", "00");
        config.call = CallOptions::new().with_timeout(10);
        config.save(&path).unwrap();

        let reloaded = Config::from_file(&path).unwrap();
        assert_eq!(reloaded.connection, config.connection);
        assert_eq!(reloaded.call, config.call);
    }
}
