//! Centralized settings loading for the dashboard backend.
//!
//! Settings live in an optional `settings.json`; every field has a default
//! so a missing file (or a partial one) still yields a runnable
//! configuration. Environment variables override at the call sites that
//! care (the server binary).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    /// Path to the database file or its directory.
    pub database_path: Option<String>,
    /// HTTP bind host.
    pub host: Option<String>,
    /// HTTP bind port.
    pub port: Option<u16>,
}

impl Settings {
    pub fn database_path_or_default(&self) -> String {
        self.database_path
            .clone()
            .unwrap_or_else(|| "database".to_string())
    }

    pub fn host_or_default(&self) -> String {
        self.host.clone().unwrap_or_else(|| "127.0.0.1".to_string())
    }

    pub fn port_or_default(&self) -> u16 {
        self.port.unwrap_or(3000)
    }
}

/// Loads settings from a JSON file.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Reading settings file: {}", path.display()))?;
    let settings: Settings = serde_json::from_str(&raw)
        .with_context(|| format!("Parsing settings JSON in {}", path.display()))?;
    Ok(settings)
}

/// Loads settings from an optional path, returning None if no path is provided.
pub fn load_optional_settings(path: Option<&PathBuf>) -> Result<Option<Settings>> {
    match path {
        Some(settings_path) => Ok(Some(load_settings(settings_path)?)),
        None => Ok(None),
    }
}

/// Tries the provided path first, then `settings.json` in the current
/// directory; defaults when neither exists.
pub fn load_settings_with_fallback(path: Option<&PathBuf>) -> Settings {
    if let Some(settings_path) = path {
        if let Ok(settings) = load_settings(settings_path) {
            return settings;
        }
    }
    load_settings("settings.json").unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.database_path_or_default(), "database");
        assert_eq!(settings.host_or_default(), "127.0.0.1");
        assert_eq!(settings.port_or_default(), 3000);
    }

    #[test]
    fn test_partial_settings_parse() {
        let settings: Settings = serde_json::from_str(r#"{"port": 8080}"#).unwrap();
        assert_eq!(settings.port_or_default(), 8080);
        assert_eq!(settings.host_or_default(), "127.0.0.1");
    }
}
