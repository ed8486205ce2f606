//! Configuration for the preview controller and its hosts.
//!
//! Settings are read from a TOML file. Missing or invalid entries fall back
//! to defaults so a viewer can still start against the local backend.

use crate::error::{PreviewError, Result};
use crate::labels::Locale;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Pages of a PDF that are ever rendered or navigable.
pub const DEFAULT_VISIBLE_UNIT_CAP: usize = 5;
/// Scale applied when rasterizing a PDF page.
pub const DEFAULT_RASTER_ZOOM: f32 = 1.5;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct PreviewConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Value of the `access_token` cookie issued by `/api/auth/login`,
    /// without the `Bearer ` prefix.
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default = "default_visible_unit_cap")]
    pub visible_unit_cap: usize,
    #[serde(default = "default_raster_zoom")]
    pub raster_zoom: f32,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub locale: Locale,
    #[serde(default)]
    pub pdfium_library_path: Option<PathBuf>,
    #[serde(default)]
    pub log_level: LogLevel,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        PreviewConfig {
            base_url: default_base_url(),
            access_token: None,
            visible_unit_cap: default_visible_unit_cap(),
            raster_zoom: default_raster_zoom(),
            request_timeout_secs: default_request_timeout_secs(),
            locale: Locale::default(),
            pdfium_library_path: None,
            log_level: LogLevel::default(),
        }
    }
}

impl PreviewConfig {
    /// Parse a TOML document, rejecting values the controller cannot honor.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: PreviewConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.visible_unit_cap == 0 {
            return Err(PreviewError::Config(
                "visible_unit_cap must be at least 1".to_string(),
            ));
        }
        if !(self.raster_zoom.is_finite() && self.raster_zoom > 0.0) {
            return Err(PreviewError::Config(format!(
                "raster_zoom must be a positive number, got {}",
                self.raster_zoom
            )));
        }
        if self.base_url.trim().is_empty() {
            return Err(PreviewError::Config("base_url must not be empty".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Load configuration from the given path, falling back to defaults on error.
pub fn load_config(path: &Path) -> PreviewConfig {
    let contents = match fs::read_to_string(path) {
        Ok(data) => {
            info!(path = %path.display(), "Loaded preview config");
            data
        }
        Err(err) => {
            warn!(
                path = %path.display(),
                "Falling back to default config: {err}"
            );
            return PreviewConfig::default();
        }
    };

    match PreviewConfig::from_toml_str(&contents) {
        Ok(cfg) => {
            debug!(base_url = %cfg.base_url, locale = %cfg.locale, "Parsed configuration from disk");
            cfg
        }
        Err(err) => {
            warn!(path = %path.display(), "Invalid config: {err}");
            PreviewConfig::default()
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_visible_unit_cap() -> usize {
    DEFAULT_VISIBLE_UNIT_CAP
}

fn default_raster_zoom() -> f32 {
    DEFAULT_RASTER_ZOOM
}

fn default_request_timeout_secs() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn empty_document_yields_defaults() {
        let config = PreviewConfig::from_toml_str("").unwrap();
        assert_eq!(config, PreviewConfig::default());
        assert_eq!(config.visible_unit_cap, 5);
        assert_eq!(config.raster_zoom, 1.5);
        assert_eq!(config.locale, Locale::Vi);
    }

    #[test]
    fn partial_document_overrides_fields() {
        let config = PreviewConfig::from_toml_str(
            r#"
            base_url = "https://materials.example.edu"
            access_token = "abc.def"
            locale = "en"
            log_level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.base_url, "https://materials.example.edu");
        assert_eq!(config.access_token.as_deref(), Some("abc.def"));
        assert_eq!(config.locale, Locale::En);
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.visible_unit_cap, DEFAULT_VISIBLE_UNIT_CAP);
    }

    #[test]
    fn rejects_zero_cap_and_bad_zoom() {
        assert!(PreviewConfig::from_toml_str("visible_unit_cap = 0").is_err());
        assert!(PreviewConfig::from_toml_str("raster_zoom = -1.0").is_err());
        assert!(PreviewConfig::from_toml_str("base_url = \"  \"").is_err());
    }

    #[test]
    fn load_config_falls_back_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("missing.toml"));
        assert_eq!(config, PreviewConfig::default());
    }

    #[test]
    fn load_config_falls_back_on_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "visible_unit_cap = \"five\"").unwrap();
        assert_eq!(load_config(file.path()), PreviewConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "visible_unit_cap = 3\nraster_zoom = 2.0").unwrap();
        let config = load_config(file.path());
        assert_eq!(config.visible_unit_cap, 3);
        assert_eq!(config.raster_zoom, 2.0);
    }
}
