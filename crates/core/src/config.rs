use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::item::DEFAULT_CATEGORIES;

/// Environment variable naming the TOML settings file.
pub const CONFIG_ENV: &str = "BONNETJE_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub database_path: PathBuf,
    pub ocr: OcrSettings,
    pub translation: TranslationSettings,
    pub server: ServerSettings,
    pub categories: Vec<String>,
}

/// Passed to the OCR backend by the caller; the engine itself never reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    /// Tesseract language string, e.g. `nld+eng`.
    pub languages: String,
    pub page_segmentation_mode: u8,
    /// Directory holding `*.traineddata`; `None` uses the system default.
    pub data_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationSettings {
    /// Base URL of a LibreTranslate-compatible service. Translation is
    /// disabled when unset.
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub source_lang: String,
    pub target_lang: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
    /// Upper bound for uploaded receipt images.
    pub max_upload_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("receipts.db"),
            ocr: OcrSettings::default(),
            translation: TranslationSettings::default(),
            server: ServerSettings::default(),
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            languages: "nld+eng".to_string(),
            page_segmentation_mode: 6,
            data_path: None,
        }
    }
}

impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            source_lang: "nl".to_string(),
            target_lang: "en".to_string(),
            timeout_secs: 10,
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl Settings {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Read settings from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(s) => Self::from_toml_str(&s),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Io { path: path.to_path_buf(), source }),
        }
    }

    /// Load from `$BONNETJE_CONFIG` (or `bonnetje.toml`), then apply the
    /// `BONNETJE_DATABASE` and `BONNETJE_BIND` overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("bonnetje.toml"));
        let mut settings = Self::load(&path)?;
        if let Some(db) = std::env::var_os("BONNETJE_DATABASE") {
            settings.database_path = PathBuf::from(db);
        }
        if let Ok(bind) = std::env::var("BONNETJE_BIND") {
            settings.server.bind = bind;
        }
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_dutch_receipts() {
        let s = Settings::default();
        assert_eq!(s.ocr.languages, "nld+eng");
        assert_eq!(s.ocr.page_segmentation_mode, 6);
        assert_eq!(s.translation.source_lang, "nl");
        assert_eq!(s.translation.target_lang, "en");
        assert_eq!(s.categories.len(), DEFAULT_CATEGORIES.len());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let s = Settings::from_toml_str(
            r#"
            database_path = "/tmp/r.db"

            [translation]
            endpoint = "http://localhost:5000"
            "#,
        )
        .unwrap();
        assert_eq!(s.database_path, PathBuf::from("/tmp/r.db"));
        assert_eq!(s.translation.endpoint.as_deref(), Some("http://localhost:5000"));
        assert_eq!(s.translation.target_lang, "en");
        assert_eq!(s.server.bind, "127.0.0.1:8080");
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let s = Settings::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(matches!(
            Settings::from_toml_str("database_path = ["),
            Err(ConfigError::Parse(_))
        ));
    }
}
