//! Application configuration.
//!
//! Every field has a default, so a missing file or a partial file is fine.
//! Keys are camelCase to match the JSON the web build used.

use crate::error::AppError;
use crate::i18n::Language;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_DIR: &str = "userdeck";
const CONFIG_FILE: &str = "config.json";
const API_URL_ENV: &str = "USERDECK_API_URL";

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    pub api_url: String,
    pub i18n: I18nConfig,
    pub transitions: TransitionConfig,
    pub channels: ChannelNames,
    pub bounded_properties: BoundedProperties,
    /// Simulated login round-trip.
    pub auth_latency_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: "https://jsonplaceholder.typicode.com".to_string(),
            i18n: I18nConfig::default(),
            transitions: TransitionConfig::default(),
            channels: ChannelNames::default(),
            bounded_properties: BoundedProperties::default(),
            auth_latency_ms: 1000,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct I18nConfig {
    pub default_language: Language,
    pub supported_languages: Vec<Language>,
    pub fallback_language: Language,
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            default_language: Language::Es,
            supported_languages: vec![Language::Es, Language::En],
            fallback_language: Language::Es,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransitionConfig {
    pub enabled: bool,
    pub duration_ms: u64,
    #[serde(rename = "type")]
    pub kind: String,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            duration_ms: 300,
            kind: "slide".to_string(),
        }
    }
}

/// Names of the shared-state channels.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChannelNames {
    pub users: String,
    pub selected_user: String,
    pub language: String,
    pub loading: String,
    pub errors: String,
}

impl Default for ChannelNames {
    fn default() -> Self {
        Self {
            users: "ch-users".to_string(),
            selected_user: "ch-user".to_string(),
            language: "ch-language".to_string(),
            loading: "ch-loading".to_string(),
            errors: "ch-errors".to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BoundedProperties {
    pub max_users: usize,
    pub search_debounce: u64,
    pub cache_timeout: u64,
}

impl Default for BoundedProperties {
    fn default() -> Self {
        Self {
            max_users: 50,
            search_debounce: deck_search::DEFAULT_QUIET_PERIOD_MS,
            cache_timeout: 5 * 60 * 1000,
        }
    }
}

impl BoundedProperties {
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce)
    }

    pub fn cache_timeout(&self) -> Duration {
        Duration::from_millis(self.cache_timeout)
    }
}

impl AppConfig {
    /// Default location: `$XDG_CONFIG_HOME/userdeck/config.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No config at {:?}, using defaults", path);
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(AppError::ConfigRead {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let config = serde_json::from_str(&raw).map_err(|source| AppError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Resolve the config for this run: explicit path, else the default
    /// location, then environment overrides.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, AppError> {
        let mut config = match explicit.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(path) => Self::load(&path)?,
            None => Self::default(),
        };
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.is_empty() {
                info!("API URL overridden by {}", API_URL_ENV);
                config.api_url = url;
            }
        }
        Ok(config)
    }

    pub fn auth_latency(&self) -> Duration {
        Duration::from_millis(self.auth_latency_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.channels.users, "ch-users");
        assert_eq!(config.channels.selected_user, "ch-user");
        assert_eq!(config.bounded_properties.max_users, 50);
        assert_eq!(
            config.bounded_properties.search_debounce(),
            Duration::from_millis(300)
        );
        assert_eq!(
            config.bounded_properties.cache_timeout(),
            Duration::from_secs(300)
        );
        assert_eq!(config.i18n.default_language, Language::Es);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config.api_url, AppConfig::default().api_url);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "apiUrl": "http://localhost:8080",
                "i18n": {{ "defaultLanguage": "en" }},
                "boundedProperties": {{ "maxUsers": 5 }},
                "transitions": {{ "type": "fade" }}
            }}"#
        )
        .unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.api_url, "http://localhost:8080");
        assert_eq!(config.i18n.default_language, Language::En);
        assert_eq!(config.i18n.supported_languages.len(), 2);
        assert_eq!(config.bounded_properties.max_users, 5);
        assert_eq!(config.bounded_properties.search_debounce, 300);
        assert_eq!(config.transitions.kind, "fade");
        assert_eq!(config.channels.language, "ch-language");
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = AppConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, AppError::ConfigParse { .. }));
    }
}
