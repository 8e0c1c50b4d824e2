use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use url::Url;

use crate::error::{AppError, Result};
use crate::steam::OWNED_GAMES_URL;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// File holding the Steam Web API key and nothing else.
    #[serde(default = "default_api_key_path")]
    pub api_key_path: String,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_db_path() -> String {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("playtime-tracker");
    std::fs::create_dir_all(&data_dir).ok();
    data_dir.join("playtime.db").to_string_lossy().to_string()
}

fn default_api_key_path() -> String {
    config_dir()
        .join("steam_webapi_key.txt")
        .to_string_lossy()
        .to_string()
}

fn default_api_url() -> String {
    OWNED_GAMES_URL.to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("playtime-tracker")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            api_key_path: default_api_key_path(),
            api_url: default_api_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.endpoint()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        config_dir().join("config.toml")
    }

    pub fn endpoint(&self) -> Result<Url> {
        Url::parse(&self.api_url)
            .map_err(|e| AppError::Config(format!("invalid api_url {:?}: {}", self.api_url, e)))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn load_api_key(&self) -> Result<String> {
        let raw = std::fs::read_to_string(&self.api_key_path).map_err(|e| {
            AppError::Config(format!("cannot read API key from {}: {}", self.api_key_path, e))
        })?;
        let key = raw.trim();
        if key.is_empty() {
            return Err(AppError::Config(format!("API key file {} is empty", self.api_key_path)));
        }
        Ok(key.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "db_path = \"/tmp/custom.db\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.db_path, "/tmp/custom.db");
        assert_eq!(config.api_url, OWNED_GAMES_URL);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn rejects_unparseable_api_url() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "api_url = \"not a url\"\n").unwrap();

        assert!(matches!(Config::load_from(&path), Err(AppError::Config(_))));
    }

    #[test]
    fn api_key_is_trimmed() {
        let dir = TempDir::new().unwrap();
        let key_path = dir.path().join("key.txt");
        std::fs::write(&key_path, "ABCDEF0123\n").unwrap();

        let config = Config {
            api_key_path: key_path.to_string_lossy().to_string(),
            ..Config::default()
        };
        assert_eq!(config.load_api_key().unwrap(), "ABCDEF0123");
    }

    #[test]
    fn empty_api_key_is_an_error() {
        let dir = TempDir::new().unwrap();
        let key_path = dir.path().join("key.txt");
        std::fs::write(&key_path, "  \n").unwrap();

        let config = Config {
            api_key_path: key_path.to_string_lossy().to_string(),
            ..Config::default()
        };
        assert!(matches!(config.load_api_key(), Err(AppError::Config(_))));
    }
}
