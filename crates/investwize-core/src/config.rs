use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

pub const DEFAULT_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
pub const API_KEY_ENV: &str = "GROQ_API_KEY";

const ENDPOINT_ENV: &str = "INVESTWIZE_ENDPOINT";
const MODEL_ENV: &str = "INVESTWIZE_MODEL";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub endpoint: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    pub fn save_api_key(key: &str) -> Result<()> {
        Self::save_api_key_to(&Self::config_path()?, key)
    }

    /// Store a key, keeping the other settings in the file.
    ///
    /// An unreadable file is replaced by one holding only the key.
    pub fn save_api_key_to(path: &Path, key: &str) -> Result<()> {
        let mut config = Self::load_from(path).unwrap_or_else(|e| {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "config file unreadable, overwriting it with the new API key"
            );
            Self::new()
        });
        config.api_key = Some(key.to_string());
        config.save_to(path)
    }

    /// Endpoint, preferring the environment over the config file
    pub fn endpoint(&self) -> String {
        std::env::var(ENDPOINT_ENV)
            .ok()
            .or_else(|| self.endpoint.clone())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
    }

    /// Model, preferring the environment over the config file
    pub fn model(&self) -> String {
        std::env::var(MODEL_ENV)
            .ok()
            .or_else(|| self.model.clone())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string())
    }

    pub fn credential(&self) -> Credential {
        Credential::from_env(API_KEY_ENV).with_stored(self.api_key.clone())
    }

    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("investwize"))
    }

    fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }
}

/// API credential, looked up on every read.
///
/// The environment variable wins over a key stored from the config file or
/// entered at runtime. Blank values count as missing.
#[derive(Debug, Clone, Default)]
pub struct Credential {
    env_var: Option<String>,
    stored: Arc<RwLock<Option<String>>>,
}

impl Credential {
    pub fn from_env(var: &str) -> Self {
        Self {
            env_var: Some(var.to_string()),
            stored: Arc::default(),
        }
    }

    pub fn stored(key: Option<String>) -> Self {
        Self::default().with_stored(key)
    }

    pub fn with_stored(self, key: Option<String>) -> Self {
        self.set_stored(key);
        self
    }

    pub fn set_stored(&self, key: Option<String>) {
        if let Ok(mut stored) = self.stored.write() {
            *stored = key;
        }
    }

    pub fn read(&self) -> Option<String> {
        self.read_env()
            .or_else(|| self.read_stored())
    }

    /// Where the current key comes from, for display
    pub fn source(&self) -> Option<&'static str> {
        if self.read_env().is_some() {
            Some("env")
        } else if self.read_stored().is_some() {
            Some("config")
        } else {
            None
        }
    }

    fn read_env(&self) -> Option<String> {
        self.env_var
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
            .and_then(non_blank)
    }

    fn read_stored(&self) -> Option<String> {
        self.stored
            .read()
            .ok()
            .and_then(|stored| stored.clone())
            .and_then(non_blank)
    }
}

fn non_blank(key: String) -> Option<String> {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::new());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            api_key: Some("gsk_test".to_string()),
            model: Some("llama-3.1-8b-instant".to_string()),
            endpoint: None,
        };
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_credential_stored_key() {
        let credential = Credential::stored(Some("  gsk_abc  ".to_string()));
        assert_eq!(credential.read().as_deref(), Some("gsk_abc"));
        assert_eq!(credential.source(), Some("config"));
    }

    #[test]
    fn test_credential_blank_is_missing() {
        let credential = Credential::stored(Some("   ".to_string()));
        assert!(credential.read().is_none());
        assert!(credential.source().is_none());
    }

    #[test]
    fn test_credential_unset_env_falls_back_to_stored() {
        let credential = Credential::from_env("INVESTWIZE_TEST_KEY_NEVER_SET")
            .with_stored(Some("gsk_file".to_string()));
        assert_eq!(credential.read().as_deref(), Some("gsk_file"));
    }

    #[test]
    fn test_save_api_key_keeps_other_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        Config {
            api_key: None,
            model: Some("llama-3.1-8b-instant".to_string()),
            endpoint: Some("http://localhost:8080/v1/chat/completions".to_string()),
        }
        .save_to(&path)
        .unwrap();

        Config::save_api_key_to(&path, "gsk_new").unwrap();

        let saved = Config::load_from(&path).unwrap();
        assert_eq!(saved.api_key.as_deref(), Some("gsk_new"));
        assert_eq!(saved.model.as_deref(), Some("llama-3.1-8b-instant"));
        assert_eq!(
            saved.endpoint.as_deref(),
            Some("http://localhost:8080/v1/chat/completions")
        );
    }

    #[test]
    fn test_save_api_key_replaces_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        Config::save_api_key_to(&path, "gsk_new").unwrap();

        let saved = Config::load_from(&path).unwrap();
        assert_eq!(saved.api_key.as_deref(), Some("gsk_new"));
        assert!(saved.model.is_none());
    }

    // Everything that touches process environment lives in this one test
    #[test]
    fn test_environment_overrides() {
        let file = Config {
            api_key: Some("gsk_file".to_string()),
            model: Some("file-model".to_string()),
            endpoint: Some("http://file.invalid/v1/chat/completions".to_string()),
        };

        let key_var = "INVESTWIZE_TEST_KEY_OVERRIDE";
        std::env::set_var(key_var, "gsk_env");
        let credential = Credential::from_env(key_var).with_stored(file.api_key.clone());
        assert_eq!(credential.read().as_deref(), Some("gsk_env"));
        assert_eq!(credential.source(), Some("env"));

        std::env::set_var(key_var, "  ");
        assert_eq!(credential.read().as_deref(), Some("gsk_file"));
        assert_eq!(credential.source(), Some("config"));
        std::env::remove_var(key_var);

        std::env::remove_var(ENDPOINT_ENV);
        std::env::remove_var(MODEL_ENV);
        assert_eq!(file.endpoint(), "http://file.invalid/v1/chat/completions");
        assert_eq!(file.model(), "file-model");
        assert_eq!(Config::new().endpoint(), DEFAULT_ENDPOINT);
        assert_eq!(Config::new().model(), DEFAULT_MODEL);

        std::env::set_var(ENDPOINT_ENV, "http://env.invalid/v1/chat/completions");
        std::env::set_var(MODEL_ENV, "env-model");
        assert_eq!(file.endpoint(), "http://env.invalid/v1/chat/completions");
        assert_eq!(file.model(), "env-model");

        std::env::remove_var(ENDPOINT_ENV);
        std::env::remove_var(MODEL_ENV);
    }

    #[test]
    fn test_credential_update_is_seen_by_clones() {
        let credential = Credential::stored(None);
        let shared = credential.clone();
        assert!(shared.read().is_none());

        credential.set_stored(Some("gsk_new".to_string()));
        assert_eq!(shared.read().as_deref(), Some("gsk_new"));
    }
}
