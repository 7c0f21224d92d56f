use std::fs;
use std::sync::{Arc, LazyLock, RwLock};

use log::info;
use thiserror::Error;

use super::toml_settings::{default_user_agent, TomlSettings};
use crate::crypto::EnvelopeKeys;
use crate::utils::base64::base64_decode_bytes;
use crate::utils::http::DEFAULT_TIMEOUT_MS;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid settings TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid key {0}: expected base64 of 32 bytes")]
    InvalidKey(&'static str),
}

/// Settings structure to hold global configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    // HTTP
    pub http_timeout_ms: u64,
    pub user_agent: String,

    // Feed credentials
    pub bearer_token: String,
    pub enc_key: String,
    pub verify_key: String,

    // Built-in subscription
    pub default_sub_id: String,
    pub default_sub_remarks: String,
    pub default_sub_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings::from(TomlSettings::default())
    }
}

impl From<TomlSettings> for Settings {
    fn from(toml: TomlSettings) -> Self {
        Settings {
            http_timeout_ms: toml.http.timeout_ms,
            user_agent: toml.http.user_agent,
            bearer_token: toml.feed.bearer_token,
            enc_key: toml.feed.enc_key,
            verify_key: toml.feed.verify_key,
            default_sub_id: toml.default_subscription.id,
            default_sub_remarks: toml.default_subscription.remarks,
            default_sub_url: toml.default_subscription.url,
        }
    }
}

fn check_key(name: &'static str, value: &str) -> Result<(), SettingsError> {
    if value.trim().is_empty() {
        return Ok(());
    }
    match base64_decode_bytes(value) {
        Some(bytes) if bytes.len() == 32 => Ok(()),
        _ => Err(SettingsError::InvalidKey(name)),
    }
}

impl Settings {
    /// Create a new settings instance with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current() -> Arc<Settings> {
        global.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Parse settings from TOML text
    pub fn load_from_content(content: &str) -> Result<Self, SettingsError> {
        let toml_settings: TomlSettings = toml::from_str(content)?;
        let mut settings = Settings::from(toml_settings);

        if settings.http_timeout_ms == 0 {
            settings.http_timeout_ms = DEFAULT_TIMEOUT_MS;
        }
        if settings.user_agent.trim().is_empty() {
            settings.user_agent = default_user_agent();
        }
        check_key("enc_key", &settings.enc_key)?;
        check_key("verify_key", &settings.verify_key)?;

        Ok(settings)
    }

    /// Load settings from a TOML file
    pub fn load_from_file(path: &str) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(path)?;
        Settings::load_from_content(&content)
    }

    pub fn envelope_keys(&self) -> EnvelopeKeys {
        EnvelopeKeys::from_base64(&self.enc_key, &self.verify_key)
    }
}

// Global settings instance
#[allow(non_upper_case_globals)]
pub static global: LazyLock<RwLock<Arc<Settings>>> =
    LazyLock::new(|| RwLock::new(Arc::new(Settings::new())));

fn replace_global(settings: Settings) {
    *global.write().unwrap_or_else(|e| e.into_inner()) = Arc::new(settings);
}

/// Update settings directly from file path
pub fn update_settings_from_file(path: &str) -> Result<(), SettingsError> {
    let settings = Settings::load_from_file(path)?;
    info!("Loaded settings from '{}'", path);
    replace_global(settings);
    Ok(())
}

/// Replace the global settings with ones parsed from TOML text
pub fn update_settings_from_content(content: &str) -> Result<(), SettingsError> {
    replace_global(Settings::load_from_content(content)?);
    Ok(())
}
