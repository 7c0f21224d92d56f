use serde::{Deserialize, Serialize};

use crate::utils::http::DEFAULT_TIMEOUT_MS;

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

pub fn default_user_agent() -> String {
    format!("subingest/{}", env!("CARGO_PKG_VERSION"))
}

fn default_subscription_id() -> String {
    "default".to_string()
}

fn default_subscription_remarks() -> String {
    "Default".to_string()
}

/// HTTP fetch settings section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Applied to both the connect and the read timeout
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
        }
    }
}

/// Feed credentials section
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FeedSettings {
    pub bearer_token: String,
    /// Base64 AES-256 key for encrypted envelopes
    pub enc_key: String,
    /// Base64 Ed25519 public key for signed envelopes
    pub verify_key: String,
}

/// Built-in subscription section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultSubscriptionSettings {
    #[serde(default = "default_subscription_id")]
    pub id: String,
    #[serde(default = "default_subscription_remarks")]
    pub remarks: String,
    pub url: String,
}

impl Default for DefaultSubscriptionSettings {
    fn default() -> Self {
        Self {
            id: default_subscription_id(),
            remarks: default_subscription_remarks(),
            url: String::new(),
        }
    }
}

/// TOML settings file layout
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TomlSettings {
    pub http: HttpSettings,
    pub feed: FeedSettings,
    #[serde(rename = "default_subscription")]
    pub default_subscription: DefaultSubscriptionSettings,
}
