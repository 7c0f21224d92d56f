use regex::Regex;
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// One remote feed registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionItem {
    #[serde(default)]
    pub remarks: String,
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Regular expression matched against imported profile remarks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub allow_insecure_url: bool,
}

impl Default for SubscriptionItem {
    fn default() -> Self {
        SubscriptionItem {
            remarks: String::new(),
            url: String::new(),
            enabled: true,
            filter: None,
            user_agent: None,
            allow_insecure_url: false,
        }
    }
}

impl SubscriptionItem {
    pub fn new(remarks: &str, url: &str) -> Self {
        SubscriptionItem {
            remarks: remarks.to_string(),
            url: url.to_string(),
            ..Default::default()
        }
    }

    /// Compile the remarks filter.
    ///
    /// Returns `Ok(None)` when no filter is configured.
    pub fn compiled_filter(&self) -> Result<Option<Regex>, regex::Error> {
        match self.filter.as_deref() {
            Some(pattern) if !pattern.is_empty() => Regex::new(pattern).map(Some),
            _ => Ok(None),
        }
    }
}
