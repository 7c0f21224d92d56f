//! Remote subscription refresh

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, error, info, warn};

use crate::crypto::{EnvelopeDecoder, EnvelopeKeys, PayloadSource, Recovered};
use crate::importer::{BatchImporter, ContentPlan};
use crate::models::SubscriptionItem;
use crate::settings::toml_settings::default_user_agent;
use crate::settings::Settings;
use crate::store::ProfileStore;
use crate::utils::http::{is_success, HttpFetcher, DEFAULT_TIMEOUT_MS};

/// Feed registered on first synchronization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultSubscription {
    pub id: String,
    pub remarks: String,
    pub url: String,
}

/// Knobs for [`SubscriptionSynchronizer`]
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Used for both the connect and the read timeout
    pub timeout_ms: u64,
    /// Sent when a subscription has no user agent of its own
    pub user_agent: String,
    /// Sent as `Authorization: Bearer <token>` when non-empty
    pub bearer_token: String,
    pub keys: EnvelopeKeys,
    pub default_subscription: Option<DefaultSubscription>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        SyncOptions {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            user_agent: default_user_agent(),
            bearer_token: String::new(),
            keys: EnvelopeKeys::default(),
            default_subscription: None,
        }
    }
}

impl SyncOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        let default_subscription = if settings.default_sub_url.trim().is_empty() {
            None
        } else {
            Some(DefaultSubscription {
                id: settings.default_sub_id.clone(),
                remarks: settings.default_sub_remarks.clone(),
                url: settings.default_sub_url.clone(),
            })
        };

        SyncOptions {
            timeout_ms: settings.http_timeout_ms,
            user_agent: settings.user_agent.clone(),
            bearer_token: settings.bearer_token.clone(),
            keys: settings.envelope_keys(),
            default_subscription,
        }
    }
}

/// Fetches subscription feeds and imports what they carry
pub struct SubscriptionSynchronizer<S: ProfileStore, F: HttpFetcher> {
    importer: BatchImporter<S>,
    fetcher: F,
    decoder: EnvelopeDecoder,
    options: SyncOptions,
}

impl<S: ProfileStore, F: HttpFetcher> SubscriptionSynchronizer<S, F> {
    pub fn new(store: Arc<S>, fetcher: F, options: SyncOptions) -> Self {
        SubscriptionSynchronizer {
            importer: BatchImporter::new(store),
            fetcher,
            decoder: EnvelopeDecoder::new(options.keys.clone()),
            options,
        }
    }

    pub fn importer(&self) -> &BatchImporter<S> {
        &self.importer
    }

    fn store(&self) -> &S {
        self.importer.store()
    }

    /// Register the configured default feed unless it is already stored with
    /// the same URL. Returns true when the store was written.
    pub fn ensure_default_subscription(&self) -> bool {
        let Some(default) = &self.options.default_subscription else {
            return false;
        };

        match self.store().get_subscription(&default.id) {
            Ok(Some(existing)) if existing.url == default.url => return false,
            Ok(_) => {}
            Err(e) => {
                error!("Failed to read subscription '{}': {}", default.id, e);
                return false;
            }
        }

        let subscription = SubscriptionItem {
            remarks: default.remarks.clone(),
            url: default.url.clone(),
            enabled: true,
            allow_insecure_url: false,
            ..Default::default()
        };
        match self.store().put_subscription(&default.id, subscription) {
            Ok(()) => {
                info!("Registered default subscription '{}'", default.id);
                true
            }
            Err(e) => {
                error!("Failed to register default subscription: {}", e);
                false
            }
        }
    }

    /// Refresh one stored subscription by id.
    pub fn sync_one(&self, sub_id: &str) -> usize {
        match self.store().get_subscription(sub_id) {
            Ok(Some(subscription)) => self.sync_subscription(sub_id, &subscription),
            Ok(None) => {
                warn!("Unknown subscription '{}'", sub_id);
                0
            }
            Err(e) => {
                error!("Failed to read subscription '{}': {}", sub_id, e);
                0
            }
        }
    }

    /// Fetch, decode and import one subscription.
    ///
    /// Disabled subscriptions, transport failures, non-2xx responses and empty
    /// bodies all yield 0 and leave the store untouched.
    pub fn sync_subscription(&self, sub_id: &str, subscription: &SubscriptionItem) -> usize {
        if !subscription.enabled {
            debug!("Subscription '{}' is disabled", sub_id);
            return 0;
        }
        if subscription.url.trim().is_empty() {
            warn!("Subscription '{}' has no URL", sub_id);
            return 0;
        }

        let Some(body) = self.fetch(subscription) else {
            return 0;
        };
        let body = String::from_utf8_lossy(&body).into_owned();
        if body.trim().is_empty() {
            warn!("Subscription '{}' returned an empty body", sub_id);
            return 0;
        }

        let count = self.import_body(&body, sub_id);
        info!("Subscription '{}' imported {} profiles", sub_id, count);
        count
    }

    fn import_body(&self, body: &str, sub_id: &str) -> usize {
        match self.decoder.decode(body) {
            Some(Recovered {
                text,
                source: PayloadSource::Encrypted | PayloadSource::Signed,
            }) => return self.importer.import_content(&text, sub_id, false),
            Some(Recovered {
                text,
                source: PayloadSource::Extracted,
            }) => match self.importer.plan_content(&text, sub_id) {
                ContentPlan::Unrecognized => {}
                plan => {
                    let count = self.importer.apply_content(plan, &text, sub_id, false);
                    if count > 0 {
                        return count;
                    }
                }
            },
            None => {}
        }

        self.importer.import_content(body, sub_id, false)
    }

    fn fetch(&self, subscription: &SubscriptionItem) -> Option<Vec<u8>> {
        let user_agent = subscription
            .user_agent
            .as_deref()
            .filter(|ua| !ua.trim().is_empty())
            .unwrap_or(&self.options.user_agent);

        let mut headers = HashMap::new();
        if !self.options.bearer_token.is_empty() {
            headers.insert(
                "Authorization".to_string(),
                format!("Bearer {}", self.options.bearer_token),
            );
        }

        let timeout = self.options.timeout_ms;
        match self
            .fetcher
            .fetch(&subscription.url, user_agent, &headers, timeout, timeout)
        {
            Ok((status, body)) if is_success(status) => Some(body),
            Ok((status, _)) => {
                warn!("Fetching {} returned HTTP {}", subscription.url, status);
                None
            }
            Err(e) => {
                error!("Fetching {} failed: {}", subscription.url, e);
                None
            }
        }
    }

    /// Refresh every stored subscription and return the total imported.
    pub fn sync_all(&self) -> usize {
        self.sync_all_cancellable(&AtomicBool::new(false))
    }

    /// Like [`sync_all`](Self::sync_all), checking `cancel` between subscriptions.
    pub fn sync_all_cancellable(&self, cancel: &AtomicBool) -> usize {
        self.ensure_default_subscription();

        let subscriptions = match self.store().list_subscriptions() {
            Ok(subscriptions) => subscriptions,
            Err(e) => {
                error!("Failed to list subscriptions: {}", e);
                return 0;
            }
        };

        let mut total = 0;
        for (id, subscription) in subscriptions {
            if cancel.load(Ordering::Relaxed) {
                info!("Subscription refresh cancelled");
                break;
            }
            total += self.sync_subscription(&id, &subscription);
        }
        total
    }
}
