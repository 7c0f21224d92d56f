//! Batch import of descriptor text into a [`ProfileStore`]

mod plan;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use log::{debug, error, info, warn};
use serde_json::Value;
use url::Url;

use crate::models::{ProfileItem, SubscriptionItem};
use crate::parser::{explode_custom, explode_custom_value, explode_wireguard_conf};
use crate::store::ProfileStore;
use crate::utils::base64::base64_decode;
use crate::utils::url::{is_valid_sub_url, url_decode};

pub use plan::{distinct_lines, is_custom_or_wireguard, plan_batch, reselect, RemarksFilter};

/// How a block of content would be imported, decided without touching the store
#[derive(Debug, Clone)]
pub enum ContentPlan {
    /// Descriptor lines that decoded, in insertion order
    Batch(Vec<ProfileItem>),
    /// Custom engine JSON or a WireGuard INI block
    CustomOrWireguard,
    /// Nothing recognizable
    Unrecognized,
}

/// Imports descriptor batches for subscriptions
///
/// Store writes for one subscription id are serialized, so a concurrent
/// import of the same subscription never interleaves its wipe and refill.
pub struct BatchImporter<S: ProfileStore> {
    store: Arc<S>,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<S: ProfileStore> BatchImporter<S> {
    pub fn new(store: Arc<S>) -> Self {
        BatchImporter {
            store,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    fn subscription_lock(&self, sub_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.entry(sub_id.to_string()).or_default().clone()
    }

    /// Remarks filter configured on `sub_id`, if any.
    pub fn filter_for(&self, sub_id: &str) -> RemarksFilter {
        if sub_id.is_empty() {
            return RemarksFilter::None;
        }
        match self.store.get_subscription(sub_id) {
            Ok(subscription) => RemarksFilter::for_subscription(subscription.as_ref()),
            Err(e) => {
                error!("Failed to load subscription '{}': {}", sub_id, e);
                RemarksFilter::None
            }
        }
    }

    /// The selected profile, if it belongs to `sub_id`.
    pub fn capture_selection(&self, sub_id: &str) -> Option<ProfileItem> {
        let selected = match self.store.get_selected_profile_id() {
            Ok(selected) => selected?,
            Err(e) => {
                error!("Failed to read selected profile: {}", e);
                return None;
            }
        };

        match self.store.get_profile(&selected) {
            Ok(Some(profile)) if profile.subscription_id == sub_id => Some(profile),
            Ok(_) => None,
            Err(e) => {
                error!("Failed to read profile '{}': {}", selected, e);
                None
            }
        }
    }

    /// Replace (or extend, with `append`) a subscription's profiles.
    ///
    /// Without `append` the selection is captured, the subscription's profiles
    /// are removed, and the selection moves to the new profile on the same
    /// endpoint. Returns the number of profiles stored.
    pub fn apply_plan(&self, planned: Vec<ProfileItem>, sub_id: &str, append: bool) -> usize {
        let lock = self.subscription_lock(sub_id);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());
        self.apply_plan_locked(planned, sub_id, append)
    }

    /// Body of [`apply_plan`](Self::apply_plan); the caller holds the
    /// subscription lock.
    fn apply_plan_locked(&self, planned: Vec<ProfileItem>, sub_id: &str, append: bool) -> usize {
        let replace = !append && !sub_id.is_empty();
        let previous = if replace {
            self.capture_selection(sub_id)
        } else {
            None
        };

        if replace {
            match self.store.delete_profiles_by_subscription(sub_id) {
                Ok(removed) => debug!("Removed {} profiles of '{}'", removed, sub_id),
                Err(e) => error!("Failed to remove profiles of '{}': {}", sub_id, e),
            }
        }

        let mut stored = Vec::with_capacity(planned.len());
        for profile in planned {
            match self.store.put_profile("", profile.clone()) {
                Ok(id) => stored.push((id, profile)),
                Err(e) => error!("Failed to store profile '{}': {}", profile.remarks, e),
            }
        }

        if let Some(id) = reselect(previous.as_ref(), &stored) {
            if let Err(e) = self.store.set_selected_profile_id(Some(id)) {
                error!("Failed to restore selection: {}", e);
            }
        }

        stored.len()
    }

    /// Import newline separated descriptors, returning how many were stored.
    pub fn import_batch(&self, text: &str, sub_id: &str, append: bool) -> usize {
        let planned = plan_batch(text, sub_id, &self.filter_for(sub_id));
        self.apply_plan(planned, sub_id, append)
    }

    /// Import custom engine JSON (one object or an array of them) or a
    /// WireGuard INI block.
    pub fn import_custom_or_wireguard(&self, text: &str, sub_id: &str) -> usize {
        let lock = self.subscription_lock(sub_id);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());
        self.import_custom_or_wireguard_locked(text, sub_id)
    }

    fn import_custom_or_wireguard_locked(&self, text: &str, sub_id: &str) -> usize {
        if plan::is_custom_config(text) {
            let count = self.import_custom_array(text, sub_id);
            if count > 0 {
                return count;
            }

            return match explode_custom(text) {
                Ok(profile) => usize::from(self.store_with_raw(profile, sub_id, text)),
                Err(e) => {
                    debug!("Not a custom config: {}", e);
                    0
                }
            };
        }

        if plan::is_wireguard_conf(text) {
            return match explode_wireguard_conf(text) {
                Ok(profile) => usize::from(self.store_with_raw(profile, sub_id, text)),
                Err(e) => {
                    warn!("Invalid WireGuard config: {}", e);
                    0
                }
            };
        }

        0
    }

    fn import_custom_array(&self, text: &str, sub_id: &str) -> usize {
        let Ok(Value::Array(items)) = serde_json::from_str::<Value>(text) else {
            return 0;
        };

        let mut count = 0;
        for item in items.iter().rev() {
            let profile = match explode_custom_value(item) {
                Ok(profile) => profile,
                Err(e) => {
                    debug!("Skipping custom config element: {}", e);
                    continue;
                }
            };
            let raw = serde_json::to_string_pretty(item).unwrap_or_default();
            if self.store_with_raw(profile, sub_id, &raw) {
                count += 1;
            }
        }
        count
    }

    fn store_with_raw(&self, mut profile: ProfileItem, sub_id: &str, raw: &str) -> bool {
        profile.subscription_id = sub_id.to_string();
        let stored = self
            .store
            .put_profile("", profile)
            .and_then(|id| self.store.put_profile_raw(&id, raw));
        match stored {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to store custom profile: {}", e);
                false
            }
        }
    }

    /// Decide how `text` would be imported.
    ///
    /// The base64 decoding of `text` is tried before `text` itself.
    pub fn plan_content(&self, text: &str, sub_id: &str) -> ContentPlan {
        let filter = self.filter_for(sub_id);
        let decoded = base64_decode(text);

        for candidate in [decoded.as_deref(), Some(text)].into_iter().flatten() {
            let planned = plan_batch(candidate, sub_id, &filter);
            if !planned.is_empty() {
                return ContentPlan::Batch(planned);
            }
        }

        if is_custom_or_wireguard(text) {
            ContentPlan::CustomOrWireguard
        } else {
            ContentPlan::Unrecognized
        }
    }

    /// Carry out a [`ContentPlan`] for `text`.
    pub fn apply_content(&self, plan: ContentPlan, text: &str, sub_id: &str, append: bool) -> usize {
        match plan {
            ContentPlan::Batch(planned) => self.apply_plan(planned, sub_id, append),
            ContentPlan::CustomOrWireguard => {
                let lock = self.subscription_lock(sub_id);
                let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

                // an empty batch still replaces the subscription's profiles
                self.apply_plan_locked(Vec::new(), sub_id, append);
                self.import_custom_or_wireguard_locked(text, sub_id)
            }
            ContentPlan::Unrecognized => self.apply_plan(Vec::new(), sub_id, append),
        }
    }

    /// Import content that may be base64 encoded descriptors, plain
    /// descriptors, custom engine JSON or a WireGuard INI block.
    pub fn import_content(&self, text: &str, sub_id: &str, append: bool) -> usize {
        let plan = self.plan_content(text, sub_id);
        self.apply_content(plan, text, sub_id, append)
    }

    /// Register every `http(s)://` line of `text` as a subscription.
    ///
    /// URLs that are already registered are skipped. Returns the number of
    /// subscriptions added.
    pub fn import_subscription_urls(&self, text: &str) -> usize {
        let existing = match self.store.list_subscriptions() {
            Ok(subscriptions) => subscriptions,
            Err(e) => {
                error!("Failed to list subscriptions: {}", e);
                return 0;
            }
        };
        let mut known: Vec<String> = existing.into_iter().map(|(_, sub)| sub.url).collect();

        let mut count = 0;
        for line in distinct_lines(text) {
            if !is_valid_sub_url(line) || known.iter().any(|url| url == line) {
                continue;
            }

            let remarks = Url::parse(line)
                .ok()
                .and_then(|url| url.fragment().map(url_decode))
                .filter(|fragment| !fragment.is_empty())
                .unwrap_or_else(|| "import sub".to_string());

            let id = uuid::Uuid::new_v4().simple().to_string();
            match self
                .store
                .put_subscription(&id, SubscriptionItem::new(&remarks, line))
            {
                Ok(()) => {
                    info!("Added subscription '{}'", remarks);
                    known.push(line.to_string());
                    count += 1;
                }
                Err(e) => error!("Failed to add subscription '{}': {}", line, e),
            }
        }
        count
    }
}
