//! Entry point tying the importer, synchronizer and codec together

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use log::{error, info};

use crate::generator::{proxy_to_single, proxy_to_uri};
use crate::importer::BatchImporter;
use crate::store::ProfileStore;
use crate::sync::{SubscriptionSynchronizer, SyncOptions};
use crate::utils::base64::base64_decode;
use crate::utils::http::HttpFetcher;

pub struct ConfigManager<S: ProfileStore, F: HttpFetcher> {
    sync: SubscriptionSynchronizer<S, F>,
}

impl<S: ProfileStore, F: HttpFetcher> ConfigManager<S, F> {
    pub fn new(store: Arc<S>, fetcher: F, options: SyncOptions) -> Self {
        ConfigManager {
            sync: SubscriptionSynchronizer::new(store, fetcher, options),
        }
    }

    pub fn store(&self) -> &S {
        self.importer().store()
    }

    pub fn importer(&self) -> &BatchImporter<S> {
        self.sync.importer()
    }

    pub fn synchronizer(&self) -> &SubscriptionSynchronizer<S, F> {
        &self.sync
    }

    pub fn import_batch(&self, text: &str, sub_id: &str, append: bool) -> usize {
        self.importer().import_batch(text, sub_id, append)
    }

    pub fn import_custom_or_wireguard(&self, text: &str, sub_id: &str) -> usize {
        self.importer().import_custom_or_wireguard(text, sub_id)
    }

    pub fn import_content(&self, text: &str, sub_id: &str, append: bool) -> usize {
        self.importer().import_content(text, sub_id, append)
    }

    /// Import pasted or scanned text.
    ///
    /// Returns `(profiles imported, subscriptions added)`. Subscription URLs in
    /// the text are registered and, if any were added, every subscription is
    /// refreshed.
    pub fn import_batch_config(&self, text: &str, sub_id: &str, append: bool) -> (usize, usize) {
        let count = self.import_content(text, sub_id, append);

        let mut count_sub = self.importer().import_subscription_urls(text);
        if count_sub == 0 {
            if let Some(decoded) = base64_decode(text) {
                count_sub = self.importer().import_subscription_urls(&decoded);
            }
        }
        if count_sub > 0 {
            info!("Added {} subscriptions, refreshing all", count_sub);
            self.sync_all();
        }

        (count, count_sub)
    }

    pub fn sync_one(&self, sub_id: &str) -> usize {
        self.sync.sync_one(sub_id)
    }

    pub fn sync_all(&self) -> usize {
        self.sync.sync_all()
    }

    pub fn sync_all_cancellable(&self, cancel: &AtomicBool) -> usize {
        self.sync.sync_all_cancellable(cancel)
    }

    /// Share URI of a stored profile, empty when it has none.
    pub fn share_as_uri(&self, profile_id: &str) -> String {
        match self.store().get_profile(profile_id) {
            Ok(Some(profile)) => proxy_to_uri(&profile),
            Ok(None) => String::new(),
            Err(e) => {
                error!("Failed to read profile '{}': {}", profile_id, e);
                String::new()
            }
        }
    }

    /// Share URIs of every stored profile that has one, in store order.
    pub fn share_all(&self) -> String {
        match self.store().list_profiles() {
            Ok(profiles) => proxy_to_single(profiles.iter().map(|(_, profile)| profile)),
            Err(e) => {
                error!("Failed to list profiles: {}", e);
                String::new()
            }
        }
    }
}
