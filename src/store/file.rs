use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard};

use log::debug;

use super::{ProfileStore, StoreError, StoreState};
use crate::models::{ProfileItem, SubscriptionItem};

/// Store persisted as a single JSON document
///
/// The whole snapshot is rewritten after every mutation.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    state: RwLock<StoreState>,
}

impl JsonFileStore {
    /// Open the store at `path`, starting empty if the file does not exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                StoreState::default()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            StoreState::default()
        };

        Ok(JsonFileStore {
            path,
            state: RwLock::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Apply `change` and persist the result while still holding the lock.
    fn update<T>(&self, change: impl FnOnce(&mut StoreState) -> T) -> Result<T, StoreError> {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        let result = change(&mut state);

        let content = serde_json::to_string_pretty(&*state)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &self.path)?;
        debug!("Persisted store to {}", self.path.display());

        Ok(result)
    }
}

impl ProfileStore for JsonFileStore {
    fn get_profile(&self, id: &str) -> Result<Option<ProfileItem>, StoreError> {
        Ok(self.read().get_profile(id))
    }

    fn put_profile(&self, id: &str, profile: ProfileItem) -> Result<String, StoreError> {
        self.update(|state| state.put_profile(id, profile))
    }

    fn put_profile_raw(&self, id: &str, raw: &str) -> Result<(), StoreError> {
        self.update(|state| state.put_profile_raw(id, raw))
    }

    fn get_profile_raw(&self, id: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read().get_profile_raw(id))
    }

    fn list_profiles(&self) -> Result<Vec<(String, ProfileItem)>, StoreError> {
        Ok(self.read().list_profiles())
    }

    fn delete_profiles_by_subscription(&self, sub_id: &str) -> Result<usize, StoreError> {
        self.update(|state| state.delete_profiles_by_subscription(sub_id))
    }

    fn list_subscriptions(&self) -> Result<Vec<(String, SubscriptionItem)>, StoreError> {
        Ok(self.read().list_subscriptions())
    }

    fn get_subscription(&self, id: &str) -> Result<Option<SubscriptionItem>, StoreError> {
        Ok(self.read().get_subscription(id))
    }

    fn put_subscription(&self, id: &str, subscription: SubscriptionItem) -> Result<(), StoreError> {
        self.update(|state| state.put_subscription(id, subscription))
    }

    fn get_selected_profile_id(&self) -> Result<Option<String>, StoreError> {
        Ok(self.read().selected())
    }

    fn set_selected_profile_id(&self, id: Option<&str>) -> Result<(), StoreError> {
        self.update(|state| state.set_selected(id))
    }
}
