use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{ProfileStore, StoreError, StoreState};
use crate::models::{ProfileItem, SubscriptionItem};

/// In-process store, nothing is persisted
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl ProfileStore for MemoryStore {
    fn get_profile(&self, id: &str) -> Result<Option<ProfileItem>, StoreError> {
        Ok(self.read().get_profile(id))
    }

    fn put_profile(&self, id: &str, profile: ProfileItem) -> Result<String, StoreError> {
        Ok(self.write().put_profile(id, profile))
    }

    fn put_profile_raw(&self, id: &str, raw: &str) -> Result<(), StoreError> {
        self.write().put_profile_raw(id, raw);
        Ok(())
    }

    fn get_profile_raw(&self, id: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read().get_profile_raw(id))
    }

    fn list_profiles(&self) -> Result<Vec<(String, ProfileItem)>, StoreError> {
        Ok(self.read().list_profiles())
    }

    fn delete_profiles_by_subscription(&self, sub_id: &str) -> Result<usize, StoreError> {
        Ok(self.write().delete_profiles_by_subscription(sub_id))
    }

    fn list_subscriptions(&self) -> Result<Vec<(String, SubscriptionItem)>, StoreError> {
        Ok(self.read().list_subscriptions())
    }

    fn get_subscription(&self, id: &str) -> Result<Option<SubscriptionItem>, StoreError> {
        Ok(self.read().get_subscription(id))
    }

    fn put_subscription(&self, id: &str, subscription: SubscriptionItem) -> Result<(), StoreError> {
        self.write().put_subscription(id, subscription);
        Ok(())
    }

    fn get_selected_profile_id(&self) -> Result<Option<String>, StoreError> {
        Ok(self.read().selected())
    }

    fn set_selected_profile_id(&self, id: Option<&str>) -> Result<(), StoreError> {
        self.write().set_selected(id);
        Ok(())
    }
}
