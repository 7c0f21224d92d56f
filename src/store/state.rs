use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{ProfileItem, SubscriptionItem};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredProfile {
    id: String,
    profile: ProfileItem,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    raw: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSubscription {
    id: String,
    subscription: SubscriptionItem,
}

/// Snapshot of everything a store holds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreState {
    profiles: Vec<StoredProfile>,
    subscriptions: Vec<StoredSubscription>,
    selected: Option<String>,
}

impl StoreState {
    pub fn get_profile(&self, id: &str) -> Option<ProfileItem> {
        self.profiles
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.profile.clone())
    }

    pub fn put_profile(&mut self, id: &str, profile: ProfileItem) -> String {
        if let Some(existing) = self.profiles.iter_mut().find(|p| !id.is_empty() && p.id == id) {
            existing.profile = profile;
            return existing.id.clone();
        }

        let id = if id.is_empty() {
            Uuid::new_v4().simple().to_string()
        } else {
            id.to_string()
        };
        self.profiles.insert(
            0,
            StoredProfile {
                id: id.clone(),
                profile,
                raw: None,
            },
        );
        id
    }

    pub fn put_profile_raw(&mut self, id: &str, raw: &str) {
        if let Some(existing) = self.profiles.iter_mut().find(|p| p.id == id) {
            existing.raw = Some(raw.to_string());
        }
    }

    pub fn get_profile_raw(&self, id: &str) -> Option<String> {
        self.profiles
            .iter()
            .find(|p| p.id == id)
            .and_then(|p| p.raw.clone())
    }

    pub fn list_profiles(&self) -> Vec<(String, ProfileItem)> {
        self.profiles
            .iter()
            .map(|p| (p.id.clone(), p.profile.clone()))
            .collect()
    }

    pub fn delete_profiles_by_subscription(&mut self, sub_id: &str) -> usize {
        let before = self.profiles.len();
        self.profiles
            .retain(|p| p.profile.subscription_id != sub_id);

        let selected_gone = self
            .selected
            .as_deref()
            .map_or(false, |sel| !self.profiles.iter().any(|p| p.id == sel));
        if selected_gone {
            self.selected = None;
        }

        before - self.profiles.len()
    }

    pub fn list_subscriptions(&self) -> Vec<(String, SubscriptionItem)> {
        self.subscriptions
            .iter()
            .map(|s| (s.id.clone(), s.subscription.clone()))
            .collect()
    }

    pub fn get_subscription(&self, id: &str) -> Option<SubscriptionItem> {
        self.subscriptions
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.subscription.clone())
    }

    pub fn put_subscription(&mut self, id: &str, subscription: SubscriptionItem) {
        match self.subscriptions.iter_mut().find(|s| s.id == id) {
            Some(existing) => existing.subscription = subscription,
            None => self.subscriptions.push(StoredSubscription {
                id: id.to_string(),
                subscription,
            }),
        }
    }

    pub fn selected(&self) -> Option<String> {
        self.selected.clone()
    }

    pub fn set_selected(&mut self, id: Option<&str>) {
        self.selected = id.filter(|id| !id.is_empty()).map(str::to_string);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ConfigType;

    fn profile(sub_id: &str, server: &str) -> ProfileItem {
        let mut item = ProfileItem::new(ConfigType::Trojan);
        item.subscription_id = sub_id.to_string();
        item.server = server.to_string();
        item.server_port = "443".to_string();
        item
    }

    #[test]
    fn test_put_profile_prepends_new_ids() {
        let mut state = StoreState::default();
        let first = state.put_profile("", profile("s", "a.example"));
        let second = state.put_profile("", profile("s", "b.example"));

        assert_ne!(first, second);
        assert_eq!(first.len(), 32);
        let ids: Vec<String> = state.list_profiles().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![second.clone(), first.clone()]);

        // replacing keeps the position
        let same = state.put_profile(&first, profile("s", "c.example"));
        assert_eq!(same, first);
        assert_eq!(state.list_profiles()[1].1.server, "c.example");
    }

    #[test]
    fn test_delete_by_subscription_clears_selection() {
        let mut state = StoreState::default();
        let keep = state.put_profile("", profile("", "manual.example"));
        let gone = state.put_profile("", profile("sub", "feed.example"));

        state.set_selected(Some(&gone));
        assert_eq!(state.delete_profiles_by_subscription("sub"), 1);
        assert_eq!(state.selected(), None);

        state.set_selected(Some(&keep));
        assert_eq!(state.delete_profiles_by_subscription("sub"), 0);
        assert_eq!(state.selected(), Some(keep));
    }

    #[test]
    fn test_put_subscription_replaces_in_place() {
        let mut state = StoreState::default();
        state.put_subscription("a", SubscriptionItem::new("A", "https://a.example"));
        state.put_subscription("b", SubscriptionItem::new("B", "https://b.example"));
        state.put_subscription("a", SubscriptionItem::new("A2", "https://a.example"));

        let subs = state.list_subscriptions();
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0].0, "a");
        assert_eq!(subs[0].1.remarks, "A2");
    }
}
