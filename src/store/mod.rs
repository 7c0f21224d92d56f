//! Profile and subscription persistence
//!
//! The importer and synchronizer only talk to [`ProfileStore`]; the two
//! implementations here keep everything in one ordered [`StoreState`].

mod file;
mod memory;
mod state;

use thiserror::Error;

use crate::models::{ProfileItem, SubscriptionItem};

pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use state::StoreState;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Keyed storage for profiles, subscriptions and the selected profile id.
///
/// Profiles keep a stable order: newly inserted profiles go to the front,
/// replacing an existing id keeps its position.
pub trait ProfileStore: Send + Sync {
    fn get_profile(&self, id: &str) -> Result<Option<ProfileItem>, StoreError>;

    /// Store a profile and return its id. An empty `id` allocates a fresh one.
    fn put_profile(&self, id: &str, profile: ProfileItem) -> Result<String, StoreError>;

    /// Attach the verbatim engine JSON of a CUSTOM profile.
    fn put_profile_raw(&self, id: &str, raw: &str) -> Result<(), StoreError>;

    fn get_profile_raw(&self, id: &str) -> Result<Option<String>, StoreError>;

    fn list_profiles(&self) -> Result<Vec<(String, ProfileItem)>, StoreError>;

    /// Remove every profile owned by `sub_id`, returning how many were removed.
    ///
    /// Clears the selection when it pointed at a removed profile.
    fn delete_profiles_by_subscription(&self, sub_id: &str) -> Result<usize, StoreError>;

    fn list_subscriptions(&self) -> Result<Vec<(String, SubscriptionItem)>, StoreError>;

    fn get_subscription(&self, id: &str) -> Result<Option<SubscriptionItem>, StoreError>;

    fn put_subscription(&self, id: &str, subscription: SubscriptionItem) -> Result<(), StoreError>;

    fn get_selected_profile_id(&self) -> Result<Option<String>, StoreError>;

    /// `None` clears the selection.
    fn set_selected_profile_id(&self, id: Option<&str>) -> Result<(), StoreError>;
}
