pub mod crypto;
pub mod generator;
pub mod importer;
pub mod manager;
pub mod models;
pub mod parser;
pub mod settings;
pub mod store;
pub mod sync;
pub mod utils;

// Re-export the main profile types for easier access
pub use models::{ConfigType, ProfileItem, SubscriptionItem};

pub use manager::ConfigManager;
pub use parser::types::DecodeError;
pub use settings::Settings;
