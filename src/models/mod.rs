//! Core data models for the application
//!
//! This module contains the profile and subscription records shared by the
//! codecs, the importer and the synchronizer, separated from the logic that
//! operates on them.
//!
//! # Usage
//!
//! ```rust
//! use subingest::models::{ConfigType, ProfileItem};
//!
//! let mut profile = ProfileItem::new(ConfigType::Trojan);
//! profile.server = "example.com".to_string();
//! profile.server_port = "443".to_string();
//! profile.password = Some("secret".to_string());
//!
//! assert_eq!(profile.config_type(), ConfigType::Trojan);
//! assert!(profile.is_manual());
//! ```
//!
//! # Working with Option fields
//!
//! Protocol specific fields are wrapped in `Option`; an absent field and an
//! empty one are not the same thing to the codecs, which only emit what is
//! present:
//!
//! ```rust
//! use subingest::models::{ConfigType, ProfileItem};
//!
//! let profile = ProfileItem::new(ConfigType::Vless);
//! let network = profile.network.as_deref().unwrap_or("tcp");
//! assert_eq!(network, "tcp");
//! ```

mod profile;
mod subscription;

pub use profile::*;
pub use subscription::*;
