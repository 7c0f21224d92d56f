//! Per-scheme descriptor decoders
//!
//! Every decoder turns one descriptor into a [`ProfileItem`](crate::models::ProfileItem)
//! or a [`DecodeError`](crate::parser::types::DecodeError). [`explode`] picks the
//! decoder from the scheme prefix.

mod common;
pub mod custom;
pub mod hysteria2;
pub mod socks;
pub mod ss;
pub mod trojan;
pub mod vless;
pub mod vmess;
pub mod wireguard;

pub use common::explode;
pub use custom::{explode_custom, explode_custom_value};
pub use wireguard::explode_wireguard_conf;
