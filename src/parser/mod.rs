pub mod explodes;
pub mod types;

pub use explodes::{explode, explode_custom, explode_custom_value, explode_wireguard_conf};
pub use types::DecodeError;
