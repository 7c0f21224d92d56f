pub mod single;

pub use single::{proxy_to_single, proxy_to_uri};
