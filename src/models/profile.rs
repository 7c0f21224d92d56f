//! Profile model definitions
//!
//! Contains the unified descriptor every codec produces and consumes.

use serde::{Deserialize, Serialize};

/// Represents the protocol family of a profile.
/// This is the canonical enum used for descriptor identification across the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConfigType {
    Vmess,
    Shadowsocks,
    Socks,
    Http,
    Vless,
    Trojan,
    Wireguard,
    Hysteria2,
    Custom,
}

impl ConfigType {
    /// URI scheme token including the `://` separator.
    ///
    /// CUSTOM profiles have no URI form; HTTP keeps its scheme token for
    /// display but is never prefix-dispatched.
    pub fn protocol_scheme(self) -> &'static str {
        match self {
            ConfigType::Vmess => "vmess://",
            ConfigType::Shadowsocks => "ss://",
            ConfigType::Socks => "socks://",
            ConfigType::Http => "http://",
            ConfigType::Vless => "vless://",
            ConfigType::Trojan => "trojan://",
            ConfigType::Wireguard => "wireguard://",
            ConfigType::Hysteria2 => "hysteria2://",
            ConfigType::Custom => "",
        }
    }

    /// Converts a `ConfigType` into a human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            ConfigType::Vmess => "VMess",
            ConfigType::Shadowsocks => "Shadowsocks",
            ConfigType::Socks => "SOCKS",
            ConfigType::Http => "HTTP",
            ConfigType::Vless => "VLESS",
            ConfigType::Trojan => "Trojan",
            ConfigType::Wireguard => "WireGuard",
            ConfigType::Hysteria2 => "Hysteria2",
            ConfigType::Custom => "Custom",
        }
    }
}

/// Alternative scheme token accepted for Hysteria2 links.
pub const HY2_SCHEME: &str = "hy2://";

/// Default local address assigned to WireGuard profiles that carry none.
pub const WIREGUARD_LOCAL_ADDRESS: &str = "172.16.0.2/32";

/// Default WireGuard MTU.
pub const WIREGUARD_LOCAL_MTU: u16 = 1420;

/// One server descriptor.
///
/// `config_type` is fixed at construction; everything else is plain data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileItem {
    config_type: ConfigType,
    /// Owning subscription id, empty for manually added profiles
    #[serde(default)]
    pub subscription_id: String,
    #[serde(default)]
    pub remarks: String,
    pub server: String,
    pub server_port: String,

    /// Password, or the user id for VMess/VLESS
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Cipher (Shadowsocks), security (VMess) or encryption (VLESS)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Shadowsocks plugin in the form `name;opts`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin: Option<String>,

    // transport
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quic_security: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quic_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authority: Option<String>,

    // tls / reality
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sni: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spider_x: Option<String>,

    // wireguard
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_shared_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reserved: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtu: Option<u16>,

    // hysteria2
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obfs_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port_hopping: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pin_sha256: Option<String>,
}

impl ProfileItem {
    pub fn new(config_type: ConfigType) -> Self {
        ProfileItem {
            config_type,
            subscription_id: String::new(),
            remarks: String::new(),
            server: String::new(),
            server_port: String::new(),
            password: None,
            method: None,
            flow: None,
            username: None,
            plugin: None,
            network: None,
            header_type: None,
            host: None,
            path: None,
            seed: None,
            quic_security: None,
            quic_key: None,
            mode: None,
            service_name: None,
            authority: None,
            security: None,
            sni: None,
            alpn: None,
            fingerprint: None,
            insecure: None,
            public_key: None,
            short_id: None,
            spider_x: None,
            secret_key: None,
            pre_shared_key: None,
            local_address: None,
            reserved: None,
            mtu: None,
            obfs_password: None,
            port_hopping: None,
            pin_sha256: None,
        }
    }

    pub fn config_type(&self) -> ConfigType {
        self.config_type
    }

    /// A profile without an owning subscription was added by hand.
    pub fn is_manual(&self) -> bool {
        self.subscription_id.is_empty()
    }

    /// True when both profiles point at the same `(server, server_port)` endpoint.
    pub fn same_endpoint(&self, other: &ProfileItem) -> bool {
        self.server == other.server && self.server_port == other.server_port
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_type_serde_uppercase() {
        let json = serde_json::to_string(&ConfigType::Hysteria2).unwrap();
        assert_eq!(json, "\"HYSTERIA2\"");
        let parsed: ConfigType = serde_json::from_str("\"VLESS\"").unwrap();
        assert_eq!(parsed, ConfigType::Vless);
    }

    #[test]
    fn test_profile_serde_keeps_config_type() {
        let mut profile = ProfileItem::new(ConfigType::Socks);
        profile.server = "10.0.0.1".to_string();
        profile.server_port = "1080".to_string();

        let json = serde_json::to_string(&profile).unwrap();
        assert!(json.contains("\"configType\":\"SOCKS\""));
        assert!(!json.contains("password"));

        let back: ProfileItem = serde_json::from_str(&json).unwrap();
        assert_eq!(back, profile);
    }

    #[test]
    fn test_same_endpoint() {
        let mut a = ProfileItem::new(ConfigType::Trojan);
        a.server = "a.example".to_string();
        a.server_port = "443".to_string();
        let mut b = ProfileItem::new(ConfigType::Vless);
        b.server = "a.example".to_string();
        b.server_port = "443".to_string();
        assert!(a.same_endpoint(&b));

        b.server_port = "8443".to_string();
        assert!(!a.same_endpoint(&b));
    }
}
