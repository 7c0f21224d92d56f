use super::common::split_host_port;
use crate::models::{ConfigType, ProfileItem};
use crate::parser::types::DecodeError;
use crate::utils::base64::base64_decode;
use crate::utils::url::url_decode;

/// Parse a Shadowsocks link into a profile
///
/// Handles SIP002 (`ss://base64(method:password)@server:port/?plugin=..#remarks`),
/// SIP002 with a plain percent-encoded `method:password` user part, and the
/// legacy `ss://base64(method:password@server:port)#remarks` form.
pub fn explode_ss(ss: &str) -> Result<ProfileItem, DecodeError> {
    let mut ss_content = ss
        .strip_prefix(ConfigType::Shadowsocks.protocol_scheme())
        .ok_or(DecodeError::UnrecognizedProtocol)?
        .replace("/?", "?");

    // Extract fragment (remarks) if present
    let mut remarks = String::new();
    if let Some(hash_pos) = ss_content.find('#') {
        remarks = url_decode(&ss_content[hash_pos + 1..]);
        ss_content.truncate(hash_pos);
    }

    // Extract plugin from the query string
    let mut plugin = None;
    if let Some(query_pos) = ss_content.find('?') {
        let addition = ss_content[query_pos + 1..].to_string();
        ss_content.truncate(query_pos);

        for (key, value) in url::form_urlencoded::parse(addition.as_bytes()) {
            if key == "plugin" && !value.is_empty() {
                plugin = Some(value.into_owned());
            }
        }
    }

    let ss_content = ss_content.trim_end_matches('/');

    let (secret, server_port) = match ss_content.rfind('@') {
        Some(at) => {
            let user = url_decode(&ss_content[..at]);
            let secret = if user.contains(':') {
                user
            } else {
                base64_decode(&user).ok_or(DecodeError::InvalidEncoding)?
            };
            (secret, ss_content[at + 1..].to_string())
        }
        None => {
            let decoded = base64_decode(ss_content).ok_or(DecodeError::InvalidEncoding)?;
            let at = decoded.rfind('@').ok_or(DecodeError::MissingHost)?;
            (decoded[..at].to_string(), decoded[at + 1..].to_string())
        }
    };

    let (method, password) = secret
        .split_once(':')
        .ok_or(DecodeError::MissingField("method"))?;
    if method.is_empty() {
        return Err(DecodeError::MissingField("method"));
    }

    let (server, port) = split_host_port(&server_port)?;

    let mut node = ProfileItem::new(ConfigType::Shadowsocks);
    node.remarks = remarks;
    node.server = server;
    node.server_port = port;
    node.method = Some(method.to_string());
    node.password = Some(password.to_string());
    node.plugin = plugin;

    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explode_ss_legacy_format() {
        // Legacy format: ss://base64(method:password@server:port)
        let legacy_ss = "ss://Y2hhY2hhMjAtaWV0Zi1wb2x5MTMwNTpwYXNzd29yZEAxMjcuMC4wLjE6ODA4MA==";
        let node = explode_ss(legacy_ss).unwrap();

        assert_eq!(node.config_type(), ConfigType::Shadowsocks);
        assert_eq!(node.server, "127.0.0.1");
        assert_eq!(node.server_port, "8080");
        assert_eq!(node.method.as_deref(), Some("chacha20-ietf-poly1305"));
        assert_eq!(node.password.as_deref(), Some("password"));
    }

    #[test]
    fn test_explode_ss_sip002_format() {
        // SIP002 format: ss://base64(method:password)@server:port
        let sip002_ss = "ss://Y2hhY2hhMjAtaWV0Zi1wb2x5MTMwNTpwYXNzd29yZA==@example.com:8388";
        let node = explode_ss(sip002_ss).unwrap();

        assert_eq!(node.server, "example.com");
        assert_eq!(node.server_port, "8388");
        assert_eq!(node.method.as_deref(), Some("chacha20-ietf-poly1305"));
        assert_eq!(node.password.as_deref(), Some("password"));
        assert_eq!(node.remarks, "");
    }

    #[test]
    fn test_explode_ss_with_fragment() {
        let ss_with_fragment =
            "ss://Y2hhY2hhMjAtaWV0Zi1wb2x5MTMwNTpwYXNzd29yZA==@example.com:8388#Example%20Server";
        let node = explode_ss(ss_with_fragment).unwrap();

        assert_eq!(node.remarks, "Example Server");
    }

    #[test]
    fn test_explode_ss_with_plugin() {
        let ss_with_plugin = "ss://Y2hhY2hhMjAtaWV0Zi1wb2x5MTMwNTpwYXNzd29yZA==@example.com:8388/?plugin=obfs-local%3Bobfs%3Dhttp%3Bobfs-host%3Dexample.com#Example%20Plugin";
        let node = explode_ss(ss_with_plugin).unwrap();

        assert_eq!(node.server_port, "8388");
        assert_eq!(
            node.plugin.as_deref(),
            Some("obfs-local;obfs=http;obfs-host=example.com")
        );
        assert_eq!(node.remarks, "Example Plugin");
    }

    #[test]
    fn test_explode_ss_plain_user_info() {
        let node = explode_ss("ss://2022-blake3-aes-128-gcm:c2VjcmV0%3D@[2001:db8::2]:443#v6").unwrap();

        assert_eq!(node.method.as_deref(), Some("2022-blake3-aes-128-gcm"));
        assert_eq!(node.password.as_deref(), Some("c2VjcmV0="));
        assert_eq!(node.server, "2001:db8::2");
        assert_eq!(node.server_port, "443");
    }

    #[test]
    fn test_explode_ss_invalid() {
        assert!(explode_ss("ss://invalid").is_err());
        assert!(explode_ss("ss://Y2hhY2hhMjAtaWV0Zi1wb2x5MTMwNTpwYXNzd29yZA==@example.com").is_err());
        assert!(explode_ss("ss://Y2hhY2hhMjAtaWV0Zi1wb2x5MTMwNTpwYXNzd29yZA==@example.com:0").is_err());
    }
}
