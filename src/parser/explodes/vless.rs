use super::common::{
    apply_transport_params, endpoint, fragment_remarks, non_empty, parse_link, user_info,
};
use crate::models::{ConfigType, ProfileItem};
use crate::parser::types::DecodeError;
use crate::utils::url::query_map;

/// Parse a VLESS link into a profile
/// Format: vless://uuid@server:port?encryption=none&security=reality&pbk=..#remarks
pub fn explode_vless(vless: &str) -> Result<ProfileItem, DecodeError> {
    let url = parse_link(vless)?;

    let id = user_info(&url).ok_or(DecodeError::MissingField("id"))?;
    let (server, server_port) = endpoint(&url)?;
    let params = query_map(&url);

    let mut node = ProfileItem::new(ConfigType::Vless);
    node.remarks = fragment_remarks(&url);
    node.server = server;
    node.server_port = server_port;
    node.password = Some(id);
    node.method = Some(non_empty(&params, "encryption").unwrap_or_else(|| "none".to_string()));
    apply_transport_params(&mut node, &params);

    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explode_vless_reality() {
        let node = explode_vless(
            "vless://0b5c6f9e-1111-4e2a-9d1c-3a5b7c9d1e2f@203.0.113.7:443?encryption=none&flow=xtls-rprx-vision&security=reality&sni=www.example.com&fp=chrome&pbk=KEY123&sid=ab12&type=tcp#DE%20Reality",
        )
        .unwrap();

        assert_eq!(node.config_type(), ConfigType::Vless);
        assert_eq!(node.server, "203.0.113.7");
        assert_eq!(node.server_port, "443");
        assert_eq!(
            node.password.as_deref(),
            Some("0b5c6f9e-1111-4e2a-9d1c-3a5b7c9d1e2f")
        );
        assert_eq!(node.method.as_deref(), Some("none"));
        assert_eq!(node.flow.as_deref(), Some("xtls-rprx-vision"));
        assert_eq!(node.security.as_deref(), Some("reality"));
        assert_eq!(node.fingerprint.as_deref(), Some("chrome"));
        assert_eq!(node.public_key.as_deref(), Some("KEY123"));
        assert_eq!(node.short_id.as_deref(), Some("ab12"));
        assert_eq!(node.remarks, "DE Reality");
    }

    #[test]
    fn test_explode_vless_ipv6() {
        let node = explode_vless("vless://id-1@[2001:db8::7]:8443?type=ws&host=cdn.example").unwrap();

        assert_eq!(node.server, "2001:db8::7");
        assert_eq!(node.host.as_deref(), Some("cdn.example"));
        assert_eq!(node.network.as_deref(), Some("ws"));
    }

    #[test]
    fn test_explode_vless_missing_id() {
        assert_eq!(
            explode_vless("vless://v.example:443").unwrap_err(),
            DecodeError::MissingField("id")
        );
    }
}
