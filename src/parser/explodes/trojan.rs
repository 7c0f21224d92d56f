use super::common::{apply_transport_params, endpoint, fragment_remarks, parse_link, user_info};
use crate::models::{ConfigType, ProfileItem};
use crate::parser::types::DecodeError;
use crate::utils::url::query_map;

/// Parse a Trojan link into a profile
/// Format: trojan://password@server:port?security=tls&sni=..&type=ws&path=..#remarks
pub fn explode_trojan(trojan: &str) -> Result<ProfileItem, DecodeError> {
    let url = parse_link(trojan)?;

    let password = user_info(&url).ok_or(DecodeError::MissingField("password"))?;
    let (server, server_port) = endpoint(&url)?;
    let params = query_map(&url);

    let mut node = ProfileItem::new(ConfigType::Trojan);
    node.remarks = fragment_remarks(&url);
    node.server = server;
    node.server_port = server_port;
    node.password = Some(password);
    apply_transport_params(&mut node, &params);

    // Trojan always runs over TLS unless told otherwise
    if node.security.is_none() {
        node.security = Some("tls".to_string());
    }

    Ok(node)
}
