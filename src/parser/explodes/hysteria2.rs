use super::common::{endpoint, fragment_remarks, non_empty, parse_flag, parse_link, user_info};
use crate::models::{ConfigType, ProfileItem};
use crate::parser::types::DecodeError;
use crate::utils::url::{query_map, url_decode};

/// Parse a Hysteria2 link into a profile (handles both hysteria2:// and hy2://)
/// Format: hysteria2://password@server:port?sni=..&obfs=salamander&obfs-password=..#remarks
pub fn explode_hysteria2(hysteria2: &str) -> Result<ProfileItem, DecodeError> {
    let url = parse_link(hysteria2)?;
    let (server, server_port) = endpoint(&url)?;
    let params = query_map(&url);

    // `user:pass` auth is kept whole
    let password = match (user_info(&url), url.password()) {
        (Some(user), Some(pass)) => Some(format!("{}:{}", user, url_decode(pass))),
        (user, _) => user,
    };

    let mut node = ProfileItem::new(ConfigType::Hysteria2);
    node.remarks = fragment_remarks(&url);
    node.server = server;
    node.server_port = server_port;
    node.password = password;
    node.security = Some(non_empty(&params, "security").unwrap_or_else(|| "tls".to_string()));
    node.sni = non_empty(&params, "sni");
    node.alpn = non_empty(&params, "alpn");
    node.insecure = params.get("insecure").map(|v| parse_flag(v));
    node.port_hopping = non_empty(&params, "mport");
    node.pin_sha256 = non_empty(&params, "pinSHA256");

    if params.get("obfs").map(String::as_str) == Some("salamander") {
        node.obfs_password = non_empty(&params, "obfs-password");
    }

    Ok(node)
}
