use super::common::{endpoint, fragment_remarks, non_empty, parse_link, split_host_port, user_info};
use crate::models::{ConfigType, ProfileItem, WIREGUARD_LOCAL_ADDRESS, WIREGUARD_LOCAL_MTU};
use crate::parser::types::DecodeError;
use crate::utils::url::query_map;

/// Parse a WireGuard link into a profile
/// Format: wireguard://privateKey@server:port?publickey=..&address=..&mtu=..#remarks
pub fn explode_wireguard(wireguard: &str) -> Result<ProfileItem, DecodeError> {
    let url = parse_link(wireguard)?;

    let secret_key = user_info(&url).ok_or(DecodeError::MissingField("secretKey"))?;
    let (server, server_port) = endpoint(&url)?;
    let params = query_map(&url);

    let public_key = non_empty(&params, "publickey").ok_or(DecodeError::MissingField("publickey"))?;

    let mut node = ProfileItem::new(ConfigType::Wireguard);
    node.remarks = fragment_remarks(&url);
    node.server = server;
    node.server_port = server_port;
    node.secret_key = Some(secret_key);
    node.public_key = Some(public_key);
    node.pre_shared_key = non_empty(&params, "presharedkey");
    node.local_address =
        Some(non_empty(&params, "address").unwrap_or_else(|| WIREGUARD_LOCAL_ADDRESS.to_string()));
    node.reserved = non_empty(&params, "reserved");
    node.mtu = Some(
        params
            .get("mtu")
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(WIREGUARD_LOCAL_MTU),
    );

    Ok(node)
}

/// Parse a WireGuard `.conf` block (`[Interface]` / `[Peer]` sections)
///
/// Only the first `[Peer]` section is used.
pub fn explode_wireguard_conf(config: &str) -> Result<ProfileItem, DecodeError> {
    let mut section = "";
    let mut peers_seen = 0;
    let mut private_key = String::new();
    let mut address = String::new();
    let mut mtu = None;
    let mut public_key = String::new();
    let mut preshared_key = String::new();
    let mut reserved = String::new();
    let mut endpoint = String::new();

    for line in config.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            section = line;
            if section == "[Peer]" {
                peers_seen += 1;
            }
            continue;
        }

        // Values may contain '=' (base64 keys), split on the first one only
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim().to_string();

        match section {
            "[Interface]" => match key {
                "PrivateKey" => private_key = value,
                "Address" => address = value,
                "MTU" => mtu = value.parse::<u16>().ok(),
                _ => {}
            },
            "[Peer]" if peers_seen == 1 => match key {
                "PublicKey" => public_key = value,
                "PresharedKey" => preshared_key = value,
                "Endpoint" => endpoint = value,
                "Reserved" => reserved = value,
                _ => {}
            },
            _ => {}
        }
    }

    if private_key.is_empty() {
        return Err(DecodeError::MissingField("PrivateKey"));
    }
    if public_key.is_empty() {
        return Err(DecodeError::MissingField("PublicKey"));
    }
    if endpoint.is_empty() {
        return Err(DecodeError::MissingField("Endpoint"));
    }
    let (server, server_port) = split_host_port(&endpoint)?;

    let mut node = ProfileItem::new(ConfigType::Wireguard);
    node.remarks = format!("{} ({})", server, server_port);
    node.server = server;
    node.server_port = server_port;
    node.secret_key = Some(private_key);
    node.public_key = Some(public_key);
    node.pre_shared_key = Some(preshared_key).filter(|s| !s.is_empty());
    node.local_address = Some(if address.is_empty() {
        WIREGUARD_LOCAL_ADDRESS.to_string()
    } else {
        address
    });
    node.reserved = Some(reserved).filter(|s| !s.is_empty());
    node.mtu = Some(mtu.unwrap_or(WIREGUARD_LOCAL_MTU));

    Ok(node)
}
