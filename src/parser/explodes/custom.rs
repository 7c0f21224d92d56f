use serde_json::Value;

use crate::models::{ConfigType, ProfileItem};
use crate::parser::types::DecodeError;

/// Outbound protocols that only route traffic locally.
const NON_PROXY_PROTOCOLS: &[&str] = &["freedom", "blackhole", "dns", "loopback"];

/// Parse a full engine configuration (inbounds/outbounds/routing) into a CUSTOM profile
pub fn explode_custom(json: &str) -> Result<ProfileItem, DecodeError> {
    let value: Value = serde_json::from_str(json)?;
    explode_custom_value(&value)
}

/// Build a CUSTOM profile from an already parsed engine configuration
///
/// The endpoint is read from the first proxy outbound, either
/// `settings.vnext[0]` or `settings.servers[0]`. A config without one is still
/// accepted with an empty endpoint.
pub fn explode_custom_value(config: &Value) -> Result<ProfileItem, DecodeError> {
    if !config.is_object() {
        return Err(DecodeError::InvalidJson("expected an object".to_string()));
    }

    let mut node = ProfileItem::new(ConfigType::Custom);
    node.remarks = match config["remarks"].as_str() {
        Some(remarks) if !remarks.trim().is_empty() => remarks.to_string(),
        _ => "custom".to_string(),
    };

    if let Some((server, port)) = first_outbound_endpoint(config) {
        node.server = server;
        node.server_port = port;
    }

    Ok(node)
}

fn first_outbound_endpoint(config: &Value) -> Option<(String, String)> {
    let outbounds = config["outbounds"].as_array()?;

    outbounds
        .iter()
        .filter(|outbound| {
            outbound["protocol"]
                .as_str()
                .map_or(false, |p| !NON_PROXY_PROTOCOLS.contains(&p))
        })
        .find_map(|outbound| {
            let settings = &outbound["settings"];
            let target = settings["vnext"]
                .get(0)
                .or_else(|| settings["servers"].get(0))?;

            let address = target["address"].as_str()?;
            let port = match &target["port"] {
                Value::Number(n) => n.to_string(),
                Value::String(s) => s.clone(),
                _ => return None,
            };
            Some((address.to_string(), port))
        })
}
