use serde_json::Value;

use super::common::{
    apply_transport_params, endpoint, fragment_remarks, non_empty, parse_link, user_info,
    validate_port,
};
use crate::models::{ConfigType, ProfileItem};
use crate::parser::types::DecodeError;
use crate::utils::base64::base64_decode;
use crate::utils::url::query_map;

/// Parse a VMess link into a profile
///
/// The base64 JSON share format is tried first, then the standard
/// `vmess://uuid@host:port?...#remarks` form.
pub fn explode_vmess(vmess: &str) -> Result<ProfileItem, DecodeError> {
    match explode_vmess_json(vmess) {
        Ok(node) => Ok(node),
        Err(json_err) => explode_std_vmess(vmess).map_err(|_| json_err),
    }
}

/// Read a JSON field that may be a string or a number, `None` when blank.
fn json_string(json: &Value, key: &str) -> Option<String> {
    match &json[key] {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parse the `vmess://base64(json)` share format
pub fn explode_vmess_json(vmess: &str) -> Result<ProfileItem, DecodeError> {
    let encoded = vmess
        .strip_prefix(ConfigType::Vmess.protocol_scheme())
        .ok_or(DecodeError::UnrecognizedProtocol)?;

    let decoded = base64_decode(encoded).ok_or(DecodeError::InvalidEncoding)?;
    let json: Value = serde_json::from_str(&decoded)?;
    if !json.is_object() {
        return Err(DecodeError::InvalidJson("expected an object".to_string()));
    }

    let server = json_string(&json, "add").ok_or(DecodeError::MissingHost)?;
    let port = json_string(&json, "port").unwrap_or_default();
    let server_port = validate_port(&port)?;
    let id = json_string(&json, "id").ok_or(DecodeError::MissingField("id"))?;

    let mut node = ProfileItem::new(ConfigType::Vmess);
    node.remarks = json_string(&json, "ps").unwrap_or_default();
    node.server = server;
    node.server_port = server_port;
    node.password = Some(id);
    node.method = Some(json_string(&json, "scy").unwrap_or_else(|| "auto".to_string()));
    node.network = Some(json_string(&json, "net").unwrap_or_else(|| "tcp".to_string()));
    node.header_type = json_string(&json, "type");
    node.host = json_string(&json, "host");
    node.path = json_string(&json, "path");
    node.security = json_string(&json, "tls");
    node.sni = json_string(&json, "sni");
    node.alpn = json_string(&json, "alpn");
    node.fingerprint = json_string(&json, "fp");

    Ok(node)
}

/// Parse a standard VMess link
/// Format: vmess://uuid@hostname:port[?type=ws&host=xxx&path=yyy]#remarks
pub fn explode_std_vmess(vmess: &str) -> Result<ProfileItem, DecodeError> {
    let url = parse_link(vmess)?;
    let (server, server_port) = endpoint(&url)?;
    let id = user_info(&url).ok_or(DecodeError::MissingField("id"))?;
    let params = query_map(&url);

    let mut node = ProfileItem::new(ConfigType::Vmess);
    node.remarks = fragment_remarks(&url);
    node.server = server;
    node.server_port = server_port;
    node.password = Some(id);
    apply_transport_params(&mut node, &params);
    node.method = Some(non_empty(&params, "encryption").unwrap_or_else(|| "auto".to_string()));

    Ok(node)
}
