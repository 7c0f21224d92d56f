use std::collections::HashMap;

use url::Url;

use crate::models::{ConfigType, ProfileItem, HY2_SCHEME};
use crate::parser::types::DecodeError;
use crate::utils::url::{strip_brackets, url_decode};

/// Explode a descriptor link into a profile
///
/// The scheme prefix picks the decoder. Prefixes are compared case-sensitively
/// in a fixed priority order and the first match wins.
pub fn explode(link: &str) -> Result<ProfileItem, DecodeError> {
    let link = link.trim();

    if link.is_empty() {
        return Err(DecodeError::UnrecognizedProtocol);
    }

    if link.starts_with(ConfigType::Vmess.protocol_scheme()) {
        super::vmess::explode_vmess(link)
    } else if link.starts_with(ConfigType::Shadowsocks.protocol_scheme()) {
        super::ss::explode_ss(link)
    } else if link.starts_with(ConfigType::Socks.protocol_scheme()) {
        super::socks::explode_socks(link)
    } else if link.starts_with(ConfigType::Trojan.protocol_scheme()) {
        super::trojan::explode_trojan(link)
    } else if link.starts_with(ConfigType::Vless.protocol_scheme()) {
        super::vless::explode_vless(link)
    } else if link.starts_with(ConfigType::Wireguard.protocol_scheme()) {
        super::wireguard::explode_wireguard(link)
    } else if link.starts_with(ConfigType::Hysteria2.protocol_scheme()) || link.starts_with(HY2_SCHEME)
    {
        super::hysteria2::explode_hysteria2(link)
    } else {
        Err(DecodeError::UnrecognizedProtocol)
    }
}

/// Parse a link with the `url` crate, mapping failures to [`DecodeError`].
pub(crate) fn parse_link(link: &str) -> Result<Url, DecodeError> {
    Ok(Url::parse(link)?)
}

/// Validate a port string and return it in canonical form.
pub(crate) fn validate_port(port: &str) -> Result<String, DecodeError> {
    match port.trim().parse::<u16>() {
        Ok(p) if p != 0 => Ok(p.to_string()),
        _ => Err(DecodeError::InvalidPort(port.to_string())),
    }
}

/// Extract `(server, server_port)` from a parsed link.
pub(crate) fn endpoint(url: &Url) -> Result<(String, String), DecodeError> {
    let host = url.host_str().map(strip_brackets).unwrap_or("");
    if host.is_empty() {
        return Err(DecodeError::MissingHost);
    }

    let port = match url.port() {
        Some(p) => validate_port(&p.to_string())?,
        None => return Err(DecodeError::InvalidPort(String::new())),
    };

    Ok((host.to_string(), port))
}

/// Split a `host:port` authority, IPv6 literals in brackets.
pub(crate) fn split_host_port(authority: &str) -> Result<(String, String), DecodeError> {
    let (host, port) = authority
        .rsplit_once(':')
        .ok_or_else(|| DecodeError::InvalidPort(String::new()))?;
    let host = strip_brackets(host.trim());
    if host.is_empty() {
        return Err(DecodeError::MissingHost);
    }
    Ok((host.to_string(), validate_port(port)?))
}

/// Remarks carried in the fragment, percent-decoded.
pub(crate) fn fragment_remarks(url: &Url) -> String {
    url.fragment().map(url_decode).unwrap_or_default()
}

/// Percent-decoded userinfo user part, `None` when empty.
pub(crate) fn user_info(url: &Url) -> Option<String> {
    let user = url_decode(url.username());
    if user.is_empty() {
        None
    } else {
        Some(user)
    }
}

pub(crate) fn non_empty(params: &HashMap<String, String>, key: &str) -> Option<String> {
    params.get(key).filter(|v| !v.is_empty()).cloned()
}

pub(crate) fn parse_flag(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

/// Copy the shared transport/TLS query keys onto a profile.
pub(crate) fn apply_transport_params(item: &mut ProfileItem, params: &HashMap<String, String>) {
    item.network = Some(non_empty(params, "type").unwrap_or_else(|| "tcp".to_string()));
    item.header_type = non_empty(params, "headerType");
    item.host = non_empty(params, "host");
    item.path = non_empty(params, "path");
    item.seed = non_empty(params, "seed");
    item.quic_security = non_empty(params, "quicSecurity");
    item.quic_key = non_empty(params, "key");
    item.mode = non_empty(params, "mode");
    item.service_name = non_empty(params, "serviceName");
    item.authority = non_empty(params, "authority");
    item.security = non_empty(params, "security");
    item.sni = non_empty(params, "sni");
    item.fingerprint = non_empty(params, "fp");
    item.alpn = non_empty(params, "alpn");
    item.public_key = non_empty(params, "pbk");
    item.short_id = non_empty(params, "sid");
    item.spider_x = non_empty(params, "spx");
    item.flow = non_empty(params, "flow");
    item.insecure = params.get("allowInsecure").map(|v| parse_flag(v));
}
