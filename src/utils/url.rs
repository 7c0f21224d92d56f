//! URL encoding/decoding utilities

use std::collections::HashMap;

use url::Url;

/// Encodes a string using URL encoding
///
/// # Examples
/// ```
/// use subingest::utils::url::url_encode;
///
/// let encoded = url_encode("Hello World!");
/// assert_eq!(encoded, "Hello%20World%21");
/// ```
pub fn url_encode(input: &str) -> String {
    urlencoding::encode(input).into_owned()
}

/// Decodes a URL-encoded string
///
/// Returns the original string if decoding fails.
///
/// # Examples
/// ```
/// use subingest::utils::url::url_decode;
///
/// let decoded = url_decode("Hello%20World%21");
/// assert_eq!(decoded, "Hello World!");
/// ```
pub fn url_decode(input: &str) -> String {
    urlencoding::decode(input)
        .map(|cow| cow.into_owned())
        .unwrap_or_else(|_| input.to_string())
}

/// Collect the query string of a parsed URL into a map.
///
/// Later duplicates overwrite earlier ones.
pub fn query_map(url: &Url) -> HashMap<String, String> {
    url.query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

/// Strip the brackets `url` keeps around IPv6 literals.
pub fn strip_brackets(host: &str) -> &str {
    host.strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host)
}

/// Bracket a host for use in an authority if it is an IPv6 literal.
pub fn format_host(host: &str) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("[{}]", host)
    } else {
        host.to_string()
    }
}

/// Check whether a line names a remote subscription feed.
pub fn is_valid_sub_url(line: &str) -> bool {
    let line = line.trim();
    if !line.starts_with("http://") && !line.starts_with("https://") {
        return false;
    }
    match Url::parse(line) {
        Ok(url) => url.host_str().map_or(false, |h| !h.is_empty()),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brackets() {
        assert_eq!(strip_brackets("[2001:db8::1]"), "2001:db8::1");
        assert_eq!(strip_brackets("example.com"), "example.com");
        assert_eq!(format_host("2001:db8::1"), "[2001:db8::1]");
        assert_eq!(format_host("[2001:db8::1]"), "[2001:db8::1]");
        assert_eq!(format_host("10.0.0.1"), "10.0.0.1");
    }

    #[test]
    fn test_is_valid_sub_url() {
        assert!(is_valid_sub_url("https://feed.example/sub?token=1#Mine"));
        assert!(is_valid_sub_url("http://10.0.0.1:8081/configs"));
        assert!(!is_valid_sub_url("vless://id@host:443"));
        assert!(!is_valid_sub_url("https://"));
        assert!(!is_valid_sub_url("not a url"));
    }

    #[test]
    fn test_query_map() {
        let url = Url::parse("vless://id@host:443?type=ws&path=%2Fws&sni=a.example").unwrap();
        let params = query_map(&url);
        assert_eq!(params.get("type").map(String::as_str), Some("ws"));
        assert_eq!(params.get("path").map(String::as_str), Some("/ws"));
        assert_eq!(params.get("sni").map(String::as_str), Some("a.example"));
    }
}
