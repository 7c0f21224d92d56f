use base64::{
    alphabet,
    engine::{general_purpose, DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine as _,
};

/// Padding optional, stray trailing bits tolerated.
const LENIENT: GeneralPurposeConfig = GeneralPurposeConfig::new()
    .with_decode_padding_mode(DecodePaddingMode::Indifferent)
    .with_decode_allow_trailing_bits(true);

const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);

/// Encodes a string to Base64 format.
pub fn base64_encode(input: &str) -> String {
    general_purpose::STANDARD.encode(input)
}

/// Encodes raw bytes to Base64 format.
pub fn base64_encode_bytes(input: &[u8]) -> String {
    general_purpose::STANDARD.encode(input)
}

/// Encodes a string to URL-safe Base64 format without padding.
pub fn url_safe_base64_encode(input: &str) -> String {
    general_purpose::URL_SAFE_NO_PAD.encode(input)
}

/// Decodes Base64 to raw bytes.
///
/// Accepts the standard and the URL-safe alphabet, with or without padding.
/// Whitespace anywhere in the input (line-wrapped feeds) is ignored.
///
/// # Returns
/// `None` if the input is empty or not Base64 in either alphabet.
pub fn base64_decode_bytes(input: &str) -> Option<Vec<u8>> {
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return None;
    }

    STANDARD_LENIENT
        .decode(&compact)
        .or_else(|_| URL_SAFE_LENIENT.decode(&compact))
        .ok()
}

/// Decodes a Base64 string to UTF-8 text.
///
/// # Returns
/// `None` if the input is not Base64 or the decoded bytes are not valid UTF-8.
pub fn base64_decode(input: &str) -> Option<String> {
    base64_decode_bytes(input).and_then(|bytes| String::from_utf8(bytes).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_with_and_without_padding() {
        assert_eq!(base64_decode("YWJjZA==").as_deref(), Some("abcd"));
        assert_eq!(base64_decode("YWJjZA").as_deref(), Some("abcd"));
    }

    #[test]
    fn test_decode_url_safe_alphabet() {
        // "??>" encodes to "Pz8+" in the standard alphabet
        assert_eq!(base64_decode("Pz8-").as_deref(), Some("??>"));
        assert_eq!(base64_decode("Pz8+").as_deref(), Some("??>"));
    }

    #[test]
    fn test_decode_ignores_line_breaks() {
        let wrapped = "dm1lc3M6Ly9h\nYmMKdmxlc3M6\r\nLy9kZWY=";
        assert_eq!(
            base64_decode(wrapped).as_deref(),
            Some("vmess://abc\nvless://def")
        );
    }

    #[test]
    fn test_decode_rejects_plain_links() {
        assert_eq!(base64_decode("vless://uuid@host:443"), None);
        assert_eq!(base64_decode("   "), None);
    }

    #[test]
    fn test_url_safe_encode_has_no_padding() {
        let encoded = url_safe_base64_encode("aes-256-gcm:p");
        assert!(!encoded.contains('='));
        assert_eq!(base64_decode(&encoded).as_deref(), Some("aes-256-gcm:p"));
    }
}
