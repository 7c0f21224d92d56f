//! Subscription response envelopes
//!
//! A feed may deliver its descriptor batch in plain text, inside an
//! AES-256 encrypted JSON envelope, or as an Ed25519 signed payload. Each
//! strategy below is a pure `&str -> Option<String>` attempt. [`EnvelopeDecoder`]
//! runs them in a fixed priority order and stops at the first success.

use log::{debug, warn};
use serde_json::Value;

use super::cipher::{cbc_open, gcm_open, CBC_IV_SIZE, GCM_TAG_SIZE};
use super::signature::verify_ed25519;
use crate::utils::base64::base64_decode_bytes;

/// Nonce lengths tried for the `enc` envelope, in order
const GCM_NONCE_SIZES: [usize; 2] = [12, 16];

/// Smallest `enc` blob worth trying (12 byte nonce + 16 byte tag)
const MIN_ENC_SIZE: usize = 28;

/// Keys scanned, in order, by the extraction fallback
const EXTRACT_KEYS: [&str; 6] = ["payload", "configs", "data", "text", "content", "enc"];

/// Key material for the envelope strategies.
///
/// A missing key disables the strategy that needs it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvelopeKeys {
    pub enc_key: Option<[u8; 32]>,
    pub verify_key: Option<[u8; 32]>,
}

impl EnvelopeKeys {
    /// Build keys from their base64 text form.
    ///
    /// Empty strings leave the key unset. Values that do not decode to
    /// exactly 32 bytes are logged and ignored.
    pub fn from_base64(enc_key: &str, verify_key: &str) -> Self {
        EnvelopeKeys {
            enc_key: decode_key("enc_key", enc_key),
            verify_key: decode_key("verify_key", verify_key),
        }
    }
}

fn decode_key(name: &str, value: &str) -> Option<[u8; 32]> {
    if value.trim().is_empty() {
        return None;
    }
    let key = base64_decode_bytes(value).and_then(|bytes| <[u8; 32]>::try_from(bytes).ok());
    if key.is_none() {
        warn!("Ignoring {}: expected base64 of 32 bytes", name);
    }
    key
}

/// Which strategy recovered the text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadSource {
    /// Authenticated decryption or CBC decryption succeeded
    Encrypted,
    /// Ed25519 signature verified
    Signed,
    /// A string field was lifted out of the JSON without any crypto
    Extracted,
}

/// Text recovered from a subscription response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recovered {
    pub text: String,
    pub source: PayloadSource,
}

/// Parse `text` as a JSON object if it looks like one.
fn parse_json_object(text: &str) -> Option<Value> {
    let trimmed = text.trim_start();
    if !trimmed.starts_with('{') {
        return None;
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) if value.is_object() => Some(value),
        Ok(_) => None,
        Err(e) => {
            debug!("Envelope is not valid JSON: {}", e);
            None
        }
    }
}

fn non_blank_str<'a>(json: &'a Value, key: &str) -> Option<&'a str> {
    json.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

fn into_text(bytes: Vec<u8>) -> Option<String> {
    String::from_utf8(bytes).ok()
}

/// Decrypt an AES-256 envelope.
///
/// Accepts `{"enc": base64(nonce || ciphertext || tag)}` (GCM with a 12 then
/// 16 byte nonce, then CBC with a 16 byte IV prefix), or, when `enc` is
/// absent, the split form `{"iv"|"nonce", "ciphertext"|"data", "tag"?}`.
pub fn try_decrypt_encrypted_payload(json_text: &str, key: &[u8; 32]) -> Option<String> {
    let json = parse_json_object(json_text)?;

    if let Some(enc) = non_blank_str(&json, "enc") {
        let enc = base64_decode_bytes(enc)?;
        if enc.len() < MIN_ENC_SIZE {
            debug!("Encrypted envelope too short: {} bytes", enc.len());
            return None;
        }

        for nonce_size in GCM_NONCE_SIZES {
            if enc.len() <= nonce_size + GCM_TAG_SIZE {
                continue;
            }
            let (nonce, sealed) = enc.split_at(nonce_size);
            if let Some(text) = gcm_open(key, nonce, sealed).and_then(into_text) {
                return Some(text);
            }
            debug!("AES-GCM open failed with {} byte nonce", nonce_size);
        }

        if enc.len() > CBC_IV_SIZE {
            let (iv, ciphertext) = enc.split_at(CBC_IV_SIZE);
            if let Some(text) = cbc_open(key, iv, ciphertext).and_then(into_text) {
                return Some(text);
            }
            debug!("AES-CBC fallback failed");
        }

        return None;
    }

    let iv = non_blank_str(&json, "iv").or_else(|| non_blank_str(&json, "nonce"))?;
    let data = non_blank_str(&json, "ciphertext").or_else(|| non_blank_str(&json, "data"))?;
    let tag = non_blank_str(&json, "tag");

    let iv = base64_decode_bytes(iv)?;
    let ciphertext = base64_decode_bytes(data)?;
    let cipher_and_tag = match tag {
        Some(tag) => {
            let mut joined = ciphertext.clone();
            joined.extend_from_slice(&base64_decode_bytes(tag)?);
            joined
        }
        None => ciphertext.clone(),
    };

    if let Some(text) = gcm_open(key, &iv, &cipher_and_tag).and_then(into_text) {
        return Some(text);
    }
    debug!("AES-GCM open failed for split-field envelope");

    if tag.is_none() && iv.len() == CBC_IV_SIZE {
        if let Some(text) = cbc_open(key, &iv, &ciphertext).and_then(into_text) {
            return Some(text);
        }
        debug!("AES-CBC fallback failed for split-field envelope");
    }

    None
}

/// Verify a `{"payload": base64, "signature": base64}` envelope.
pub fn try_decode_signed_payload(json_text: &str, public_key: &[u8; 32]) -> Option<String> {
    let json = parse_json_object(json_text)?;
    let payload = base64_decode_bytes(non_blank_str(&json, "payload")?)?;
    let signature = base64_decode_bytes(non_blank_str(&json, "signature")?)?;

    if !verify_ed25519(&payload, &signature, public_key) {
        warn!("Signed payload verification failed");
        return None;
    }

    into_text(payload)
}

/// Return the first non-blank string among the well-known payload keys.
///
/// No decryption or verification happens here.
pub fn try_extract_payload(json_text: &str) -> Option<String> {
    let json = parse_json_object(json_text)?;
    EXTRACT_KEYS
        .iter()
        .find_map(|key| non_blank_str(&json, key))
        .map(str::to_string)
}

/// Runs the envelope strategies in priority order
#[derive(Debug, Clone, Default)]
pub struct EnvelopeDecoder {
    keys: EnvelopeKeys,
}

impl EnvelopeDecoder {
    pub fn new(keys: EnvelopeKeys) -> Self {
        EnvelopeDecoder { keys }
    }

    /// Recover plaintext from a response body.
    ///
    /// `None` means no structured strategy applied; the caller then falls
    /// back to the raw body.
    pub fn decode(&self, body: &str) -> Option<Recovered> {
        let encrypted = |text: &str| {
            self.keys
                .enc_key
                .as_ref()
                .and_then(|key| try_decrypt_encrypted_payload(text, key))
        };
        let signed = |text: &str| {
            self.keys
                .verify_key
                .as_ref()
                .and_then(|key| try_decode_signed_payload(text, key))
        };

        let attempts: [(PayloadSource, &dyn Fn(&str) -> Option<String>); 3] = [
            (PayloadSource::Encrypted, &encrypted),
            (PayloadSource::Signed, &signed),
            (PayloadSource::Extracted, &try_extract_payload),
        ];

        attempts.iter().find_map(|(source, attempt)| {
            attempt(body).map(|text| {
                debug!("Recovered subscription payload via {:?}", source);
                Recovered {
                    text,
                    source: *source,
                }
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::base64::base64_encode_bytes;
    use aes::Aes256;
    use aes_gcm::{
        aead::{
            consts::{U12, U16},
            Aead, KeyInit,
        },
        AesGcm, Nonce,
    };
    use cbc::cipher::{block_padding::Pkcs7, BlockEncryptMut, KeyIvInit};
    use ed25519_dalek::{Signer, SigningKey};

    const KEY: [u8; 32] = [42u8; 32];
    const PLAIN: &str = "vless://id@a.example:443#A\ntrojan://pw@b.example:443#B";

    fn gcm_envelope(key: &[u8; 32], plaintext: &str) -> String {
        let nonce = [9u8; 12];
        let sealed = AesGcm::<Aes256, U12>::new_from_slice(key)
            .unwrap()
            .encrypt(Nonce::<U12>::from_slice(&nonce), plaintext.as_bytes())
            .unwrap();
        let mut blob = nonce.to_vec();
        blob.extend_from_slice(&sealed);
        format!(r#"{{"enc":"{}"}}"#, base64_encode_bytes(&blob))
    }

    fn cbc_ciphertext(plaintext: &str, iv: &[u8; 16]) -> Vec<u8> {
        cbc::Encryptor::<Aes256>::new_from_slices(&KEY, iv)
            .unwrap()
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes())
    }

    #[test]
    fn test_enc_envelope_gcm() {
        let envelope = gcm_envelope(&KEY, PLAIN);
        assert_eq!(
            try_decrypt_encrypted_payload(&envelope, &KEY).as_deref(),
            Some(PLAIN)
        );
        assert_eq!(try_decrypt_encrypted_payload(&envelope, &[1u8; 32]), None);
    }

    #[test]
    fn test_enc_envelope_cbc_prefix() {
        let iv = [4u8; 16];
        let mut blob = iv.to_vec();
        blob.extend_from_slice(&cbc_ciphertext(PLAIN, &iv));
        let envelope = format!(r#"  {{"enc":"{}"}}"#, base64_encode_bytes(&blob));

        assert_eq!(
            try_decrypt_encrypted_payload(&envelope, &KEY).as_deref(),
            Some(PLAIN)
        );
    }

    #[test]
    fn test_enc_envelope_gcm_16_byte_nonce() {
        // the 12 byte split fails authentication before the 16 byte one is tried
        let nonce = [8u8; 16];
        let sealed = AesGcm::<Aes256, U16>::new_from_slice(&KEY)
            .unwrap()
            .encrypt(Nonce::<U16>::from_slice(&nonce), PLAIN.as_bytes())
            .unwrap();
        let mut blob = nonce.to_vec();
        blob.extend_from_slice(&sealed);
        let envelope = format!(r#"{{"enc":"{}"}}"#, base64_encode_bytes(&blob));

        assert_eq!(
            try_decrypt_encrypted_payload(&envelope, &KEY).as_deref(),
            Some(PLAIN)
        );
        assert_eq!(try_decrypt_encrypted_payload(&envelope, &[1u8; 32]), None);
    }

    #[test]
    fn test_split_field_gcm_tag_in_data() {
        let nonce = [2u8; 12];
        let sealed = AesGcm::<Aes256, U12>::new_from_slice(&KEY)
            .unwrap()
            .encrypt(Nonce::<U12>::from_slice(&nonce), PLAIN.as_bytes())
            .unwrap();
        let envelope = format!(
            r#"{{"nonce":"{}","data":"{}"}}"#,
            base64_encode_bytes(&nonce),
            base64_encode_bytes(&sealed)
        );

        assert_eq!(
            try_decrypt_encrypted_payload(&envelope, &KEY).as_deref(),
            Some(PLAIN)
        );
    }

    #[test]
    fn test_split_field_cbc() {
        let iv = [5u8; 16];
        let envelope = format!(
            r#"{{"iv":"{}","data":"{}"}}"#,
            base64_encode_bytes(&iv),
            base64_encode_bytes(&cbc_ciphertext(PLAIN, &iv))
        );

        assert_eq!(
            try_decrypt_encrypted_payload(&envelope, &KEY).as_deref(),
            Some(PLAIN)
        );
    }

    #[test]
    fn test_split_field_gcm_with_tag() {
        let nonce = [6u8; 12];
        let sealed = AesGcm::<Aes256, U12>::new_from_slice(&KEY)
            .unwrap()
            .encrypt(Nonce::<U12>::from_slice(&nonce), PLAIN.as_bytes())
            .unwrap();
        let (ciphertext, tag) = sealed.split_at(sealed.len() - 16);
        let envelope = format!(
            r#"{{"nonce":"{}","ciphertext":"{}","tag":"{}"}}"#,
            base64_encode_bytes(&nonce),
            base64_encode_bytes(ciphertext),
            base64_encode_bytes(tag)
        );

        assert_eq!(
            try_decrypt_encrypted_payload(&envelope, &KEY).as_deref(),
            Some(PLAIN)
        );
    }

    #[test]
    fn test_encrypted_rejects_non_json_and_short_blobs() {
        assert_eq!(try_decrypt_encrypted_payload(PLAIN, &KEY), None);
        assert_eq!(try_decrypt_encrypted_payload(r#"{"enc":"AAAA"}"#, &KEY), None);
        assert_eq!(try_decrypt_encrypted_payload("{not json", &KEY), None);
    }

    #[test]
    fn test_signed_payload() {
        let signing_key = SigningKey::from_bytes(&[3u8; 32]);
        let signature = signing_key.sign(PLAIN.as_bytes());
        let envelope = format!(
            r#"{{"payload":"{}","signature":"{}"}}"#,
            base64_encode_bytes(PLAIN.as_bytes()),
            base64_encode_bytes(&signature.to_bytes())
        );

        let public_key = signing_key.verifying_key().to_bytes();
        assert_eq!(
            try_decode_signed_payload(&envelope, &public_key).as_deref(),
            Some(PLAIN)
        );

        let other_key = SigningKey::from_bytes(&[4u8; 32]).verifying_key().to_bytes();
        assert_eq!(try_decode_signed_payload(&envelope, &other_key), None);
    }

    #[test]
    fn test_extract_payload_key_order() {
        assert_eq!(
            try_extract_payload(r#"{"text":"t","data":"  ","configs":"c"}"#).as_deref(),
            Some("c")
        );
        assert_eq!(try_extract_payload(r#"{"other":"x"}"#), None);
        assert_eq!(try_extract_payload(r#"{"payload":5}"#), None);
        assert_eq!(try_extract_payload("plain text"), None);
    }

    #[test]
    fn test_decoder_priority() {
        let decoder = EnvelopeDecoder::new(EnvelopeKeys {
            enc_key: Some(KEY),
            verify_key: None,
        });

        let recovered = decoder.decode(&gcm_envelope(&KEY, PLAIN)).unwrap();
        assert_eq!(recovered.text, PLAIN);
        assert_eq!(recovered.source, PayloadSource::Encrypted);

        // wrong key: the enc string itself is extracted as a last resort
        let foreign = gcm_envelope(&[1u8; 32], PLAIN);
        let recovered = decoder.decode(&foreign).unwrap();
        assert_eq!(recovered.source, PayloadSource::Extracted);
        assert_ne!(recovered.text, PLAIN);

        assert_eq!(decoder.decode(PLAIN), None);
    }

    #[test]
    fn test_decoder_without_keys_only_extracts() {
        let decoder = EnvelopeDecoder::default();
        let recovered = decoder.decode(&gcm_envelope(&KEY, PLAIN)).unwrap();
        assert_eq!(recovered.source, PayloadSource::Extracted);
    }

    #[test]
    fn test_keys_from_base64() {
        let encoded = base64_encode_bytes(&KEY);
        let keys = EnvelopeKeys::from_base64(&encoded, "");
        assert_eq!(keys.enc_key, Some(KEY));
        assert_eq!(keys.verify_key, None);

        let keys = EnvelopeKeys::from_base64("c2hvcnQ=", "not base64!");
        assert_eq!(keys, EnvelopeKeys::default());
    }
}
