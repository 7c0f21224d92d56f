//! Crypto fallback decoder for subscription responses

pub mod cipher;
pub mod envelope;
pub mod signature;

pub use envelope::{
    try_decode_signed_payload, try_decrypt_encrypted_payload, try_extract_payload,
    EnvelopeDecoder, EnvelopeKeys, PayloadSource, Recovered,
};
