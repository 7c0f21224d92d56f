use ed25519_dalek::{Signature, Verifier, VerifyingKey};

/// Ed25519 public key size
pub const PUBLIC_KEY_SIZE: usize = 32;

/// Verify an Ed25519 signature over `payload`.
///
/// Malformed keys or signatures count as a failed verification.
pub fn verify_ed25519(payload: &[u8], signature: &[u8], public_key: &[u8]) -> bool {
    let Ok(key_bytes) = <[u8; PUBLIC_KEY_SIZE]>::try_from(public_key) else {
        return false;
    };
    let Ok(verifying_key) = VerifyingKey::from_bytes(&key_bytes) else {
        return false;
    };
    let Ok(signature) = Signature::from_slice(signature) else {
        return false;
    };

    verifying_key.verify(payload, &signature).is_ok()
}
