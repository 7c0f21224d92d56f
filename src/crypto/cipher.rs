//! AES-256 primitives used by subscription envelopes
//!
//! Both openers return `None` on any failure: wrong key length, wrong nonce
//! length, failed authentication or bad padding.

use aes::Aes256;
use aes_gcm::{
    aead::{
        consts::{U12, U16},
        Aead, KeyInit,
    },
    AesGcm, Nonce,
};
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, KeyIvInit};

/// Authentication tag size appended to every GCM ciphertext
pub const GCM_TAG_SIZE: usize = 16;

/// IV size for AES-CBC
pub const CBC_IV_SIZE: usize = 16;

type Aes256Gcm12 = AesGcm<Aes256, U12>;
type Aes256Gcm16 = AesGcm<Aes256, U16>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Open an AES-256-GCM `ciphertext || tag` with a 12 or 16 byte nonce.
pub fn gcm_open(key: &[u8], nonce: &[u8], cipher_and_tag: &[u8]) -> Option<Vec<u8>> {
    let opened = match nonce.len() {
        12 => Aes256Gcm12::new_from_slice(key)
            .ok()?
            .decrypt(Nonce::<U12>::from_slice(nonce), cipher_and_tag),
        16 => Aes256Gcm16::new_from_slice(key)
            .ok()?
            .decrypt(Nonce::<U16>::from_slice(nonce), cipher_and_tag),
        _ => return None,
    };
    opened.ok()
}

/// Decrypt AES-256-CBC with PKCS#7 padding.
pub fn cbc_open(key: &[u8], iv: &[u8], ciphertext: &[u8]) -> Option<Vec<u8>> {
    let decryptor = Aes256CbcDec::new_from_slices(key, iv).ok()?;
    decryptor.decrypt_padded_vec_mut::<Pkcs7>(ciphertext).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cbc::cipher::BlockEncryptMut;

    const KEY: [u8; 32] = [7u8; 32];

    #[test]
    fn test_gcm_open_both_nonce_sizes() {
        let sealed = Aes256Gcm12::new_from_slice(&KEY)
            .unwrap()
            .encrypt(Nonce::<U12>::from_slice(&[1u8; 12]), b"hello".as_ref())
            .unwrap();
        assert_eq!(gcm_open(&KEY, &[1u8; 12], &sealed).unwrap(), b"hello");

        let sealed = Aes256Gcm16::new_from_slice(&KEY)
            .unwrap()
            .encrypt(Nonce::<U16>::from_slice(&[2u8; 16]), b"world".as_ref())
            .unwrap();
        assert_eq!(gcm_open(&KEY, &[2u8; 16], &sealed).unwrap(), b"world");
    }

    #[test]
    fn test_gcm_open_rejects_wrong_key_and_nonce() {
        let sealed = Aes256Gcm12::new_from_slice(&KEY)
            .unwrap()
            .encrypt(Nonce::<U12>::from_slice(&[1u8; 12]), b"hello".as_ref())
            .unwrap();

        assert!(gcm_open(&[8u8; 32], &[1u8; 12], &sealed).is_none());
        assert!(gcm_open(&KEY, &[1u8; 16], &sealed).is_none());
        assert!(gcm_open(&KEY, &[1u8; 8], &sealed).is_none());
        assert!(gcm_open(&KEY[..16], &[1u8; 12], &sealed).is_none());
    }

    #[test]
    fn test_cbc_open() {
        let iv = [3u8; CBC_IV_SIZE];
        let ciphertext = cbc::Encryptor::<Aes256>::new_from_slices(&KEY, &iv)
            .unwrap()
            .encrypt_padded_vec_mut::<Pkcs7>(b"vless://id@host:443");

        assert_eq!(
            cbc_open(&KEY, &iv, &ciphertext).unwrap(),
            b"vless://id@host:443"
        );
        assert!(cbc_open(&KEY, &iv[..8], &ciphertext).is_none());
    }
}
