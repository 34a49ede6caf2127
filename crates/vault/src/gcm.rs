//! AES-256-GCM scheme used for `Server.encryptedCredential` and backup
//! secrets (§4.1, §6 "Vault serialization"). Serialization:
//! `hex(iv12) ":" hex(tag16) ":" hex(ciphertext)`.

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use rand::RngCore;

use crate::error::{Result, VaultError};

const IV_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// Encrypts `plaintext` with a random 96-bit IV, returning
/// `hex(iv):hex(tag):hex(ciphertext)`.
pub fn encrypt(key: &[u8; 32], plaintext: &[u8]) -> Result<String> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));

    let mut iv_bytes = [0u8; IV_LEN];
    rand::thread_rng().fill_bytes(&mut iv_bytes);
    let nonce = Nonce::from_slice(&iv_bytes);

    let mut sealed = cipher
        .encrypt(
            nonce,
            Payload {
                msg: plaintext,
                aad: &[],
            },
        )
        .map_err(|_| VaultError::CryptoAuthFail)?;

    // `aes_gcm` appends the tag to the end of the ciphertext; split it back
    // out so the wire format keeps iv/tag/ciphertext as three distinct parts.
    let tag = sealed.split_off(sealed.len() - TAG_LEN);

    Ok(format!(
        "{}:{}:{}",
        hex::encode(iv_bytes),
        hex::encode(tag),
        hex::encode(sealed)
    ))
}

/// Decrypts a `hex(iv):hex(tag):hex(ciphertext)` string.
pub fn decrypt(key: &[u8; 32], serialized: &str) -> Result<Vec<u8>> {
    let mut parts = serialized.split(':');
    let (iv_hex, tag_hex, ct_hex) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(iv), Some(tag), Some(ct), None) => (iv, tag, ct),
        _ => return Err(VaultError::CryptoInvalidFormat),
    };

    let iv = hex::decode(iv_hex)?;
    let tag = hex::decode(tag_hex)?;
    let ciphertext = hex::decode(ct_hex)?;

    if iv.len() != IV_LEN || tag.len() != TAG_LEN {
        return Err(VaultError::CryptoInvalidFormat);
    }

    let mut sealed = ciphertext;
    sealed.extend_from_slice(&tag);

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let nonce = Nonce::from_slice(&iv);

    cipher
        .decrypt(
            nonce,
            Payload {
                msg: &sealed,
                aad: &[],
            },
        )
        .map_err(|_| VaultError::CryptoAuthFail)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> [u8; 32] {
        [7u8; 32]
    }

    #[test]
    fn round_trip() {
        let ct = encrypt(&key(), b"hunter2").unwrap();
        assert_eq!(decrypt(&key(), &ct).unwrap(), b"hunter2");
    }

    #[test]
    fn serialization_has_three_colon_parts() {
        let ct = encrypt(&key(), b"payload").unwrap();
        assert_eq!(ct.split(':').count(), 3);
    }

    #[test]
    fn missing_part_is_invalid_format() {
        let err = decrypt(&key(), "aa:bb").unwrap_err();
        assert!(matches!(err, VaultError::CryptoInvalidFormat));
    }

    #[test]
    fn tampered_tag_fails_auth() {
        let ct = encrypt(&key(), b"payload").unwrap();
        let mut parts: Vec<&str> = ct.split(':').collect();
        let bad_tag = "00".repeat(TAG_LEN);
        parts[1] = &bad_tag;
        let tampered = parts.join(":");
        let err = decrypt(&key(), &tampered).unwrap_err();
        assert!(matches!(err, VaultError::CryptoAuthFail));
    }

    #[test]
    fn tampered_ciphertext_fails_auth() {
        let ct = encrypt(&key(), b"payload").unwrap();
        let mut parts: Vec<String> = ct.split(':').map(String::from).collect();
        let mut bytes = hex::decode(&parts[2]).unwrap();
        bytes[0] ^= 0xff;
        parts[2] = hex::encode(bytes);
        let tampered = parts.join(":");
        let err = decrypt(&key(), &tampered).unwrap_err();
        assert!(matches!(err, VaultError::CryptoAuthFail));
    }

    #[test]
    fn wrong_key_fails() {
        let ct = encrypt(&key(), b"payload").unwrap();
        let err = decrypt(&[9u8; 32], &ct).unwrap_err();
        assert!(matches!(err, VaultError::CryptoAuthFail));
    }

    #[test]
    fn different_nonces_produce_different_ciphertexts() {
        let a = encrypt(&key(), b"same").unwrap();
        let b = encrypt(&key(), b"same").unwrap();
        assert_ne!(a, b);
    }
}
