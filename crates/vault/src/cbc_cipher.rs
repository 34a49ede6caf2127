//! AES-256-CBC + PKCS#7 scheme, used only for user-provided LLM/search API
//! keys (§4.1): "the distinction is historical but MUST be preserved so
//! pre-existing ciphertexts remain readable". Serialization (§6):
//! `hex(iv16) ":" hex(ciphertext)`.

use aes::Aes256;
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::RngCore;

use crate::error::{Result, VaultError};

type Encryptor = cbc::Encryptor<Aes256>;
type Decryptor = cbc::Decryptor<Aes256>;

const IV_LEN: usize = 16;

/// Encrypts `plaintext`, returning `hex(iv):hex(ciphertext)`.
pub fn encrypt(key: &[u8; 32], plaintext: &[u8]) -> Result<String> {
    let mut iv = [0u8; IV_LEN];
    rand::thread_rng().fill_bytes(&mut iv);

    let ciphertext = Encryptor::new(key.into(), &iv.into())
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    Ok(format!("{}:{}", hex::encode(iv), hex::encode(ciphertext)))
}

/// Decrypts a `hex(iv):hex(ciphertext)` string.
pub fn decrypt(key: &[u8; 32], serialized: &str) -> Result<Vec<u8>> {
    let mut parts = serialized.split(':');
    let (iv_hex, ct_hex) = match (parts.next(), parts.next(), parts.next()) {
        (Some(iv), Some(ct), None) => (iv, ct),
        _ => return Err(VaultError::CryptoInvalidFormat),
    };

    let iv = hex::decode(iv_hex)?;
    let ciphertext = hex::decode(ct_hex)?;

    if iv.len() != IV_LEN {
        return Err(VaultError::CryptoInvalidFormat);
    }

    Decryptor::new(key.into(), iv.as_slice().into())
        .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
        .map_err(|_| VaultError::CryptoAuthFail)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> [u8; 32] {
        [3u8; 32]
    }

    #[test]
    fn round_trip() {
        let ct = encrypt(&key(), b"sk-my-api-key").unwrap();
        assert_eq!(decrypt(&key(), &ct).unwrap(), b"sk-my-api-key");
    }

    #[test]
    fn serialization_has_two_colon_parts() {
        let ct = encrypt(&key(), b"payload").unwrap();
        assert_eq!(ct.split(':').count(), 2);
    }

    #[test]
    fn missing_part_is_invalid_format() {
        let err = decrypt(&key(), "onlyonepart").unwrap_err();
        assert!(matches!(err, VaultError::CryptoInvalidFormat));
    }

    #[test]
    fn tampered_ciphertext_fails_padding_check() {
        let ct = encrypt(&key(), b"0123456789abcdef").unwrap();
        let mut parts: Vec<String> = ct.split(':').map(String::from).collect();
        let mut bytes = hex::decode(&parts[1]).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        parts[1] = hex::encode(bytes);
        let tampered = parts.join(":");
        assert!(decrypt(&key(), &tampered).is_err());
    }

    #[test]
    fn different_ivs_produce_different_ciphertexts() {
        let a = encrypt(&key(), b"same-value").unwrap();
        let b = encrypt(&key(), b"same-value").unwrap();
        assert_ne!(a, b);
    }
}
