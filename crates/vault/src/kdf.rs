//! Key derivation (§4.1): "derived from a process-wide secret via scrypt
//! with a fixed application salt".

use scrypt::Params;
use zeroize::Zeroizing;

use crate::error::{Result, VaultError};

/// Fixed, non-secret application salt. Per §4.1 every derived key for a given
/// named secret is the same key every process start — the secret itself,
/// not the salt, is what must stay confidential.
const APP_SALT: &[u8] = b"vps-agent-v1-fixed-scrypt-salt";

const KEY_LEN: usize = 32;

/// Derives a 32-byte key from `secret` using scrypt with the fixed
/// application salt.
pub fn derive_key(secret: &str) -> Result<Zeroizing<[u8; 32]>> {
    let params =
        Params::recommended();
    let mut output = [0u8; KEY_LEN];
    scrypt::scrypt(secret.as_bytes(), APP_SALT, &params, &mut output)
        .map_err(|_| VaultError::MissingSecret("scrypt output buffer".into()))?;
    Ok(Zeroizing::new(output))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_secret_derives_same_key() {
        let a = derive_key("secret-a").unwrap();
        let b = derive_key("secret-a").unwrap();
        assert_eq!(*a, *b);
    }

    #[test]
    fn different_secrets_derive_different_keys() {
        let a = derive_key("secret-a").unwrap();
        let b = derive_key("secret-b").unwrap();
        assert_ne!(*a, *b);
    }
}
