//! C1 Crypto Vault: the single entry point the rest of the core uses for
//! credential encryption. Holds three independently-derived keys (§9: "expose
//! all three as named secrets rather than folding them") and picks the
//! cipher scheme that matches the caller's intent, never generically.

use zeroize::Zeroizing;

use crate::cbc_cipher;
use crate::error::Result;
use crate::gcm;
use crate::kdf::derive_key;
use crate::mask::mask_api_key;
use crate::secret::{ApiKeySecret, EncryptionKeySecret, SessionSecret};

/// Encrypts/decrypts credentials using the three named secrets from §6.
///
/// `encrypted_credential`/`encrypted_backup_secret` use AES-256-GCM;
/// `encrypted_api_key` uses AES-256-CBC+PKCS7, preserved for backward
/// compatibility with pre-existing ciphertexts (§4.1).
pub struct Vault {
    session_key: Zeroizing<[u8; 32]>,
    api_key_key: Zeroizing<[u8; 32]>,
    encryption_key_key: Zeroizing<[u8; 32]>,
}

impl Vault {
    pub fn new(
        session: &SessionSecret,
        api_key: &ApiKeySecret,
        encryption_key: &EncryptionKeySecret,
    ) -> Result<Self> {
        Ok(Self {
            session_key: derive_key(&session.0)?,
            api_key_key: derive_key(&api_key.0)?,
            encryption_key_key: derive_key(&encryption_key.0)?,
        })
    }

    /// Encrypts a `Server.encryptedCredential` value (SSH password or
    /// private key). GCM, keyed from `SESSION_SECRET`.
    pub fn encrypt_credential(&self, plaintext: &str) -> Result<String> {
        gcm::encrypt(&self.session_key, plaintext.as_bytes())
    }

    /// Decrypts a `Server.encryptedCredential` value. Callers must hold the
    /// result only for the duration of the SSH connect attempt (§3, §5).
    pub fn decrypt_credential(&self, ciphertext: &str) -> Result<Zeroizing<String>> {
        let bytes = gcm::decrypt(&self.session_key, ciphertext)?;
        Ok(Zeroizing::new(String::from_utf8_lossy(&bytes).into_owned()))
    }

    /// Encrypts a user-provided LLM/search API key. CBC+PKCS7, keyed from
    /// `API_KEY_ENCRYPTION_SECRET`.
    pub fn encrypt_api_key(&self, plaintext: &str) -> Result<String> {
        cbc_cipher::encrypt(&self.api_key_key, plaintext.as_bytes())
    }

    pub fn decrypt_api_key(&self, ciphertext: &str) -> Result<Zeroizing<String>> {
        let bytes = cbc_cipher::decrypt(&self.api_key_key, ciphertext)?;
        Ok(Zeroizing::new(String::from_utf8_lossy(&bytes).into_owned()))
    }

    /// Encrypts a `BackupConfig` secret (password, access key, ...). GCM,
    /// keyed from `ENCRYPTION_KEY` — deliberately distinct from
    /// `SESSION_SECRET` (§6, §9).
    pub fn encrypt_backup_secret(&self, plaintext: &str) -> Result<String> {
        gcm::encrypt(&self.encryption_key_key, plaintext.as_bytes())
    }

    pub fn decrypt_backup_secret(&self, ciphertext: &str) -> Result<Zeroizing<String>> {
        let bytes = gcm::decrypt(&self.encryption_key_key, ciphertext)?;
        Ok(Zeroizing::new(String::from_utf8_lossy(&bytes).into_owned()))
    }

    /// Display-safe masking of a plaintext API key; never logs the full
    /// value (§4.1).
    #[must_use]
    pub fn mask_api_key(plaintext: &str) -> String {
        mask_api_key(plaintext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vault() -> Vault {
        Vault::new(
            &SessionSecret::new("test-session-secret"),
            &ApiKeySecret::new("test-api-key-secret"),
            &EncryptionKeySecret::new("test-encryption-key-secret"),
        )
        .unwrap()
    }

    #[test]
    fn credential_round_trip() {
        let v = vault();
        let ct = v.encrypt_credential("p@ssw0rd").unwrap();
        assert_eq!(*v.decrypt_credential(&ct).unwrap(), "p@ssw0rd");
    }

    #[test]
    fn api_key_round_trip_uses_cbc_format() {
        let v = vault();
        let ct = v.encrypt_api_key("sk-ant-abc123").unwrap();
        assert_eq!(ct.split(':').count(), 2, "CBC serialization is iv:ciphertext");
        assert_eq!(*v.decrypt_api_key(&ct).unwrap(), "sk-ant-abc123");
    }

    #[test]
    fn backup_secret_round_trip_uses_gcm_format() {
        let v = vault();
        let ct = v.encrypt_backup_secret("restic-repo-password").unwrap();
        assert_eq!(ct.split(':').count(), 3, "GCM serialization is iv:tag:ciphertext");
        assert_eq!(*v.decrypt_backup_secret(&ct).unwrap(), "restic-repo-password");
    }

    #[test]
    fn distinct_secrets_yield_distinct_keys_for_same_plaintext() {
        let v = vault();
        let credential_ct = v.encrypt_credential("same-value").unwrap();
        let backup_ct = v.encrypt_backup_secret("same-value").unwrap();
        // Different keys + random IVs: ciphertexts never coincide, and a
        // credential ciphertext must not decrypt under the backup key.
        assert_ne!(credential_ct, backup_ct);
        assert!(gcm::decrypt(&v.encryption_key_key, &credential_ct).is_err());
    }

    #[test]
    fn api_key_ciphertext_is_not_readable_by_credential_key() {
        let v = vault();
        let ct = v.encrypt_api_key("sk-test").unwrap();
        // Different cipher (CBC vs GCM) and different key: must not parse.
        assert!(gcm::decrypt(&v.session_key, &ct).is_err());
    }
}
