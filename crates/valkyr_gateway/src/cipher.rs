//! Per-version AES encryption for dispatch payloads.
//!
//! Every supported game version has its own 256-bit key. Payloads
//! travel as `base64(nonce || ciphertext)` with a fresh random nonce
//! per message; AES-GCM authentication makes a wrong-key or tampered
//! payload fail cleanly instead of producing garbage plaintext.

use std::collections::HashMap;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::RngCore;

use crate::error::GatewayError;

const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32;

/// Holds the AES keys for every supported version and performs the
/// transport encoding in both directions.
pub struct DispatchCipher {
    keys: HashMap<u32, [u8; KEY_LEN]>,
}

impl DispatchCipher {
    /// Builds a cipher from hex-encoded 256-bit keys. Fails on any key
    /// that is not exactly 64 hex characters, so a typo in the hotfix
    /// file is caught at startup rather than at first request.
    pub fn from_hex_keys<'a, I>(keys: I) -> Result<Self, GatewayError>
    where
        I: IntoIterator<Item = (u32, &'a str)>,
    {
        let mut table = HashMap::new();
        for (version, hex_key) in keys {
            let raw = hex::decode(hex_key.trim()).map_err(|e| {
                GatewayError::Config(format!("AES key for version {version} is not hex: {e}"))
            })?;
            let key: [u8; KEY_LEN] = raw.try_into().map_err(|_| {
                GatewayError::Config(format!(
                    "AES key for version {version} must be {KEY_LEN} bytes"
                ))
            })?;
            table.insert(version, key);
        }
        Ok(Self { keys: table })
    }

    /// Returns true when a key is configured for the given version.
    pub fn has_key(&self, version: u32) -> bool {
        self.keys.contains_key(&version)
    }

    /// Encrypts a payload for the given version, returning the
    /// base64 transport form.
    pub fn encrypt(&self, version: u32, plaintext: &[u8]) -> Result<String, GatewayError> {
        let cipher = self.cipher_for(version)?;
        let mut nonce = [0u8; NONCE_LEN];
        rand::rngs::OsRng.fill_bytes(&mut nonce);
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext)
            .map_err(|_| GatewayError::Decrypt(version))?;
        let mut raw = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        raw.extend_from_slice(&nonce);
        raw.extend_from_slice(&ciphertext);
        Ok(BASE64.encode(raw))
    }

    /// Decrypts a base64 transport payload with the key for the given
    /// version. Fails with [`GatewayError::Decrypt`] on any corruption,
    /// truncation or key mismatch.
    pub fn decrypt(&self, version: u32, transport: &str) -> Result<Vec<u8>, GatewayError> {
        let cipher = self.cipher_for(version)?;
        let raw = BASE64
            .decode(transport.trim())
            .map_err(|_| GatewayError::Decrypt(version))?;
        if raw.len() < NONCE_LEN {
            return Err(GatewayError::Decrypt(version));
        }
        let (nonce, ciphertext) = raw.split_at(NONCE_LEN);
        cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| GatewayError::Decrypt(version))
    }

    fn cipher_for(&self, version: u32) -> Result<Aes256Gcm, GatewayError> {
        let key = self
            .keys
            .get(&version)
            .ok_or_else(|| GatewayError::UnsupportedVersion(version.to_string()))?;
        Aes256Gcm::new_from_slice(key)
            .map_err(|_| GatewayError::Config(format!("bad AES key for version {version}")))
    }
}
