//! Manifest signing service.
//!
//! Produces the detached Ed25519 signatures that peers present when
//! registering a manifest. Signing always goes through the canonical JSON
//! form, so the verifier on the receiving side reconstructs the exact byte
//! sequence that was signed.
//!
//! Signatures are deterministic for the same key and payload. The signed
//! payload carries no nonce or timestamp, so an old signed manifest can be
//! replayed by anyone who captured it; the registry entry it refreshes is
//! bounded by the peer TTL.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use ed25519_dalek::{Signer, SigningKey, VerifyingKey, SECRET_KEY_LENGTH};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use zeroize::Zeroize;

use latticesync_core::to_canonical_vec;

/// A detached signature over a canonical manifest payload, in the base64
/// wire encoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetachedSignature {
    /// Base64 Ed25519 signature (64 bytes decoded)
    pub signature: String,
    /// Base64 Ed25519 public key (32 bytes decoded)
    pub pubkey: String,
}

/// Errors that can occur during signing operations.
#[derive(Debug, Error)]
pub enum SignerError {
    #[error("Invalid key length: {length} (expected 32)")]
    InvalidKeyLength { length: usize },

    #[error("Serialization error: {0}")]
    Serialization(#[from] latticesync_core::CoreError),
}

/// Signs this node's own manifest for registration with remote peers.
pub struct ManifestSigner {
    signing_key: SigningKey,
    key_id: String,
}

impl ManifestSigner {
    /// Create a signer with a freshly generated key.
    ///
    /// For production use, keys should be loaded from secure storage.
    pub fn generate() -> Self {
        use rand::RngCore;
        let mut secret_bytes = [0u8; SECRET_KEY_LENGTH];
        rand::thread_rng().fill_bytes(&mut secret_bytes);

        let signer = Self::from_key_array(secret_bytes);
        secret_bytes.zeroize();
        signer
    }

    /// Create a signer from existing private key bytes.
    ///
    /// # Security
    /// The caller's key bytes are copied; the internal copy is zeroized
    /// after the signing key is constructed.
    pub fn from_key(key_bytes: &[u8]) -> Result<Self, SignerError> {
        if key_bytes.len() != SECRET_KEY_LENGTH {
            return Err(SignerError::InvalidKeyLength {
                length: key_bytes.len(),
            });
        }

        let mut key_array = [0u8; SECRET_KEY_LENGTH];
        key_array.copy_from_slice(key_bytes);
        let signer = Self::from_key_array(key_array);
        key_array.zeroize();
        Ok(signer)
    }

    fn from_key_array(key_array: [u8; SECRET_KEY_LENGTH]) -> Self {
        let signing_key = SigningKey::from_bytes(&key_array);
        let key_id = Self::generate_key_id(&signing_key.verifying_key());
        Self {
            signing_key,
            key_id,
        }
    }

    /// Generates a stable public key identifier from a verifying key.
    fn generate_key_id(verifying_key: &VerifyingKey) -> String {
        let hash = blake3::hash(verifying_key.as_bytes());
        hex::encode(&hash.as_bytes()[..16])
    }

    /// Raw public key bytes for this signer.
    pub fn public_key(&self) -> Vec<u8> {
        self.signing_key.verifying_key().to_bytes().to_vec()
    }

    /// Base64 public key in the wire encoding.
    pub fn public_key_b64(&self) -> String {
        BASE64.encode(self.signing_key.verifying_key().to_bytes())
    }

    /// Stable short identifier for this signer's public key.
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Sign the canonical serialization of a manifest value.
    ///
    /// The value is canonicalized (sorted keys) before signing, so the
    /// signature verifies against any re-serialization of the same
    /// manifest contents.
    pub fn sign_canonical(&self, manifest: &Value) -> Result<DetachedSignature, SignerError> {
        let payload = to_canonical_vec(manifest)?;
        Ok(self.sign_payload(&payload))
    }

    /// Sign raw payload bytes the caller already canonicalized.
    pub fn sign_payload(&self, payload: &[u8]) -> DetachedSignature {
        let signature = self.signing_key.sign(payload);
        DetachedSignature {
            signature: BASE64.encode(signature.to_bytes()),
            pubkey: self.public_key_b64(),
        }
    }
}
