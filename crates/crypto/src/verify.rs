//! Detached Ed25519 signature verification.
//!
//! This is the trust boundary against forged membership claims. Every
//! input here comes from an untrusted peer, so nothing in this module
//! panics or returns an error past its boundary: malformed base64, a key
//! of the wrong length, a key that is not a valid curve point, a signature
//! of the wrong length, and a well-formed signature that simply does not
//! verify all yield `false` identically.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use ed25519_dalek::{Signature, VerifyingKey, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH};

/// Verify a detached Ed25519 signature over `payload` raw bytes.
///
/// Returns `true` only if `public_key` decodes to a valid verifying key
/// and `signature` is a valid signature by that key over exactly
/// `payload`. No side effects, no network, deterministic.
pub fn verify_detached(payload: &[u8], signature: &[u8], public_key: &[u8]) -> bool {
    let key_bytes: [u8; PUBLIC_KEY_LENGTH] = match public_key.try_into() {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };
    let verifying_key = match VerifyingKey::from_bytes(&key_bytes) {
        Ok(key) => key,
        Err(_) => return false,
    };

    let sig_bytes: [u8; SIGNATURE_LENGTH] = match signature.try_into() {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };
    let signature = Signature::from_bytes(&sig_bytes);

    // verify_strict rejects the malleable/small-order edge cases that
    // plain verify tolerates.
    verifying_key.verify_strict(payload, &signature).is_ok()
}

/// Verify a detached signature whose signature and key arrive as base64
/// strings, the encoding used on the wire.
///
/// Decode failures are indistinguishable from failed verification.
pub fn verify_detached_b64(payload: &[u8], signature_b64: &str, public_key_b64: &str) -> bool {
    let signature = match BASE64.decode(signature_b64) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };
    let public_key = match BASE64.decode(public_key_b64) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };

    verify_detached(payload, &signature, &public_key)
}
