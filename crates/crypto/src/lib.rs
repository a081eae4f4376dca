//! Cryptographic primitives for LatticeSync federation.
//!
//! Two halves of the manifest trust boundary live here:
//!
//! - **Verification** ([`verify`]): validating detached Ed25519 signatures
//!   over canonical manifest payloads supplied by untrusted peers.
//! - **Signing** ([`signer`]): producing those signatures for this node's
//!   own manifest.
//!
//! Signature verification authenticates the manifest claim, not the
//! transport channel. There is no nonce or timestamp binding, so replay of
//! an old validly-signed manifest is accepted; see `ManifestSigner` docs.

pub mod signer;
pub mod verify;

pub use signer::{DetachedSignature, ManifestSigner, SignerError};
pub use verify::{verify_detached, verify_detached_b64};
