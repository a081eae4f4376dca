//! Core functionality for the LatticeSync federation system.
//!
//! This crate provides the fundamental utilities used across the
//! LatticeSync ecosystem: content hashing, canonical JSON serialization,
//! error types, and logging initialization.

pub mod canonical;
pub mod error;
pub mod hash;
pub mod logging;

pub use canonical::to_canonical_vec;
pub use error::{CoreError, CoreResult};
pub use hash::{digest_bytes, digest_canonical, digest_file};
