//! Content hashing for lattice nodes and manifest payloads.
//!
//! All content addressing in LatticeSync uses BLAKE3 digests rendered as
//! lowercase hex. Hash equality implies content equality; there is no
//! separate version counter anywhere in the protocol.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use blake3::Hasher;
use serde_json::Value;

use crate::canonical::to_canonical_vec;
use crate::error::CoreResult;

/// Read buffer size for streaming file digests.
const FILE_CHUNK_SIZE: usize = 64 * 1024;

/// Compute the hex BLAKE3 digest of a byte slice.
pub fn digest_bytes(data: &[u8]) -> String {
    hex::encode(blake3::hash(data).as_bytes())
}

/// Compute the hex BLAKE3 digest of a file's contents.
///
/// Reads the file in bounded chunks so arbitrarily large files never get
/// pulled into memory at once.
pub fn digest_file<P: AsRef<Path>>(path: P) -> CoreResult<String> {
    let mut file = File::open(path)?;
    let mut hasher = Hasher::new();
    let mut buffer = [0u8; FILE_CHUNK_SIZE];

    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(hex::encode(hasher.finalize().as_bytes()))
}

/// Compute the hex BLAKE3 digest of a JSON value's canonical serialization.
///
/// Used for lattice node content hashes, so two nodes holding the same
/// content under different key orderings produce identical hashes.
pub fn digest_canonical(value: &Value) -> CoreResult<String> {
    let bytes = to_canonical_vec(value)?;
    Ok(digest_bytes(&bytes))
}
