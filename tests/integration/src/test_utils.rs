//! Test utilities for federation integration tests

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::{json, Value};

use latticesync_crypto::ManifestSigner;
use latticesync_federation::{
    LatticeNode, Manifest, ManifestStore, RegisterManifestRequest,
};

/// Get current timestamp in milliseconds
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64
}

/// Fresh per-test directory under the system temp dir.
pub fn temp_data_dir(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!("lattice_{}_{}", label, uuid::Uuid::new_v4()))
}

/// Test fixture for a federation peer with its own Ed25519 keypair.
pub struct TestPeer {
    pub node_id: String,
    pub signer: ManifestSigner,
}

impl TestPeer {
    /// Create a peer whose node id is derived from its public key.
    pub fn new() -> Self {
        let signer = ManifestSigner::generate();
        let node_id = hex::encode(blake3::hash(&signer.public_key()).as_bytes());
        Self { node_id, signer }
    }

    /// Create a peer with a fixed, human-readable node id.
    pub fn named(node_id: &str) -> Self {
        Self {
            node_id: node_id.to_string(),
            signer: ManifestSigner::generate(),
        }
    }

    /// Manifest value advertising the given `(id, hash)` node references.
    pub fn manifest(&self, nodes: &[(&str, &str)]) -> Value {
        let refs: Vec<Value> = nodes
            .iter()
            .map(|(id, hash)| json!({"id": id, "hash": hash}))
            .collect();
        json!({"node_id": self.node_id, "nodes": refs})
    }

    /// Correctly signed registration request for a manifest value.
    pub fn registration(&self, manifest: Value) -> RegisterManifestRequest {
        let detached = self.signer.sign_canonical(&manifest).unwrap();
        RegisterManifestRequest {
            manifest: Some(manifest),
            signature: Some(detached.signature),
            pubkey: Some(detached.pubkey),
        }
    }

    /// JSON request body for the `/manifest` transport verb.
    pub fn registration_body(&self, manifest: Value) -> Value {
        let detached = self.signer.sign_canonical(&manifest).unwrap();
        json!({
            "manifest": manifest,
            "signature": detached.signature,
            "pubkey": detached.pubkey,
        })
    }
}

impl Default for TestPeer {
    fn default() -> Self {
        Self::new()
    }
}

/// Write `(id, content)` lattice nodes plus the aggregate manifest into a
/// fresh store, returning the store.
pub fn seeded_store(owner: &str, nodes: &[(&str, Value)]) -> ManifestStore {
    let store = ManifestStore::new(temp_data_dir("seed"));
    let mut refs = Vec::new();
    for (id, content) in nodes {
        let node = LatticeNode::from_content(id, content.clone()).unwrap();
        refs.push(node.node_ref());
        store.store_node(&node).unwrap();
    }
    store
        .store_manifest(&Manifest {
            node_id: owner.to_string(),
            nodes: refs,
        })
        .unwrap();
    store
}
