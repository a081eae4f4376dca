//! Federation Protocol Handler
//!
//! Orchestrates the three federation operations: peer discovery, signed
//! manifest registration, and content-hash delta sync. This is where the
//! trust decisions live: an unsigned or badly-signed manifest never
//! reaches the peer registry.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use latticesync_core::to_canonical_vec;
use latticesync_crypto::verify_detached_b64;

use crate::error::{FederationError, FederationResult};
use crate::manifest::{LatticeNodeRef, ManifestStore};
use crate::registry::{PeerRecord, PeerStore};

/// Manifest registration request as it arrives off the wire.
///
/// Fields decode leniently so presence policy is enforced here, not by the
/// deserializer. The manifest stays a raw JSON value: the signature covers
/// its canonical serialization, and a typed decode would drop unknown
/// fields and break verification.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterManifestRequest {
    /// The peer's self-description
    #[serde(default)]
    pub manifest: Option<Value>,
    /// Base64 detached Ed25519 signature over the canonical manifest
    #[serde(default)]
    pub signature: Option<String>,
    /// Base64 Ed25519 public key the signature verifies against
    #[serde(default)]
    pub pubkey: Option<String>,
}

/// Membership view returned by discovery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoverResponse {
    /// All live peer records, sorted by node id
    pub peers: Vec<PeerRecord>,
    /// Number of live peers
    pub count: usize,
}

/// The caller's known `{id: hash}` view of its own lattice nodes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncRequest {
    /// Node references the caller already holds
    #[serde(default)]
    pub nodes: Vec<LatticeNodeRef>,
}

/// Delta of lattice nodes the caller is missing or holds stale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncResponse {
    /// Number of payloads in `nodes`
    pub delta_count: usize,
    /// Full payloads of the divergent nodes
    pub nodes: Vec<Value>,
}

/// Orchestrates discovery, manifest registration, and delta sync.
///
/// The registry handle is injected so deployments can back it with Redis
/// while tests substitute [`crate::MemoryPeerStore`].
pub struct FederationHandler {
    registry: Arc<dyn PeerStore>,
    manifests: ManifestStore,
}

impl FederationHandler {
    /// Create a handler over the given registry and manifest store.
    pub fn new(registry: Arc<dyn PeerStore>, manifests: ManifestStore) -> Self {
        Self {
            registry,
            manifests,
        }
    }

    /// Read-only membership view from the peer registry.
    ///
    /// No authentication: the membership view is non-sensitive. No side
    /// effects.
    pub fn discover(&self) -> FederationResult<DiscoverResponse> {
        let peers = self.registry.list_live()?;
        let count = peers.len();
        Ok(DiscoverResponse { peers, count })
    }

    /// Validate a signed manifest and register its peer.
    ///
    /// The detached signature over the manifest's canonical serialization
    /// is the sole gate against forged membership claims. Registration is
    /// idempotent: re-registering the same manifest refreshes the peer's
    /// TTL and advances `last_seen`.
    ///
    /// Replay is accepted: the signed payload carries no nonce or
    /// timestamp, so an old valid manifest re-registers its peer.
    pub fn register_manifest(&self, request: &RegisterManifestRequest) -> FederationResult<String> {
        let manifest = request
            .manifest
            .as_ref()
            .ok_or(FederationError::MissingFields { field: "manifest" })?;
        let signature = require_field(&request.signature, "signature")?;
        let pubkey = require_field(&request.pubkey, "pubkey")?;

        let payload = to_canonical_vec(manifest)?;
        if !verify_detached_b64(&payload, signature, pubkey) {
            tracing::warn!("Rejected manifest registration with invalid signature");
            return Err(FederationError::InvalidSignature);
        }

        // A manifest without a node id is rejected outright: registering it
        // under a shared fallback key would let unrelated peers overwrite
        // each other's registry entry.
        let node_id = manifest
            .get("node_id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .ok_or(FederationError::MissingFields { field: "node_id" })?;

        self.registry.upsert(node_id, manifest_fields(manifest))?;
        tracing::info!(node_id, "Registered peer manifest");
        Ok(node_id.to_string())
    }

    /// Compute the delta of local lattice nodes the caller lacks or holds
    /// stale.
    ///
    /// One-directional: ids present only in the caller's view are ignored;
    /// convergence requires the caller to serve a sync in the opposite
    /// direction. Read-only snapshot with per-node consistency: concurrent
    /// store writers may interleave across entries, never within one.
    /// A store failure mid-scan aborts the whole response rather than
    /// returning a partial delta labeled complete.
    pub fn sync(&self, request: &SyncRequest) -> FederationResult<SyncResponse> {
        let manifest = self.manifests.load_local_manifest()?;
        let remote_view: HashMap<&str, &str> = request
            .nodes
            .iter()
            .map(|entry| (entry.id.as_str(), entry.hash.as_str()))
            .collect();

        let mut nodes = Vec::new();
        for entry in manifest.node_refs() {
            if remote_view.get(entry.id.as_str()) == Some(&entry.hash.as_str()) {
                continue;
            }
            match self.manifests.load_node(&entry.id)? {
                Some(payload) => nodes.push(payload),
                None => {
                    // Manifest and node files are written by an external
                    // collaborator; a dangling reference is omitted from
                    // the delta, not an error.
                    tracing::warn!(id = %entry.id, "Manifest references a missing node; omitting");
                }
            }
        }

        Ok(SyncResponse {
            delta_count: nodes.len(),
            nodes,
        })
    }
}

fn require_field<'a>(
    value: &'a Option<String>,
    field: &'static str,
) -> FederationResult<&'a str> {
    value
        .as_deref()
        .filter(|content| !content.is_empty())
        .ok_or(FederationError::MissingFields { field })
}

/// Flatten a manifest object into the string fields stored in the peer
/// registry. Any caller-supplied `last_seen` is dropped; the registry
/// stamps freshness itself.
fn manifest_fields(manifest: &Value) -> HashMap<String, String> {
    let Some(object) = manifest.as_object() else {
        return HashMap::new();
    };
    object
        .iter()
        .filter(|(key, _)| key.as_str() != "last_seen")
        .map(|(key, value)| {
            let rendered = match value {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            (key.clone(), rendered)
        })
        .collect()
}
