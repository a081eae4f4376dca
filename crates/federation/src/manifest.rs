//! Manifest Store - Local Lattice Node Storage
//!
//! Owns the canonical copy of this node's own manifest and lattice nodes.
//! The store is file-backed: the aggregate manifest lives in
//! `manifest.json` and each lattice node in its own `<id>.json`, so a
//! delta request can fetch only the nodes whose hash differs.
//!
//! The protocol handler only reads from this store; writing local nodes is
//! the business of whatever produces them (deploy tooling, an editor, a
//! replication job). The write half is still provided here so those
//! collaborators and the tests share one implementation.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;

use latticesync_core::digest_canonical;

use crate::error::{FederationError, FederationResult};

/// Reference to a lattice node: id plus content hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatticeNodeRef {
    /// Stable identifier, unique within a node's local set
    pub id: String,
    /// Hex BLAKE3 digest of the node's canonical content
    pub hash: String,
}

/// This node's self-description: the set of lattice nodes it holds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    /// Identifier of the node that owns this manifest
    #[serde(default)]
    pub node_id: String,
    /// References to the lattice nodes in the local set
    #[serde(default)]
    pub nodes: Vec<LatticeNodeRef>,
}

impl Manifest {
    /// Local view of `{id -> hash}` over this manifest's entries.
    pub fn node_refs(&self) -> impl Iterator<Item = &LatticeNodeRef> {
        self.nodes.iter()
    }
}

/// A named, content-addressed unit of synchronized state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatticeNode {
    /// Stable identifier
    pub id: String,
    /// Hex BLAKE3 digest of the canonical content; acts as the version
    /// fingerprint (hash equality implies content equality)
    pub hash: String,
    /// The node's current content
    pub content: Value,
}

impl LatticeNode {
    /// Build a lattice node from content, computing its content hash.
    pub fn from_content(id: &str, content: Value) -> FederationResult<Self> {
        let hash = digest_canonical(&content)?;
        Ok(Self {
            id: id.to_string(),
            hash,
            content,
        })
    }

    /// Reference entry for this node.
    pub fn node_ref(&self) -> LatticeNodeRef {
        LatticeNodeRef {
            id: self.id.clone(),
            hash: self.hash.clone(),
        }
    }
}

/// File-backed store of the local manifest and lattice nodes.
#[derive(Debug, Clone)]
pub struct ManifestStore {
    dir: PathBuf,
}

impl ManifestStore {
    const MANIFEST_FILE: &'static str = "manifest.json";

    /// Create a store rooted at `dir`. The directory is created lazily on
    /// first write; a missing directory reads as an empty store.
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory this store reads from.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Read the local manifest.
    ///
    /// Returns an empty manifest if none has been written yet - never an
    /// error for absence.
    pub fn load_local_manifest(&self) -> FederationResult<Manifest> {
        match fs::read_to_string(self.dir.join(Self::MANIFEST_FILE)) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Manifest::default()),
            Err(err) => Err(err.into()),
        }
    }

    /// Fetch one lattice node's full payload by id.
    ///
    /// Returns `None` for an absent node. An id that cannot name a stored
    /// object (path separators, `..`) is treated the same way.
    pub fn load_node(&self, id: &str) -> FederationResult<Option<Value>> {
        let Some(path) = self.node_path(id) else {
            return Ok(None);
        };
        match fs::read_to_string(path) {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Write the local manifest.
    pub fn store_manifest(&self, manifest: &Manifest) -> FederationResult<()> {
        fs::create_dir_all(&self.dir)?;
        let payload = serde_json::to_string_pretty(manifest)?;
        fs::write(self.dir.join(Self::MANIFEST_FILE), payload)?;
        Ok(())
    }

    /// Write one lattice node's payload.
    pub fn store_node(&self, node: &LatticeNode) -> FederationResult<()> {
        let path = self
            .node_path(&node.id)
            .ok_or_else(|| FederationError::InvalidNodeId {
                id: node.id.clone(),
            })?;
        fs::create_dir_all(&self.dir)?;
        let payload = serde_json::to_string_pretty(node)?;
        fs::write(path, payload)?;
        Ok(())
    }

    /// Resolve the file path for a node id, rejecting ids that would
    /// escape the store directory.
    fn node_path(&self, id: &str) -> Option<PathBuf> {
        if id.is_empty()
            || id == "."
            || id == ".."
            || id.contains('/')
            || id.contains('\\')
            || id == Self::MANIFEST_FILE.trim_end_matches(".json")
        {
            return None;
        }
        Some(self.dir.join(format!("{id}.json")))
    }
}
