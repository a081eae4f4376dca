//! LatticeSync Federation - Node Synchronization Protocol
//!
//! Implements the federation protocol by which independent peers discover
//! each other and converge on shared lattice node state.
//!
//! # Core Components
//!
//! - **Peer Registry**: TTL-backed membership view of remote nodes
//! - **Manifest Store**: local durable store of this node's manifest and
//!   content-addressed lattice nodes
//! - **Protocol Handler**: discovery, signed manifest registration, and
//!   content-hash delta sync
//!
//! # Trust Model
//!
//! Manifest registration is gated on a detached Ed25519 signature over the
//! manifest's canonical serialization. That signature authenticates the
//! manifest claim, not the transport channel, and it is the only identity
//! check in the protocol.

#![warn(missing_docs)]

pub mod error;
pub mod manifest;
pub mod protocol;
pub mod registry;

pub use error::{FederationError, FederationResult};
pub use manifest::{LatticeNode, LatticeNodeRef, Manifest, ManifestStore};
pub use protocol::{
    DiscoverResponse, FederationHandler, RegisterManifestRequest, SyncRequest, SyncResponse,
};
pub use registry::{MemoryPeerStore, PeerRecord, PeerStore, RedisPeerStore, PEER_TTL_MS};
