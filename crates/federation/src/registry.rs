//! Peer Registry - TTL-Backed Cluster Membership
//!
//! Maintains an eventually-accurate view of which peers are alive. Every
//! successful manifest registration writes a peer record with a fixed TTL;
//! a record that is not refreshed simply disappears, so an expired peer is
//! indistinguishable from one that never registered.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{FederationError, FederationResult};

/// How long a peer record stays live without a refresh (milliseconds).
pub const PEER_TTL_MS: u64 = 120_000;

/// Identity of a remote node as seen by this node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerRecord {
    /// Unique node identifier, stable across restarts
    pub node_id: String,
    /// Self-reported manifest fields, stringified
    pub fields: HashMap<String, String>,
    /// Registry-assigned write timestamp (Unix epoch milliseconds).
    /// Never trusted from the caller.
    pub last_seen: u64,
}

/// Backing store for the peer registry.
///
/// Injected into the protocol handler so deployments can choose Redis and
/// tests can substitute the in-memory implementation.
///
/// `list_live` returns records sorted lexicographically by `node_id`;
/// the order is stable within a process run.
pub trait PeerStore: Send + Sync {
    /// Write or overwrite a peer record, resetting its TTL to
    /// [`PEER_TTL_MS`] from the call time and stamping `last_seen`
    /// server-side.
    fn upsert(&self, node_id: &str, fields: HashMap<String, String>) -> FederationResult<()>;

    /// All non-expired peer records.
    fn list_live(&self) -> FederationResult<Vec<PeerRecord>>;
}

/// Get current timestamp in milliseconds
fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64
}

#[derive(Debug, Clone)]
struct StoredPeer {
    fields: HashMap<String, String>,
    last_seen: u64,
    expires_at: u64,
}

/// In-memory peer store for tests and single-process deployments.
///
/// TTL bookkeeping is explicit: the trait methods stamp the current time,
/// while the `_at` variants take the clock as a parameter so expiry is
/// testable without waiting out the window.
#[derive(Debug, Default)]
pub struct MemoryPeerStore {
    entries: Mutex<HashMap<String, StoredPeer>>,
}

impl MemoryPeerStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert a peer record as of `now_ms`.
    pub fn upsert_at(
        &self,
        node_id: &str,
        fields: HashMap<String, String>,
        now_ms: u64,
    ) -> FederationResult<()> {
        let mut entries = self.lock_entries()?;
        entries.insert(
            node_id.to_string(),
            StoredPeer {
                fields,
                last_seen: now_ms,
                expires_at: now_ms + PEER_TTL_MS,
            },
        );
        Ok(())
    }

    /// All records still live as of `now_ms`, sorted by node id.
    ///
    /// Expired entries are dropped from the table on the way through.
    pub fn list_live_at(&self, now_ms: u64) -> FederationResult<Vec<PeerRecord>> {
        let mut entries = self.lock_entries()?;
        entries.retain(|_, stored| stored.expires_at > now_ms);

        let mut records: Vec<PeerRecord> = entries
            .iter()
            .map(|(node_id, stored)| PeerRecord {
                node_id: node_id.clone(),
                fields: stored.fields.clone(),
                last_seen: stored.last_seen,
            })
            .collect();
        records.sort_by(|a, b| a.node_id.cmp(&b.node_id));
        Ok(records)
    }

    fn lock_entries(
        &self,
    ) -> FederationResult<std::sync::MutexGuard<'_, HashMap<String, StoredPeer>>> {
        self.entries
            .lock()
            .map_err(|_| FederationError::StoreUnavailable("peer table lock poisoned".to_string()))
    }
}

impl PeerStore for MemoryPeerStore {
    fn upsert(&self, node_id: &str, fields: HashMap<String, String>) -> FederationResult<()> {
        self.upsert_at(node_id, fields, current_timestamp())
    }

    fn list_live(&self) -> FederationResult<Vec<PeerRecord>> {
        self.list_live_at(current_timestamp())
    }
}

/// Redis-backed peer store for multi-process deployments.
///
/// Each record is a JSON value under `<prefix><node_id>`, written with
/// `SET ... EX` so expiry is enforced by Redis itself rather than polled
/// by the protocol handler.
pub struct RedisPeerStore {
    client: redis::Client,
    key_prefix: String,
}

impl RedisPeerStore {
    /// Default key namespace for peer records.
    pub const DEFAULT_PREFIX: &'static str = "lattice:peer:";

    /// Connect to a Redis instance by URL.
    pub fn connect(url: &str) -> FederationResult<Self> {
        let client = redis::Client::open(url)?;
        Ok(Self {
            client,
            key_prefix: Self::DEFAULT_PREFIX.to_string(),
        })
    }

    /// Override the key namespace, for sharing one Redis across clusters.
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.key_prefix = prefix.to_string();
        self
    }

    fn scan_peer_keys(&self, conn: &mut redis::Connection) -> FederationResult<Vec<String>> {
        let pattern = format!("{}*", self.key_prefix);
        let mut keys = Vec::new();
        let mut cursor: u64 = 0;

        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(64)
                .query(conn)?;
            keys.extend(batch);
            cursor = next;
            if cursor == 0 {
                break;
            }
        }

        Ok(keys)
    }
}

impl PeerStore for RedisPeerStore {
    fn upsert(&self, node_id: &str, fields: HashMap<String, String>) -> FederationResult<()> {
        let record = PeerRecord {
            node_id: node_id.to_string(),
            fields,
            last_seen: current_timestamp(),
        };
        let payload = serde_json::to_string(&record)?;

        let mut conn = self.client.get_connection()?;
        redis::cmd("SET")
            .arg(format!("{}{}", self.key_prefix, node_id))
            .arg(payload)
            .arg("EX")
            .arg(PEER_TTL_MS / 1000)
            .query::<()>(&mut conn)?;
        Ok(())
    }

    fn list_live(&self) -> FederationResult<Vec<PeerRecord>> {
        let mut conn = self.client.get_connection()?;
        let keys = self.scan_peer_keys(&mut conn)?;

        let mut records = Vec::with_capacity(keys.len());
        for key in keys {
            // A key can expire between SCAN and GET; that peer is simply
            // no longer live.
            let payload: Option<String> = redis::cmd("GET").arg(&key).query(&mut conn)?;
            let Some(payload) = payload else { continue };

            match serde_json::from_str::<PeerRecord>(&payload) {
                Ok(record) => records.push(record),
                Err(err) => {
                    tracing::warn!(key = %key, error = %err, "Skipping unparseable peer record");
                }
            }
        }

        records.sort_by(|a, b| a.node_id.cmp(&b.node_id));
        Ok(records)
    }
}
