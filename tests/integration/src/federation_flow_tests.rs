//! End-to-End Federation Flow Tests
//!
//! Drives the protocol handler the way a cluster would: signed
//! registration, discovery, TTL expiry against a simulated clock, and
//! two-node delta sync in both directions.

use std::sync::Arc;

use serde_json::json;

use latticesync_federation::{
    FederationHandler, LatticeNodeRef, ManifestStore, MemoryPeerStore, SyncRequest, PEER_TTL_MS,
};

use crate::test_utils::{current_timestamp_ms, seeded_store, temp_data_dir, TestPeer};

#[test]
fn test_registration_discovery_expiry_lifecycle() {
    let _ = tracing_subscriber::fmt::try_init();

    let registry = Arc::new(MemoryPeerStore::new());
    let handler = FederationHandler::new(
        registry.clone(),
        ManifestStore::new(temp_data_dir("lifecycle")),
    );

    // Register a correctly signed manifest.
    let peer = TestPeer::named("peer-1");
    let manifest = peer.manifest(&[("alpha", "h1")]);
    let node_id = handler.register_manifest(&peer.registration(manifest)).unwrap();
    assert_eq!(node_id, "peer-1");

    // Discovery sees exactly that peer.
    let view = handler.discover().unwrap();
    assert_eq!(view.count, 1);
    assert_eq!(view.peers[0].node_id, "peer-1");

    // Beyond the TTL window (simulated clock) the record is gone, and an
    // expired peer is indistinguishable from one that never registered.
    let beyond_ttl = current_timestamp_ms() + PEER_TTL_MS + 1;
    assert!(registry.list_live_at(beyond_ttl).unwrap().is_empty());
}

#[test]
fn test_reregistration_keeps_single_record() {
    let registry = Arc::new(MemoryPeerStore::new());
    let handler = FederationHandler::new(
        registry.clone(),
        ManifestStore::new(temp_data_dir("rereg")),
    );

    let peer = TestPeer::named("peer-1");
    for _ in 0..3 {
        let manifest = peer.manifest(&[]);
        handler.register_manifest(&peer.registration(manifest)).unwrap();
    }

    let view = handler.discover().unwrap();
    assert_eq!(view.count, 1);
}

#[test]
fn test_forged_peer_never_becomes_visible() {
    let registry = Arc::new(MemoryPeerStore::new());
    let handler = FederationHandler::new(
        registry,
        ManifestStore::new(temp_data_dir("forged")),
    );

    let peer = TestPeer::named("peer-1");
    let imposter = TestPeer::named("peer-1");

    // Imposter signs with its own key but presents the genuine peer's
    // public key; the signature cannot verify against that key.
    let manifest = peer.manifest(&[]);
    let mut request = imposter.registration(manifest);
    request.pubkey = Some(peer.signer.public_key_b64());

    assert!(handler.register_manifest(&request).is_err());
    assert_eq!(handler.discover().unwrap().count, 0);
}

#[test]
fn test_two_node_bidirectional_convergence() {
    // Node A holds alpha@v2 and beta; node B holds alpha@v1 and gamma.
    let store_a = seeded_store(
        "node-a",
        &[
            ("alpha", json!({"v": 2})),
            ("beta", json!({"role": "relay"})),
        ],
    );
    let store_b = seeded_store(
        "node-b",
        &[
            ("alpha", json!({"v": 1})),
            ("gamma", json!({"role": "edge"})),
        ],
    );

    let handler_a =
        FederationHandler::new(Arc::new(MemoryPeerStore::new()), store_a.clone());
    let handler_b =
        FederationHandler::new(Arc::new(MemoryPeerStore::new()), store_b.clone());

    let view_of = |store: &ManifestStore| -> Vec<LatticeNodeRef> {
        store.load_local_manifest().unwrap().nodes
    };

    // B asks A for what it lacks: A pushes its alpha (B's hash is stale)
    // and beta. A does not report gamma - sync is one-directional.
    let delta_from_a = handler_a
        .sync(&SyncRequest {
            nodes: view_of(&store_b),
        })
        .unwrap();
    assert_eq!(delta_from_a.delta_count, 2);
    let ids: Vec<&str> = delta_from_a
        .nodes
        .iter()
        .map(|node| node["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&"alpha"));
    assert!(ids.contains(&"beta"));

    // Convergence needs the opposite call too: A asks B and receives
    // gamma, plus B's alpha which differs from A's copy.
    let delta_from_b = handler_b
        .sync(&SyncRequest {
            nodes: view_of(&store_a),
        })
        .unwrap();
    assert_eq!(delta_from_b.delta_count, 2);
    let ids: Vec<&str> = delta_from_b
        .nodes
        .iter()
        .map(|node| node["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&"alpha"));
    assert!(ids.contains(&"gamma"));
}

#[test]
fn test_identical_views_produce_empty_delta() {
    let store = seeded_store("node-a", &[("alpha", json!({"v": 1}))]);
    let handler = FederationHandler::new(Arc::new(MemoryPeerStore::new()), store.clone());

    let response = handler
        .sync(&SyncRequest {
            nodes: store.load_local_manifest().unwrap().nodes,
        })
        .unwrap();

    assert_eq!(response.delta_count, 0);
    assert!(response.nodes.is_empty());
}
