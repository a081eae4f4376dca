//! Integration tests for the LatticeSync federation protocol
//!
//! This test suite validates:
//! - Signed manifest registration end-to-end (signer through registry)
//! - Peer discovery and TTL expiry of registry entries
//! - Content-hash delta sync between two nodes
//! - The HTTP transport's status mapping for the three federation verbs

pub mod test_utils;

#[cfg(test)]
mod federation_flow_tests;
