use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info, warn};

use latticesync_federation::{FederationError, RegisterManifestRequest, SyncRequest};

use crate::state::AppState;

pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "latticesync-node",
        "node_id": state.config.node_id,
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

pub async fn discover(State(state): State<Arc<AppState>>) -> Result<Json<Value>, StatusCode> {
    match state.handler.discover() {
        Ok(view) => Ok(Json(json!({
            "peers": view.peers,
            "count": view.count
        }))),
        Err(err) => {
            error!("Discovery failed: {}", err);
            Err(error_status(&err))
        }
    }
}

pub async fn register_manifest(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterManifestRequest>,
) -> Result<Json<Value>, StatusCode> {
    match state.handler.register_manifest(&request) {
        Ok(node_id) => {
            info!("Peer {} registered", node_id);
            Ok(Json(json!({
                "status": "registered",
                "node_id": node_id
            })))
        }
        Err(err) => {
            warn!("Manifest registration rejected: {}", err);
            Err(error_status(&err))
        }
    }
}

pub async fn sync(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SyncRequest>,
) -> Result<Json<Value>, StatusCode> {
    match state.handler.sync(&request) {
        Ok(delta) => Ok(Json(json!({
            "delta_count": delta.delta_count,
            "nodes": delta.nodes
        }))),
        Err(err) => {
            error!("Sync failed: {}", err);
            Err(error_status(&err))
        }
    }
}

/// Map protocol errors onto the transport's status classes exactly once.
fn error_status(error: &FederationError) -> StatusCode {
    match error {
        FederationError::MissingFields { .. } | FederationError::InvalidNodeId { .. } => {
            StatusCode::BAD_REQUEST
        }
        FederationError::InvalidSignature => StatusCode::UNAUTHORIZED,
        FederationError::NodeNotFound { .. } => StatusCode::NOT_FOUND,
        FederationError::StoreUnavailable(_) | FederationError::Serialization(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
