use std::sync::Arc;

use latticesync_federation::{
    FederationHandler, ManifestStore, MemoryPeerStore, PeerStore, RedisPeerStore,
};
use tracing::info;

use crate::config::Config;

pub struct AppState {
    pub config: Config,
    pub handler: FederationHandler,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let registry: Arc<dyn PeerStore> = match &config.redis_url {
            Some(url) => {
                info!("Peer registry backed by Redis at {}", url);
                Arc::new(RedisPeerStore::connect(url)?)
            }
            None => {
                info!("Peer registry running in-memory (no REDIS_URL configured)");
                Arc::new(MemoryPeerStore::new())
            }
        };

        let manifests = ManifestStore::new(&config.data_dir);
        let handler = FederationHandler::new(registry, manifests);

        Ok(AppState { config, handler })
    }
}
