use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub node_id: String,
    /// TTL store connection string; absent selects the in-memory registry
    pub redis_url: Option<String>,
    pub data_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            port: env::var("PORT")
                .ok()
                .and_then(|value| value.parse().ok())
                .unwrap_or(8471),
            node_id: env::var("NODE_ID").unwrap_or_else(|_| "node-001".to_string()),
            redis_url: env::var("REDIS_URL").ok(),
            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./data")),
        }
    }
}
