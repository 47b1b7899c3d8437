use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// When set, websocket upgrades and `/v1` calls must send it as `Authorization`.
    pub password: Option<String>,
    /// Directory of static client files served at `/`.
    pub public_dir: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            password: None,
            public_dir: None,
        }
    }
}
