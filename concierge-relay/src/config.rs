use concierge_core::utils::DEFAULT_RELAY_BIND;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RelayConfig {
    /// Address the WebSocket endpoint listens on.
    pub bind: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_RELAY_BIND.to_owned(),
        }
    }
}
