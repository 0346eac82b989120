use crate::signaling::RetryPolicy;
use crate::transport::TransportConfig;
use concierge_core::RoleDirectory;
use concierge_core::utils::DEFAULT_RELAY_URL;
use serde::{Deserialize, Serialize};

/// Everything an endpoint needs to reach the relay and its peers.
/// Missing JSON fields fall back to [`CallConfig::default`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CallConfig {
    pub relay_url: String,
    pub transport: TransportConfig,
    pub retry: RetryPolicy,
    pub directory: RoleDirectory,
}

impl Default for CallConfig {
    fn default() -> Self {
        Self {
            relay_url: DEFAULT_RELAY_URL.to_owned(),
            transport: TransportConfig::default(),
            retry: RetryPolicy::default(),
            directory: RoleDirectory::default(),
        }
    }
}

impl CallConfig {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn with_relay_url(mut self, url: impl Into<String>) -> Self {
        self.relay_url = url.into();
        self
    }
}
