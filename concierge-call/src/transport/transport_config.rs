use concierge_core::IceServerConfig;
use concierge_core::utils::{
    DEFAULT_STUN_ADDR, DEFAULT_STUN_ADDR_2, DEFAULT_STUN_ADDR_3, DEFAULT_STUN_ADDR_4,
    DEFAULT_STUN_ADDR_5,
};
use serde::{Deserialize, Serialize};

/// Конфигурация для WebRTC. Только STUN, TURN не настроен.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransportConfig {
    pub ice_servers: Vec<IceServerConfig>,
}

impl TransportConfig {
    /// Host candidates only. Enough for peers on the same machine or LAN.
    pub fn local_only() -> Self {
        Self {
            ice_servers: Vec::new(),
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec![IceServerConfig::stun(vec![
                DEFAULT_STUN_ADDR.to_owned(),
                DEFAULT_STUN_ADDR_2.to_owned(),
                DEFAULT_STUN_ADDR_3.to_owned(),
                DEFAULT_STUN_ADDR_4.to_owned(),
                DEFAULT_STUN_ADDR_5.to_owned(),
            ])],
        }
    }
}
