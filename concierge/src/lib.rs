pub use concierge_core::model::{ParticipantId, Role};

pub mod model {
    pub use concierge_core::model::*;
}

#[cfg(feature = "call")]
pub mod call {
    pub use concierge_call::*;
}

#[cfg(feature = "relay")]
pub mod relay {
    pub use concierge_relay::*;
}
