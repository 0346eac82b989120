mod peer_session;
mod transport_config;
mod transport_event;

pub use peer_session::*;
pub use transport_config::*;
pub use transport_event::*;
