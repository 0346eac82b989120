mod ice;
mod participant;
mod role;
mod signaling;

pub use ice::{IceCandidate, IceServerConfig, SdpKind, SessionDescription};
pub use participant::ParticipantId;
pub use role::{Role, RoleDirectory};
pub use signaling::{RejectReason, SignalMessage};
