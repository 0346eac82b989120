use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("participant id must not be empty")]
    EmptyParticipantId,

    #[error("malformed signaling frame: {0}")]
    MalformedFrame(#[from] serde_json::Error),
}
