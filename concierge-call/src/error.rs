use crate::call::{CallInput, CallStatus};
use crate::media::MediaKind;
use thiserror::Error;

/// Camera/microphone failures. Fatal to the current call attempt only.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeviceError {
    #[error("permission to use camera/microphone was denied")]
    PermissionDenied,

    #[error("no {0:?} capture device found")]
    NotFound(MediaKind),

    #[error("capture device unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum CallError {
    #[error("camera/microphone error: {0}")]
    Device(#[from] DeviceError),

    #[error("negotiation failed: {0}")]
    Negotiation(String),

    #[error("{input:?} is not valid while {status:?}")]
    InvalidTransition { status: CallStatus, input: CallInput },

    #[error("call engine has stopped")]
    EngineStopped,
}

impl From<anyhow::Error> for CallError {
    fn from(e: anyhow::Error) -> Self {
        CallError::Negotiation(format!("{:#}", e))
    }
}
