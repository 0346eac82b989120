use crate::call::CallStatus;
use crate::media::MediaKind;
use concierge_core::ParticipantId;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    /// Needs the user's attention (device failure, lost connection).
    Error,
}

/// Human-readable message for the UI layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.severity, self.message)
    }
}

/// Roster changes as announced by the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterUpdate {
    Snapshot(Vec<ParticipantId>),
    Joined(ParticipantId),
    Left(ParticipantId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum CallEvent {
    SignalingConnected,
    SignalingDisconnected,
    StatusChanged {
        status: CallStatus,
        peer: Option<ParticipantId>,
    },
    IncomingCall {
        from: ParticipantId,
    },
    RemoteTrackAdded {
        kind: MediaKind,
    },
    MediaToggled {
        muted: bool,
        video_enabled: bool,
    },
    Roster(RosterUpdate),
    Notification(Notification),
}
