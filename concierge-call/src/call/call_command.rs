use concierge_core::ParticipantId;

/// User intents fed into the call engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallCommand {
    StartCall { target: ParticipantId },
    Accept,
    Reject,
    End,
    ToggleMute,
    ToggleVideo,
    /// Owner only: ask the relay to disconnect a participant.
    RemoveUser { user_id: ParticipantId },
    Shutdown,
}
