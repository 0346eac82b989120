use crate::error::ProtocolError;
use crate::model::ice::{IceCandidate, SessionDescription};
use crate::model::participant::ParticipantId;
use crate::model::role::Role;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RejectReason {
    Busy,
    Rejected,
}

/// Кадры сигнального протокола. Поле `type` определяет вариант.
///
/// Все кадры, относящиеся к звонку, несут отправителя (`userId`) и получателя (`target`);
/// маршрутизацией по `target` занимается relay.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum SignalMessage {
    #[serde(rename = "register")]
    Register { user_id: ParticipantId, role: Role },

    #[serde(rename = "users")]
    Users { users: Vec<ParticipantId> },

    #[serde(rename = "userConnected")]
    UserConnected { user_id: ParticipantId },

    #[serde(rename = "userDisconnected")]
    UserDisconnected { user_id: ParticipantId },

    #[serde(rename = "call", alias = "offer")]
    Call {
        user_id: ParticipantId,
        target: ParticipantId,
        offer: SessionDescription,
    },

    #[serde(rename = "callAccepted", alias = "answer")]
    CallAccepted {
        user_id: ParticipantId,
        target: ParticipantId,
        answer: SessionDescription,
    },

    #[serde(rename = "callRejected")]
    CallRejected {
        user_id: ParticipantId,
        target: ParticipantId,
        reason: RejectReason,
    },

    #[serde(rename = "ice-candidate")]
    IceCandidate {
        user_id: ParticipantId,
        target: ParticipantId,
        candidate: IceCandidate,
    },

    #[serde(rename = "endCall")]
    EndCall {
        user_id: ParticipantId,
        target: ParticipantId,
    },

    #[serde(rename = "removeUser")]
    RemoveUser { user_id: ParticipantId },
}

impl SignalMessage {
    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Wire tag, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            SignalMessage::Register { .. } => "register",
            SignalMessage::Users { .. } => "users",
            SignalMessage::UserConnected { .. } => "userConnected",
            SignalMessage::UserDisconnected { .. } => "userDisconnected",
            SignalMessage::Call { .. } => "call",
            SignalMessage::CallAccepted { .. } => "callAccepted",
            SignalMessage::CallRejected { .. } => "callRejected",
            SignalMessage::IceCandidate { .. } => "ice-candidate",
            SignalMessage::EndCall { .. } => "endCall",
            SignalMessage::RemoveUser { .. } => "removeUser",
        }
    }

    /// Recipient of a call-scoped frame. Roster and registration frames have none.
    pub fn target(&self) -> Option<&ParticipantId> {
        match self {
            SignalMessage::Call { target, .. }
            | SignalMessage::CallAccepted { target, .. }
            | SignalMessage::CallRejected { target, .. }
            | SignalMessage::IceCandidate { target, .. }
            | SignalMessage::EndCall { target, .. } => Some(target),
            SignalMessage::Register { .. }
            | SignalMessage::Users { .. }
            | SignalMessage::UserConnected { .. }
            | SignalMessage::UserDisconnected { .. }
            | SignalMessage::RemoveUser { .. } => None,
        }
    }

    /// Sender of a call-scoped frame.
    pub fn sender(&self) -> Option<&ParticipantId> {
        match self {
            SignalMessage::Call { user_id, .. }
            | SignalMessage::CallAccepted { user_id, .. }
            | SignalMessage::CallRejected { user_id, .. }
            | SignalMessage::IceCandidate { user_id, .. }
            | SignalMessage::EndCall { user_id, .. } => Some(user_id),
            _ => None,
        }
    }
}
