use crate::error::CallError;
use concierge_core::{ParticipantId, RejectReason, SessionDescription};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStatus {
    Idle,
    /// Offer sent, waiting for the callee.
    Calling,
    /// Offer received, waiting for the local user.
    Incoming,
    Connected,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CallInput {
    Initiate {
        target: ParticipantId,
    },
    OfferReceived {
        from: ParticipantId,
        offer: SessionDescription,
    },
    AnswerReceived {
        from: ParticipantId,
        answer: SessionDescription,
    },
    RejectedByRemote {
        from: ParticipantId,
        reason: RejectReason,
    },
    Accept,
    Reject,
    LocalEnd,
    RemoteEnd {
        from: ParticipantId,
    },
    PeerLeft {
        peer: ParticipantId,
    },
    ConnectionFailed,
    SetupFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    LocalHangup,
    RemoteHangup,
    Rejected(RejectReason),
    PeerLeft,
    ConnectionLost,
    SetupFailed,
}

/// What the engine has to do after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Acquire media, build the peer connection, send `call`.
    PlaceCall { target: ParticipantId },
    /// Offer retained; surface accept/reject.
    Ring { from: ParticipantId },
    /// Answer `callRejected(busy)`; the current call is untouched.
    RejectBusy { caller: ParticipantId },
    ApplyAnswer { answer: SessionDescription },
    /// Build the peer connection from the retained offer and send the answer.
    Answer {
        caller: ParticipantId,
        offer: SessionDescription,
    },
    /// Answer `callRejected(rejected)`.
    Decline { caller: ParticipantId },
    Teardown {
        peer: ParticipantId,
        notify_remote: bool,
        reason: EndReason,
    },
    /// Stale or unrelated input.
    Ignore,
}

/// Single source of truth for the status of this participant's one call.
#[derive(Debug)]
pub struct CallStateMachine {
    status: CallStatus,
    peer: Option<ParticipantId>,
    pending_offer: Option<SessionDescription>,
}

impl Default for CallStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl CallStateMachine {
    pub fn new() -> Self {
        Self {
            status: CallStatus::Idle,
            peer: None,
            pending_offer: None,
        }
    }

    pub fn status(&self) -> CallStatus {
        self.status
    }

    pub fn peer(&self) -> Option<&ParticipantId> {
        self.peer.as_ref()
    }

    pub fn pending_offer(&self) -> Option<&SessionDescription> {
        self.pending_offer.as_ref()
    }

    fn is_peer(&self, id: &ParticipantId) -> bool {
        self.peer.as_ref() == Some(id)
    }

    pub fn apply(&mut self, input: CallInput) -> Result<Effect, CallError> {
        use CallStatus::*;

        let effect = match (self.status, input) {
            (Idle, CallInput::Initiate { target }) => {
                self.status = Calling;
                self.peer = Some(target.clone());
                Effect::PlaceCall { target }
            }

            (Idle, CallInput::OfferReceived { from, offer }) => {
                self.status = Incoming;
                self.peer = Some(from.clone());
                self.pending_offer = Some(offer);
                Effect::Ring { from }
            }
            (_, CallInput::OfferReceived { from, .. }) => Effect::RejectBusy { caller: from },

            (Calling, CallInput::AnswerReceived { from, answer }) if self.is_peer(&from) => {
                self.status = Connected;
                Effect::ApplyAnswer { answer }
            }
            (_, CallInput::AnswerReceived { .. }) => Effect::Ignore,

            (Incoming, CallInput::Accept) => match (self.peer.clone(), self.pending_offer.take()) {
                (Some(caller), Some(offer)) => {
                    self.status = Connected;
                    Effect::Answer { caller, offer }
                }
                _ => {
                    self.reset();
                    Effect::Ignore
                }
            },

            (Incoming, CallInput::Reject) => match self.reset() {
                Some(caller) => Effect::Decline { caller },
                None => Effect::Ignore,
            },

            (Calling, CallInput::RejectedByRemote { from, reason }) if self.is_peer(&from) => {
                self.teardown(false, EndReason::Rejected(reason))
            }
            (_, CallInput::RejectedByRemote { .. }) => Effect::Ignore,

            (Idle, CallInput::LocalEnd) => Effect::Ignore,
            (_, CallInput::LocalEnd) => self.teardown(true, EndReason::LocalHangup),

            (Idle, CallInput::RemoteEnd { .. }) => Effect::Ignore,
            (_, CallInput::RemoteEnd { from }) if self.is_peer(&from) => {
                self.teardown(false, EndReason::RemoteHangup)
            }
            (_, CallInput::RemoteEnd { .. }) => Effect::Ignore,

            (Idle, CallInput::PeerLeft { .. }) => Effect::Ignore,
            (_, CallInput::PeerLeft { peer }) if self.is_peer(&peer) => {
                self.teardown(false, EndReason::PeerLeft)
            }
            (_, CallInput::PeerLeft { .. }) => Effect::Ignore,

            (Idle, CallInput::ConnectionFailed) => Effect::Ignore,
            (_, CallInput::ConnectionFailed) => self.teardown(true, EndReason::ConnectionLost),

            (Idle, CallInput::SetupFailed) => Effect::Ignore,
            // The caller fails before anything was sent.
            (Calling, CallInput::SetupFailed) => self.teardown(false, EndReason::SetupFailed),
            (_, CallInput::SetupFailed) => self.teardown(true, EndReason::SetupFailed),

            (status, input) => return Err(CallError::InvalidTransition { status, input }),
        };

        Ok(effect)
    }

    fn teardown(&mut self, notify_remote: bool, reason: EndReason) -> Effect {
        match self.reset() {
            Some(peer) => Effect::Teardown {
                peer,
                notify_remote,
                reason,
            },
            None => Effect::Ignore,
        }
    }

    fn reset(&mut self) -> Option<ParticipantId> {
        self.status = CallStatus::Idle;
        self.pending_offer = None;
        self.peer.take()
    }
}
