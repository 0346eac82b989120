use crate::call::{CallCommand, CallEvent, CallStatus, RosterUpdate};
use crate::client::{CallClient, CallHandle};
use crate::config::CallConfig;
use crate::error::CallError;
use crate::media::MediaSource;
use crate::signaling::Registration;
use concierge_core::{ParticipantId, Role, RoleDirectory};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterEntry {
    Online,
    /// `removeUser` sent, waiting for the relay to confirm via `userDisconnected`.
    PendingRemoval,
}

/// Connected customers as seen by the support desk. Owner ids never appear.
#[derive(Debug, Default)]
pub struct Roster {
    entries: BTreeMap<ParticipantId, RosterEntry>,
}

impl Roster {
    pub fn apply(&mut self, update: &RosterUpdate, directory: &RoleDirectory) {
        match update {
            RosterUpdate::Snapshot(users) => {
                self.entries = users
                    .iter()
                    .filter(|id| !directory.is_support(id))
                    .map(|id| (id.clone(), RosterEntry::Online))
                    .collect();
            }
            RosterUpdate::Joined(id) => {
                if !directory.is_support(id) {
                    self.entries.insert(id.clone(), RosterEntry::Online);
                }
            }
            RosterUpdate::Left(id) => {
                self.entries.remove(id);
            }
        }
    }

    /// Returns false for unknown or already pending participants.
    pub fn mark_pending(&mut self, id: &ParticipantId) -> bool {
        match self.entries.get_mut(id) {
            Some(entry) if *entry == RosterEntry::Online => {
                *entry = RosterEntry::PendingRemoval;
                true
            }
            _ => false,
        }
    }

    pub fn get(&self, id: &ParticipantId) -> Option<RosterEntry> {
        self.entries.get(id).copied()
    }

    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ParticipantId, RosterEntry)> {
        self.entries.iter().map(|(id, entry)| (id, *entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Support desk side: answers incoming calls and manages the roster.
pub struct OwnerController {
    handle: CallHandle,
    directory: RoleDirectory,
    roster: Roster,
    status: CallStatus,
    incoming: Option<ParticipantId>,
    connected: bool,
    muted: bool,
    video_enabled: bool,
}

impl OwnerController {
    /// Register under the support address from the directory.
    pub fn connect(config: &CallConfig, media_source: Arc<dyn MediaSource>) -> Self {
        let registration = Registration::new(config.directory.support().clone(), Role::Owner);
        let handle = CallClient::connect(config, registration, media_source);
        Self::new(handle, config.directory.clone())
    }

    pub fn new(handle: CallHandle, directory: RoleDirectory) -> Self {
        Self {
            handle,
            directory,
            roster: Roster::default(),
            status: CallStatus::Idle,
            incoming: None,
            connected: false,
            muted: false,
            video_enabled: true,
        }
    }

    pub fn id(&self) -> &ParticipantId {
        self.handle.local_id()
    }

    pub async fn accept(&self) -> Result<(), CallError> {
        self.handle.send(CallCommand::Accept).await
    }

    pub async fn reject(&self) -> Result<(), CallError> {
        self.handle.send(CallCommand::Reject).await
    }

    pub async fn end(&self) -> Result<(), CallError> {
        self.handle.send(CallCommand::End).await
    }

    pub async fn toggle_mute(&self) -> Result<(), CallError> {
        self.handle.send(CallCommand::ToggleMute).await
    }

    pub async fn toggle_video(&self) -> Result<(), CallError> {
        self.handle.send(CallCommand::ToggleVideo).await
    }

    /// Ask the relay to disconnect `user_id`. The entry stays in the roster,
    /// marked pending, until the relay announces the disconnect.
    ///
    /// Returns false if the participant is not listed or already pending.
    pub async fn remove_user(&mut self, user_id: &ParticipantId) -> Result<bool, CallError> {
        if !self.roster.mark_pending(user_id) {
            debug!("{} is not removable", user_id);
            return Ok(false);
        }
        self.handle
            .send(CallCommand::RemoveUser {
                user_id: user_id.clone(),
            })
            .await?;
        Ok(true)
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn incoming_caller(&self) -> Option<&ParticipantId> {
        self.incoming.as_ref()
    }

    pub fn status(&self) -> CallStatus {
        self.status
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn is_video_enabled(&self) -> bool {
        self.video_enabled
    }

    pub async fn next_event(&mut self) -> Option<CallEvent> {
        let event = self.handle.next_event().await?;
        self.observe(&event);
        Some(event)
    }

    fn observe(&mut self, event: &CallEvent) {
        match event {
            CallEvent::SignalingConnected => self.connected = true,
            CallEvent::SignalingDisconnected => self.connected = false,
            CallEvent::StatusChanged { status, peer } => {
                self.status = *status;
                self.incoming = match status {
                    CallStatus::Incoming => peer.clone(),
                    _ => None,
                };
            }
            CallEvent::IncomingCall { from } => self.incoming = Some(from.clone()),
            CallEvent::MediaToggled {
                muted,
                video_enabled,
            } => {
                self.muted = *muted;
                self.video_enabled = *video_enabled;
            }
            CallEvent::Roster(update) => self.roster.apply(update, &self.directory),
            _ => {}
        }
    }

    pub async fn dispose(self) {
        self.handle.dispose().await;
    }
}
