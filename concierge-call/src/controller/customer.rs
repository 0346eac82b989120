use crate::call::{CallCommand, CallEvent, CallStatus};
use crate::client::{CallClient, CallHandle};
use crate::config::CallConfig;
use crate::error::CallError;
use crate::media::MediaSource;
use crate::signaling::Registration;
use concierge_core::{ParticipantId, Role, RoleDirectory};
use std::sync::Arc;

/// Website visitor side: one button that calls the support desk.
pub struct CustomerController {
    handle: CallHandle,
    directory: RoleDirectory,
    status: CallStatus,
    connected: bool,
    expanded: bool,
    muted: bool,
    video_enabled: bool,
}

impl CustomerController {
    /// Register under a freshly generated `user_` id.
    pub fn connect(config: &CallConfig, media_source: Arc<dyn MediaSource>) -> Self {
        let registration = Registration::new(ParticipantId::generate_customer(), Role::Customer);
        let handle = CallClient::connect(config, registration, media_source);
        Self::new(handle, config.directory.clone())
    }

    pub fn new(handle: CallHandle, directory: RoleDirectory) -> Self {
        Self {
            handle,
            directory,
            status: CallStatus::Idle,
            connected: false,
            expanded: false,
            muted: false,
            video_enabled: true,
        }
    }

    pub fn id(&self) -> &ParticipantId {
        self.handle.local_id()
    }

    pub async fn call(&self) -> Result<(), CallError> {
        self.handle
            .send(CallCommand::StartCall {
                target: self.directory.support().clone(),
            })
            .await
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

    /// Purely presentational; the call is not affected.
    pub fn toggle_expanded(&mut self) -> bool {
        self.expanded = !self.expanded;
        self.expanded
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
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
            CallEvent::StatusChanged { status, .. } => self.status = *status,
            CallEvent::MediaToggled {
                muted,
                video_enabled,
            } => {
                self.muted = *muted;
                self.video_enabled = *video_enabled;
            }
            _ => {}
        }
    }

    pub async fn dispose(self) {
        self.handle.dispose().await;
    }
}
