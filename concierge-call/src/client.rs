use crate::call::{CallCommand, CallEngine, CallEvent};
use crate::config::CallConfig;
use crate::error::CallError;
use crate::media::MediaSource;
use crate::signaling::{Registration, SignalingChannel};
use concierge_core::ParticipantId;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

pub struct CallClient;

impl CallClient {
    /// Open the signaling channel and start a call engine on top of it.
    pub fn connect(
        config: &CallConfig,
        registration: Registration,
        media_source: Arc<dyn MediaSource>,
    ) -> CallHandle {
        let user_id = registration.user_id.clone();
        let role = registration.role;
        let (signaling, channel_rx) =
            SignalingChannel::spawn(config.relay_url.clone(), registration, config.retry);

        CallEngine::spawn(
            user_id,
            role,
            Arc::new(signaling),
            channel_rx,
            media_source,
            config.transport.clone(),
        )
    }
}

/// Control surface of a running call engine.
pub struct CallHandle {
    local_id: ParticipantId,
    commands: mpsc::Sender<CallCommand>,
    events: mpsc::UnboundedReceiver<CallEvent>,
    task: Option<JoinHandle<()>>,
}

impl CallHandle {
    pub(crate) fn new(
        local_id: ParticipantId,
        commands: mpsc::Sender<CallCommand>,
        events: mpsc::UnboundedReceiver<CallEvent>,
        task: Option<JoinHandle<()>>,
    ) -> Self {
        Self {
            local_id,
            commands,
            events,
            task,
        }
    }

    pub fn local_id(&self) -> &ParticipantId {
        &self.local_id
    }

    pub async fn send(&self, cmd: CallCommand) -> Result<(), CallError> {
        self.commands
            .send(cmd)
            .await
            .map_err(|_| CallError::EngineStopped)
    }

    /// `None` once the engine has stopped and every event was drained.
    pub async fn next_event(&mut self) -> Option<CallEvent> {
        self.events.recv().await
    }

    /// End any active call, stop the engine and wait for it to finish.
    pub async fn dispose(mut self) {
        let _ = self.commands.send(CallCommand::Shutdown).await;
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("Call engine task for {} failed: {:?}", self.local_id, e);
            }
        }
    }
}
