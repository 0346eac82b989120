use crate::call::{
    CallCommand, CallEvent, CallInput, CallStateMachine, CallStatus, Effect, EndReason,
    Notification, RosterUpdate,
};
use crate::client::CallHandle;
use crate::error::CallError;
use crate::media::{MediaKind, MediaSessionManager, MediaSource};
use crate::signaling::{ChannelEvent, SignalingOutput};
use crate::transport::{PeerSession, TransportConfig, TransportEvent};
use concierge_core::{
    IceCandidate, ParticipantId, RejectReason, Role, SessionDescription, SignalMessage,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use webrtc::ice_transport::ice_connection_state::RTCIceConnectionState;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;

/// Per-participant actor: owns the state machine, the media session and the
/// peer connection of the single active call.
pub struct CallEngine {
    local_id: ParticipantId,
    role: Role,
    machine: CallStateMachine,
    media: MediaSessionManager,
    peer: Option<PeerSession>,
    pending_candidates: Vec<IceCandidate>,
    generation: u64,
    last_status: (CallStatus, Option<ParticipantId>),
    signaling: Arc<dyn SignalingOutput>,
    transport_config: TransportConfig,
    command_rx: mpsc::Receiver<CallCommand>,
    channel_rx: mpsc::Receiver<ChannelEvent>,
    transport_rx: mpsc::Receiver<TransportEvent>,
    transport_tx: mpsc::Sender<TransportEvent>,
    event_tx: mpsc::UnboundedSender<CallEvent>,
}

impl CallEngine {
    /// Start the engine on the runtime and hand back its control surface.
    ///
    /// A customer engine only places calls: offers reaching it while idle are declined.
    pub fn spawn(
        local_id: ParticipantId,
        role: Role,
        signaling: Arc<dyn SignalingOutput>,
        channel_rx: mpsc::Receiver<ChannelEvent>,
        media_source: Arc<dyn MediaSource>,
        transport_config: TransportConfig,
    ) -> CallHandle {
        let (command_tx, command_rx) = mpsc::channel(64);
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (transport_tx, transport_rx) = mpsc::channel(256);

        let engine = Self {
            local_id: local_id.clone(),
            role,
            machine: CallStateMachine::new(),
            media: MediaSessionManager::new(media_source),
            peer: None,
            pending_candidates: Vec::new(),
            generation: 0,
            last_status: (CallStatus::Idle, None),
            signaling,
            transport_config,
            command_rx,
            channel_rx,
            transport_rx,
            transport_tx,
            event_tx,
        };

        let task = tokio::spawn(engine.run());
        CallHandle::new(local_id, command_tx, event_rx, Some(task))
    }

    async fn run(mut self) {
        info!("Call engine for {} started", self.local_id);

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => match cmd {
                    Some(CallCommand::Shutdown) => {
                        info!("Shutdown requested for {}", self.local_id);
                        break;
                    }
                    Some(c) => self.handle_command(c).await,
                    None => {
                        info!("Command channel closed. Shutting down call engine.");
                        break;
                    }
                },

                evt = self.channel_rx.recv() => match evt {
                    Some(e) => self.handle_channel_event(e).await,
                    None => {
                        warn!("Signaling channel closed unexpectedly");
                        break;
                    }
                },

                Some(evt) = self.transport_rx.recv() => self.handle_transport_event(evt).await,
            }
        }

        self.apply(CallInput::LocalEnd).await;
        info!("Call engine for {} finished", self.local_id);
    }

    async fn handle_command(&mut self, cmd: CallCommand) {
        match cmd {
            CallCommand::StartCall { target } => {
                if target == self.local_id {
                    self.notify(Notification::warning("Cannot call yourself"));
                    return;
                }
                self.apply(CallInput::Initiate { target }).await;
            }
            CallCommand::Accept => self.apply(CallInput::Accept).await,
            CallCommand::Reject => self.apply(CallInput::Reject).await,
            CallCommand::End => self.apply(CallInput::LocalEnd).await,

            CallCommand::ToggleMute => {
                let muted = self.media.toggle_mute();
                debug!("Microphone {}", if muted { "muted" } else { "unmuted" });
                self.emit_media_state();
            }

            CallCommand::ToggleVideo => {
                let enabled = self.media.toggle_video();
                debug!("Camera {}", if enabled { "enabled" } else { "disabled" });
                self.emit_media_state();
            }

            CallCommand::RemoveUser { user_id } => {
                info!("Requesting removal of {}", user_id);
                self.signaling
                    .send(SignalMessage::RemoveUser { user_id })
                    .await;
            }

            // handled by the run loop
            CallCommand::Shutdown => {}
        }
    }

    async fn handle_channel_event(&mut self, event: ChannelEvent) {
        match event {
            ChannelEvent::Connected => {
                self.emit(CallEvent::SignalingConnected);
                self.notify(Notification::info("Connected to signaling server"));
            }
            ChannelEvent::Disconnected => {
                self.emit(CallEvent::SignalingDisconnected);
                self.notify(Notification::warning(
                    "Disconnected from signaling server, reconnecting",
                ));
            }
            ChannelEvent::Error(e) => {
                self.notify(Notification::warning(format!("Signaling error: {}", e)));
            }
            ChannelEvent::Message(msg) => self.handle_signal(msg).await,
        }
    }

    async fn handle_signal(&mut self, msg: SignalMessage) {
        match msg {
            SignalMessage::Users { users } => {
                self.emit(CallEvent::Roster(RosterUpdate::Snapshot(users)));
            }
            SignalMessage::UserConnected { user_id } => {
                self.emit(CallEvent::Roster(RosterUpdate::Joined(user_id)));
            }
            SignalMessage::UserDisconnected { user_id } => {
                self.emit(CallEvent::Roster(RosterUpdate::Left(user_id.clone())));
                self.apply(CallInput::PeerLeft { peer: user_id }).await;
            }

            SignalMessage::Call { user_id, offer, .. } => {
                if self.role == Role::Customer && self.machine.status() == CallStatus::Idle {
                    info!("Declining call from {}: customers do not take calls", user_id);
                    self.send_reject(user_id, RejectReason::Rejected).await;
                    return;
                }
                self.apply(CallInput::OfferReceived {
                    from: user_id,
                    offer,
                })
                .await;
            }
            SignalMessage::CallAccepted {
                user_id, answer, ..
            } => {
                self.apply(CallInput::AnswerReceived {
                    from: user_id,
                    answer,
                })
                .await;
            }
            SignalMessage::CallRejected {
                user_id, reason, ..
            } => {
                self.apply(CallInput::RejectedByRemote {
                    from: user_id,
                    reason,
                })
                .await;
            }
            SignalMessage::IceCandidate {
                user_id, candidate, ..
            } => self.handle_remote_candidate(user_id, candidate).await,
            SignalMessage::EndCall { user_id, .. } => {
                self.apply(CallInput::RemoteEnd { from: user_id }).await;
            }

            SignalMessage::Register { .. } | SignalMessage::RemoveUser { .. } => {
                warn!("Unexpected '{}' frame from relay", msg.kind());
            }
        }
    }

    async fn handle_transport_event(&mut self, event: TransportEvent) {
        let current = self.peer.as_ref().map(|p| p.generation);
        if current != Some(event.generation()) {
            debug!(
                "Ignoring event from stale peer connection #{}",
                event.generation()
            );
            return;
        }

        match event {
            TransportEvent::CandidateGenerated(_, candidate) => {
                let Some(target) = self.machine.peer().cloned() else {
                    return;
                };
                self.signaling
                    .send(SignalMessage::IceCandidate {
                        user_id: self.local_id.clone(),
                        target,
                        candidate,
                    })
                    .await;
            }

            TransportEvent::RemoteTrack(_, track) => {
                let Some(kind) = MediaKind::from_codec_type(track.kind()) else {
                    warn!("Remote track {} has unknown kind", track.id());
                    return;
                };
                self.media.add_remote_track(kind, track);
                self.emit(CallEvent::RemoteTrackAdded { kind });
            }

            TransportEvent::IceStateChanged(_, state) => {
                if matches!(
                    state,
                    RTCIceConnectionState::Failed | RTCIceConnectionState::Disconnected
                ) {
                    warn!("ICE connection {:?}, ending call", state);
                    self.apply(CallInput::ConnectionFailed).await;
                }
            }

            TransportEvent::ConnectionStateChanged(_, state) => {
                if matches!(
                    state,
                    RTCPeerConnectionState::Failed | RTCPeerConnectionState::Closed
                ) {
                    warn!("Peer connection {:?}, ending call", state);
                    self.apply(CallInput::ConnectionFailed).await;
                }
            }
        }
    }

    async fn handle_remote_candidate(&mut self, from: ParticipantId, candidate: IceCandidate) {
        if self.machine.peer() != Some(&from) {
            debug!("Dropping ICE candidate from {} (not in a call with them)", from);
            return;
        }

        match self.peer.as_ref() {
            Some(session) if session.remote_description_applied() => {
                if let Err(e) = session.add_ice_candidate(&candidate).await {
                    warn!("Failed to add ICE candidate from {}: {:?}", from, e);
                }
            }
            _ => {
                debug!("Buffering early ICE candidate from {}", from);
                self.pending_candidates.push(candidate);
            }
        }
    }

    async fn apply(&mut self, input: CallInput) {
        match self.machine.apply(input) {
            Ok(effect) => self.execute(effect).await,
            Err(e) => {
                warn!("{}", e);
                self.notify(Notification::warning(e.to_string()));
            }
        }
    }

    async fn execute(&mut self, effect: Effect) {
        match effect {
            Effect::PlaceCall { target } => {
                info!("Calling {}", target);
                self.emit_status();
                if let Err(e) = self.place_call(target).await {
                    self.fail_setup(e).await;
                }
            }

            Effect::Ring { from } => {
                info!("Incoming call from {}", from);
                self.emit_status();
                self.emit(CallEvent::IncomingCall { from: from.clone() });
                self.notify(Notification::info(format!("Incoming call from {}", from)));
            }

            Effect::RejectBusy { caller } => {
                info!("Rejecting call from {} (busy)", caller);
                self.send_reject(caller.clone(), RejectReason::Busy).await;
                self.notify(Notification::info(format!(
                    "Missed call from {} while busy",
                    caller
                )));
            }

            Effect::ApplyAnswer { answer } => match self.apply_answer(&answer).await {
                Ok(()) => {
                    self.emit_status();
                    self.notify(Notification::info("Call connected"));
                }
                Err(e) => self.fail_setup(e).await,
            },

            Effect::Answer { caller, offer } => {
                info!("Accepting call from {}", caller);
                match self.answer_call(caller, &offer).await {
                    Ok(()) => {
                        self.emit_status();
                        self.notify(Notification::info("Call connected"));
                    }
                    Err(e) => self.fail_setup(e).await,
                }
            }

            Effect::Decline { caller } => {
                info!("Declining call from {}", caller);
                self.send_reject(caller, RejectReason::Rejected).await;
                self.release_call_resources().await;
                self.emit_status();
            }

            Effect::Teardown {
                peer,
                notify_remote,
                reason,
            } => {
                info!("Ending call with {} ({:?})", peer, reason);
                self.teardown(&peer, notify_remote).await;
                if let Some(notification) = end_notification(&peer, reason) {
                    self.notify(notification);
                }
            }

            Effect::Ignore => {}
        }
    }

    async fn place_call(&mut self, target: ParticipantId) -> Result<(), CallError> {
        self.media.acquire_local().await?;
        self.open_peer_session(target.clone()).await?;

        let offer = {
            let Some(session) = self.peer.as_ref() else {
                return Err(CallError::Negotiation("peer session missing".into()));
            };
            if let Some(stream) = self.media.local() {
                session.add_local_stream(stream).await?;
            }
            session.create_offer().await?
        };

        self.signaling
            .send(SignalMessage::Call {
                user_id: self.local_id.clone(),
                target,
                offer,
            })
            .await;
        Ok(())
    }

    async fn answer_call(
        &mut self,
        caller: ParticipantId,
        offer: &SessionDescription,
    ) -> Result<(), CallError> {
        self.media.acquire_local().await?;
        self.open_peer_session(caller.clone()).await?;

        let answer = {
            let Some(session) = self.peer.as_mut() else {
                return Err(CallError::Negotiation("peer session missing".into()));
            };
            if let Some(stream) = self.media.local() {
                session.add_local_stream(stream).await?;
            }
            session.accept_offer(offer).await?
        };

        self.signaling
            .send(SignalMessage::CallAccepted {
                user_id: self.local_id.clone(),
                target: caller,
                answer,
            })
            .await;
        self.flush_pending_candidates().await;
        Ok(())
    }

    async fn apply_answer(
        &mut self,
        answer: &SessionDescription,
    ) -> Result<(), CallError> {
        let Some(session) = self.peer.as_mut() else {
            return Err(CallError::Negotiation("answer without peer session".into()));
        };
        session.apply_answer(answer).await?;
        self.flush_pending_candidates().await;
        Ok(())
    }

    async fn open_peer_session(&mut self, remote: ParticipantId) -> Result<(), CallError> {
        if let Some(old) = self.peer.take() {
            let _ = old.close().await;
        }

        self.generation += 1;
        let session = PeerSession::new(
            remote,
            self.generation,
            &self.transport_config,
            self.transport_tx.clone(),
        )
        .await?;
        self.peer = Some(session);
        Ok(())
    }

    async fn flush_pending_candidates(&mut self) {
        let Some(session) = self.peer.as_ref() else {
            return;
        };
        if !session.remote_description_applied() {
            return;
        }

        let pending = std::mem::take(&mut self.pending_candidates);
        if !pending.is_empty() {
            debug!("Applying {} buffered ICE candidates", pending.len());
        }
        for candidate in pending {
            if let Err(e) = session.add_ice_candidate(&candidate).await {
                warn!("Failed to add buffered ICE candidate: {:?}", e);
            }
        }
    }

    async fn fail_setup(&mut self, e: CallError) {
        error!("Call setup failed: {}", e);
        self.notify(Notification::error(e.to_string()));

        match self.machine.apply(CallInput::SetupFailed) {
            Ok(Effect::Teardown {
                peer,
                notify_remote,
                ..
            }) => self.teardown(&peer, notify_remote).await,
            _ => {
                self.release_call_resources().await;
                self.emit_status();
            }
        }
    }

    async fn teardown(&mut self, peer: &ParticipantId, notify_remote: bool) {
        if notify_remote {
            self.signaling
                .send(SignalMessage::EndCall {
                    user_id: self.local_id.clone(),
                    target: peer.clone(),
                })
                .await;
        }
        self.release_call_resources().await;
        self.emit_status();
    }

    async fn release_call_resources(&mut self) {
        let had_media = self.media.teardown();
        if let Some(session) = self.peer.take() {
            if let Err(e) = session.close().await {
                warn!("Failed to close peer connection: {:?}", e);
            }
        }
        self.pending_candidates.clear();

        if had_media {
            self.emit_media_state();
        }
    }

    async fn send_reject(&self, caller: ParticipantId, reason: RejectReason) {
        self.signaling
            .send(SignalMessage::CallRejected {
                user_id: self.local_id.clone(),
                target: caller,
                reason,
            })
            .await;
    }

    fn emit_status(&mut self) {
        let current = (self.machine.status(), self.machine.peer().cloned());
        if current == self.last_status {
            return;
        }
        self.last_status = current.clone();
        self.emit(CallEvent::StatusChanged {
            status: current.0,
            peer: current.1,
        });
    }

    fn emit_media_state(&self) {
        self.emit(CallEvent::MediaToggled {
            muted: self.media.is_muted(),
            video_enabled: self.media.is_video_enabled(),
        });
    }

    fn notify(&self, notification: Notification) {
        self.emit(CallEvent::Notification(notification));
    }

    fn emit(&self, event: CallEvent) {
        let _ = self.event_tx.send(event);
    }
}

fn end_notification(peer: &ParticipantId, reason: EndReason) -> Option<Notification> {
    let notification = match reason {
        EndReason::LocalHangup => Notification::info("Call ended"),
        EndReason::RemoteHangup => Notification::info(format!("{} ended the call", peer)),
        EndReason::Rejected(RejectReason::Busy) => {
            Notification::warning(format!("{} is busy", peer))
        }
        EndReason::Rejected(RejectReason::Rejected) => {
            Notification::warning(format!("{} declined the call", peer))
        }
        EndReason::PeerLeft => Notification::warning(format!("{} disconnected", peer)),
        EndReason::ConnectionLost => Notification::error("Connection lost"),
        // fail_setup reports its own error
        EndReason::SetupFailed => return None,
    };
    Some(notification)
}
