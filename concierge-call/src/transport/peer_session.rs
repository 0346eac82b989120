use crate::media::LocalStream;
use crate::transport::transport_config::TransportConfig;
use crate::transport::transport_event::TransportEvent;
use anyhow::{Context, Result, bail};
use concierge_core::{IceCandidate, ParticipantId, SdpKind, SessionDescription};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_connection_state::RTCIceConnectionState;
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::rtp_receiver::RTCRtpReceiver;
use webrtc::rtp_transceiver::RTCRtpTransceiver;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_remote::TrackRemote;

/// WebRTC соединение одного звонка. Новый звонок всегда создает новую сессию.
pub struct PeerSession {
    pub remote: ParticipantId,
    pub generation: u64,
    peer_connection: Arc<RTCPeerConnection>,
    remote_description_applied: bool,
}

impl PeerSession {
    /// Инициализация нового WebRTC соединения.
    /// event_tx - канал, в который соединение отправляет события для движка звонков.
    pub async fn new(
        remote: ParticipantId,
        generation: u64,
        config: &TransportConfig,
        event_tx: mpsc::Sender<TransportEvent>,
    ) -> Result<Self> {
        let mut m = MediaEngine::default();
        m.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut m)?;

        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: config
                .ice_servers
                .iter()
                .map(|server| RTCIceServer {
                    urls: server.urls.clone(),
                    username: server.username.clone().unwrap_or_default(),
                    credential: server.credential.clone().unwrap_or_default(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        };

        let peer_connection = Arc::new(api.new_peer_connection(rtc_config).await?);

        let state_tx = event_tx.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let tx = state_tx.clone();
                Box::pin(async move {
                    info!("Peer connection #{} state: {:?}", generation, s);
                    let _ = tx
                        .send(TransportEvent::ConnectionStateChanged(generation, s))
                        .await;
                })
            },
        ));

        let ice_state_tx = event_tx.clone();
        peer_connection.on_ice_connection_state_change(Box::new(
            move |s: RTCIceConnectionState| {
                let tx = ice_state_tx.clone();
                Box::pin(async move {
                    info!("ICE connection #{} state: {:?}", generation, s);
                    let _ = tx
                        .send(TransportEvent::IceStateChanged(generation, s))
                        .await;
                })
            },
        ));

        // Trickle ICE: локальные кандидаты уходят собеседнику через relay
        let ice_tx = event_tx.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();
            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                let candidate = IceCandidate {
                    candidate: init.candidate,
                    sdp_mid: init.sdp_mid,
                    sdp_m_line_index: init.sdp_mline_index,
                    username_fragment: init.username_fragment,
                };
                let _ = tx
                    .send(TransportEvent::CandidateGenerated(generation, candidate))
                    .await;
            })
        }));

        let track_tx = event_tx;
        peer_connection.on_track(Box::new(
            move |track: Arc<TrackRemote>,
                  _receiver: Arc<RTCRtpReceiver>,
                  _transceiver: Arc<RTCRtpTransceiver>| {
                let tx = track_tx.clone();
                Box::pin(async move {
                    debug!("Remote {:?} track on #{}", track.kind(), generation);
                    let _ = tx.send(TransportEvent::RemoteTrack(generation, track)).await;
                })
            },
        ));

        Ok(Self {
            remote,
            generation,
            peer_connection,
            remote_description_applied: false,
        })
    }

    /// Добавить все локальные треки в соединение.
    pub async fn add_local_stream(&self, stream: &LocalStream) -> Result<()> {
        for local in stream.tracks() {
            let track: Arc<dyn TrackLocal + Send + Sync> = local.track();
            let rtp_sender = self
                .peer_connection
                .add_track(track)
                .await
                .with_context(|| format!("Failed to add {:?} track", local.kind()))?;

            // RTCP нужно вычитывать, иначе интерцепторы не работают
            tokio::spawn(async move {
                let mut rtcp_buf = vec![0u8; 1500];
                while rtp_sender.read(&mut rtcp_buf).await.is_ok() {}
            });
        }
        Ok(())
    }

    /// Создать SDP Offer и установить его как LocalDescription.
    pub async fn create_offer(&self) -> Result<SessionDescription> {
        let offer = self.peer_connection.create_offer(None).await?;
        self.peer_connection
            .set_local_description(offer.clone())
            .await?;
        Ok(SessionDescription::offer(offer.sdp))
    }

    /// Применить удаленный Offer и ответить локальным Answer.
    pub async fn accept_offer(&mut self, offer: &SessionDescription) -> Result<SessionDescription> {
        if offer.kind != SdpKind::Offer {
            bail!("expected an SDP offer, got {:?}", offer.kind);
        }

        let desc = RTCSessionDescription::offer(offer.sdp.clone())?;
        self.peer_connection
            .set_remote_description(desc)
            .await
            .context("Failed to apply remote offer")?;
        self.remote_description_applied = true;

        let answer = self.peer_connection.create_answer(None).await?;
        self.peer_connection
            .set_local_description(answer.clone())
            .await?;
        Ok(SessionDescription::answer(answer.sdp))
    }

    /// Применить удаленный Answer (сторона звонящего).
    pub async fn apply_answer(&mut self, answer: &SessionDescription) -> Result<()> {
        if answer.kind != SdpKind::Answer {
            bail!("expected an SDP answer, got {:?}", answer.kind);
        }

        let desc = RTCSessionDescription::answer(answer.sdp.clone())?;
        self.peer_connection
            .set_remote_description(desc)
            .await
            .context("Failed to apply remote answer")?;
        self.remote_description_applied = true;
        Ok(())
    }

    pub fn remote_description_applied(&self) -> bool {
        self.remote_description_applied
    }

    /// Добавить удаленного ICE-кандидата (Trickle ICE).
    pub async fn add_ice_candidate(&self, candidate: &IceCandidate) -> Result<()> {
        let init = RTCIceCandidateInit {
            candidate: candidate.candidate.clone(),
            sdp_mid: candidate.sdp_mid.clone(),
            sdp_mline_index: candidate.sdp_m_line_index,
            username_fragment: candidate.username_fragment.clone(),
        };
        self.peer_connection
            .add_ice_candidate(init)
            .await
            .context("Failed to add ICE candidate")?;
        Ok(())
    }

    /// Закрыть WebRTC соединение
    pub async fn close(&self) -> Result<()> {
        self.peer_connection.close().await?;
        Ok(())
    }
}
