use concierge_core::IceCandidate;
use std::sync::Arc;
use webrtc::ice_transport::ice_connection_state::RTCIceConnectionState;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::track::track_remote::TrackRemote;

/// События, которые PeerConnection генерирует для движка звонков.
///
/// Первое поле каждого варианта - поколение сессии; события закрытых сессий отбрасываются.
pub enum TransportEvent {
    /// Найден локальный ICE-кандидат, его нужно переслать собеседнику.
    CandidateGenerated(u64, IceCandidate),

    /// Пришел очередной удаленный трек (аудио или видео).
    RemoteTrack(u64, Arc<TrackRemote>),

    IceStateChanged(u64, RTCIceConnectionState),

    ConnectionStateChanged(u64, RTCPeerConnectionState),
}

impl TransportEvent {
    pub fn generation(&self) -> u64 {
        match self {
            TransportEvent::CandidateGenerated(generation, _)
            | TransportEvent::RemoteTrack(generation, _)
            | TransportEvent::IceStateChanged(generation, _)
            | TransportEvent::ConnectionStateChanged(generation, _) => *generation,
        }
    }
}
