use crate::media::MediaKind;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::task::JoinHandle;
use tracing::debug;
use webrtc::track::track_remote::TrackRemote;

pub struct RemoteTrack {
    kind: MediaKind,
    id: String,
    packets: Arc<AtomicU64>,
    reader: JoinHandle<()>,
}

impl RemoteTrack {
    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn packets_received(&self) -> u64 {
        self.packets.load(Ordering::Relaxed)
    }
}

/// Remote media of one call. Tracks are appended as they arrive.
#[derive(Default)]
pub struct RemoteStream {
    tracks: Vec<RemoteTrack>,
}

impl RemoteStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a freshly announced remote track and start draining its RTP.
    pub fn add_track(&mut self, kind: MediaKind, track: Arc<TrackRemote>) {
        let id = track.id();
        let packets = Arc::new(AtomicU64::new(0));

        let counter = Arc::clone(&packets);
        let track_id = id.clone();
        let reader = tokio::spawn(async move {
            while track.read_rtp().await.is_ok() {
                counter.fetch_add(1, Ordering::Relaxed);
            }
            debug!("Remote track {} finished", track_id);
        });

        self.tracks.push(RemoteTrack {
            kind,
            id,
            packets,
            reader,
        });
    }

    pub fn tracks(&self) -> &[RemoteTrack] {
        &self.tracks
    }

    pub fn has_kind(&self, kind: MediaKind) -> bool {
        self.tracks.iter().any(|t| t.kind == kind)
    }

    pub fn stop(&mut self) {
        for track in self.tracks.drain(..) {
            track.reader.abort();
        }
    }
}

impl Drop for RemoteStream {
    fn drop(&mut self) {
        self.stop();
    }
}
