use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::task::JoinHandle;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Audio,
    Video,
}

impl MediaKind {
    pub fn from_codec_type(kind: RTPCodecType) -> Option<Self> {
        match kind {
            RTPCodecType::Audio => Some(MediaKind::Audio),
            RTPCodecType::Video => Some(MediaKind::Video),
            _ => None,
        }
    }
}

/// One captured track. `enabled` is the mute switch; `stop` releases the device.
pub struct LocalTrack {
    kind: MediaKind,
    track: Arc<TrackLocalStaticSample>,
    enabled: Arc<AtomicBool>,
    stopped: Arc<AtomicBool>,
    pump: Option<JoinHandle<()>>,
}

impl LocalTrack {
    pub fn new(kind: MediaKind, track: Arc<TrackLocalStaticSample>) -> Self {
        Self {
            kind,
            track,
            enabled: Arc::new(AtomicBool::new(true)),
            stopped: Arc::new(AtomicBool::new(false)),
            pump: None,
        }
    }

    /// Attach the task that feeds frames into the track. Aborted on `stop`.
    pub fn with_pump(mut self, pump: JoinHandle<()>) -> Self {
        self.pump = Some(pump);
        self
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn track(&self) -> Arc<TrackLocalStaticSample> {
        Arc::clone(&self.track)
    }

    pub fn enabled_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.enabled)
    }

    pub fn stopped_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stopped)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn is_live(&self) -> bool {
        !self.stopped.load(Ordering::Relaxed)
    }

    pub fn stop(&mut self) {
        self.stopped.store(true, Ordering::Relaxed);
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
    }
}

impl Drop for LocalTrack {
    fn drop(&mut self) {
        self.stop();
    }
}

pub struct LocalStream {
    id: String,
    tracks: Vec<LocalTrack>,
}

impl LocalStream {
    pub fn new(id: impl Into<String>, tracks: Vec<LocalTrack>) -> Self {
        Self {
            id: id.into(),
            tracks,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn tracks(&self) -> &[LocalTrack] {
        &self.tracks
    }

    /// Flip `enabled` on every track of `kind`. Tracks keep running.
    pub fn set_enabled(&self, kind: MediaKind, enabled: bool) {
        self.tracks
            .iter()
            .filter(|t| t.kind() == kind)
            .for_each(|t| t.set_enabled(enabled));
    }

    pub fn live_track_count(&self) -> usize {
        self.tracks.iter().filter(|t| t.is_live()).count()
    }

    pub fn stop(&mut self) {
        for track in &mut self.tracks {
            track.stop();
        }
    }
}
