use crate::error::DeviceError;
use crate::media::{LocalStream, LocalTrack, MediaKind};
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info};
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8};
use webrtc::media::Sample;
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

/// Opus TOC byte for a 20 ms silent frame.
const OPUS_SILENCE: &[u8] = &[0xf8, 0xff, 0xfe];
const AUDIO_FRAME: Duration = Duration::from_millis(20);

/// Smallest VP8 key frame header; receivers only count packets.
const VP8_PLACEHOLDER: &[u8] = &[0x10, 0x02, 0x00, 0x9d, 0x01, 0x2a, 0x02, 0x00, 0x02, 0x00];
const VIDEO_FRAME: Duration = Duration::from_millis(33);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaConstraints {
    pub audio: bool,
    pub video: bool,
}

impl Default for MediaConstraints {
    fn default() -> Self {
        Self {
            audio: true,
            video: true,
        }
    }
}

/// Platform capture API (camera + microphone).
#[async_trait]
pub trait MediaSource: Send + Sync {
    async fn acquire(&self, constraints: MediaConstraints) -> Result<LocalStream, DeviceError>;
}

/// Capture source without hardware: silent Opus audio and placeholder VP8 video.
///
/// Keeps track of what it handed out so callers can check nothing leaked.
#[derive(Default)]
pub struct SyntheticMediaSource {
    issued: Mutex<Vec<Arc<AtomicBool>>>,
    streams: AtomicU64,
}

impl SyntheticMediaSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracks handed out and not stopped yet.
    pub fn live_tracks(&self) -> usize {
        match self.issued.lock() {
            Ok(issued) => issued
                .iter()
                .filter(|stopped| !stopped.load(Ordering::Relaxed))
                .count(),
            Err(poisoned) => poisoned
                .into_inner()
                .iter()
                .filter(|stopped| !stopped.load(Ordering::Relaxed))
                .count(),
        }
    }

    fn remember(&self, track: &LocalTrack) {
        let mut issued = match self.issued.lock() {
            Ok(issued) => issued,
            Err(poisoned) => poisoned.into_inner(),
        };
        issued.retain(|stopped| !stopped.load(Ordering::Relaxed));
        issued.push(track.stopped_flag());
    }

    fn sample_track(
        kind: MediaKind,
        stream_id: &str,
        frame: &'static [u8],
        every: Duration,
    ) -> LocalTrack {
        let (capability, label) = match kind {
            MediaKind::Audio => (
                RTCRtpCodecCapability {
                    mime_type: MIME_TYPE_OPUS.to_owned(),
                    clock_rate: 48_000,
                    channels: 2,
                    ..Default::default()
                },
                "audio",
            ),
            MediaKind::Video => (
                RTCRtpCodecCapability {
                    mime_type: MIME_TYPE_VP8.to_owned(),
                    clock_rate: 90_000,
                    ..Default::default()
                },
                "video",
            ),
        };

        let track = Arc::new(TrackLocalStaticSample::new(
            capability,
            label.to_owned(),
            stream_id.to_owned(),
        ));
        let local = LocalTrack::new(kind, Arc::clone(&track));

        let enabled = local.enabled_flag();
        let pump = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                if !enabled.load(Ordering::Relaxed) {
                    continue;
                }
                let sample = Sample {
                    data: Bytes::from_static(frame),
                    duration: every,
                    ..Default::default()
                };
                if let Err(e) = track.write_sample(&sample).await {
                    debug!("Synthetic {:?} frame dropped: {}", kind, e);
                }
            }
        });

        local.with_pump(pump)
    }
}

#[async_trait]
impl MediaSource for SyntheticMediaSource {
    async fn acquire(&self, constraints: MediaConstraints) -> Result<LocalStream, DeviceError> {
        let n = self.streams.fetch_add(1, Ordering::Relaxed);
        let stream_id = format!("synthetic-{}", n);

        let mut tracks = Vec::new();
        if constraints.audio {
            tracks.push(Self::sample_track(
                MediaKind::Audio,
                &stream_id,
                OPUS_SILENCE,
                AUDIO_FRAME,
            ));
        }
        if constraints.video {
            tracks.push(Self::sample_track(
                MediaKind::Video,
                &stream_id,
                VP8_PLACEHOLDER,
                VIDEO_FRAME,
            ));
        }

        for track in &tracks {
            self.remember(track);
        }

        info!("Acquired {} synthetic tracks ({})", tracks.len(), stream_id);
        Ok(LocalStream::new(stream_id, tracks))
    }
}
