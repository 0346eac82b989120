use crate::error::DeviceError;
use crate::media::{LocalStream, MediaConstraints, MediaKind, MediaSource, RemoteStream};
use std::sync::Arc;
use tracing::{debug, info};
use webrtc::track::track_remote::TrackRemote;

/// Local capture and remote sinks of the one active call.
pub struct MediaSessionManager {
    source: Arc<dyn MediaSource>,
    constraints: MediaConstraints,
    local: Option<LocalStream>,
    remote: Option<RemoteStream>,
    muted: bool,
    video_enabled: bool,
}

impl MediaSessionManager {
    pub fn new(source: Arc<dyn MediaSource>) -> Self {
        Self {
            source,
            constraints: MediaConstraints::default(),
            local: None,
            remote: None,
            muted: false,
            video_enabled: true,
        }
    }

    /// Acquire camera and microphone, stopping whatever was held before.
    pub async fn acquire_local(&mut self) -> Result<&LocalStream, DeviceError> {
        self.release_local();

        let stream = self.source.acquire(self.constraints).await?;
        stream.set_enabled(MediaKind::Audio, !self.muted);
        stream.set_enabled(MediaKind::Video, self.video_enabled);

        info!(
            "Local stream {} ready with {} tracks",
            stream.id(),
            stream.tracks().len()
        );
        let stream = self.local.insert(stream);
        Ok(&*stream)
    }

    pub fn local(&self) -> Option<&LocalStream> {
        self.local.as_ref()
    }

    pub fn remote(&self) -> Option<&RemoteStream> {
        self.remote.as_ref()
    }

    /// Append a remote track to the session's single remote stream.
    pub fn add_remote_track(&mut self, kind: MediaKind, track: Arc<TrackRemote>) {
        debug!("Remote {:?} track {} attached", kind, track.id());
        self.remote
            .get_or_insert_with(RemoteStream::new)
            .add_track(kind, track);
    }

    /// Returns the new muted state.
    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        if let Some(local) = &self.local {
            local.set_enabled(MediaKind::Audio, !self.muted);
        }
        self.muted
    }

    /// Returns whether video is now enabled.
    pub fn toggle_video(&mut self) -> bool {
        self.video_enabled = !self.video_enabled;
        if let Some(local) = &self.local {
            local.set_enabled(MediaKind::Video, self.video_enabled);
        }
        self.video_enabled
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn is_video_enabled(&self) -> bool {
        self.video_enabled
    }

    pub fn live_local_tracks(&self) -> usize {
        self.local.as_ref().map_or(0, LocalStream::live_track_count)
    }

    /// Stop every local and remote track and reset toggles. Safe to repeat.
    ///
    /// Returns whether anything was actually released.
    pub fn teardown(&mut self) -> bool {
        let had_local = self.release_local();
        let had_remote = match self.remote.take() {
            Some(mut remote) => {
                remote.stop();
                true
            }
            None => false,
        };

        self.muted = false;
        self.video_enabled = true;

        had_local || had_remote
    }

    fn release_local(&mut self) -> bool {
        match self.local.take() {
            Some(mut local) => {
                debug!("Stopping local stream {}", local.id());
                local.stop();
                true
            }
            None => false,
        }
    }
}
