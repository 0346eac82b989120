use async_trait::async_trait;
use concierge_call::DeviceError;
use concierge_call::media::{LocalStream, MediaConstraints, MediaSource};

/// Capture source that always fails, like a denied permission prompt.
pub struct FailingMediaSource {
    error: DeviceError,
}

impl FailingMediaSource {
    pub fn new(error: DeviceError) -> Self {
        Self { error }
    }

    pub fn denied() -> Self {
        Self::new(DeviceError::PermissionDenied)
    }
}

#[async_trait]
impl MediaSource for FailingMediaSource {
    async fn acquire(&self, _constraints: MediaConstraints) -> Result<LocalStream, DeviceError> {
        Err(self.error.clone())
    }
}
