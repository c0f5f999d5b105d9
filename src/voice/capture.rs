//! Platform audio-capture capability

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Microphone permission denied")]
    PermissionDenied,
    #[error("Audio device unavailable: {0}")]
    Unavailable(String),
    #[error("Capture failed to start: {0}")]
    Start(String),
}

/// Grants access to an audio input
#[async_trait]
pub trait AudioCapture: Send + Sync {
    /// Ask for the microphone; may suspend on a permission prompt
    async fn request_microphone(&self) -> Result<Box<dyn AudioStream>, CaptureError>;
}

/// An opened audio input
pub trait AudioStream: Send {
    /// Start capturing. Chunks arrive about every `timeslice`; the channel
    /// closes once the capture has confirmed stop.
    fn start(&mut self, timeslice: Duration) -> Result<mpsc::Receiver<Bytes>, CaptureError>;

    /// Request stop. Pending data is flushed before the channel closes.
    fn stop(&mut self);

    /// Release the underlying device
    fn release(&mut self);

    fn media_type(&self) -> &str {
        super::WEBM_MEDIA_TYPE
    }
}

#[async_trait]
impl<T: AudioCapture + ?Sized> AudioCapture for Arc<T> {
    async fn request_microphone(&self) -> Result<Box<dyn AudioStream>, CaptureError> {
        (**self).request_microphone().await
    }
}
