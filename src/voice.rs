//! Voice input
//!
//! A three-state recorder (`idle → recording → processing → idle`) on top of
//! a platform audio-capture capability.

mod capture;
mod file_capture;
mod recorder;

pub use capture::{AudioCapture, AudioStream, CaptureError};
pub use file_capture::FileCapture;
pub use recorder::{VoiceRecorder, CHUNK_TIMESLICE, MICROPHONE_DENIED};

use bytes::{Bytes, BytesMut};
use serde::Serialize;

/// Media type produced by browser-style recorders
pub const WEBM_MEDIA_TYPE: &str = "audio/webm";

const RECORDING_FILE_NAME: &str = "recording.webm";

/// Recorder lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordingState {
    #[default]
    Idle,
    Recording,
    /// Capture is finalizing; controls should be disabled
    Processing,
}

/// A finalized recording ready for transcription
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub bytes: Bytes,
    pub media_type: String,
    pub file_name: String,
}

impl AudioClip {
    #[allow(dead_code)] // Used in tests
    pub fn webm(bytes: Bytes) -> Self {
        Self {
            bytes,
            media_type: WEBM_MEDIA_TYPE.to_string(),
            file_name: RECORDING_FILE_NAME.to_string(),
        }
    }

    /// Join captured chunks in order
    pub fn from_chunks(chunks: &[Bytes], media_type: &str) -> Self {
        let mut joined = BytesMut::with_capacity(chunks.iter().map(Bytes::len).sum());
        for chunk in chunks {
            joined.extend_from_slice(chunk);
        }
        Self {
            bytes: joined.freeze(),
            media_type: media_type.to_string(),
            file_name: RECORDING_FILE_NAME.to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
