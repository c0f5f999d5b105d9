//! Voice recorder state machine

use super::{AudioCapture, AudioClip, AudioStream, CaptureError, RecordingState};
use bytes::Bytes;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Interval at which the capture delivers chunks
pub const CHUNK_TIMESLICE: Duration = Duration::from_millis(100);

/// Shown in the error slot when the microphone cannot be opened
pub const MICROPHONE_DENIED: &str = "Microphone access denied. Please allow microphone permissions.";

struct ActiveRecording {
    stream: Box<dyn AudioStream>,
    /// Drains the chunk channel until the capture confirms stop
    collector: JoinHandle<Vec<Bytes>>,
}

/// Records one voice clip at a time
pub struct VoiceRecorder<C: AudioCapture> {
    capture: C,
    state_tx: watch::Sender<RecordingState>,
    error: Option<String>,
    active: Option<ActiveRecording>,
}

impl<C: AudioCapture> VoiceRecorder<C> {
    pub fn new(capture: C) -> Self {
        let (state_tx, _) = watch::channel(RecordingState::Idle);
        Self {
            capture,
            state_tx,
            error: None,
            active: None,
        }
    }

    pub fn state(&self) -> RecordingState {
        *self.state_tx.borrow()
    }

    /// Observe state changes (e.g. to disable controls while processing)
    #[allow(dead_code)] // Used in tests
    pub fn subscribe(&self) -> watch::Receiver<RecordingState> {
        self.state_tx.subscribe()
    }

    /// Last permission error, cleared by the next `start_recording`
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Open the microphone and start buffering.
    ///
    /// Does nothing unless idle. On denial the error slot is set and the
    /// recorder stays idle.
    pub async fn start_recording(&mut self) {
        let state = self.state();
        if state != RecordingState::Idle {
            tracing::debug!(?state, "Recording already active, ignoring start");
            return;
        }

        self.error = None;
        match self.open().await {
            Ok(active) => {
                self.active = Some(active);
                self.set_state(RecordingState::Recording);
                tracing::info!("Recording started");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not open microphone");
                self.error = Some(MICROPHONE_DENIED.to_string());
                self.set_state(RecordingState::Idle);
            }
        }
    }

    async fn open(&self) -> Result<ActiveRecording, CaptureError> {
        let mut stream = self.capture.request_microphone().await?;
        let mut chunks = match stream.start(CHUNK_TIMESLICE) {
            Ok(chunks) => chunks,
            Err(e) => {
                stream.release();
                return Err(e);
            }
        };

        let collector = tokio::spawn(async move {
            let mut collected = Vec::new();
            while let Some(chunk) = chunks.recv().await {
                if !chunk.is_empty() {
                    collected.push(chunk);
                }
            }
            collected
        });

        Ok(ActiveRecording { stream, collector })
    }

    /// Finish the recording and return the clip.
    ///
    /// Returns `None` without any state change unless recording.
    pub async fn stop_recording(&mut self) -> Option<AudioClip> {
        if self.state() != RecordingState::Recording {
            return None;
        }
        let mut active = self.active.take()?;

        self.set_state(RecordingState::Processing);
        active.stream.stop();

        let chunks = match active.collector.await {
            Ok(chunks) => chunks,
            Err(e) => {
                tracing::warn!(error = %e, "Audio collector task failed");
                Vec::new()
            }
        };
        active.stream.release();

        let clip = AudioClip::from_chunks(&chunks, active.stream.media_type());
        tracing::info!(bytes = clip.len(), chunks = chunks.len(), "Recording finished");
        self.set_state(RecordingState::Idle);
        Some(clip)
    }

    fn set_state(&self, state: RecordingState) {
        self.state_tx.send_replace(state);
    }
}

impl<C: AudioCapture> Drop for VoiceRecorder<C> {
    fn drop(&mut self) {
        if let Some(mut active) = self.active.take() {
            active.stream.stop();
            active.stream.release();
            active.collector.abort();
        }
    }
}
