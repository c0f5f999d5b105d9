//! Capture device that replays an audio file
//!
//! Stands in for a microphone on hosts without one: the file is delivered in
//! fixed-size chunks at the requested timeslice, and whatever has not been
//! delivered yet is flushed when the recording stops.

use super::{AudioCapture, AudioStream, CaptureError, WEBM_MEDIA_TYPE};
use async_trait::async_trait;
use bytes::Bytes;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

const DEFAULT_CHUNK_SIZE: usize = 16 * 1024;

/// File-backed audio capture
#[derive(Debug, Clone)]
pub struct FileCapture {
    path: PathBuf,
    chunk_size: usize,
}

impl FileCapture {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    #[allow(dead_code)] // Used in tests
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }
}

#[async_trait]
impl AudioCapture for FileCapture {
    async fn request_microphone(&self) -> Result<Box<dyn AudioStream>, CaptureError> {
        let data = tokio::fs::read(&self.path)
            .await
            .map_err(|e| CaptureError::Unavailable(format!("{}: {e}", self.path.display())))?;

        let media_type = mime_guess::from_path(&self.path)
            .first()
            .filter(|m| m.type_() == mime_guess::mime::AUDIO)
            .map_or_else(|| WEBM_MEDIA_TYPE.to_string(), |m| m.essence_str().to_string());

        Ok(Box::new(FileStream {
            data: Bytes::from(data),
            chunk_size: self.chunk_size,
            media_type,
            stop_tx: None,
        }))
    }
}

struct FileStream {
    data: Bytes,
    chunk_size: usize,
    media_type: String,
    stop_tx: Option<oneshot::Sender<()>>,
}

impl AudioStream for FileStream {
    fn start(&mut self, timeslice: Duration) -> Result<mpsc::Receiver<Bytes>, CaptureError> {
        if self.stop_tx.is_some() {
            return Err(CaptureError::Start("stream already started".to_string()));
        }

        let (chunk_tx, chunk_rx) = mpsc::channel(64);
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let data = self.data.clone();
        let chunk_size = self.chunk_size;

        tokio::spawn(async move {
            let mut offset = 0;
            let mut ticker = tokio::time::interval(timeslice);
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {
                        if offset >= data.len() {
                            continue;
                        }
                        let end = (offset + chunk_size).min(data.len());
                        if chunk_tx.send(data.slice(offset..end)).await.is_err() {
                            return;
                        }
                        offset = end;
                    }
                }
            }

            if offset < data.len() {
                let _ = chunk_tx.send(data.slice(offset..)).await;
            }
        });

        self.stop_tx = Some(stop_tx);
        Ok(chunk_rx)
    }

    fn stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
    }

    fn release(&mut self) {
        self.stop();
    }

    fn media_type(&self) -> &str {
        &self.media_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voice::{RecordingState, VoiceRecorder, MICROPHONE_DENIED};

    #[tokio::test]
    async fn test_file_is_delivered_in_full() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("question.webm");
        let audio: Vec<u8> = (0..250u8).collect();
        std::fs::write(&path, &audio).unwrap();

        let mut recorder = VoiceRecorder::new(FileCapture::new(&path).with_chunk_size(100));
        recorder.start_recording().await;
        assert_eq!(recorder.state(), RecordingState::Recording);
        tokio::time::sleep(Duration::from_millis(150)).await;

        let clip = recorder.stop_recording().await.unwrap();
        assert_eq!(clip.bytes.as_ref(), audio.as_slice());
        assert_eq!(clip.media_type, "audio/webm");
    }

    #[tokio::test]
    async fn test_missing_file_reads_as_denied() {
        let dir = tempfile::tempdir().unwrap();
        let mut recorder = VoiceRecorder::new(FileCapture::new(dir.path().join("absent.webm")));
        recorder.start_recording().await;
        assert_eq!(recorder.state(), RecordingState::Idle);
        assert_eq!(recorder.error(), Some(MICROPHONE_DENIED));
    }

    #[tokio::test]
    async fn test_start_twice_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.webm");
        std::fs::write(&path, b"abc").unwrap();

        let mut stream = FileCapture::new(&path).request_microphone().await.unwrap();
        let _rx = stream.start(Duration::from_millis(10)).unwrap();
        assert!(matches!(
            stream.start(Duration::from_millis(10)),
            Err(CaptureError::Start(_))
        ));
        stream.release();
    }
}
