//! Mock implementations for testing
//!
//! These mocks enable session and recorder tests without real I/O.

use crate::attachment::ImageFile;
use crate::conversation::Message;
use crate::transport::{
    ApiResponse, AuthSession, ChatReply, Diagnosis, SavedSession, SessionSummary, Transcription,
    Transport,
};
use crate::voice::{AudioCapture, AudioClip, AudioStream, CaptureError};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

// ============================================================================
// Mock Transport
// ============================================================================

/// A recorded chat or diagnosis request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub message: String,
    pub session_id: Option<String>,
    pub images: Vec<String>,
}

impl RecordedCall {
    fn new(message: &str, images: &[ImageFile], session_id: Option<&str>) -> Self {
        Self {
            message: message.to_string(),
            session_id: session_id.map(ToString::to_string),
            images: images.iter().map(|img| img.name.clone()).collect(),
        }
    }
}

/// Transport that returns queued responses.
///
/// An empty queue answers with the failure the HTTP transport reports when
/// the backend is unreachable.
#[allow(dead_code)]
#[derive(Default)]
pub struct MockTransport {
    chat: Mutex<VecDeque<ApiResponse<ChatReply>>>,
    diagnosis: Mutex<VecDeque<ApiResponse<Diagnosis>>>,
    transcription: Mutex<VecDeque<ApiResponse<Transcription>>>,
    auth: Mutex<VecDeque<ApiResponse<AuthSession>>>,
    save: Mutex<VecDeque<ApiResponse<SavedSession>>>,
    chat_gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
    /// Record of chat requests
    pub chat_requests: Mutex<Vec<RecordedCall>>,
    /// Record of diagnosis requests
    pub diagnose_requests: Mutex<Vec<RecordedCall>>,
    /// Byte length of each transcribed clip
    pub transcribe_requests: Mutex<Vec<usize>>,
    /// Session id and message count of each save
    pub save_requests: Mutex<Vec<(String, usize)>>,
}

#[allow(dead_code)]
impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_chat(&self, response: ApiResponse<ChatReply>) {
        self.chat.lock().unwrap().push_back(response);
    }

    pub fn queue_diagnosis(&self, response: ApiResponse<Diagnosis>) {
        self.diagnosis.lock().unwrap().push_back(response);
    }

    pub fn queue_transcription(&self, response: ApiResponse<Transcription>) {
        self.transcription.lock().unwrap().push_back(response);
    }

    pub fn queue_auth(&self, response: ApiResponse<AuthSession>) {
        self.auth.lock().unwrap().push_back(response);
    }

    pub fn queue_save(&self, response: ApiResponse<SavedSession>) {
        self.save.lock().unwrap().push_back(response);
    }

    /// Hold the next chat request until the returned sender fires
    pub fn gate_next_chat(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.chat_gates.lock().unwrap().push_back(rx);
        tx
    }

    pub fn chat_calls(&self) -> Vec<RecordedCall> {
        self.chat_requests.lock().unwrap().clone()
    }

    pub fn diagnose_calls(&self) -> Vec<RecordedCall> {
        self.diagnose_requests.lock().unwrap().clone()
    }

    pub fn saved(&self) -> Vec<(String, usize)> {
        self.save_requests.lock().unwrap().clone()
    }

    fn next<T>(queue: &Mutex<VecDeque<ApiResponse<T>>>, fallback: &str) -> ApiResponse<T> {
        queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| ApiResponse::failure(fallback))
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send_chat_message(
        &self,
        message: &str,
        images: &[ImageFile],
        session_id: Option<&str>,
    ) -> ApiResponse<ChatReply> {
        self.chat_requests
            .lock()
            .unwrap()
            .push(RecordedCall::new(message, images, session_id));

        let gate = self.chat_gates.lock().unwrap().pop_front();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        Self::next(&self.chat, "Network error. Is the backend running?")
    }

    async fn analyze_crop_images(
        &self,
        images: &[ImageFile],
        message: &str,
        session_id: Option<&str>,
    ) -> ApiResponse<Diagnosis> {
        self.diagnose_requests
            .lock()
            .unwrap()
            .push(RecordedCall::new(message, images, session_id));
        Self::next(&self.diagnosis, "Network error. Please try again.")
    }

    async fn transcribe_audio(&self, audio: &AudioClip) -> ApiResponse<Transcription> {
        self.transcribe_requests.lock().unwrap().push(audio.len());
        Self::next(&self.transcription, "Transcription failed. Please try again.")
    }

    async fn register(&self, _name: &str, _email: &str, _password: &str) -> ApiResponse<AuthSession> {
        Self::next(&self.auth, "Network error. Please try again.")
    }

    async fn login(&self, _email: &str, _password: &str) -> ApiResponse<AuthSession> {
        Self::next(&self.auth, "Network error. Please try again.")
    }

    async fn get_sessions(&self) -> ApiResponse<Vec<SessionSummary>> {
        ApiResponse::failure("Failed to fetch sessions.")
    }

    async fn save_chat_session(
        &self,
        session_id: &str,
        messages: &[Message],
    ) -> ApiResponse<SavedSession> {
        self.save_requests
            .lock()
            .unwrap()
            .push((session_id.to_string(), messages.len()));
        Self::next(&self.save, "Failed to save session.")
    }
}

// ============================================================================
// Mock Audio Capture
// ============================================================================

/// Capture that delivers fixed chunks as soon as it starts
pub struct MockCapture {
    chunks: Vec<Bytes>,
    deny_remaining: AtomicUsize,
    stop_delay: Option<Duration>,
    /// Number of microphone requests
    pub requests: AtomicUsize,
    /// Number of released streams
    pub releases: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl MockCapture {
    pub fn new(chunks: Vec<Bytes>) -> Self {
        Self {
            chunks,
            deny_remaining: AtomicUsize::new(0),
            stop_delay: None,
            requests: AtomicUsize::new(0),
            releases: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Every request is denied
    pub fn denied() -> Self {
        Self::new(Vec::new()).deny_first(usize::MAX)
    }

    /// Deny the first `n` requests
    pub fn deny_first(self, n: usize) -> Self {
        self.deny_remaining.store(n, Ordering::SeqCst);
        self
    }

    /// Close the chunk channel only after `delay` once stop is requested
    pub fn with_stop_delay(mut self, delay: Duration) -> Self {
        self.stop_delay = Some(delay);
        self
    }
}

#[async_trait]
impl AudioCapture for MockCapture {
    async fn request_microphone(&self) -> Result<Box<dyn AudioStream>, CaptureError> {
        self.requests.fetch_add(1, Ordering::SeqCst);

        let denied = self
            .deny_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if denied {
            return Err(CaptureError::PermissionDenied);
        }

        Ok(Box::new(MockStream {
            chunks: self.chunks.clone(),
            stop_delay: self.stop_delay,
            tx: None,
            releases: self.releases.clone(),
        }))
    }
}

struct MockStream {
    chunks: Vec<Bytes>,
    stop_delay: Option<Duration>,
    tx: Option<mpsc::Sender<Bytes>>,
    releases: Arc<AtomicUsize>,
}

impl AudioStream for MockStream {
    fn start(&mut self, _timeslice: Duration) -> Result<mpsc::Receiver<Bytes>, CaptureError> {
        let (tx, rx) = mpsc::channel(self.chunks.len().max(1));
        for chunk in self.chunks.drain(..) {
            tx.try_send(chunk)
                .map_err(|e| CaptureError::Start(e.to_string()))?;
        }
        self.tx = Some(tx);
        Ok(rx)
    }

    fn stop(&mut self) {
        let Some(tx) = self.tx.take() else {
            return;
        };
        match self.stop_delay {
            Some(delay) => {
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    drop(tx);
                });
            }
            None => drop(tx),
        }
    }

    fn release(&mut self) {
        self.stop();
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}
