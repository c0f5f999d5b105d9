//! Runtime for a chat session
//!
//! The conversation is owned by a single task; callers talk to it through a
//! [`ChatHandle`] and observe it through transcript broadcasts.

mod executor;

#[cfg(test)]
pub mod testing;

pub use executor::ChatRuntime;

use crate::attachment::UploadedImage;
use crate::conversation::{SendMode, Submission, Transcript, TransitionError};
use crate::transport::{ApiResponse, SavedSession, Transport};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot};

/// Requests handled by the runtime task
#[derive(Debug)]
pub enum Command {
    Submit {
        submission: Submission,
        mode: SendMode,
        reply: oneshot::Sender<Result<String, TransitionError>>,
    },
    Clear {
        reply: oneshot::Sender<()>,
    },
    Snapshot {
        reply: oneshot::Sender<Transcript>,
    },
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Rejected(#[from] TransitionError),
    #[error("Chat session has stopped")]
    Stopped,
}

/// Handle to interact with a running chat session
#[derive(Clone)]
pub struct ChatHandle {
    command_tx: mpsc::Sender<Command>,
    updates_tx: broadcast::Sender<Transcript>,
    transport: Arc<dyn Transport>,
}

impl ChatHandle {
    /// Send a chat message. Returns the id of the placeholder that will hold
    /// the reply.
    pub async fn send_message(
        &self,
        content: impl Into<String>,
        images: Vec<UploadedImage>,
    ) -> Result<String, SessionError> {
        self.submit(Submission::new(content, images), SendMode::Chat)
            .await
    }

    /// Ask for a dedicated diagnosis of the attached images
    pub async fn diagnose(
        &self,
        content: impl Into<String>,
        images: Vec<UploadedImage>,
    ) -> Result<String, SessionError> {
        self.submit(Submission::new(content, images), SendMode::Diagnose)
            .await
    }

    async fn submit(
        &self,
        submission: Submission,
        mode: SendMode,
    ) -> Result<String, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.command(Command::Submit {
            submission,
            mode,
            reply,
        })
        .await?;
        Ok(rx.await.map_err(|_| SessionError::Stopped)??)
    }

    /// Reset to the greeting under a fresh session id
    pub async fn clear_chat(&self) -> Result<(), SessionError> {
        let (reply, rx) = oneshot::channel();
        self.command(Command::Clear { reply }).await?;
        rx.await.map_err(|_| SessionError::Stopped)
    }

    pub async fn transcript(&self) -> Result<Transcript, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.command(Command::Snapshot { reply }).await?;
        rx.await.map_err(|_| SessionError::Stopped)
    }

    /// Transcript published after every change
    pub fn subscribe(&self) -> broadcast::Receiver<Transcript> {
        self.updates_tx.subscribe()
    }

    /// Save the current transcript under its session id
    pub async fn save_session(&self) -> ApiResponse<SavedSession> {
        let transcript = match self.transcript().await {
            Ok(transcript) => transcript,
            Err(e) => return ApiResponse::failure(e.to_string()),
        };
        tracing::info!(
            session_id = %transcript.session_id,
            messages = transcript.messages.len(),
            "Saving chat session"
        );
        self.transport
            .save_chat_session(&transcript.session_id, &transcript.messages)
            .await
    }

    async fn command(&self, command: Command) -> Result<(), SessionError> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| SessionError::Stopped)
    }
}

/// Spawn the runtime task for a fresh conversation
pub fn start_chat<T: Transport + 'static>(transport: Arc<T>) -> ChatHandle {
    let (command_tx, command_rx) = mpsc::channel(32);
    let (updates_tx, _) = broadcast::channel(64);

    let runtime = ChatRuntime::new(transport.clone(), command_rx, updates_tx.clone());
    tokio::spawn(runtime.run());

    ChatHandle {
        command_tx,
        updates_tx,
        transport,
    }
}
