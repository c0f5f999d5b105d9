//! Backend transport
//!
//! Every operation returns an [`ApiResponse`] envelope; failures are never
//! raised to the caller.

mod envelope;
mod error;
mod http;
mod types;

pub use envelope::{ApiResponse, INVALID_RESPONSE};
pub use error::{TransportError, TransportErrorKind};
pub use http::HttpTransport;
pub use types::*;

use crate::attachment::ImageFile;
use crate::conversation::Message;
use crate::voice::AudioClip;
use async_trait::async_trait;
use std::sync::Arc;

/// Operations offered by the AgriAssist backend
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a chat message with optional images
    async fn send_chat_message(
        &self,
        message: &str,
        images: &[ImageFile],
        session_id: Option<&str>,
    ) -> ApiResponse<ChatReply>;

    /// Run the dedicated crop image diagnosis
    async fn analyze_crop_images(
        &self,
        images: &[ImageFile],
        message: &str,
        session_id: Option<&str>,
    ) -> ApiResponse<Diagnosis>;

    /// Turn a voice recording into text
    async fn transcribe_audio(&self, audio: &AudioClip) -> ApiResponse<Transcription>;

    async fn register(&self, name: &str, email: &str, password: &str) -> ApiResponse<AuthSession>;

    async fn login(&self, email: &str, password: &str) -> ApiResponse<AuthSession>;

    /// List sessions saved for the current user
    async fn get_sessions(&self) -> ApiResponse<Vec<SessionSummary>>;

    /// Save a transcript under its session id
    async fn save_chat_session(
        &self,
        session_id: &str,
        messages: &[Message],
    ) -> ApiResponse<SavedSession>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send_chat_message(
        &self,
        message: &str,
        images: &[ImageFile],
        session_id: Option<&str>,
    ) -> ApiResponse<ChatReply> {
        (**self).send_chat_message(message, images, session_id).await
    }

    async fn analyze_crop_images(
        &self,
        images: &[ImageFile],
        message: &str,
        session_id: Option<&str>,
    ) -> ApiResponse<Diagnosis> {
        (**self).analyze_crop_images(images, message, session_id).await
    }

    async fn transcribe_audio(&self, audio: &AudioClip) -> ApiResponse<Transcription> {
        (**self).transcribe_audio(audio).await
    }

    async fn register(&self, name: &str, email: &str, password: &str) -> ApiResponse<AuthSession> {
        (**self).register(name, email, password).await
    }

    async fn login(&self, email: &str, password: &str) -> ApiResponse<AuthSession> {
        (**self).login(email, password).await
    }

    async fn get_sessions(&self) -> ApiResponse<Vec<SessionSummary>> {
        (**self).get_sessions().await
    }

    async fn save_chat_session(
        &self,
        session_id: &str,
        messages: &[Message],
    ) -> ApiResponse<SavedSession> {
        (**self).save_chat_session(session_id, messages).await
    }
}
