//! HTTP implementation of the backend transport

use super::envelope::{decode, INVALID_RESPONSE};
use super::types::{LoginRequest, RegisterRequest, SaveSessionRequest};
use super::{
    ApiResponse, AuthSession, ChatReply, Diagnosis, SavedSession, SessionSummary, Transcription,
    Transport, TransportError, TransportErrorKind,
};
use crate::attachment::ImageFile;
use crate::config::ClientConfig;
use crate::conversation::Message;
use crate::credentials::Credentials;
use crate::voice::AudioClip;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Instant;

const CHAT_NETWORK_ERROR: &str = "Network error. Is the backend running?";
const DIAGNOSE_NETWORK_ERROR: &str = "Network error. Please try again.";
const AUTH_NETWORK_ERROR: &str = "Network error. Please try again.";
const TRANSCRIBE_NETWORK_ERROR: &str = "Transcription failed. Please try again.";
const LIST_SESSIONS_NETWORK_ERROR: &str = "Failed to fetch sessions.";
const SAVE_SESSION_NETWORK_ERROR: &str = "Failed to save session.";

/// Transport over HTTP using JSON and multipart bodies
pub struct HttpTransport {
    client: Client,
    base_url: String,
    credentials: Credentials,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig, credentials: Credentials) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| TransportError::protocol(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Attach the bearer token when one is present
    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.credentials.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and normalize the outcome into an envelope.
    ///
    /// Network failures are reported with the operation's fixed message.
    async fn execute<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
        network_error: &'static str,
    ) -> ApiResponse<T> {
        let start = Instant::now();
        let result = Self::send(request).await;
        let duration = start.elapsed();

        match result {
            Ok(data) => {
                tracing::info!(
                    operation,
                    duration_ms = %duration.as_millis(),
                    "Backend request completed"
                );
                ApiResponse::success(data)
            }
            Err(e) => {
                tracing::warn!(
                    operation,
                    duration_ms = %duration.as_millis(),
                    kind = e.kind.as_str(),
                    error = %e.message,
                    "Backend request failed"
                );
                if e.kind == TransportErrorKind::Network {
                    ApiResponse::failure(network_error)
                } else {
                    e.into()
                }
            }
        }
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, TransportError> {
        let response = request
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(&e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            tracing::warn!(error = %e, "Failed to read response body");
            TransportError::protocol(INVALID_RESPONSE)
        })?;

        decode(status, &body)
    }
}

/// Multipart file part; an unparsable media type is sent without one
fn file_part(name: &str, media_type: &str, bytes: &Bytes) -> Part {
    let part = || Part::bytes(bytes.to_vec()).file_name(name.to_string());
    part().mime_str(media_type).unwrap_or_else(|_| part())
}

fn image_part(file: &ImageFile) -> Part {
    file_part(&file.name, &file.media_type, &file.bytes)
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send_chat_message(
        &self,
        message: &str,
        images: &[ImageFile],
        session_id: Option<&str>,
    ) -> ApiResponse<ChatReply> {
        let mut form = Form::new().text("message", message.to_string());
        if let Some(id) = session_id {
            form = form.text("sessionId", id.to_string());
        }
        for image in images {
            form = form.part("images", image_part(image));
        }

        let request = self.authorized(self.client.post(self.url("/chat"))).multipart(form);
        self.execute("chat", request, CHAT_NETWORK_ERROR).await
    }

    async fn analyze_crop_images(
        &self,
        images: &[ImageFile],
        message: &str,
        session_id: Option<&str>,
    ) -> ApiResponse<Diagnosis> {
        let mut form = Form::new();
        for image in images {
            form = form.part("images", image_part(image));
        }
        form = form.text("message", message.to_string());
        if let Some(id) = session_id {
            form = form.text("sessionId", id.to_string());
        }

        let request = self
            .authorized(self.client.post(self.url("/diagnose")))
            .multipart(form);
        self.execute("diagnose", request, DIAGNOSE_NETWORK_ERROR).await
    }

    async fn transcribe_audio(&self, audio: &AudioClip) -> ApiResponse<Transcription> {
        let form = Form::new().part(
            "audio",
            file_part(&audio.file_name, &audio.media_type, &audio.bytes),
        );

        let request = self
            .authorized(self.client.post(self.url("/transcribe")))
            .multipart(form);
        self.execute("transcribe", request, TRANSCRIBE_NETWORK_ERROR).await
    }

    async fn register(&self, name: &str, email: &str, password: &str) -> ApiResponse<AuthSession> {
        let request = self
            .client
            .post(self.url("/auth/register"))
            .json(&RegisterRequest {
                name,
                email,
                password,
            });
        self.execute("register", request, AUTH_NETWORK_ERROR).await
    }

    async fn login(&self, email: &str, password: &str) -> ApiResponse<AuthSession> {
        let request = self
            .client
            .post(self.url("/auth/login"))
            .json(&LoginRequest { email, password });
        self.execute("login", request, AUTH_NETWORK_ERROR).await
    }

    async fn get_sessions(&self) -> ApiResponse<Vec<SessionSummary>> {
        let request = self.authorized(self.client.get(self.url("/sessions")));
        self.execute("list_sessions", request, LIST_SESSIONS_NETWORK_ERROR)
            .await
    }

    async fn save_chat_session(
        &self,
        session_id: &str,
        messages: &[Message],
    ) -> ApiResponse<SavedSession> {
        let request = self
            .authorized(self.client.post(self.url("/sessions")))
            .json(&SaveSessionRequest {
                session_id,
                messages,
            });
        self.execute("save_session", request, SAVE_SESSION_NETWORK_ERROR)
            .await
    }
}
