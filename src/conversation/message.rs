//! Transcript messages

use crate::attachment::UploadedImage;
use crate::transport::DiagnosisResult;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry of the transcript
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<UploadedImage>,
    pub timestamp: DateTime<Utc>,
    /// Set only on a placeholder awaiting its reply
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_loading: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnoses: Vec<DiagnosisResult>,
}

impl Message {
    pub fn user(content: impl Into<String>, images: Vec<UploadedImage>) -> Self {
        Self::new(Role::User, content.into(), images, false)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content.into(), Vec::new(), false)
    }

    /// Empty assistant message shown while a reply is pending
    pub fn placeholder() -> Self {
        Self::new(Role::Assistant, String::new(), Vec::new(), true)
    }

    fn new(role: Role, content: String, images: Vec<UploadedImage>, is_loading: bool) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content,
            images,
            timestamp: Utc::now(),
            is_loading,
            diagnoses: Vec::new(),
        }
    }
}
