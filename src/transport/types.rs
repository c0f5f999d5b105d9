//! Request and response payloads of the AgriAssist backend

use serde::{Deserialize, Serialize};

/// Reply to a chat message
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatReply {
    pub reply: Option<String>,
    pub session_id: Option<String>,
}

/// Severity reported for a detected problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// One finding of the image diagnosis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiagnosisResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disease: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub recommendations: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Reply to a diagnosis request
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Diagnosis {
    pub session_id: Option<String>,
    pub reply: Option<String>,
    pub diagnoses: Vec<DiagnosisResult>,
}

/// Text recognized in a voice recording
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Transcription {
    pub text: String,
}

/// Authenticated user profile
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    #[allow(dead_code)]
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Result of register and login
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}

/// Entry of the saved-session list
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: String,
    pub title: String,
    pub updated_at: String,
}

/// Acknowledgement of a saved session
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedSession {
    pub id: String,
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct RegisterRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SaveSessionRequest<'a, M: Serialize> {
    pub session_id: &'a str,
    pub messages: &'a [M],
}
