//! Events that can occur in a conversation

use crate::attachment::UploadedImage;
use crate::transport::{ApiResponse, ChatReply, Diagnosis, DiagnosisResult};

/// Which backend operation answers a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SendMode {
    #[default]
    Chat,
    /// Dedicated image diagnosis; needs at least one image
    Diagnose,
}

/// Text and images the user submits together
#[derive(Debug, Clone, Default)]
pub struct Submission {
    pub content: String,
    pub images: Vec<UploadedImage>,
}

impl Submission {
    pub fn new(content: impl Into<String>, images: Vec<UploadedImage>) -> Self {
        Self {
            content: content.into(),
            images,
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::new(content, Vec::new())
    }

    /// True when there is nothing to send
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty() && self.images.is_empty()
    }
}

/// Settled outcome of an outbound request
#[derive(Debug, Clone)]
pub enum Reply {
    Chat(ApiResponse<ChatReply>),
    Diagnosis(ApiResponse<Diagnosis>),
}

/// Reply fields the conversation cares about
#[derive(Debug, Default)]
pub(super) struct ReplyParts {
    pub text: Option<String>,
    pub session_id: Option<String>,
    pub diagnoses: Vec<DiagnosisResult>,
}

impl Reply {
    pub(super) fn into_parts(self) -> Result<ReplyParts, String> {
        match self {
            Reply::Chat(response) => response.into_result().map(|data| ReplyParts {
                text: data.reply,
                session_id: data.session_id,
                diagnoses: Vec::new(),
            }),
            Reply::Diagnosis(response) => response.into_result().map(|data| ReplyParts {
                text: data.reply,
                session_id: data.session_id,
                diagnoses: data.diagnoses,
            }),
        }
    }
}

/// Events that trigger conversation transitions
#[derive(Debug, Clone)]
pub enum Event {
    UserMessage {
        submission: Submission,
        mode: SendMode,
    },
    ReplyReceived {
        placeholder_id: String,
        reply: Reply,
    },
    Clear,
}
