//! Conversation state

use super::Message;

/// Greeting that opens a new conversation
pub const GREETING: &str = "Hello! I'm AgriAssist, your AI-powered crop health advisor. Upload images of your crops and describe any issues you're seeing — I'll diagnose diseases, pests, nutrient deficiencies, and provide treatment recommendations.\n\nTip: For best results, upload clear, well-lit photos of affected leaves, stems, or fruit.";

/// Greeting after the chat is cleared
pub const CLEARED_GREETING: &str = "Hello! I'm AgriAssist, your AI-powered crop health advisor. Upload images of your crops and describe any issues you're seeing — I'll diagnose diseases, pests, nutrient deficiencies, and provide treatment recommendations.";

pub(super) fn new_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// The message log, session id and in-flight marker of one chat
#[derive(Debug)]
pub struct Conversation {
    pub(super) messages: Vec<Message>,
    pub(super) session_id: String,
    /// Placeholder awaiting its reply; `Some` while a request is in flight
    pub(super) pending: Option<String>,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            messages: vec![Message::assistant(GREETING)],
            session_id: new_session_id(),
            pending: None,
        }
    }

    #[allow(dead_code)] // Used in tests
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    #[allow(dead_code)] // Used in tests
    pub fn pending_placeholder(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    pub fn transcript(&self) -> Transcript {
        Transcript {
            messages: self.messages.clone(),
            session_id: self.session_id.clone(),
            is_loading: self.is_loading(),
        }
    }
}

/// Read-only snapshot handed to observers
#[derive(Debug, Clone)]
pub struct Transcript {
    pub messages: Vec<Message>,
    pub session_id: String,
    pub is_loading: bool,
}

#[allow(dead_code)] // Used in tests
impl Transcript {
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn find(&self, id: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }
}
