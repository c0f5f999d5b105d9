//! Conversation transition function
//!
//! Applies an event to the conversation and returns the effects the runtime
//! must execute. Transitions perform no I/O.

use super::effect::Outbound;
use super::event::ReplyParts;
use super::state::new_session_id;
use super::{Conversation, Effect, Event, Message, SendMode, Submission, CLEARED_GREETING};
use thiserror::Error;

/// Content used when the backend succeeds without reply text
pub const NO_RESPONSE: &str = "No response received.";

/// Prefix marking a failure written into the transcript
pub const ERROR_PREFIX: &str = "⚠️ ";

/// Result of a transition
#[derive(Debug, Default)]
pub struct TransitionResult {
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Events the conversation refuses
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("A reply is still pending, wait for it before sending")]
    Busy,
    #[error("Nothing to send")]
    EmptyMessage,
    #[error("Diagnosis needs at least one image")]
    ImagesRequired,
}

/// Apply `event` to `conversation`
pub fn transition(
    conversation: &mut Conversation,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match event {
        Event::UserMessage { submission, mode } => submit(conversation, submission, mode),
        Event::ReplyReceived {
            placeholder_id,
            reply,
        } => Ok(settle(conversation, &placeholder_id, reply.into_parts())),
        Event::Clear => Ok(clear(conversation)),
    }
}

fn submit(
    conversation: &mut Conversation,
    submission: Submission,
    mode: SendMode,
) -> Result<TransitionResult, TransitionError> {
    if conversation.pending.is_some() {
        return Err(TransitionError::Busy);
    }
    if submission.is_blank() {
        return Err(TransitionError::EmptyMessage);
    }
    if mode == SendMode::Diagnose && submission.images.is_empty() {
        return Err(TransitionError::ImagesRequired);
    }

    let message = submission.content.trim().to_string();
    let images = submission.images.iter().map(|img| img.file.clone()).collect();

    let placeholder = Message::placeholder();
    let placeholder_id = placeholder.id.clone();

    conversation
        .messages
        .push(Message::user(submission.content, submission.images));
    conversation.messages.push(placeholder);
    conversation.pending = Some(placeholder_id.clone());

    Ok(TransitionResult::new()
        .with_effect(Effect::NotifyObservers)
        .with_effect(Effect::SendRequest(Outbound {
            placeholder_id,
            mode,
            message,
            images,
            session_id: conversation.session_id.clone(),
        })))
}

fn settle(
    conversation: &mut Conversation,
    placeholder_id: &str,
    outcome: Result<ReplyParts, String>,
) -> TransitionResult {
    // Replies for a placeholder discarded by clear belong to an old session
    if conversation.pending.as_deref() != Some(placeholder_id) {
        tracing::debug!(placeholder_id, "Dropping reply for a discarded placeholder");
        return TransitionResult::new();
    }
    conversation.pending = None;

    let (content, diagnoses) = match outcome {
        Ok(parts) => {
            if let Some(session_id) = parts.session_id.filter(|id| !id.is_empty()) {
                if session_id != conversation.session_id {
                    tracing::debug!(session_id = %session_id, "Adopting server session id");
                }
                conversation.session_id = session_id;
            }
            (
                parts.text.unwrap_or_else(|| NO_RESPONSE.to_string()),
                parts.diagnoses,
            )
        }
        Err(error) => (format!("{ERROR_PREFIX}{error}"), Vec::new()),
    };

    match conversation
        .messages
        .iter_mut()
        .find(|m| m.id == placeholder_id)
    {
        Some(placeholder) => {
            placeholder.is_loading = false;
            placeholder.content = content;
            placeholder.diagnoses = diagnoses;
        }
        None => tracing::warn!(placeholder_id, "Pending placeholder missing from the log"),
    }

    TransitionResult::new().with_effect(Effect::NotifyObservers)
}

fn clear(conversation: &mut Conversation) -> TransitionResult {
    conversation.messages = vec![Message::assistant(CLEARED_GREETING)];
    conversation.session_id = new_session_id();
    conversation.pending = None;
    TransitionResult::new().with_effect(Effect::NotifyObservers)
}
