//! Effects produced by conversation transitions

use super::SendMode;
use crate::attachment::ImageFile;

/// Request the runtime sends on behalf of a placeholder
#[derive(Debug, Clone)]
pub struct Outbound {
    pub placeholder_id: String,
    pub mode: SendMode,
    /// Trimmed message text
    pub message: String,
    pub images: Vec<ImageFile>,
    pub session_id: String,
}

/// Effects to be executed after a transition
#[derive(Debug, Clone)]
pub enum Effect {
    /// Publish the updated transcript to observers
    NotifyObservers,

    /// Send a request; its reply comes back as `Event::ReplyReceived`
    SendRequest(Outbound),
}
