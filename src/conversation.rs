//! Conversation session state
//!
//! The message log, session id and in-flight placeholder of one chat. Events
//! are applied through [`transition`], which returns the effects the runtime
//! executes.

mod effect;
pub mod event;
mod message;
mod state;
mod transition;

#[cfg(test)]
mod proptests;

pub use effect::{Effect, Outbound};
pub use event::{Event, Reply, SendMode, Submission};
pub use message::{Message, Role};
pub use state::{Conversation, Transcript, CLEARED_GREETING, GREETING};
pub use transition::{transition, TransitionError, TransitionResult, ERROR_PREFIX, NO_RESPONSE};
