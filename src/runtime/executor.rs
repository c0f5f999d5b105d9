//! Chat runtime executor

use super::Command;
use crate::conversation::{
    transition, Conversation, Effect, Event, Outbound, Reply, SendMode, Transcript,
    TransitionError,
};
use crate::transport::Transport;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{broadcast, mpsc};

/// Owns one conversation and executes the effects of its transitions
pub struct ChatRuntime<T: Transport + 'static> {
    conversation: Conversation,
    transport: Arc<T>,
    command_rx: mpsc::Receiver<Command>,
    /// Replies from spawned requests come back through this channel
    event_rx: mpsc::Receiver<Event>,
    event_tx: mpsc::Sender<Event>,
    updates_tx: broadcast::Sender<Transcript>,
}

impl<T: Transport + 'static> ChatRuntime<T> {
    pub fn new(
        transport: Arc<T>,
        command_rx: mpsc::Receiver<Command>,
        updates_tx: broadcast::Sender<Transcript>,
    ) -> Self {
        let (event_tx, event_rx) = mpsc::channel(32);
        Self {
            conversation: Conversation::new(),
            transport,
            command_rx,
            event_rx,
            event_tx,
            updates_tx,
        }
    }

    pub async fn run(mut self) {
        tracing::info!(session_id = %self.conversation.session_id(), "Starting chat runtime");

        loop {
            tokio::select! {
                command = self.command_rx.recv() => match command {
                    Some(command) => self.handle_command(command),
                    // Every handle is gone
                    None => break,
                },
                Some(event) = self.event_rx.recv() => {
                    if let Err(e) = self.apply(event) {
                        tracing::error!(error = %e, "Error handling reply");
                    }
                }
            }
        }

        tracing::info!(session_id = %self.conversation.session_id(), "Chat runtime stopped");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Submit {
                submission,
                mode,
                reply,
            } => {
                let result = self.apply(Event::UserMessage { submission, mode });
                if let Err(e) = &result {
                    tracing::debug!(error = %e, "Message rejected");
                }
                let _ = reply.send(result.map(|placeholder| placeholder.unwrap_or_default()));
            }
            Command::Clear { reply } => {
                if let Err(e) = self.apply(Event::Clear) {
                    tracing::error!(error = %e, "Clear rejected");
                }
                tracing::info!(session_id = %self.conversation.session_id(), "Chat cleared");
                let _ = reply.send(());
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.conversation.transcript());
            }
        }
    }

    /// Run one transition and execute its effects. Returns the placeholder id
    /// of a request the transition started.
    fn apply(&mut self, event: Event) -> Result<Option<String>, TransitionError> {
        let result = transition(&mut self.conversation, event)?;

        let mut placeholder = None;
        for effect in result.effects {
            match effect {
                Effect::NotifyObservers => self.notify(),
                Effect::SendRequest(outbound) => {
                    placeholder = Some(outbound.placeholder_id.clone());
                    self.spawn_request(outbound);
                }
            }
        }
        Ok(placeholder)
    }

    fn notify(&self) {
        // No receivers is fine; the transcript is still available on demand
        let _ = self.updates_tx.send(self.conversation.transcript());
    }

    fn spawn_request(&self, outbound: Outbound) {
        let transport = self.transport.clone();
        let event_tx = self.event_tx.clone();

        tokio::spawn(async move {
            let started = Instant::now();
            let session_id = Some(outbound.session_id.as_str());

            let reply = match outbound.mode {
                SendMode::Chat => Reply::Chat(
                    transport
                        .send_chat_message(&outbound.message, &outbound.images, session_id)
                        .await,
                ),
                SendMode::Diagnose => Reply::Diagnosis(
                    transport
                        .analyze_crop_images(&outbound.images, &outbound.message, session_id)
                        .await,
                ),
            };

            tracing::debug!(
                placeholder_id = %outbound.placeholder_id,
                mode = ?outbound.mode,
                images = outbound.images.len(),
                duration_ms = started.elapsed().as_millis(),
                "Request settled"
            );

            let event = Event::ReplyReceived {
                placeholder_id: outbound.placeholder_id,
                reply,
            };
            if event_tx.send(event).await.is_err() {
                tracing::debug!("Runtime stopped before reply arrived");
            }
        });
    }
}
