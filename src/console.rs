//! Terminal front end
//!
//! Reads commands from stdin, drives the composer and chat session, and
//! prints settled replies as they arrive.

mod command;
mod render;

pub use command::{parse, Input, HELP};
pub use render::ReplyPrinter;

use crate::attachment::{ImageFile, PreviewRegistry};
use crate::composer::{Composer, DictationOutcome};
use crate::conversation::SendMode;
use crate::credentials::Credentials;
use crate::runtime::{ChatHandle, SessionError};
use crate::staging::{ImageStaging, MAX_STAGED_IMAGES};
use crate::transport::{ApiResponse, AuthSession, Transport};
use crate::voice::{FileCapture, RecordingState, VoiceRecorder};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

/// Interactive session bound to stdin and stdout
pub struct Console {
    chat: ChatHandle,
    transport: Arc<dyn Transport>,
    credentials: Credentials,
    composer: Composer,
    recorder: Option<VoiceRecorder<FileCapture>>,
}

impl Console {
    pub fn new(
        chat: ChatHandle,
        transport: Arc<dyn Transport>,
        credentials: Credentials,
        previews: PreviewRegistry,
    ) -> Self {
        Self {
            chat,
            transport,
            credentials,
            composer: Composer::new(ImageStaging::new(previews)),
            recorder: None,
        }
    }

    pub async fn run(mut self) -> Result<(), SessionError> {
        let mut updates = self.chat.subscribe();
        let mut printer = ReplyPrinter::default();
        for line in printer.fresh(&self.chat.transcript().await?) {
            println!("{line}");
        }
        println!("Type /help for commands.");

        let printer_task = tokio::spawn(async move {
            loop {
                match updates.recv().await {
                    Ok(transcript) => {
                        for line in printer.fresh(&transcript) {
                            println!("{line}");
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "Printer lagged behind transcript updates");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to read stdin");
                    break;
                }
            };
            match parse(&line) {
                Ok(Input::Quit) => break,
                Ok(input) => self.handle(input).await?,
                Err(e) => println!("{e}"),
            }
        }

        printer_task.abort();
        Ok(())
    }

    async fn handle(&mut self, input: Input) -> Result<(), SessionError> {
        match input {
            Input::Send(text) => {
                self.composer.append(&text);
                self.send(SendMode::Chat).await?;
            }
            Input::Empty => {
                if self.composer.can_send() {
                    self.send(SendMode::Chat).await?;
                }
            }
            Input::Diagnose(text) => {
                if self.composer.staging().is_empty() {
                    println!("Attach at least one image first (/attach <file>).");
                    return Ok(());
                }
                if !text.is_empty() {
                    self.composer.append(&text);
                }
                self.send(SendMode::Diagnose).await?;
            }
            Input::Attach(paths) => self.attach(paths).await,
            Input::Remove(position) => {
                let id = self
                    .composer
                    .staging()
                    .images()
                    .get(position - 1)
                    .map(|img| img.id.clone());
                match id.and_then(|id| self.composer.staging_mut().remove(&id)) {
                    Some(removed) => println!("Removed {}.", removed.name),
                    None => println!("No attached image at position {position}."),
                }
            }
            Input::Staged => self.list_staged(),
            Input::Record(path) => self.start_dictation(path).await,
            Input::Stop => self.stop_dictation().await,
            Input::Clear => {
                self.chat.clear_chat().await?;
                self.composer.staging_mut().clear();
            }
            Input::Save => match self.chat.save_session().await.into_result() {
                Ok(saved) => println!("Saved session {} ({}).", saved.session_id, saved.id),
                Err(error) => println!("{error}"),
            },
            Input::Sessions => match self.transport.get_sessions().await.into_result() {
                Ok(sessions) => println!("{}", render::sessions(&sessions)),
                Err(error) => println!("{error}"),
            },
            Input::Login { email, password } => {
                let response = self.transport.login(&email, &password).await;
                self.store_session(response);
            }
            Input::Register {
                email,
                password,
                name,
            } => {
                let response = self.transport.register(&name, &email, &password).await;
                self.store_session(response);
            }
            Input::Logout => {
                if let Err(e) = self.credentials.clear() {
                    tracing::warn!(error = %e, "Failed to remove stored credentials");
                }
                println!("Logged out.");
            }
            Input::Help => println!("{HELP}"),
            Input::Quit => {}
        }
        Ok(())
    }

    async fn send(&mut self, mode: SendMode) -> Result<(), SessionError> {
        if self.chat.transcript().await?.is_loading {
            println!("Still waiting for the previous reply.");
            return Ok(());
        }
        let Some(submission) = self.composer.draft() else {
            return Ok(());
        };
        let sent = match mode {
            SendMode::Chat => {
                self.chat
                    .send_message(submission.content, submission.images)
                    .await
            }
            SendMode::Diagnose => self.chat.diagnose(submission.content, submission.images).await,
        };
        match sent {
            Ok(_) => {
                self.composer.discard_draft();
                Ok(())
            }
            Err(SessionError::Rejected(e)) => {
                println!("{e}");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn attach(&mut self, paths: Vec<PathBuf>) {
        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            match ImageFile::read(&path).await {
                Ok(file) => files.push(file),
                Err(e) => println!("Cannot read {}: {e}", path.display()),
            }
        }

        let report = self.composer.staging_mut().stage(files);
        for image in &report.added {
            println!("Attached {}.", image.name);
        }
        if report.skipped_non_images > 0 {
            println!("Skipped {} file(s) that are not images.", report.skipped_non_images);
        }
        if report.hit_capacity() {
            println!(
                "Only {MAX_STAGED_IMAGES} images can be attached; {} not added.",
                report.dropped_over_capacity
            );
        }
    }

    fn list_staged(&self) {
        let images = self.composer.staging().images();
        if images.is_empty() {
            println!("No images attached.");
        }
        for (i, image) in images.iter().enumerate() {
            println!("{}. {} ({})", i + 1, image.name, image.preview_url());
        }
    }

    async fn start_dictation(&mut self, path: PathBuf) {
        if let Some(recorder) = &self.recorder {
            if recorder.state() != RecordingState::Idle {
                println!("Already recording, type /stop to finish.");
                return;
            }
        }

        let mut recorder = VoiceRecorder::new(FileCapture::new(path));
        recorder.start_recording().await;
        match recorder.error() {
            Some(error) => println!("{error}"),
            None => {
                println!("Recording... type /stop to finish.");
                self.recorder = Some(recorder);
            }
        }
    }

    async fn stop_dictation(&mut self) {
        let Some(mut recorder) = self.recorder.take() else {
            println!("Not recording.");
            return;
        };
        match self
            .composer
            .finish_dictation(&mut recorder, self.transport.as_ref())
            .await
        {
            DictationOutcome::Transcribed(_) => {
                println!("Draft: {}", self.composer.text());
                println!("Press enter to send, or keep typing.");
            }
            DictationOutcome::Failed(error) => println!("{error}"),
            DictationOutcome::NotRecording => println!("Not recording."),
        }
    }

    fn store_session(&self, response: ApiResponse<AuthSession>) {
        match response.into_result() {
            Ok(session) => {
                if let Err(e) = self.credentials.set_token(session.token) {
                    tracing::warn!(error = %e, "Failed to persist credentials");
                }
                println!("Signed in as {} <{}>.", session.user.name, session.user.email);
            }
            Err(error) => println!("{error}"),
        }
    }
}
