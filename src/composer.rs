//! Draft of the next outbound message

use crate::conversation::Submission;
use crate::staging::ImageStaging;
use crate::transport::Transport;
use crate::voice::{AudioCapture, VoiceRecorder};

/// Result of finishing a dictation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DictationOutcome {
    /// Recorder was not recording; nothing happened
    NotRecording,
    /// Transcript appended to the draft
    Transcribed(String),
    /// Transcription failed or produced no text; the draft is unchanged
    Failed(String),
}

/// Pending text and staged images
#[derive(Debug)]
pub struct Composer {
    text: String,
    staging: ImageStaging,
}

impl Composer {
    pub fn new(staging: ImageStaging) -> Self {
        Self {
            text: String::new(),
            staging,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn staging(&self) -> &ImageStaging {
        &self.staging
    }

    pub fn staging_mut(&mut self) -> &mut ImageStaging {
        &mut self.staging
    }

    /// Append to the draft, separated from existing text by a space
    pub fn append(&mut self, text: &str) {
        if !self.text.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(text);
    }

    pub fn can_send(&self) -> bool {
        !self.text.trim().is_empty() || !self.staging.is_empty()
    }

    /// The draft as a submission; `None` when blank.
    ///
    /// The draft stays in place until [`Composer::discard_draft`].
    pub fn draft(&self) -> Option<Submission> {
        if !self.can_send() {
            return None;
        }
        Some(Submission::new(
            self.text.trim(),
            self.staging.images().to_vec(),
        ))
    }

    /// Reset the text and staging after a successful send
    pub fn discard_draft(&mut self) {
        self.text.clear();
        self.staging.clear();
    }

    /// Stop the recorder, transcribe the clip and append the text
    pub async fn finish_dictation<C, T>(
        &mut self,
        recorder: &mut VoiceRecorder<C>,
        transport: &T,
    ) -> DictationOutcome
    where
        C: AudioCapture,
        T: Transport + ?Sized,
    {
        let Some(clip) = recorder.stop_recording().await else {
            return DictationOutcome::NotRecording;
        };

        match transport.transcribe_audio(&clip).await.into_result() {
            Ok(transcription) if !transcription.text.is_empty() => {
                self.append(&transcription.text);
                DictationOutcome::Transcribed(transcription.text)
            }
            Ok(_) => {
                tracing::info!(bytes = clip.len(), "Transcription returned no text");
                DictationOutcome::Failed("No speech recognized.".to_string())
            }
            Err(error) => {
                tracing::warn!(error = %error, "Transcription failed");
                DictationOutcome::Failed(error)
            }
        }
    }
}
