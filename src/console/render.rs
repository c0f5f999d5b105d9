//! Text rendering of transcript entries

use crate::conversation::{Message, Role, Transcript};
use crate::transport::{DiagnosisResult, SessionSummary, Severity};
use std::collections::HashSet;
use std::fmt::Write;

pub fn message(message: &Message) -> String {
    let speaker = match message.role {
        Role::User => "you",
        Role::Assistant => "agri-assist",
    };
    let mut out = format!("[{}] {speaker}: {}", message.timestamp.format("%H:%M"), message.content);

    if !message.images.is_empty() {
        let names: Vec<&str> = message.images.iter().map(|img| img.name.as_str()).collect();
        let _ = write!(out, "\n  attached: {}", names.join(", "));
    }
    for diagnosis in &message.diagnoses {
        out.push('\n');
        out.push_str(&self::diagnosis(diagnosis));
    }
    out
}

fn diagnosis(result: &DiagnosisResult) -> String {
    let mut out = format!(
        "  - {}",
        result.disease.as_deref().unwrap_or("Unidentified condition")
    );
    if let Some(severity) = result.severity {
        let label = match severity {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        };
        let _ = write!(out, " (severity: {label})");
    }
    if let Some(confidence) = result.confidence {
        let _ = write!(out, " {:.0}% confidence", confidence * 100.0);
    }
    if let Some(description) = &result.description {
        let _ = write!(out, "\n    {description}");
    }
    for step in &result.recommendations {
        let _ = write!(out, "\n    * {step}");
    }
    out
}

pub fn sessions(sessions: &[SessionSummary]) -> String {
    if sessions.is_empty() {
        return "No saved sessions.".to_string();
    }
    sessions
        .iter()
        .map(|s| {
            let title = if s.title.is_empty() { "(untitled)" } else { &s.title };
            format!("{}  {}  {title}", s.session_id, s.updated_at)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Tracks which assistant messages have been shown
#[derive(Debug, Default)]
pub struct ReplyPrinter {
    shown: HashSet<String>,
}

impl ReplyPrinter {
    /// Settled assistant messages in `transcript` not shown before
    pub fn fresh(&mut self, transcript: &Transcript) -> Vec<String> {
        transcript
            .messages
            .iter()
            .filter(|m| m.role == Role::Assistant && !m.is_loading)
            .filter(|m| self.shown.insert(m.id.clone()))
            .map(message)
            .collect()
    }
}
