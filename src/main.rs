//! AgriAssist terminal client
//!
//! Chat with the crop-health assistant backend: text, crop images and voice
//! dictation in, diagnoses and treatment guidance out.

mod attachment;
mod composer;
mod config;
mod console;
mod conversation;
mod credentials;
mod runtime;
mod staging;
mod transport;
mod voice;

use attachment::PreviewRegistry;
use config::ClientConfig;
use console::Console;
use credentials::Credentials;
use std::sync::Arc;
use transport::HttpTransport;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so they never interleave with the chat on stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agri_assist=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = ClientConfig::from_env();
    tracing::info!(
        base_url = %config.api_base_url,
        timeout_secs = config.request_timeout.as_secs(),
        "Client configured"
    );

    let credentials = match &config.credentials_path {
        Some(path) => Credentials::load(path).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable credentials");
            Credentials::in_memory()
        }),
        None => Credentials::in_memory(),
    };
    if credentials.token().is_some() {
        tracing::info!("Using stored credentials");
    }

    let transport = Arc::new(HttpTransport::new(&config, credentials.clone())?);
    let chat = runtime::start_chat(transport.clone());

    Console::new(chat, transport, credentials, PreviewRegistry::new())
        .run()
        .await?;

    Ok(())
}
