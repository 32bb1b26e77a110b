//! Library root for `faq-bot`.
//!
//! Faq-bot is a Slack assistant that answers frequently asked questions:
//! - Answers when mentioned directly, or when a thread it is already in continues
//! - Treats a message as a question with a simple lexical heuristic
//! - Replies with the first FAQ answer whose keyword appears in the question
//! - Points users at the help command when it has no answer
//!
//! The FAQ lives in a JSON file that is reloaded when it changes. The chat
//! platform sits behind a trait, so other implementations can be swapped in.

pub mod base;
pub mod interaction;
pub mod runtime;
pub mod service;

use anyhow::anyhow;
use base::{config::Config, types::Void};
use rustls::crypto;
use tracing::info;

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the faq-bot runtime:
/// - Initializes the crypto provider
/// - Loads the FAQ table and connects the chat client
/// - Starts the main polling loop for processing messages
pub async fn start(config: Config) -> Void {
    info!("Starting faq-bot ...");

    // Start the crypto provider.
    crypto::ring::default_provider().install_default().map_err(|_| anyhow!("Failed to install the crypto provider."))?;

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config).await?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}
