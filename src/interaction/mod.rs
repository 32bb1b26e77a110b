//! Event handling and user interactions for faq-bot.
//!
//! This module provides the message pipeline:
//! - Picking the message to answer out of a batch of events
//! - Stripping the leading @-mention from message text
//! - Remembering which threads the bot is taking part in
//! - Building the reply from the FAQ table

pub mod classifier;
pub mod command;
pub mod conversation;
pub mod mention;
