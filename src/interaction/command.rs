//! Building the reply for a command the bot decided to answer.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument};

use crate::{
    base::{replies, types::CommandMetadata},
    service::faq::FaqTable,
};

/// Loose "is this a question" heuristic, applied to lowercased text.
static QUESTION_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(can|how|what)(.*\??)$").expect("hardcoded regex"));

/// Whether `text` looks like a question.
///
/// This is a heuristic: "scan the logs" counts, "is it down?" does not.
pub fn is_question(text: &str) -> bool {
    QUESTION_REGEX.is_match(&text.to_lowercase())
}

/// The FAQ answer for `text`, if it is a question that mentions a known keyword.
pub fn find_answer<'a>(text: &str, faq: &'a FaqTable) -> Option<&'a str> {
    let text = text.to_lowercase();

    if !QUESTION_REGEX.is_match(&text) {
        debug!("Message does not look like a question.");
        return None;
    }

    debug!("Found a question.");

    faq.find_answer(&text)
}

/// Work out the reply for `text` sent by `metadata.user`.
///
/// Answers from the FAQ when possible, lists the keywords for the help
/// command, and otherwise falls back to pointing the user at the help command.
#[instrument(skip_all, fields(channel = %metadata.channel, thread_key = %metadata.thread_key))]
pub fn handle_command(text: &str, metadata: &CommandMetadata, faq: &FaqTable, help_command: &str) -> String {
    if let Some(answer) = find_answer(text, faq) {
        return answer.to_string();
    }

    if text.trim().eq_ignore_ascii_case(help_command) {
        return replies::help_reply(faq.keywords());
    }

    replies::default_reply(&metadata.user, help_command)
}
