//! Deciding which inbound event, if any, the bot should answer.

use std::collections::HashSet;

use tracing::{debug, trace};

use crate::base::types::{Command, CommandMetadata, RawEvent};

use super::{conversation::ConversationTracker, mention::parse_mention};

/// Picks the message to answer out of a batch of raw events.
#[derive(Debug, Clone)]
pub struct EventClassifier {
    bot_user_id: String,
    filtered_types: HashSet<String>,
}

impl EventClassifier {
    /// `filtered_types` only keeps noisy events out of the debug output.
    pub fn new<I, S>(bot_user_id: &str, filtered_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            bot_user_id: bot_user_id.to_string(),
            filtered_types: filtered_types.into_iter().map(Into::into).collect(),
        }
    }

    pub fn bot_user_id(&self) -> &str {
        &self.bot_user_id
    }

    /// Return the first event in `events` that is addressed to the bot, or
    /// continues a thread the bot is in. Later events in the batch are not looked at.
    pub fn classify(&self, events: &[RawEvent], conversations: &ConversationTracker) -> Option<Command> {
        events.iter().find_map(|event| self.classify_event(event, conversations))
    }

    /// Classify a single event.
    pub fn classify_event(&self, event: &RawEvent, conversations: &ConversationTracker) -> Option<Command> {
        if self.filtered_types.contains(&event.kind) {
            trace!(kind = %event.kind, "Filtered event.");
        } else {
            debug!(?event, "Received event.");
        }

        if !event.is_plain_message() {
            return None;
        }

        // Never answer our own posts.
        if event.bot_id.is_some() || event.user.as_deref() == Some(self.bot_user_id.as_str()) {
            return None;
        }

        let Some(thread_key) = event.thread_key() else {
            debug!("Skipping a message that has no thread key.");
            return None;
        };

        let (Some(channel), Some(user)) = (event.channel.as_deref(), event.user.as_deref()) else {
            debug!("Skipping a message without a channel or user.");
            return None;
        };

        let mention = parse_mention(event.text.as_deref().unwrap_or_default());
        let addressed = mention.user_id == Some(self.bot_user_id.as_str());

        if !addressed && !conversations.is_active(thread_key) {
            return None;
        }

        debug!(thread_key, addressed, "Encountered event to process.");

        Some(Command {
            text: mention.remainder.to_string(),
            metadata: CommandMetadata {
                channel: channel.to_string(),
                user: user.to_string(),
                thread_key: thread_key.to_string(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> EventClassifier {
        EventClassifier::new("BOT", ["user_typing"])
    }

    fn message(text: &str, user: &str, ts: &str) -> RawEvent {
        RawEvent {
            kind: "message".to_string(),
            text: Some(text.to_string()),
            channel: Some("C1".to_string()),
            user: Some(user.to_string()),
            ts: Some(ts.to_string()),
            ..Default::default()
        }
    }

    fn typing() -> RawEvent {
        RawEvent {
            kind: "user_typing".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn direct_mention_after_noise() {
        let events = vec![typing(), message("<@BOT> how do I deploy?", "U1", "100")];

        let command = classifier().classify(&events, &ConversationTracker::default()).unwrap();

        assert_eq!(command.text, "how do I deploy?");
        assert_eq!(
            command.metadata,
            CommandMetadata {
                channel: "C1".to_string(),
                user: "U1".to_string(),
                thread_key: "100".to_string(),
            }
        );
    }

    #[test]
    fn unaddressed_message_is_ignored() {
        let events = vec![message("how do I deploy?", "U1", "100")];

        assert!(classifier().classify(&events, &ConversationTracker::default()).is_none());
    }

    #[test]
    fn mention_of_someone_else_is_ignored() {
        let events = vec![message("<@U999> how do I deploy?", "U1", "100")];

        assert!(classifier().classify(&events, &ConversationTracker::default()).is_none());
    }

    #[test]
    fn follow_up_in_active_thread_needs_no_mention() {
        let mut conversations = ConversationTracker::default();
        conversations.track("100", "U1");

        let event = RawEvent {
            thread_ts: Some("100".to_string()),
            ..message("what about staging?", "U2", "105")
        };

        let command = classifier().classify(&[event], &conversations).unwrap();

        assert_eq!(command.text, "what about staging?");
        assert_eq!(command.metadata.user, "U2");
        assert_eq!(command.metadata.thread_key, "100");
    }

    #[test]
    fn thread_root_wins_over_message_ts() {
        let event = RawEvent {
            thread_ts: Some("90".to_string()),
            ..message("<@BOT> hi", "U1", "100")
        };

        let command = classifier().classify(&[event], &ConversationTracker::default()).unwrap();
        assert_eq!(command.metadata.thread_key, "90");
    }

    #[test]
    fn subtypes_are_never_actionable() {
        let event = RawEvent {
            subtype: Some("message_changed".to_string()),
            ..message("<@BOT> how do I deploy?", "U1", "100")
        };

        assert!(classifier().classify(&[event], &ConversationTracker::default()).is_none());
    }

    #[test]
    fn bot_posts_are_ignored_even_in_active_threads() {
        let mut conversations = ConversationTracker::default();
        conversations.track("100", "U1");

        let own = message("Run `make deploy`.", "BOT", "100");
        let other_bot = RawEvent {
            bot_id: Some("B2".to_string()),
            ..message("beep", "U7", "100")
        };

        assert!(classifier().classify(&[own, other_bot], &conversations).is_none());
    }

    #[test]
    fn unthreadable_and_malformed_messages_are_skipped() {
        let no_ts = RawEvent { ts: None, ..message("<@BOT> hi", "U1", "") };
        let no_channel = RawEvent { channel: None, ..message("<@BOT> hi", "U1", "100") };
        let no_text = RawEvent { text: None, ..message("", "U1", "100") };

        assert!(classifier().classify(&[no_ts, no_channel, no_text], &ConversationTracker::default()).is_none());
    }

    #[test]
    fn only_first_qualifying_event_is_returned() {
        let events = vec![message("<@BOT> first", "U1", "100"), message("<@BOT> second", "U2", "200")];

        let command = classifier().classify(&events, &ConversationTracker::default()).unwrap();
        assert_eq!(command.text, "first");
    }

    #[test]
    fn filtered_types_do_not_change_behavior() {
        let noisy = EventClassifier::new("BOT", ["message"]);
        let events = vec![message("<@BOT> how do I deploy?", "U1", "100")];

        assert!(noisy.classify(&events, &ConversationTracker::default()).is_some());
    }
}
