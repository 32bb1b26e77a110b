//! Tracking of the threads the bot is taking part in.
//!
//! Once the bot has answered in a thread, follow-ups in that thread are
//! answered without the user having to mention the bot again. Entries expire
//! after a period of inactivity, and the table is capped so a long-running
//! process does not grow without bound.

use std::{
    collections::{BTreeSet, HashMap},
    time::Duration,
};

use chrono::{DateTime, Utc};
use tracing::debug;

/// A thread the bot is participating in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub participants: BTreeSet<String>,
    pub started_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
}

/// Active conversations keyed by thread key.
#[derive(Debug, Default)]
pub struct ConversationTracker {
    conversations: HashMap<String, Conversation>,
    ttl: Option<Duration>,
    max_entries: Option<usize>,
}

impl ConversationTracker {
    /// Create a tracker that forgets threads idle for longer than `ttl`, and
    /// keeps at most `max_entries` of them. `None` disables either limit.
    pub fn new(ttl: Option<Duration>, max_entries: Option<usize>) -> Self {
        Self {
            conversations: HashMap::new(),
            ttl,
            max_entries,
        }
    }

    /// Record that `user` spoke to the bot in `thread_key`.
    pub fn track(&mut self, thread_key: &str, user: &str) {
        self.track_at(thread_key, user, Utc::now());
    }

    pub fn track_at(&mut self, thread_key: &str, user: &str, now: DateTime<Utc>) {
        self.prune(now);

        match self.conversations.get_mut(thread_key) {
            Some(conversation) => {
                if conversation.participants.insert(user.to_string()) {
                    debug!(thread_key, user, "Adding a new user to an active conversation.");
                }
                conversation.last_updated_at = conversation.last_updated_at.max(now);
            }
            None => {
                debug!(thread_key, user, "Adding a new conversation.");

                self.make_room();
                self.conversations.insert(
                    thread_key.to_string(),
                    Conversation {
                        participants: BTreeSet::from([user.to_string()]),
                        started_at: now,
                        last_updated_at: now,
                    },
                );
            }
        }
    }

    /// Whether the bot is currently part of `thread_key`.
    pub fn is_active(&self, thread_key: &str) -> bool {
        self.is_active_at(thread_key, Utc::now())
    }

    pub fn is_active_at(&self, thread_key: &str, now: DateTime<Utc>) -> bool {
        self.conversations.get(thread_key).is_some_and(|c| !self.is_expired(c, now))
    }

    pub fn get(&self, thread_key: &str) -> Option<&Conversation> {
        self.conversations.get(thread_key)
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    fn is_expired(&self, conversation: &Conversation, now: DateTime<Utc>) -> bool {
        let Some(ttl) = self.ttl else {
            return false;
        };

        // A TTL too large for chrono never expires.
        match chrono::Duration::from_std(ttl) {
            Ok(ttl) => now.signed_duration_since(conversation.last_updated_at) > ttl,
            Err(_) => false,
        }
    }

    /// Drop every conversation that has been idle past the TTL.
    fn prune(&mut self, now: DateTime<Utc>) {
        if self.ttl.is_none() {
            return;
        }

        let expired = self
            .conversations
            .iter()
            .filter(|(_, c)| self.is_expired(c, now))
            .map(|(k, _)| k.clone())
            .collect::<Vec<_>>();

        for key in expired {
            debug!(thread_key = %key, "Forgetting an expired conversation.");
            self.conversations.remove(&key);
        }
    }

    /// Evict least-recently-updated conversations until one more fits under the cap.
    fn make_room(&mut self) {
        let Some(max) = self.max_entries else {
            return;
        };

        while !self.conversations.is_empty() && self.conversations.len() >= max {
            let oldest = self.conversations.iter().min_by_key(|(_, c)| c.last_updated_at).map(|(k, _)| k.clone());

            if let Some(key) = oldest {
                debug!(thread_key = %key, "Evicting the least recently updated conversation.");
                self.conversations.remove(&key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn tracked_thread_becomes_active() {
        let mut tracker = ConversationTracker::default();

        assert!(!tracker.is_active("100"));
        tracker.track("100", "U1");
        assert!(tracker.is_active("100"));
        assert!(!tracker.is_active("200"));
    }

    #[test]
    fn new_conversation_records_participant_and_times() {
        let mut tracker = ConversationTracker::default();
        tracker.track_at("100", "U1", at(0));

        let conversation = tracker.get("100").unwrap();
        assert_eq!(conversation.participants, BTreeSet::from(["U1".to_string()]));
        assert_eq!(conversation.started_at, at(0));
        assert_eq!(conversation.last_updated_at, at(0));
    }

    #[test]
    fn repeated_tracking_is_idempotent_on_participants() {
        let mut tracker = ConversationTracker::default();
        tracker.track_at("100", "U1", at(0));
        tracker.track_at("100", "U1", at(5));
        tracker.track_at("100", "U1", at(9));

        let conversation = tracker.get("100").unwrap();
        assert_eq!(conversation.participants.len(), 1);
        assert_eq!(conversation.started_at, at(0));
        assert_eq!(conversation.last_updated_at, at(9));
    }

    #[test]
    fn last_updated_never_moves_backwards() {
        let mut tracker = ConversationTracker::default();
        tracker.track_at("100", "U1", at(10));
        tracker.track_at("100", "U1", at(3));

        assert_eq!(tracker.get("100").unwrap().last_updated_at, at(10));
    }

    #[test]
    fn new_participants_join() {
        let mut tracker = ConversationTracker::default();
        tracker.track_at("100", "U1", at(0));
        tracker.track_at("100", "U2", at(1));

        let conversation = tracker.get("100").unwrap();
        assert!(conversation.participants.contains("U1"));
        assert!(conversation.participants.contains("U2"));
        assert_eq!(conversation.last_updated_at, at(1));
    }

    #[test]
    fn idle_conversations_expire() {
        let mut tracker = ConversationTracker::new(Some(Duration::from_secs(60)), None);
        tracker.track_at("100", "U1", at(0));

        assert!(tracker.is_active_at("100", at(60)));
        assert!(!tracker.is_active_at("100", at(61)));

        // The next track drops it from the table entirely.
        tracker.track_at("200", "U2", at(61));
        assert!(tracker.get("100").is_none());
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn cap_evicts_least_recently_updated() {
        let mut tracker = ConversationTracker::new(None, Some(2));
        tracker.track_at("a", "U1", at(0));
        tracker.track_at("b", "U1", at(1));
        tracker.track_at("a", "U1", at(2));
        tracker.track_at("c", "U1", at(3));

        assert_eq!(tracker.len(), 2);
        assert!(tracker.is_active_at("a", at(3)));
        assert!(!tracker.is_active_at("b", at(3)));
        assert!(tracker.is_active_at("c", at(3)));
    }
}
