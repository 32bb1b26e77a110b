//! Runtime services and shared state for the faq-bot.

use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    base::{
        config::Config,
        types::{RawEvent, Res, Void},
    },
    interaction::{classifier::EventClassifier, command, conversation::ConversationTracker},
    service::{
        chat::{ChatClient, EventReceiver},
        faq::{FaqStore, watcher::FaqWatcher},
    },
};

/// Runtime service context.
///
/// This struct holds the chat client, the FAQ table, and the conversation
/// state. Everything is owned by the single polling loop, so the
/// conversation state needs no locking.
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The chat client instance.
    pub chat: ChatClient,
    /// The current FAQ table.
    pub faq: FaqStore,
    /// Threads the bot is taking part in.
    pub conversations: ConversationTracker,
    /// Decides which events to answer.
    pub classifier: EventClassifier,
}

impl Runtime {
    /// Create a new runtime instance.
    #[instrument(skip_all)]
    pub async fn new(config: Config) -> Res<Self> {
        // Load the FAQ before touching the network, so a bad file fails fast.
        let faq = FaqStore::from_file(&config.faq_path)?;
        info!("Loaded {} FAQ keywords.", faq.current().len());

        // Initialize the chat client.
        let chat = ChatClient::slack(&config).await?;

        Ok(Self::from_parts(config, chat, faq))
    }

    /// Assemble a runtime from already constructed services.
    pub fn from_parts(config: Config, chat: ChatClient, faq: FaqStore) -> Self {
        let conversations = ConversationTracker::new(config.conversation_ttl(), config.conversation_cap());
        let classifier = EventClassifier::new(chat.bot_user_id(), config.filtered_event_types.iter().cloned());

        Self {
            config,
            chat,
            faq,
            conversations,
            classifier,
        }
    }

    /// Run the bot until interrupted.
    pub async fn start(mut self) -> Void {
        let (tx, mut rx) = mpsc::unbounded_channel();

        self.chat.connect(tx).await?;

        // The watcher stops when dropped at the end of this function.
        let _watcher = if self.config.watch_faq { Some(FaqWatcher::start(&self.config.faq_path, self.faq.clone())?) } else { None };

        info!("faq-bot connected and running!");

        let result = tokio::select! {
            result = self.run(&mut rx) => result,
            result = tokio::signal::ctrl_c() => {
                info!("Received interrupt, shutting down ...");
                result.map_err(Into::into)
            }
        };

        self.chat.disconnect().await?;

        result
    }

    /// The polling loop: read a batch, answer at most one message, wait.
    async fn run(&mut self, rx: &mut EventReceiver) -> Void {
        let interval = self.config.poll_interval();

        while let Some(batch) = next_batch(rx).await {
            self.process_batch(batch).await;
            tokio::time::sleep(interval).await;
        }

        warn!("Event stream closed.");

        Ok(())
    }

    /// Answer the first qualifying message in `events`.
    ///
    /// Returns the reply that was sent, if any. A failed send is logged and
    /// otherwise ignored.
    #[instrument(skip_all, fields(events = events.len()))]
    pub async fn process_batch(&mut self, events: Vec<RawEvent>) -> Option<String> {
        let command = self.classifier.classify(&events, &self.conversations)?;
        let metadata = &command.metadata;

        self.conversations.track(&metadata.thread_key, &metadata.user);
        debug!(conversations = self.conversations.len(), "Updated the conversation table.");

        let faq = self.faq.current();
        let reply = command::handle_command(&command.text, metadata, &faq, &self.config.help_command);

        if let Err(err) = self.chat.send_message(&metadata.channel, &metadata.thread_key, &reply).await {
            error!("Error while replying: {}", err);
        }

        Some(reply)
    }
}

/// Wait for the next event, then take everything else already queued with it.
///
/// Returns `None` once the channel is closed.
async fn next_batch(rx: &mut EventReceiver) -> Option<Vec<RawEvent>> {
    let first = rx.recv().await?;
    let mut batch = vec![first];

    while let Ok(event) = rx.try_recv() {
        batch.push(event);
    }

    Some(batch)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(kind: &str) -> RawEvent {
        RawEvent {
            kind: kind.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn batches_drain_queued_events() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        tx.send(event("hello")).unwrap();
        tx.send(event("message")).unwrap();

        let batch = next_batch(&mut rx).await.unwrap();
        assert_eq!(batch.iter().map(|e| e.kind.as_str()).collect::<Vec<_>>(), vec!["hello", "message"]);

        drop(tx);
        assert!(next_batch(&mut rx).await.is_none());
    }
}
