pub mod slack;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::base::types::{RawEvent, Void};

// Types.

/// Where a chat client delivers the events it receives.
pub type EventSender = mpsc::UnboundedSender<RawEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<RawEvent>;

// Traits.

/// Generic "chat" trait that clients must implement.
///
/// This trait defines the core functionality for interacting with chat platforms
/// like Slack. Implementing this trait allows different chat services to be used
/// with the faq-bot.
#[async_trait]
pub trait GenericChatClient: Send + Sync + 'static {
    /// Get the bot user ID.
    ///
    /// Returns the unique identifier for the bot in the chat platform,
    /// which is used to detect when the bot is mentioned.
    fn bot_user_id(&self) -> &str;

    /// Connect to the chat platform.
    ///
    /// Every event received afterwards is forwarded to `events` until
    /// [`GenericChatClient::disconnect`] is called.
    async fn connect(&self, events: EventSender) -> Void;

    /// Disconnect from the chat platform.
    async fn disconnect(&self) -> Void;

    /// Send a message to a channel thread.
    ///
    /// An empty `thread_ts` posts to the channel itself.
    async fn send_message(&self, channel_id: &str, thread_ts: &str, text: &str) -> Void;
}

// Structs.

/// Chat client for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<dyn GenericChatClient>,
}

impl Deref for ChatClient {
    type Target = dyn GenericChatClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ChatClient {
    pub fn new(inner: Arc<dyn GenericChatClient>) -> Self {
        Self { inner }
    }
}
