//! Slack integration for faq-bot.
//!
//! This module connects to Slack over socket mode and:
//! - Forwards every push event to the bot as a [`RawEvent`]
//! - Posts replies, threaded on the conversation they answer
//!
//! The bot's own user ID is looked up once, when the client is created.

use crate::base::{
    config::Config,
    types::{RawEvent, Res, Void},
};
use anyhow::anyhow;
use async_trait::async_trait;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use slack_morphism::prelude::*;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use std::sync::Arc;

use super::{ChatClient, EventSender, GenericChatClient};

// Type aliases.

type Connector = SlackClientHyperConnector<HttpsConnector<HttpConnector>>;
type FullClient = slack_morphism::SlackClient<Connector>;
type Listener = SlackClientSocketModeListener<Connector>;

// Extra methods on `ChatClient` applied by the slack implementation.

impl ChatClient {
    /// Creates a new Slack chat client.
    pub async fn slack(config: &Config) -> Res<Self> {
        let client = SlackChatClient::new(config).await?;
        Ok(Self { inner: Arc::new(client) })
    }
}

// Structs.

/// User state for the slack socket client.
struct SlackUserState {
    events: EventSender,
}

/// Slack client implementation.
struct SlackChatClient {
    app_token: SlackApiToken,
    bot_token: SlackApiToken,
    bot_user_id: String,
    client: Arc<FullClient>,
    listener: Mutex<Option<Arc<Listener>>>,
}

impl SlackChatClient {
    /// Create a new Slack chat client.
    #[instrument(name = "SlackChatClient::new", skip_all)]
    pub async fn new(config: &Config) -> Res<Self> {
        // Initialize tokens.

        let app_token = SlackApiToken::new(SlackApiTokenValue(config.slack_app_token.clone()));
        let bot_token = SlackApiToken::new(SlackApiTokenValue(config.slack_bot_token.clone()));

        // Initialize the Slack client.

        let https_connector = HttpsConnector::<HttpConnector>::builder().with_native_roots()?.https_only().enable_all_versions().build();
        let connector = SlackClientHyperConnector::with_connector(https_connector);
        let client = Arc::new(slack_morphism::SlackClient::new(connector));

        // Get the bot's user ID.

        let session = client.open_session(&bot_token);
        let bot_user = session.auth_test().await.map_err(|e| anyhow!("Failed to authenticate with Slack: {}", e))?;
        let bot_user_id = bot_user.user_id.0;

        info!("Slack bot user ID: {}", bot_user_id);

        Ok(Self {
            app_token,
            bot_token,
            bot_user_id,
            client,
            listener: Mutex::new(None),
        })
    }
}

#[async_trait]
impl GenericChatClient for SlackChatClient {
    fn bot_user_id(&self) -> &str {
        &self.bot_user_id
    }

    async fn connect(&self, events: EventSender) -> Void {
        // Initialize the socket mode listener.

        let socket_mode_callbacks = SlackSocketModeListenerCallbacks::new().with_push_events(handle_push_event);

        let listener_environment = Arc::new(SlackClientEventsListenerEnvironment::new(self.client.clone()).with_user_state(SlackUserState { events }));

        let socket_mode_listener = Arc::new(SlackClientSocketModeListener::new(
            &SlackClientSocketModeConfig::new(),
            listener_environment.clone(),
            socket_mode_callbacks,
        ));

        // Register an app token to listen for events, then open the WS connections.
        socket_mode_listener.listen_for(&self.app_token).await.map_err(|e| anyhow!("Failed to connect to Slack: {}", e))?;
        socket_mode_listener.start().await;

        info!("Connected to Slack.");

        *self.listener.lock().await = Some(socket_mode_listener);

        Ok(())
    }

    async fn disconnect(&self) -> Void {
        if let Some(listener) = self.listener.lock().await.take() {
            listener.shutdown().await;
            info!("Disconnected from Slack.");
        }

        Ok(())
    }

    #[instrument(skip(self, text))]
    async fn send_message(&self, channel_id: &str, thread_ts: &str, text: &str) -> Void {
        let message = SlackMessageContent::new().with_text(text.to_string());

        let mut request = SlackApiChatPostMessageRequest::new(SlackChannelId(channel_id.to_string()), message).with_as_user(true).with_link_names(true);

        if !thread_ts.is_empty() {
            request = request.with_thread_ts(SlackTs(thread_ts.to_string()));
        }

        let session = self.client.open_session(&self.bot_token);

        let _ = session.chat_post_message(&request).await.map_err(|e| anyhow!("Failed to send message: {}", e))?;

        Ok(())
    }
}

// Socket mode listener callbacks for Slack.

/// Converts a push event into the bot's `RawEvent`.
fn to_raw_event(event: &SlackEventCallbackBody) -> Res<RawEvent> {
    let value = serde_json::to_value(event)?;
    Ok(serde_json::from_value(value)?)
}

/// Handles push events from Slack.
#[instrument(skip_all)]
async fn handle_push_event(event_callback: SlackPushEventCallback, _client: Arc<SlackHyperClient>, states: SlackClientEventsUserState) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let states = states.read().await;
    let user_state = states.get_user_state::<SlackUserState>().ok_or(anyhow!("Failed to get user state"))?;

    // Events the bot can't read are irrelevant to it, so they are dropped here.
    let event = match to_raw_event(&event_callback.event) {
        Ok(event) => event,
        Err(e) => {
            debug!("Skipping unreadable push event: {}", e);
            return Ok(());
        }
    };

    if user_state.events.send(event).is_err() {
        warn!("Dropping push event, the bot is shutting down.");
    }

    Ok(())
}

// Tests.

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn message_push_event_becomes_raw_event() {
        let body: SlackEventCallbackBody = serde_json::from_value(json!({
            "type": "message",
            "channel": "C1",
            "user": "U1",
            "text": "<@BOT> how do I deploy?",
            "ts": "100.000",
            "thread_ts": "90.000",
            "channel_type": "channel"
        }))
        .unwrap();

        let event = to_raw_event(&body).unwrap();

        assert_eq!(event.kind, "message");
        assert_eq!(event.channel.as_deref(), Some("C1"));
        assert_eq!(event.user.as_deref(), Some("U1"));
        assert_eq!(event.text.as_deref(), Some("<@BOT> how do I deploy?"));
        assert_eq!(event.thread_key(), Some("90.000"));
        assert!(event.is_plain_message());
    }
}
