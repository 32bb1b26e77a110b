//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, path::PathBuf, sync::Arc, time::Duration};

use serde::Deserialize;

use crate::base::replies;

use super::types::Res;

/// Default location of the FAQ definitions.
fn default_faq_path() -> PathBuf {
    PathBuf::from("./faq.json")
}

/// Hot-reload the FAQ file by default.
fn default_watch_faq() -> bool {
    true
}

/// Default delay between reads of the event stream.
fn default_poll_interval_ms() -> u64 {
    1000
}

/// Default help keyword.
fn default_help_command() -> String {
    replies::HELP_COMMAND.to_string()
}

/// Default list of event types kept out of the debug output.
fn default_filtered_event_types() -> Vec<String> {
    replies::FILTERED_EVENT_TYPES.iter().map(|s| s.to_string()).collect()
}

/// Default conversation expiry (one day).
fn default_conversation_ttl_secs() -> u64 {
    86_400
}

/// Default cap on tracked conversations.
fn default_max_conversations() -> usize {
    1000
}

/// Configuration for the faq-bot application.
#[derive(Debug, Clone)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ConfigInner {
    /// Slack app token used for socket mode (`FAQ_BOT_SLACK_APP_TOKEN`).
    pub slack_app_token: String,
    /// Slack bot token (`FAQ_BOT_SLACK_BOT_TOKEN`).
    pub slack_bot_token: String,
    /// Verbose diagnostics (`FAQ_BOT_DEBUG`).
    #[serde(default)]
    pub debug: bool,
    /// Path to the FAQ JSON file (`FAQ_BOT_FAQ_PATH`).
    #[serde(default = "default_faq_path")]
    pub faq_path: PathBuf,
    /// Reload the FAQ file when it changes on disk (`FAQ_BOT_WATCH_FAQ`).
    #[serde(default = "default_watch_faq")]
    pub watch_faq: bool,
    /// Delay between reads of the event stream, in milliseconds (`FAQ_BOT_POLL_INTERVAL_MS`).
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Keyword that lists the known FAQ keywords (`FAQ_BOT_HELP_COMMAND`).
    #[serde(default = "default_help_command")]
    pub help_command: String,
    /// Event types that are never logged at debug level.
    #[serde(default = "default_filtered_event_types")]
    pub filtered_event_types: Vec<String>,
    /// Seconds of inactivity before a conversation is forgotten; `0` keeps them forever
    /// (`FAQ_BOT_CONVERSATION_TTL_SECS`).
    #[serde(default = "default_conversation_ttl_secs")]
    pub conversation_ttl_secs: u64,
    /// Maximum number of tracked conversations; `0` means unbounded
    /// (`FAQ_BOT_MAX_CONVERSATIONS`).
    #[serde(default = "default_max_conversations")]
    pub max_conversations: usize,
}

impl Default for ConfigInner {
    fn default() -> Self {
        Self {
            slack_app_token: String::new(),
            slack_bot_token: String::new(),
            debug: false,
            faq_path: default_faq_path(),
            watch_faq: default_watch_faq(),
            poll_interval_ms: default_poll_interval_ms(),
            help_command: default_help_command(),
            filtered_event_types: default_filtered_event_types(),
            conversation_ttl_secs: default_conversation_ttl_secs(),
            max_conversations: default_max_conversations(),
        }
    }
}

impl ConfigInner {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn conversation_ttl(&self) -> Option<Duration> {
        (self.conversation_ttl_secs > 0).then(|| Duration::from_secs(self.conversation_ttl_secs))
    }

    pub fn conversation_cap(&self) -> Option<usize> {
        (self.max_conversations > 0).then_some(self.max_conversations)
    }
}

impl Config {
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let mut cfg = config::Config::builder();

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        cfg = cfg.add_source(config::Environment::default().prefix("FAQ_BOT").prefix_separator("_").list_separator(",").with_list_parse_key("filtered_event_types").try_parsing(true));

        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize()?),
        };

        result.validate()?;

        Ok(result)
    }

    pub fn validate(&self) -> Res<()> {
        if self.slack_app_token.trim().is_empty() {
            return Err(anyhow::anyhow!("Slack app token must not be empty."));
        }

        if self.slack_bot_token.trim().is_empty() {
            return Err(anyhow::anyhow!("Slack bot token must not be empty."));
        }

        if self.poll_interval_ms < 1 || self.poll_interval_ms > 60_000 {
            return Err(anyhow::anyhow!("Poll interval must be between 1 and 60000 milliseconds."));
        }

        Ok(())
    }
}

impl From<ConfigInner> for Config {
    fn from(inner: ConfigInner) -> Self {
        Self { inner: Arc::new(inner) }
    }
}
