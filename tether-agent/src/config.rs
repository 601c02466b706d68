//! Binding configuration
//!
//! Connection settings for the relay plus the per-deployment binding
//! flags. All values can come from the environment to suit container
//! deployments.

use std::time::Duration;

/// Relay binding configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Relay base URL (e.g., "https://relay.example.com")
    pub relay_url: String,

    /// Login username for the password grant
    pub username: String,

    /// Login password
    pub password: String,

    /// Deployment prefix prepended to every derived topic name; empty for
    /// none
    pub topic_prefix: String,

    /// Whether to start a consumer worker for command topics
    pub consume: bool,

    /// Whether to publish job state transitions
    pub publish: bool,

    /// Server-side hold window for each long poll
    pub poll_timeout: Duration,
}

impl Config {
    /// Creates a new configuration with defaults
    pub fn new(relay_url: String, username: String, password: String) -> Self {
        Self {
            relay_url,
            username,
            password,
            topic_prefix: String::new(),
            consume: true,
            publish: true,
            poll_timeout: Duration::from_secs(30),
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - RELAY_URL (required)
    /// - RELAY_USERNAME (required)
    /// - RELAY_PASSWORD (required)
    /// - RELAY_TOPIC_PREFIX (optional, default: empty)
    /// - MESSAGE_QUEUE_CONSUME (optional, default: true)
    /// - MESSAGE_QUEUE_PUBLISH (optional, default: true)
    /// - POLL_TIMEOUT (optional, seconds, default: 30)
    pub fn from_env() -> anyhow::Result<Self> {
        let relay_url = std::env::var("RELAY_URL")
            .map_err(|_| anyhow::anyhow!("RELAY_URL environment variable not set"))?;

        let username = std::env::var("RELAY_USERNAME")
            .map_err(|_| anyhow::anyhow!("RELAY_USERNAME environment variable not set"))?;

        let password = std::env::var("RELAY_PASSWORD")
            .map_err(|_| anyhow::anyhow!("RELAY_PASSWORD environment variable not set"))?;

        let topic_prefix = std::env::var("RELAY_TOPIC_PREFIX").unwrap_or_default();

        let consume = std::env::var("MESSAGE_QUEUE_CONSUME")
            .ok()
            .and_then(|s| s.parse::<bool>().ok())
            .unwrap_or(true);

        let publish = std::env::var("MESSAGE_QUEUE_PUBLISH")
            .ok()
            .and_then(|s| s.parse::<bool>().ok())
            .unwrap_or(true);

        let poll_timeout = std::env::var("POLL_TIMEOUT")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(30));

        Ok(Self {
            relay_url,
            username,
            password,
            topic_prefix,
            consume,
            publish,
            poll_timeout,
        })
    }

    /// Sets the topic prefix
    pub fn with_topic_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.topic_prefix = prefix.into();
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.relay_url.is_empty() {
            anyhow::bail!("relay_url cannot be empty");
        }

        if !self.relay_url.starts_with("http://") && !self.relay_url.starts_with("https://") {
            anyhow::bail!("relay_url must start with http:// or https://");
        }

        if self.username.is_empty() {
            anyhow::bail!("username cannot be empty");
        }

        if self.password.is_empty() {
            anyhow::bail!("password cannot be empty");
        }

        let window = self.poll_timeout.as_secs();
        if !(1..=60).contains(&window) {
            anyhow::bail!("poll_timeout must be between 1 and 60 seconds");
        }

        Ok(())
    }
}
