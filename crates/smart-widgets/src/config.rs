use std::env;
use std::sync::OnceLock;
use std::time::Duration;

use nostr_sdk::prelude::*;

use crate::collector::{CollectorOptions, DEFAULT_QUIET_PERIOD};
use crate::events::WidgetType;
use crate::validate::validate_relay_set;
use crate::Error;

pub const DEFAULT_RELAYS: [&str; 3] = [
    "wss://nostr-01.yakihonne.com",
    "wss://nostr-02.yakihonne.com",
    "wss://relay.damus.io",
];

pub const DEFAULT_PUBLISH_TIMEOUT: Duration = Duration::from_millis(3000);

#[derive(Clone)]
pub struct WidgetConfig {
    pub widget_type: WidgetType,
    pub relays: Vec<String>,
    /// Hex-encoded secret key. When absent `key_fallback` supplies the keys.
    pub secret_key: Option<String>,
    pub publish_timeout: Duration,
    pub collector: CollectorOptions,
    pub key_fallback: fn() -> Keys,
}

impl WidgetConfig {
    pub fn new(widget_type: WidgetType) -> Self {
        Self {
            widget_type,
            relays: DEFAULT_RELAYS.iter().map(|relay| relay.to_string()).collect(),
            secret_key: None,
            publish_timeout: DEFAULT_PUBLISH_TIMEOUT,
            collector: CollectorOptions::default(),
            key_fallback: process_keys,
        }
    }

    pub fn relays(mut self, relays: Vec<String>) -> Self {
        self.relays = relays;
        self
    }

    pub fn secret_key(mut self, secret_key: impl Into<String>) -> Self {
        self.secret_key = Some(secret_key.into());
        self
    }

    /// Create configuration from environment variables.
    ///
    /// - `SMART_WIDGET_TYPE` - basic, action or tool (default: basic)
    /// - `NOSTR_RELAYS` - comma or whitespace separated relay URLs
    /// - `NOSTR_SECRET_KEY` - hex secret key
    /// - `SMART_WIDGET_PUBLISH_TIMEOUT_MS` - publish confirmation timeout (default: 3000)
    /// - `SMART_WIDGET_QUIET_PERIOD_MS` - collector quiet period (default: 1000)
    /// - `SMART_WIDGET_MAX_COLLECT_MS` - optional hard cap on collection time
    pub fn from_env() -> Result<Self, Error> {
        let widget_type = match env::var("SMART_WIDGET_TYPE") {
            Ok(value) => value.parse()?,
            Err(_) => WidgetType::default(),
        };
        let mut config = Self::new(widget_type);

        if let Ok(value) = env::var("NOSTR_RELAYS") {
            let relays = parse_relays(&value);
            if !relays.is_empty() {
                config.relays = relays;
            }
        }

        config.secret_key = env::var("NOSTR_SECRET_KEY")
            .ok()
            .filter(|value| !value.trim().is_empty());

        config.publish_timeout = env_millis("SMART_WIDGET_PUBLISH_TIMEOUT_MS")
            .unwrap_or(DEFAULT_PUBLISH_TIMEOUT);
        config.collector = CollectorOptions {
            quiet_period: env_millis("SMART_WIDGET_QUIET_PERIOD_MS")
                .unwrap_or(DEFAULT_QUIET_PERIOD),
            max_duration: env_millis("SMART_WIDGET_MAX_COLLECT_MS"),
        };

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        validate_relay_set(&self.relays)?;
        Ok(())
    }

    /// Parses the configured key, or falls back to `key_fallback`.
    pub fn keys(&self) -> Result<Keys, Error> {
        match &self.secret_key {
            Some(secret) => parse_secret_key(secret),
            None => Ok((self.key_fallback)()),
        }
    }
}

/// Random keys generated on first use and shared for the rest of the
/// process.
pub fn process_keys() -> Keys {
    static KEYS: OnceLock<Keys> = OnceLock::new();
    KEYS.get_or_init(Keys::generate).clone()
}

fn parse_secret_key(secret: &str) -> Result<Keys, Error> {
    let secret = secret.trim();
    let bytes = hex::decode(secret).map_err(|_| Error::InvalidSecretKey)?;
    if bytes.len() != 32 {
        return Err(Error::InvalidSecretKey);
    }
    Ok(Keys::parse(secret)?)
}

pub(crate) fn parse_relays(value: &str) -> Vec<String> {
    value
        .split(',')
        .flat_map(|chunk| chunk.split_whitespace())
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

fn env_millis(name: &str) -> Option<Duration> {
    env::var(name)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .map(Duration::from_millis)
}
