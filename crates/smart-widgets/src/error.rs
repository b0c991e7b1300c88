use thiserror::Error;

use crate::validate::UrlContext;

/// Reasons a field, relay set or component set is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("title must be a string")]
    Title,
    #[error("invalid {context} url: {url}")]
    Url { context: UrlContext, url: String },
    #[error("relay set must not be empty")]
    EmptyRelaySet,
    #[error("relay url must use wss: {0}")]
    InsecureRelay(String),
    #[error("component set must not be empty")]
    EmptyComponents,
    #[error("image required")]
    ImageRequired,
    #[error("too many images")]
    TooManyImages,
    #[error("icon required")]
    IconRequired,
    #[error("too many icons")]
    TooManyIcons,
    #[error("an app button is required when combining an input with multiple buttons")]
    AppButtonRequired,
    #[error("too many inputs")]
    TooManyInputs,
    #[error("buttons exceeded limit or non-consecutive indexes")]
    ButtonIndexes,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("button index must be at least 1, got {0}")]
    InvalidIndex(u32),
    #[error("{0} label must not be empty")]
    EmptyLabel(&'static str),
    #[error("unknown {kind}: {value}")]
    UnknownValue { kind: &'static str, value: String },
    #[error("secret key must be 32 hex-encoded bytes")]
    InvalidSecretKey,
    #[error("component set was validated for {set} widgets, not {widget}")]
    WidgetTypeMismatch { set: String, widget: String },
    #[error("nostr client error: {0}")]
    NostrClient(#[from] nostr_sdk::client::Error),
    #[error("nostr key error: {0}")]
    NostrKey(#[from] nostr_sdk::nostr::key::Error),
    #[error("nostr tag error: {0}")]
    NostrTag(#[from] nostr_sdk::nostr::event::tag::Error),
    #[error("nostr event builder error: {0}")]
    NostrBuilder(#[from] nostr_sdk::nostr::event::builder::Error),
    #[error("nip19 error: {0}")]
    Nip19(#[from] nostr_sdk::nostr::nips::nip19::Error),
    #[error("serde json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("missing {0} tag")]
    MissingTag(&'static str),
    #[error("unexpected event kind: {0}")]
    UnexpectedKind(u16),
    #[error("publish timed out, make sure the widget is initialized and the relay set is reachable")]
    PublishTimeout,
    #[error("publish failed ({0}), make sure the widget is initialized and the relay set is reachable")]
    PublishFailed(Box<Error>),
}
