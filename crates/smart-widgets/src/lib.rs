//! Build, sign, publish and search Nostr smart widgets.
//!
//! A smart widget is an addressable Nostr event (kind 30033) describing a
//! small UI: one image, an optional icon, an optional input and up to six
//! buttons. This crate validates component combinations, encodes them into
//! canonical tags, signs the event and publishes it to a relay set.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        SMART-WIDGETS                             │
//! │                                                                  │
//! │  Icon / Image / Input / Button ──▶ ComponentSet (validated)      │
//! │                                         │                        │
//! │                                         ▼                        │
//! │  ┌─────────────────────┐       ┌─────────────────────┐          │
//! │  │   Widget            │       │   collector         │          │
//! │  │   (write path)      │──────▶│   (read path)       │          │
//! │  │                     │       │                     │          │
//! │  │ - sign_event        │       │ - subscribe         │          │
//! │  │ - publish           │       │ - quiet period      │          │
//! │  │ - search_nostr      │       │ - hard cap          │          │
//! │  └──────────┬──────────┘       └──────────┬──────────┘          │
//! │             │                             │                      │
//! │             ▼                             ▼                      │
//! │                 RelayClient (nostr-sdk)                          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Event layout
//!
//! | Tag | Values | Notes |
//! |-----|--------|-------|
//! | `d` | identifier | given or random UUID |
//! | `l` | `basic` / `action` / `tool` | widget type |
//! | `icon`, `image` | url | insertion order |
//! | `input` | label | at most one |
//! | `button` | label, type, url | sorted by index |
//!
//! # Example
//!
//! ```rust,ignore
//! use smart_widgets::{Button, ButtonType, Image, Widget, WidgetConfig, WidgetType};
//!
//! let widget = Widget::new(WidgetConfig::new(WidgetType::Basic).secret_key("hex..."))?;
//! widget.init().await?;
//!
//! let set = widget.component_set(vec![
//!     Image::new("https://example.com/cover.png")?.into(),
//!     Button::new(1, "Visit", ButtonType::Redirect, "https://example.com")?.into(),
//! ])?;
//!
//! let signed = widget.publish(&set, Some("Hello"), None, None).await?;
//! println!("{}", signed.naddr);
//! ```
//!
//! # Traits
//!
//! - [`RelayClient`] - connections, subscriptions and publishing; implemented
//!   by [`NostrRelayClient`]

mod client;
mod collector;
mod component_set;
mod components;
mod config;
mod error;
mod events;
mod manifest;
mod validate;
mod widget;

pub use client::{NostrRelayClient, PublishResult, RelayClient, Subscription};
pub use collector::{collect, sanitize_filter, Collected, CollectorOptions, DEFAULT_QUIET_PERIOD};
pub use component_set::{validate_components, ComponentSet, MAX_BUTTONS};
pub use components::{
    Button, ButtonType, Component, Icon, Image, Input, TAG_BUTTON, TAG_ICON, TAG_IMAGE, TAG_INPUT,
};
pub use config::{process_keys, WidgetConfig, DEFAULT_PUBLISH_TIMEOUT, DEFAULT_RELAYS};
pub use error::{Error, ValidationError};
pub use events::{
    d_tag, l_tag, tag_value, widget_address, NostrTag, SignedWidget, SmartWidget, WidgetType,
    KIND_SMART_WIDGET, TAG_IDENTIFIER, TAG_WIDGET_TYPE,
};
pub use manifest::{ComponentSpec, WidgetManifest};
pub use validate::{validate_relay_set, validate_title, validate_url, UrlContext};
pub use widget::Widget;

/// Crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
