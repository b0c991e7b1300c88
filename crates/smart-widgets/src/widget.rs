use std::sync::Arc;
use std::time::Duration;

use nostr_sdk::prelude::*;
use tokio::time::{timeout_at, Instant};
use tracing::{info, warn};
use uuid::Uuid;

use crate::client::{NostrRelayClient, RelayClient, Subscription};
use crate::collector::{collect, Collected};
use crate::component_set::ComponentSet;
use crate::components::Component;
use crate::config::WidgetConfig;
use crate::events::{d_tag, l_tag, widget_address, SignedWidget, KIND_SMART_WIDGET};
use crate::Error;

/// Publish confirmation progress for one event.
enum Confirmation {
    Listening,
    Matched,
    Closed,
}

/// Signs, publishes and searches smart widgets for one identity and relay
/// set.
#[derive(Clone)]
pub struct Widget {
    config: WidgetConfig,
    keys: Keys,
    client: Arc<dyn RelayClient>,
}

impl Widget {
    /// Validates the relay set and key; does not touch the network.
    pub fn new(config: WidgetConfig) -> Result<Self, Error> {
        config.validate()?;
        let keys = config.keys()?;
        let client = Arc::new(NostrRelayClient::new(keys.clone()));
        Ok(Self {
            config,
            keys,
            client,
        })
    }

    pub fn with_client(config: WidgetConfig, client: Arc<dyn RelayClient>) -> Result<Self, Error> {
        config.validate()?;
        let keys = config.keys()?;
        Ok(Self {
            config,
            keys,
            client,
        })
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn public_key(&self) -> PublicKey {
        self.keys.public_key()
    }

    /// Connects to the relay set. Must finish before `publish`.
    pub async fn init(&self) -> Result<(), Error> {
        self.client.connect(&self.config.relays).await
    }

    pub async fn teardown(&self) {
        self.client.disconnect().await;
    }

    /// Validates `components` for this widget's type.
    pub fn component_set(&self, components: Vec<Component>) -> Result<ComponentSet, Error> {
        ComponentSet::new(components, self.config.widget_type)
    }

    /// Builds and signs the widget event without any network access.
    pub fn sign_event(
        &self,
        components: &ComponentSet,
        title: Option<&str>,
        identifier: Option<&str>,
    ) -> Result<SignedWidget, Error> {
        if components.widget_type() != self.config.widget_type {
            return Err(Error::WidgetTypeMismatch {
                set: components.widget_type().to_string(),
                widget: self.config.widget_type.to_string(),
            });
        }

        let identifier = match identifier {
            Some(value) if !value.is_empty() => value.to_string(),
            _ => Uuid::new_v4().to_string(),
        };

        let mut tags = Vec::with_capacity(components.components().len() + 2);
        tags.push(d_tag(&identifier).to_sdk_tag()?);
        tags.push(l_tag(self.config.widget_type).to_sdk_tag()?);
        for tag in components.to_tags() {
            tags.push(tag.to_sdk_tag()?);
        }

        let event = EventBuilder::new(Kind::Custom(KIND_SMART_WIDGET), title.unwrap_or_default())
            .tags(tags)
            .sign_with_keys(&self.keys)?;
        let naddr = widget_address(event.pubkey, &identifier)?;

        Ok(SignedWidget {
            event,
            identifier,
            naddr,
        })
    }

    /// Signs, publishes to the configured relays and waits until a relay
    /// serves the event back, all within `timeout` (the configured publish
    /// timeout when `None`).
    ///
    /// Network failures come back as [`Error::PublishFailed`], a missing
    /// confirmation as [`Error::PublishTimeout`].
    pub async fn publish(
        &self,
        components: &ComponentSet,
        title: Option<&str>,
        identifier: Option<&str>,
        timeout: Option<Duration>,
    ) -> Result<SignedWidget, Error> {
        let signed = self.sign_event(components, title, identifier)?;
        let timeout = timeout.unwrap_or(self.config.publish_timeout);
        let deadline = Instant::now() + timeout;

        match self.publish_and_confirm(&signed.event, deadline).await {
            Ok(()) => {
                info!(
                    event_id = %signed.event.id,
                    naddr = %signed.naddr,
                    "Published smart widget"
                );
                Ok(signed)
            }
            Err(Error::PublishTimeout) => {
                warn!(
                    event_id = %signed.event.id,
                    timeout_ms = timeout.as_millis() as u64,
                    "Smart widget publish was not confirmed in time"
                );
                Err(Error::PublishTimeout)
            }
            Err(err) => {
                warn!(event_id = %signed.event.id, error = %err, "Smart widget publish failed");
                Err(Error::PublishFailed(Box::new(err)))
            }
        }
    }

    async fn publish_and_confirm(&self, event: &Event, deadline: Instant) -> Result<(), Error> {
        let mut subscription = timeout_at(
            deadline,
            self.client.subscribe(vec![Filter::new().id(event.id)]),
        )
        .await
        .map_err(|_| Error::PublishTimeout)??;

        let result = timeout_at(deadline, self.await_confirmation(&mut subscription, event)).await;
        self.client.unsubscribe(&subscription).await;
        result.map_err(|_| Error::PublishTimeout)?
    }

    async fn await_confirmation(
        &self,
        subscription: &mut Subscription,
        event: &Event,
    ) -> Result<(), Error> {
        let output = self.client.publish(event, &self.config.relays).await?;
        info!(
            event_id = %output.event_id,
            success = output.success,
            failed = output.failed,
            "Sent smart widget to relays"
        );

        let mut state = Confirmation::Listening;
        while let Confirmation::Listening = state {
            state = match subscription.next_event().await {
                Some(seen) if seen.id == event.id => Confirmation::Matched,
                Some(_) => Confirmation::Listening,
                None => Confirmation::Closed,
            };
        }

        match state {
            Confirmation::Matched => Ok(()),
            // Nothing left to wait for; the deadline decides.
            _ => std::future::pending().await,
        }
    }

    /// Time-boxed query using the configured collector options.
    pub async fn search_nostr(&self, filters: Vec<Filter>) -> Result<Collected, Error> {
        collect(self.client.as_ref(), filters, &self.config.collector).await
    }
}
