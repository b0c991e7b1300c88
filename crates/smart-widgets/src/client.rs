use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use nostr_sdk::prelude::*;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::Error;

/// Upper bound on how long `connect` waits for relays to come up.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishResult {
    pub event_id: String,
    pub success: usize,
    pub failed: usize,
}

/// Live stream of events for one query. Dropping it stops delivery.
pub struct Subscription {
    ids: Vec<SubscriptionId>,
    events: mpsc::UnboundedReceiver<Event>,
}

impl Subscription {
    pub fn new(ids: Vec<SubscriptionId>, events: mpsc::UnboundedReceiver<Event>) -> Self {
        Self { ids, events }
    }

    pub fn ids(&self) -> &[SubscriptionId] {
        &self.ids
    }

    /// Next event, or `None` once the source has gone away.
    pub async fn next_event(&mut self) -> Option<Event> {
        self.events.recv().await
    }
}

/// The network side of a widget: relay connections, subscriptions and
/// publishing.
#[async_trait]
pub trait RelayClient: Send + Sync {
    async fn connect(&self, relays: &[String]) -> Result<(), Error>;
    async fn disconnect(&self);
    async fn subscribe(&self, filters: Vec<Filter>) -> Result<Subscription, Error>;
    async fn unsubscribe(&self, subscription: &Subscription);
    async fn publish(&self, event: &Event, relays: &[String]) -> Result<PublishResult, Error>;
}

/// Event delivered for a subscription, however the pool reported it.
///
/// The pool emits `Event` only the first time it sees an event, and never
/// for events this client sent. Raw `EVENT` messages arrive every time.
fn subscription_event(notification: RelayPoolNotification) -> Option<(SubscriptionId, Event)> {
    match notification {
        RelayPoolNotification::Event {
            subscription_id,
            event,
            ..
        } => Some((subscription_id, *event)),
        RelayPoolNotification::Message {
            message:
                RelayMessage::Event {
                    subscription_id,
                    event,
                },
            ..
        } => Some((subscription_id.into_owned(), event.into_owned())),
        _ => None,
    }
}

/// [`RelayClient`] backed by the nostr-sdk relay pool.
#[derive(Clone)]
pub struct NostrRelayClient {
    client: Client,
}

impl NostrRelayClient {
    pub fn new(keys: Keys) -> Self {
        let client = Client::builder().signer(keys).build();
        Self { client }
    }

    pub fn inner(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl RelayClient for NostrRelayClient {
    async fn connect(&self, relays: &[String]) -> Result<(), Error> {
        for relay in relays {
            self.client.add_relay(relay).await?;
        }
        self.client.connect().await;
        self.client.wait_for_connection(CONNECT_TIMEOUT).await;
        info!(relays = relays.len(), "Connected to nostr relays");
        Ok(())
    }

    async fn disconnect(&self) {
        self.client.disconnect().await;
    }

    async fn subscribe(&self, filters: Vec<Filter>) -> Result<Subscription, Error> {
        // Take the receiver first so nothing sent right after REQ is missed.
        let mut notifications = self.client.notifications();

        let mut ids = Vec::with_capacity(filters.len());
        for filter in filters {
            // The pool keeps the id even when the REQ fails.
            let id = SubscriptionId::generate();
            ids.push(id.clone());
            if let Err(err) = self.client.subscribe_with_id(id, filter, None).await {
                for id in &ids {
                    self.client.unsubscribe(id).await;
                }
                return Err(err.into());
            }
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let wanted: HashSet<SubscriptionId> = ids.iter().cloned().collect();
        tokio::spawn(async move {
            let mut seen = HashSet::new();
            loop {
                let notification = tokio::select! {
                    _ = tx.closed() => break,
                    notification = notifications.recv() => notification,
                };
                match notification {
                    Ok(notification) => {
                        let Some((subscription_id, event)) = subscription_event(notification)
                        else {
                            continue;
                        };
                        if !wanted.contains(&subscription_id) || !seen.insert(event.id) {
                            continue;
                        }
                        if tx.send(event).is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Nostr notification stream lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            debug!("Subscription forwarder stopped");
        });

        Ok(Subscription::new(ids, rx))
    }

    async fn unsubscribe(&self, subscription: &Subscription) {
        for id in subscription.ids() {
            self.client.unsubscribe(id).await;
        }
    }

    async fn publish(&self, event: &Event, relays: &[String]) -> Result<PublishResult, Error> {
        let output = self.client.send_event_to(relays.to_vec(), event).await?;

        Ok(PublishResult {
            event_id: output.id().to_string(),
            success: output.success.len(),
            failed: output.failed.len(),
        })
    }
}
