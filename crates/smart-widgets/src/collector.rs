//! Time-boxed event collection.
//!
//! Relays never say "that's everything", so a query is considered finished
//! once no new event has arrived for a quiet period. Each new event re-arms
//! the timer; an optional hard cap bounds the total duration.

use std::time::Duration;

use nostr_sdk::prelude::*;
use tokio::time::{sleep, sleep_until, Instant};
use tracing::debug;

use crate::client::RelayClient;
use crate::Error;

pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectorOptions {
    pub quiet_period: Duration,
    /// `None` keeps collecting for as long as events keep arriving.
    pub max_duration: Option<Duration>,
}

impl Default for CollectorOptions {
    fn default() -> Self {
        Self {
            quiet_period: DEFAULT_QUIET_PERIOD,
            max_duration: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collected {
    pub data: Vec<Event>,
    /// Authors of `data`, de-duplicated, in first-seen order.
    pub pubkeys: Vec<PublicKey>,
}

impl Collected {
    fn push(&mut self, event: Event) {
        if !self.pubkeys.contains(&event.pubkey) {
            self.pubkeys.push(event.pubkey);
        }
        self.data.push(event);
    }
}

enum Stop {
    Quiet,
    Capped,
    SourceClosed,
}

/// Collects events matching `filters` until the stream goes quiet.
///
/// Empty filters resolve immediately without opening a subscription.
/// Errors from the client's subscribe call are returned as-is.
pub async fn collect(
    client: &dyn RelayClient,
    filters: Vec<Filter>,
    options: &CollectorOptions,
) -> Result<Collected, Error> {
    let filters: Vec<Filter> = filters
        .into_iter()
        .map(sanitize_filter)
        .filter(|filter| *filter != Filter::new())
        .collect();
    if filters.is_empty() {
        return Ok(Collected::default());
    }

    let mut subscription = client.subscribe(filters).await?;
    let deadline = options.max_duration.map(|max| Instant::now() + max);
    let mut collected = Collected::default();

    let stop = loop {
        let capped = async {
            match deadline {
                Some(deadline) => sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            next = subscription.next_event() => match next {
                Some(event) => collected.push(event),
                None => break Stop::SourceClosed,
            },
            _ = sleep(options.quiet_period) => break Stop::Quiet,
            _ = capped => break Stop::Capped,
        }
    };

    client.unsubscribe(&subscription).await;
    debug!(
        events = collected.data.len(),
        authors = collected.pubkeys.len(),
        reason = match stop {
            Stop::Quiet => "quiet",
            Stop::Capped => "capped",
            Stop::SourceClosed => "closed",
        },
        "Collection finished"
    );

    Ok(collected)
}

/// Drops empty sets, empty values and zero bounds so a filter never carries
/// a degenerate constraint such as `"#d": [""]` or `"limit": 0`.
pub fn sanitize_filter(mut filter: Filter) -> Filter {
    if filter.ids.as_ref().is_some_and(|ids| ids.is_empty()) {
        filter.ids = None;
    }
    if filter.authors.as_ref().is_some_and(|authors| authors.is_empty()) {
        filter.authors = None;
    }
    if filter.kinds.as_ref().is_some_and(|kinds| kinds.is_empty()) {
        filter.kinds = None;
    }
    if filter.search.as_ref().is_some_and(|search| search.is_empty()) {
        filter.search = None;
    }
    if filter.since == Some(Timestamp::zero()) {
        filter.since = None;
    }
    if filter.until == Some(Timestamp::zero()) {
        filter.until = None;
    }
    if filter.limit == Some(0) {
        filter.limit = None;
    }
    filter.generic_tags.retain(|_, values| {
        values.retain(|value| !value.is_empty());
        !values.is_empty()
    });
    filter
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::sync::mpsc;

    use super::*;
    use crate::client::{PublishResult, Subscription};

    /// Hands out a pre-wired receiver and counts subscriptions.
    struct ScriptedClient {
        receiver: std::sync::Mutex<Option<mpsc::UnboundedReceiver<Event>>>,
        subscribes: AtomicUsize,
        unsubscribes: AtomicUsize,
    }

    impl ScriptedClient {
        fn new(receiver: mpsc::UnboundedReceiver<Event>) -> Self {
            Self {
                receiver: std::sync::Mutex::new(Some(receiver)),
                subscribes: AtomicUsize::new(0),
                unsubscribes: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl RelayClient for ScriptedClient {
        async fn connect(&self, _relays: &[String]) -> Result<(), Error> {
            Ok(())
        }

        async fn disconnect(&self) {}

        async fn subscribe(&self, _filters: Vec<Filter>) -> Result<Subscription, Error> {
            self.subscribes.fetch_add(1, Ordering::SeqCst);
            let receiver = self.receiver.lock().unwrap().take().unwrap();
            Ok(Subscription::new(vec![SubscriptionId::generate()], receiver))
        }

        async fn unsubscribe(&self, _subscription: &Subscription) {
            self.unsubscribes.fetch_add(1, Ordering::SeqCst);
        }

        async fn publish(&self, event: &Event, _relays: &[String]) -> Result<PublishResult, Error> {
            Ok(PublishResult {
                event_id: event.id.to_string(),
                success: 1,
                failed: 0,
            })
        }
    }

    fn note(keys: &Keys, content: &str) -> Event {
        EventBuilder::text_note(content).sign_with_keys(keys).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_collects_until_quiet() {
        let (tx, rx) = mpsc::unbounded_channel();
        let client = Arc::new(ScriptedClient::new(rx));
        let alice = Keys::generate();
        let bob = Keys::generate();
        let events = vec![note(&alice, "one"), note(&bob, "two"), note(&alice, "three")];

        let feed = events.clone();
        tokio::spawn(async move {
            for event in feed {
                sleep(Duration::from_millis(100)).await;
                tx.send(event).unwrap();
            }
            // Keep the stream open so only the quiet period can end it.
            sleep(Duration::from_secs(60)).await;
            drop(tx);
        });

        let started = Instant::now();
        let collected = collect(
            &*client,
            vec![Filter::new().kind(Kind::TextNote)],
            &CollectorOptions::default(),
        )
        .await
        .unwrap();
        let elapsed = started.elapsed();

        assert_eq!(collected.data, events);
        assert_eq!(collected.pubkeys, vec![alice.public_key(), bob.public_key()]);
        assert!(elapsed >= Duration::from_millis(1300));
        assert!(elapsed < Duration::from_millis(1400));
        assert_eq!(client.subscribes.load(Ordering::SeqCst), 1);
        assert_eq!(client.unsubscribes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_filters_skip_subscription() {
        let (_tx, rx) = mpsc::unbounded_channel();
        let client = ScriptedClient::new(rx);

        let collected = collect(&client, vec![], &CollectorOptions::default())
            .await
            .unwrap();
        assert_eq!(collected, Collected::default());

        let degenerate = Filter::new().identifier("");
        let collected = collect(&client, vec![degenerate], &CollectorOptions::default())
            .await
            .unwrap();
        assert!(collected.data.is_empty());
        assert!(collected.pubkeys.is_empty());
        assert_eq!(client.subscribes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hard_cap_bounds_collection() {
        let (tx, rx) = mpsc::unbounded_channel();
        let client = ScriptedClient::new(rx);
        let keys = Keys::generate();

        tokio::spawn(async move {
            loop {
                sleep(Duration::from_millis(200)).await;
                if tx.send(note(&keys, "spam")).is_err() {
                    break;
                }
            }
        });

        let options = CollectorOptions {
            quiet_period: Duration::from_millis(500),
            max_duration: Some(Duration::from_secs(2)),
        };
        let started = Instant::now();
        let collected = collect(&client, vec![Filter::new().kind(Kind::TextNote)], &options)
            .await
            .unwrap();

        assert!(started.elapsed() <= Duration::from_secs(2));
        assert!(!collected.data.is_empty());
        assert_eq!(collected.pubkeys.len(), 1);
    }

    #[tokio::test]
    async fn test_closed_source_resolves() {
        let (tx, rx) = mpsc::unbounded_channel();
        let client = ScriptedClient::new(rx);
        let keys = Keys::generate();
        tx.send(note(&keys, "only")).unwrap();
        drop(tx);

        let collected = collect(
            &client,
            vec![Filter::new().kind(Kind::TextNote)],
            &CollectorOptions::default(),
        )
        .await
        .unwrap();
        assert_eq!(collected.data.len(), 1);
    }

    #[test]
    fn test_sanitize_filter() {
        let filter = Filter::new()
            .kind(Kind::Custom(30033))
            .identifier("")
            .hashtag("widgets");
        let sanitized = sanitize_filter(filter);
        assert_eq!(
            sanitized,
            Filter::new().kind(Kind::Custom(30033)).hashtag("widgets")
        );

        let empty_authors = Filter::new().authors(Vec::<PublicKey>::new());
        assert_eq!(sanitize_filter(empty_authors), Filter::new());

        let zero_bounds = Filter::new()
            .kind(Kind::TextNote)
            .since(Timestamp::zero())
            .until(Timestamp::zero())
            .limit(0);
        assert_eq!(sanitize_filter(zero_bounds), Filter::new().kind(Kind::TextNote));

        let zero_only = Filter::new().limit(0);
        assert_eq!(sanitize_filter(zero_only), Filter::new());
    }
}
