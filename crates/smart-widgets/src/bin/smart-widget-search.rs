use std::time::Duration;

use clap::Parser;
use nostr_sdk::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use smart_widgets::{SmartWidget, Widget, WidgetConfig, WidgetType, KIND_SMART_WIDGET};

#[derive(Debug, Parser)]
#[command(name = "smart-widget-search")]
#[command(about = "Collect smart widgets from Nostr relays")]
struct Args {
    /// Relay URL(s) to query (falls back to NOSTR_RELAYS)
    #[arg(long)]
    relay: Vec<String>,
    /// Only widgets by these authors (hex or npub)
    #[arg(long)]
    author: Vec<String>,
    /// Widget identifier (`d` tag)
    #[arg(long)]
    identifier: Option<String>,
    /// Widget type (`l` tag)
    #[arg(long)]
    widget_type: Option<WidgetType>,
    #[arg(long)]
    limit: Option<usize>,
    /// Quiet period in milliseconds before the search completes
    #[arg(long)]
    quiet_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let args = Args::parse();

    let mut config = WidgetConfig::from_env()?;
    if !args.relay.is_empty() {
        config.relays = args.relay;
    }
    if let Some(quiet_ms) = args.quiet_ms {
        config.collector.quiet_period = Duration::from_millis(quiet_ms);
    }

    let mut filter = Filter::new().kind(Kind::Custom(KIND_SMART_WIDGET));
    if !args.author.is_empty() {
        let authors = args
            .author
            .iter()
            .map(|author| PublicKey::parse(author))
            .collect::<Result<Vec<_>, _>>()?;
        filter = filter.authors(authors);
    }
    if let Some(identifier) = args.identifier {
        filter = filter.identifier(identifier);
    }
    if let Some(widget_type) = args.widget_type {
        filter = filter.custom_tag(
            SingleLetterTag::lowercase(Alphabet::L),
            widget_type.as_str(),
        );
    }
    if let Some(limit) = args.limit {
        filter = filter.limit(limit);
    }

    let widget = Widget::new(config)?;
    widget.init().await?;
    let results = widget.search_nostr(vec![filter]).await;
    widget.teardown().await;
    let results = results?;

    info!(
        events = results.data.len(),
        authors = results.pubkeys.len(),
        "Search finished"
    );

    for event in &results.data {
        match SmartWidget::from_event(event) {
            Ok(found) => {
                let naddr = found.address()?;
                println!(
                    "{naddr}\t{}\t{}\t{} components",
                    found.widget_type,
                    found.title.as_deref().unwrap_or("-"),
                    found.components.components().len()
                );
            }
            Err(err) => warn!(event_id = %event.id, error = %err, "Skipping malformed widget"),
        }
    }

    Ok(())
}
