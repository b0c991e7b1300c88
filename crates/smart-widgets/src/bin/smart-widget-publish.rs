use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use nostr_sdk::JsonUtil;
use tracing::info;
use tracing_subscriber::EnvFilter;

use smart_widgets::{Widget, WidgetConfig, WidgetManifest};

#[derive(Debug, Parser)]
#[command(name = "smart-widget-publish")]
#[command(about = "Sign and publish a smart widget described by a JSON manifest")]
struct Args {
    /// Relay URL(s) to publish to (falls back to NOSTR_RELAYS)
    #[arg(long)]
    relay: Vec<String>,
    /// Hex secret key (falls back to NOSTR_SECRET_KEY, then a random key)
    #[arg(long)]
    key: Option<String>,
    /// Path to the widget manifest
    #[arg(long, required = true)]
    manifest: PathBuf,
    /// Confirmation timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,
    /// Sign only, do not publish
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let args = Args::parse();

    let manifest = WidgetManifest::from_path(&args.manifest)?;

    let mut config = WidgetConfig::from_env()?;
    config.widget_type = manifest.widget_type;
    if !args.relay.is_empty() {
        config.relays = args.relay;
    }
    if let Some(key) = args.key {
        config.secret_key = Some(key);
    }

    let widget = Widget::new(config)?;
    let components = manifest.component_set()?;
    let title = manifest.title()?;
    let identifier = manifest.identifier.as_deref();

    let signed = if args.dry_run {
        widget.sign_event(&components, title, identifier)?
    } else {
        widget.init().await?;
        let timeout = args.timeout_ms.map(Duration::from_millis);
        let signed = widget.publish(&components, title, identifier, timeout).await;
        widget.teardown().await;
        signed?
    };

    info!(
        event_id = %signed.event.id,
        identifier = %signed.identifier,
        dry_run = args.dry_run,
        "Smart widget ready"
    );
    println!("{}", signed.event.as_json());
    println!("{}", signed.naddr);
    Ok(())
}
