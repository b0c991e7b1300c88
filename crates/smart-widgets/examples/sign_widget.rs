//! Build and sign an action widget without touching the network.
//!
//! Run with: cargo run -p smart-widgets --example sign_widget
//!
//! Uses NOSTR_SECRET_KEY when set, otherwise a random key for this process.

use nostr_sdk::JsonUtil;
use smart_widgets::{Button, ButtonType, Icon, Image, Input, Widget, WidgetConfig, WidgetType};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    let mut config = WidgetConfig::from_env()?;
    config.widget_type = WidgetType::Action;
    let widget = Widget::new(config)?;

    let set = widget.component_set(vec![
        Icon::new("https://example.com/icon.png")?.into(),
        Image::new("https://example.com/cover.png")?.into(),
        Input::new("How many sats?")?.into(),
        Button::new(1, "Open app", ButtonType::App, "https://app.example.com")?.into(),
        Button::new(2, "Zap", ButtonType::Zap, "alice@example.com")?.into(),
    ])?;

    let signed = widget.sign_event(&set, Some("Tip jar"), None)?;
    println!("{}", signed.event.as_json());
    println!("naddr: {}", signed.naddr);
    Ok(())
}
