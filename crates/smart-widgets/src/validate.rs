//! Pure field validators. None of these panic; callers decide whether a
//! rejection is fatal.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use url::Url;

use crate::error::ValidationError;

const WEB_PREFIXES: [&str; 3] = ["https://", "http://", "data:image/"];
const NOSTR_PREFIXES: [&str; 6] = ["nostr:", "npub", "nprofile", "note1", "nevent", "naddr"];
const LIGHTNING_PREFIXES: [&str; 2] = ["lnurl", "lnbc"];
const MIN_LIGHTNING_LEN: usize = 33;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

/// Which rule set a URL is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UrlContext {
    #[default]
    Default,
    Redirect,
    Post,
    App,
    Nostr,
    Zap,
}

impl fmt::Display for UrlContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UrlContext::Default => "default",
            UrlContext::Redirect => "redirect",
            UrlContext::Post => "post",
            UrlContext::App => "app",
            UrlContext::Nostr => "nostr",
            UrlContext::Zap => "zap",
        };
        f.write_str(name)
    }
}

/// Accepts `null` or any string.
pub fn validate_title(title: &Value) -> Result<(), ValidationError> {
    match title {
        Value::Null | Value::String(_) => Ok(()),
        _ => Err(ValidationError::Title),
    }
}

pub fn validate_url(url: &str, context: UrlContext) -> Result<(), ValidationError> {
    let valid = match context {
        UrlContext::Default | UrlContext::Redirect | UrlContext::Post | UrlContext::App => {
            WEB_PREFIXES.iter().any(|prefix| url.starts_with(prefix))
        }
        UrlContext::Nostr => NOSTR_PREFIXES.iter().any(|prefix| url.starts_with(prefix)),
        UrlContext::Zap => is_lightning_address(url),
    };

    if valid {
        Ok(())
    } else {
        Err(ValidationError::Url {
            context,
            url: url.to_string(),
        })
    }
}

/// Lightning addresses look like emails; LNURLs and bolt11 invoices are long
/// bech32 strings.
fn is_lightning_address(value: &str) -> bool {
    if EMAIL_RE.is_match(value) {
        return true;
    }
    let lower = value.to_ascii_lowercase();
    LIGHTNING_PREFIXES
        .iter()
        .any(|prefix| lower.starts_with(prefix))
        && value.len() >= MIN_LIGHTNING_LEN
}

/// Every relay must be a parseable `wss://` URL.
pub fn validate_relay_set<S: AsRef<str>>(relays: &[S]) -> Result<(), ValidationError> {
    if relays.is_empty() {
        return Err(ValidationError::EmptyRelaySet);
    }

    for relay in relays {
        let relay = relay.as_ref();
        match Url::parse(relay) {
            Ok(parsed) if parsed.scheme() == "wss" => {}
            _ => return Err(ValidationError::InsecureRelay(relay.to_string())),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_urls() {
        assert!(validate_url("https://x.com", UrlContext::Default).is_ok());
        assert!(validate_url("http://x.com", UrlContext::Redirect).is_ok());
        assert!(validate_url("data:image/png;base64,AAAA", UrlContext::Default).is_ok());
        assert_eq!(
            validate_url("ftp://x.com", UrlContext::Default),
            Err(ValidationError::Url {
                context: UrlContext::Default,
                url: "ftp://x.com".to_string(),
            })
        );
    }

    #[test]
    fn test_nostr_urls() {
        assert!(validate_url("nostr:abc", UrlContext::Nostr).is_ok());
        assert!(validate_url("npub1xyz", UrlContext::Nostr).is_ok());
        assert!(validate_url("naddr1xyz", UrlContext::Nostr).is_ok());
        assert!(validate_url("https://x.com", UrlContext::Nostr).is_err());
    }

    #[test]
    fn test_zap_urls() {
        assert!(validate_url("alice@example.com", UrlContext::Zap).is_ok());
        assert!(validate_url("lnbc1xxxxx", UrlContext::Zap).is_err());
        let invoice = format!("lnbc{}", "1".repeat(40));
        assert!(validate_url(&invoice, UrlContext::Zap).is_ok());
        let lnurl = format!("LNURL{}", "A".repeat(40));
        assert!(validate_url(&lnurl, UrlContext::Zap).is_ok());
        assert!(validate_url("alice at example.com", UrlContext::Zap).is_err());
    }

    #[test]
    fn test_lightning_length_boundary() {
        let exactly_32 = format!("lnbc{}", "1".repeat(28));
        assert_eq!(exactly_32.len(), 32);
        assert!(validate_url(&exactly_32, UrlContext::Zap).is_err());
        let exactly_33 = format!("lnbc{}", "1".repeat(29));
        assert!(validate_url(&exactly_33, UrlContext::Zap).is_ok());
    }

    #[test]
    fn test_title() {
        assert!(validate_title(&Value::Null).is_ok());
        assert!(validate_title(&json!("")).is_ok());
        assert!(validate_title(&json!("My widget")).is_ok());
        assert_eq!(validate_title(&json!(42)), Err(ValidationError::Title));
        assert_eq!(validate_title(&json!(["a"])), Err(ValidationError::Title));
    }

    #[test]
    fn test_relay_set() {
        assert!(validate_relay_set(&["wss://a.com"]).is_ok());
        assert_eq!(
            validate_relay_set(&["ws://a.com"]),
            Err(ValidationError::InsecureRelay("ws://a.com".to_string()))
        );
        assert_eq!(
            validate_relay_set::<&str>(&[]),
            Err(ValidationError::EmptyRelaySet)
        );
        assert!(validate_relay_set(&["wss://a.com", "not a url"]).is_err());
    }
}
