use std::fmt;
use std::str::FromStr;

use nostr_sdk::prelude::*;
use serde::{Deserialize, Serialize};

use crate::component_set::ComponentSet;
use crate::Error;

/// Addressable event kind carrying a smart widget.
pub const KIND_SMART_WIDGET: u16 = 30033;

pub const TAG_IDENTIFIER: &str = "d";
pub const TAG_WIDGET_TYPE: &str = "l";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetType {
    #[default]
    Basic,
    Action,
    Tool,
}

impl WidgetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WidgetType::Basic => "basic",
            WidgetType::Action => "action",
            WidgetType::Tool => "tool",
        }
    }

    pub fn is_basic(&self) -> bool {
        matches!(self, WidgetType::Basic)
    }
}

impl fmt::Display for WidgetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WidgetType {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "basic" => Ok(WidgetType::Basic),
            "action" => Ok(WidgetType::Action),
            "tool" => Ok(WidgetType::Tool),
            other => Err(Error::UnknownValue {
                kind: "widget type",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NostrTag {
    pub name: String,
    pub values: Vec<String>,
}

impl NostrTag {
    pub fn new(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn to_sdk_tag(&self) -> Result<Tag, Error> {
        let mut parts = Vec::with_capacity(1 + self.values.len());
        parts.push(self.name.clone());
        parts.extend(self.values.clone());
        Ok(Tag::parse(parts)?)
    }

    pub fn from_sdk_tag(tag: &Tag) -> Self {
        let parts = tag.clone().to_vec();
        let name = parts.first().cloned().unwrap_or_default();
        let values = parts.into_iter().skip(1).collect();
        Self { name, values }
    }

    /// Flat `[name, ...values]` form used in event JSON.
    pub fn to_vec(&self) -> Vec<String> {
        let mut parts = Vec::with_capacity(1 + self.values.len());
        parts.push(self.name.clone());
        parts.extend(self.values.iter().cloned());
        parts
    }
}

pub fn d_tag(identifier: &str) -> NostrTag {
    NostrTag::new(TAG_IDENTIFIER, vec![identifier.to_string()])
}

pub fn l_tag(widget_type: WidgetType) -> NostrTag {
    NostrTag::new(TAG_WIDGET_TYPE, vec![widget_type.as_str().to_string()])
}

pub fn tag_value<'a>(tags: &'a [NostrTag], name: &str) -> Option<&'a str> {
    tags.iter()
        .find(|tag| tag.name == name)
        .and_then(|tag| tag.values.first().map(|s| s.as_str()))
}

/// NIP-19 `naddr` for a widget event.
pub fn widget_address(public_key: PublicKey, identifier: &str) -> Result<String, Error> {
    let coordinate =
        Coordinate::new(Kind::Custom(KIND_SMART_WIDGET), public_key).identifier(identifier);
    let address = Nip19Coordinate::new(coordinate, Vec::<RelayUrl>::new());
    Ok(address.to_bech32()?)
}

/// A signed widget event together with its shareable address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedWidget {
    pub event: Event,
    pub identifier: String,
    pub naddr: String,
}

/// A widget decoded from an event found on the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmartWidget {
    pub identifier: String,
    pub widget_type: WidgetType,
    pub title: Option<String>,
    pub pubkey: PublicKey,
    pub components: ComponentSet,
}

impl SmartWidget {
    pub fn from_event(event: &Event) -> Result<Self, Error> {
        let kind = event.kind.as_u16();
        if kind != KIND_SMART_WIDGET {
            return Err(Error::UnexpectedKind(kind));
        }

        let tags: Vec<NostrTag> = event.tags.iter().map(NostrTag::from_sdk_tag).collect();
        let identifier =
            tag_value(&tags, TAG_IDENTIFIER).ok_or(Error::MissingTag(TAG_IDENTIFIER))?;
        let widget_type: WidgetType = tag_value(&tags, TAG_WIDGET_TYPE)
            .ok_or(Error::MissingTag(TAG_WIDGET_TYPE))?
            .parse()?;
        let components = ComponentSet::from_tags(&tags, widget_type)?;
        let title = if event.content.is_empty() {
            None
        } else {
            Some(event.content.clone())
        };

        Ok(Self {
            identifier: identifier.to_string(),
            widget_type,
            title,
            pubkey: event.pubkey,
            components,
        })
    }

    pub fn address(&self) -> Result<String, Error> {
        widget_address(self.pubkey, &self.identifier)
    }
}
