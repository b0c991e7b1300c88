//! Widget components. Every constructor validates its fields, so a value of
//! any of these types is always well formed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::events::NostrTag;
use crate::validate::{validate_url, UrlContext};

pub const TAG_ICON: &str = "icon";
pub const TAG_IMAGE: &str = "image";
pub const TAG_INPUT: &str = "input";
pub const TAG_BUTTON: &str = "button";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonType {
    Redirect,
    Nostr,
    Zap,
    Post,
    App,
}

impl ButtonType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ButtonType::Redirect => "redirect",
            ButtonType::Nostr => "nostr",
            ButtonType::Zap => "zap",
            ButtonType::Post => "post",
            ButtonType::App => "app",
        }
    }

    /// URL rules that apply to a button of this type.
    pub fn url_context(&self) -> UrlContext {
        match self {
            ButtonType::Redirect => UrlContext::Redirect,
            ButtonType::Nostr => UrlContext::Nostr,
            ButtonType::Zap => UrlContext::Zap,
            ButtonType::Post => UrlContext::Post,
            ButtonType::App => UrlContext::App,
        }
    }
}

impl fmt::Display for ButtonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ButtonType {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "redirect" => Ok(ButtonType::Redirect),
            "nostr" => Ok(ButtonType::Nostr),
            "zap" => Ok(ButtonType::Zap),
            "post" => Ok(ButtonType::Post),
            "app" => Ok(ButtonType::App),
            other => Err(Error::UnknownValue {
                kind: "button type",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Icon {
    url: String,
}

impl Icon {
    pub fn new(url: impl Into<String>) -> Result<Self, Error> {
        let url = url.into();
        validate_url(&url, UrlContext::Default)?;
        Ok(Self { url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    url: String,
}

impl Image {
    pub fn new(url: impl Into<String>) -> Result<Self, Error> {
        let url = url.into();
        validate_url(&url, UrlContext::Default)?;
        Ok(Self { url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    label: String,
}

impl Input {
    pub fn new(label: impl Into<String>) -> Result<Self, Error> {
        let label = label.into();
        if label.is_empty() {
            return Err(Error::EmptyLabel(TAG_INPUT));
        }
        Ok(Self { label })
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    index: u32,
    label: String,
    button_type: ButtonType,
    url: String,
}

impl Button {
    /// Buttons are numbered from 1; the URL is checked against the rules of
    /// `button_type`.
    pub fn new(
        index: u32,
        label: impl Into<String>,
        button_type: ButtonType,
        url: impl Into<String>,
    ) -> Result<Self, Error> {
        if index < 1 {
            return Err(Error::InvalidIndex(index));
        }
        let label = label.into();
        if label.is_empty() {
            return Err(Error::EmptyLabel(TAG_BUTTON));
        }
        let url = url.into();
        validate_url(&url, button_type.url_context())?;

        Ok(Self {
            index,
            label,
            button_type,
            url,
        })
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn button_type(&self) -> ButtonType {
        self.button_type
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Component {
    Icon(Icon),
    Image(Image),
    Input(Input),
    Button(Button),
}

impl Component {
    /// Canonical tag projection of this component.
    pub fn to_tag(&self) -> NostrTag {
        match self {
            Component::Icon(icon) => NostrTag::new(TAG_ICON, vec![icon.url.clone()]),
            Component::Image(image) => NostrTag::new(TAG_IMAGE, vec![image.url.clone()]),
            Component::Input(input) => NostrTag::new(TAG_INPUT, vec![input.label.clone()]),
            Component::Button(button) => NostrTag::new(
                TAG_BUTTON,
                vec![
                    button.label.clone(),
                    button.button_type.as_str().to_string(),
                    button.url.clone(),
                ],
            ),
        }
    }

    pub fn as_button(&self) -> Option<&Button> {
        match self {
            Component::Button(button) => Some(button),
            _ => None,
        }
    }
}

impl From<Icon> for Component {
    fn from(value: Icon) -> Self {
        Component::Icon(value)
    }
}

impl From<Image> for Component {
    fn from(value: Image) -> Self {
        Component::Image(value)
    }
}

impl From<Input> for Component {
    fn from(value: Input) -> Self {
        Component::Input(value)
    }
}

impl From<Button> for Component {
    fn from(value: Button) -> Self {
        Component::Button(value)
    }
}
