//! JSON description of a widget, as read by the publish binary.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::component_set::ComponentSet;
use crate::components::{Button, ButtonType, Component, Icon, Image, Input};
use crate::events::WidgetType;
use crate::validate::validate_title;
use crate::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "component", rename_all = "lowercase")]
pub enum ComponentSpec {
    Icon {
        url: String,
    },
    Image {
        url: String,
    },
    Input {
        label: String,
    },
    Button {
        index: u32,
        label: String,
        #[serde(rename = "type")]
        button_type: ButtonType,
        url: String,
    },
}

impl ComponentSpec {
    pub fn build(self) -> Result<Component, Error> {
        Ok(match self {
            ComponentSpec::Icon { url } => Icon::new(url)?.into(),
            ComponentSpec::Image { url } => Image::new(url)?.into(),
            ComponentSpec::Input { label } => Input::new(label)?.into(),
            ComponentSpec::Button {
                index,
                label,
                button_type,
                url,
            } => Button::new(index, label, button_type, url)?.into(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetManifest {
    #[serde(default)]
    pub widget_type: WidgetType,
    /// Kept loose so a non-string title is reported as a validation error
    /// rather than a parse error.
    #[serde(default)]
    pub title: Value,
    #[serde(default)]
    pub identifier: Option<String>,
    pub components: Vec<ComponentSpec>,
}

impl WidgetManifest {
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn title(&self) -> Result<Option<&str>, Error> {
        validate_title(&self.title)?;
        Ok(self.title.as_str())
    }

    pub fn component_set(&self) -> Result<ComponentSet, Error> {
        let components = self
            .components
            .iter()
            .cloned()
            .map(ComponentSpec::build)
            .collect::<Result<Vec<_>, _>>()?;
        ComponentSet::new(components, self.widget_type)
    }
}
