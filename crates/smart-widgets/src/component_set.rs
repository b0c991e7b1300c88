//! Validation and canonical encoding of a widget's components.
//!
//! A [`ComponentSet`] is checked once, against the [`WidgetType`] it will be
//! published as, and is immutable afterwards. Encoding emits icon and image
//! tags first (insertion order), then the input, then buttons sorted by index.

use std::collections::BTreeSet;
use std::str::FromStr;

use crate::components::{
    Button, ButtonType, Component, Icon, Image, Input, TAG_BUTTON, TAG_ICON, TAG_IMAGE, TAG_INPUT,
};
use crate::error::{Error, ValidationError};
use crate::events::{NostrTag, WidgetType};

pub const MAX_BUTTONS: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentSet {
    components: Vec<Component>,
    widget_type: WidgetType,
}

impl ComponentSet {
    pub fn new(components: Vec<Component>, widget_type: WidgetType) -> Result<Self, Error> {
        validate_components(&components, widget_type)?;
        Ok(Self {
            components,
            widget_type,
        })
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn widget_type(&self) -> WidgetType {
        self.widget_type
    }

    /// Canonical tag list for event construction.
    pub fn to_tags(&self) -> Vec<NostrTag> {
        let mut tags = Vec::with_capacity(self.components.len());

        tags.extend(
            self.components
                .iter()
                .filter(|c| matches!(c, Component::Icon(_) | Component::Image(_)))
                .map(Component::to_tag),
        );
        tags.extend(
            self.components
                .iter()
                .filter(|c| matches!(c, Component::Input(_)))
                .map(Component::to_tag),
        );

        let mut buttons: Vec<&Button> = self
            .components
            .iter()
            .filter_map(Component::as_button)
            .collect();
        buttons.sort_by_key(|button| button.index());
        tags.extend(
            buttons
                .into_iter()
                .map(|button| Component::Button(button.clone()).to_tag()),
        );

        tags
    }

    /// Rebuilds a set from event tags. Tags that are not components are
    /// skipped; buttons are numbered in tag order.
    pub fn from_tags(tags: &[NostrTag], widget_type: WidgetType) -> Result<Self, Error> {
        let mut components = Vec::new();
        let mut next_index = 1;

        for tag in tags {
            let first = tag.values.first().map(String::as_str);
            let component = match (tag.name.as_str(), first) {
                (TAG_ICON, Some(url)) => Component::Icon(Icon::new(url)?),
                (TAG_IMAGE, Some(url)) => Component::Image(Image::new(url)?),
                (TAG_INPUT, Some(label)) => Component::Input(Input::new(label)?),
                (TAG_BUTTON, Some(label)) => {
                    let button_type = tag
                        .values
                        .get(1)
                        .map(String::as_str)
                        .unwrap_or_default();
                    let url = tag.values.get(2).map(String::as_str).unwrap_or_default();
                    let button = Button::new(
                        next_index,
                        label,
                        ButtonType::from_str(button_type)?,
                        url,
                    )?;
                    next_index += 1;
                    Component::Button(button)
                }
                _ => continue,
            };
            components.push(component);
        }

        Self::new(components, widget_type)
    }
}

/// Structural rules for a widget's components; the first violated rule
/// decides the error.
pub fn validate_components(
    components: &[Component],
    widget_type: WidgetType,
) -> Result<(), ValidationError> {
    if components.is_empty() {
        return Err(ValidationError::EmptyComponents);
    }

    let mut icons = 0;
    let mut images = 0;
    let mut inputs = 0;
    let mut buttons = Vec::new();
    for component in components {
        match component {
            Component::Icon(_) => icons += 1,
            Component::Image(_) => images += 1,
            Component::Input(_) => inputs += 1,
            Component::Button(button) => buttons.push(button),
        }
    }

    match images {
        0 => return Err(ValidationError::ImageRequired),
        1 => {}
        _ => return Err(ValidationError::TooManyImages),
    }

    if !widget_type.is_basic() && icons == 0 {
        return Err(ValidationError::IconRequired);
    }
    if icons > 1 {
        return Err(ValidationError::TooManyIcons);
    }

    if !widget_type.is_basic()
        && inputs > 0
        && buttons.len() > 1
        && !buttons
            .iter()
            .any(|button| button.button_type() == ButtonType::App)
    {
        return Err(ValidationError::AppButtonRequired);
    }

    if inputs > 1 {
        return Err(ValidationError::TooManyInputs);
    }

    if !buttons.is_empty() {
        let indexes: BTreeSet<u32> = buttons.iter().map(|button| button.index()).collect();
        let consecutive = indexes
            .iter()
            .zip(1u32..)
            .all(|(index, expected)| *index == expected);
        if indexes.len() != buttons.len() || indexes.len() > MAX_BUTTONS || !consecutive {
            return Err(ValidationError::ButtonIndexes);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image() -> Component {
        Image::new("https://example.com/cover.png").unwrap().into()
    }

    fn icon() -> Component {
        Icon::new("https://example.com/icon.png").unwrap().into()
    }

    fn input() -> Component {
        Input::new("Amount").unwrap().into()
    }

    fn button(index: u32, button_type: ButtonType) -> Component {
        let url = match button_type {
            ButtonType::Nostr => "nostr:npub1example",
            ButtonType::Zap => "alice@example.com",
            _ => "https://example.com",
        };
        Button::new(index, format!("Button {index}"), button_type, url)
            .unwrap()
            .into()
    }

    fn with_buttons(indexes: &[u32]) -> Vec<Component> {
        let mut components = vec![image()];
        components.extend(indexes.iter().map(|i| button(*i, ButtonType::Redirect)));
        components
    }

    #[test]
    fn test_valid_sets() {
        assert!(validate_components(&[image()], WidgetType::Basic).is_ok());
        assert!(validate_components(&with_buttons(&[1, 2, 3]), WidgetType::Basic).is_ok());
        assert!(validate_components(
            &[icon(), image(), button(1, ButtonType::App)],
            WidgetType::Action
        )
        .is_ok());
        assert!(validate_components(
            &[
                icon(),
                image(),
                input(),
                button(1, ButtonType::Redirect),
                button(2, ButtonType::App),
            ],
            WidgetType::Tool
        )
        .is_ok());
        assert!(validate_components(&[icon(), image(), input()], WidgetType::Basic).is_ok());
    }

    #[test]
    fn test_rejections() {
        assert_eq!(
            validate_components(&[], WidgetType::Basic),
            Err(ValidationError::EmptyComponents)
        );
        assert_eq!(
            validate_components(&[icon()], WidgetType::Basic),
            Err(ValidationError::ImageRequired)
        );
        assert_eq!(
            validate_components(&[image(), image()], WidgetType::Basic),
            Err(ValidationError::TooManyImages)
        );
        assert_eq!(
            validate_components(&[image()], WidgetType::Action),
            Err(ValidationError::IconRequired)
        );
        assert_eq!(
            validate_components(&[image(), icon(), icon()], WidgetType::Basic),
            Err(ValidationError::TooManyIcons)
        );
        assert_eq!(
            validate_components(&[image(), input(), input()], WidgetType::Basic),
            Err(ValidationError::TooManyInputs)
        );
    }

    #[test]
    fn test_app_button_rule_only_applies_with_input() {
        let no_app = vec![
            icon(),
            image(),
            input(),
            button(1, ButtonType::Redirect),
            button(2, ButtonType::Post),
        ];
        assert_eq!(
            validate_components(&no_app, WidgetType::Action),
            Err(ValidationError::AppButtonRequired)
        );
        assert!(validate_components(&no_app, WidgetType::Basic).is_ok());

        let without_input = vec![
            icon(),
            image(),
            button(1, ButtonType::Redirect),
            button(2, ButtonType::Post),
        ];
        assert!(validate_components(&without_input, WidgetType::Tool).is_ok());
    }

    #[test]
    fn test_button_indexes() {
        let ok = |indexes: &[u32]| validate_components(&with_buttons(indexes), WidgetType::Basic);
        assert!(ok(&[1, 2, 3]).is_ok());
        assert!(ok(&[3, 1, 2]).is_ok());
        assert_eq!(ok(&[1, 2, 4]), Err(ValidationError::ButtonIndexes));
        assert_eq!(ok(&[2, 3, 4]), Err(ValidationError::ButtonIndexes));
        assert_eq!(ok(&[1, 1, 2]), Err(ValidationError::ButtonIndexes));
        assert_eq!(
            ok(&[1, 2, 3, 4, 5, 6, 7]),
            Err(ValidationError::ButtonIndexes)
        );
        assert!(ok(&[1, 2, 3, 4, 5, 6]).is_ok());
    }

    #[test]
    fn test_encoding_order() {
        let set = ComponentSet::new(
            vec![
                button(3, ButtonType::Redirect),
                image(),
                button(1, ButtonType::Zap),
                input(),
                icon(),
                button(2, ButtonType::Nostr),
            ],
            WidgetType::Basic,
        )
        .unwrap();

        let tags = set.to_tags();
        let names: Vec<&str> = tags.iter().map(|tag| tag.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["image", "icon", "input", "button", "button", "button"]
        );
        let labels: Vec<&str> = tags[3..]
            .iter()
            .map(|tag| tag.values[0].as_str())
            .collect();
        assert_eq!(labels, vec!["Button 1", "Button 2", "Button 3"]);
        assert_eq!(tags[3].values, vec!["Button 1", "zap", "alice@example.com"]);

        assert_eq!(set.to_tags(), tags);
    }

    #[test]
    fn test_decode_from_tags() {
        let set = ComponentSet::new(
            vec![
                icon(),
                image(),
                button(2, ButtonType::App),
                button(1, ButtonType::Redirect),
            ],
            WidgetType::Action,
        )
        .unwrap();

        let mut tags = vec![NostrTag::new("d", vec!["widget".to_string()])];
        tags.extend(set.to_tags());

        let decoded = ComponentSet::from_tags(&tags, WidgetType::Action).unwrap();
        assert_eq!(decoded.to_tags(), set.to_tags());
        assert_eq!(decoded.widget_type(), WidgetType::Action);
    }

    #[test]
    fn test_decode_rejects_unknown_button_type() {
        let tags = vec![
            NostrTag::new("image", vec!["https://example.com/a.png".to_string()]),
            NostrTag::new(
                "button",
                vec!["Go".to_string(), "submit".to_string(), "https://x.com".to_string()],
            ),
        ];
        assert!(matches!(
            ComponentSet::from_tags(&tags, WidgetType::Basic),
            Err(Error::UnknownValue { .. })
        ));
    }
}
