//! Typed style overrides

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Style properties the editor can override
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StyleProperty {
    Color,
    BackgroundColor,
    FontSize,
    FontWeight,
    FontStyle,
    TextDecoration,
    TextAlign,
    LineHeight,
    LetterSpacing,
    Opacity,
    BorderWidth,
    BorderStyle,
    BorderColor,
    BorderRadius,
    #[serde(rename = "--hover-color")]
    HoverColor,
}

impl StyleProperty {
    pub const ALL: [StyleProperty; 15] = [
        StyleProperty::Color,
        StyleProperty::BackgroundColor,
        StyleProperty::FontSize,
        StyleProperty::FontWeight,
        StyleProperty::FontStyle,
        StyleProperty::TextDecoration,
        StyleProperty::TextAlign,
        StyleProperty::LineHeight,
        StyleProperty::LetterSpacing,
        StyleProperty::Opacity,
        StyleProperty::BorderWidth,
        StyleProperty::BorderStyle,
        StyleProperty::BorderColor,
        StyleProperty::BorderRadius,
        StyleProperty::HoverColor,
    ];

    /// Property segment used in derived override keys
    pub fn key_name(self) -> &'static str {
        match self {
            StyleProperty::Color => "textColor",
            StyleProperty::HoverColor => "hoverColor",
            other => other.js_name(),
        }
    }

    /// Name inside a JS style object
    pub fn js_name(self) -> &'static str {
        match self {
            StyleProperty::Color => "color",
            StyleProperty::BackgroundColor => "backgroundColor",
            StyleProperty::FontSize => "fontSize",
            StyleProperty::FontWeight => "fontWeight",
            StyleProperty::FontStyle => "fontStyle",
            StyleProperty::TextDecoration => "textDecoration",
            StyleProperty::TextAlign => "textAlign",
            StyleProperty::LineHeight => "lineHeight",
            StyleProperty::LetterSpacing => "letterSpacing",
            StyleProperty::Opacity => "opacity",
            StyleProperty::BorderWidth => "borderWidth",
            StyleProperty::BorderStyle => "borderStyle",
            StyleProperty::BorderColor => "borderColor",
            StyleProperty::BorderRadius => "borderRadius",
            StyleProperty::HoverColor => "--hover-color",
        }
    }

    /// Name in a CSS declaration
    pub fn css_name(self) -> &'static str {
        match self {
            StyleProperty::Color => "color",
            StyleProperty::BackgroundColor => "background-color",
            StyleProperty::FontSize => "font-size",
            StyleProperty::FontWeight => "font-weight",
            StyleProperty::FontStyle => "font-style",
            StyleProperty::TextDecoration => "text-decoration",
            StyleProperty::TextAlign => "text-align",
            StyleProperty::LineHeight => "line-height",
            StyleProperty::LetterSpacing => "letter-spacing",
            StyleProperty::Opacity => "opacity",
            StyleProperty::BorderWidth => "border-width",
            StyleProperty::BorderStyle => "border-style",
            StyleProperty::BorderColor => "border-color",
            StyleProperty::BorderRadius => "border-radius",
            StyleProperty::HoverColor => "--hover-color",
        }
    }

    /// Resolve a property from a derived-key segment, a JS name or a CSS name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| {
            p.key_name() == name || p.js_name() == name || p.css_name() == name
        })
    }
}

/// Property → value map layered over compiled-in styles
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleOverride {
    pub properties: BTreeMap<StyleProperty, String>,
}

impl StyleOverride {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, property: StyleProperty, value: impl Into<String>) -> Self {
        self.set(property, value);
        self
    }

    pub fn set(&mut self, property: StyleProperty, value: impl Into<String>) {
        self.properties.insert(property, value.into());
    }

    pub fn get(&self, property: StyleProperty) -> Option<&str> {
        self.properties.get(&property).map(String::as_str)
    }

    /// Later values win per property
    pub fn merge(&mut self, other: &StyleOverride) {
        for (property, value) in &other.properties {
            self.properties.insert(*property, value.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// `color: red; font-size: 12px;` style declarations
    pub fn to_css(&self) -> String {
        self.properties
            .iter()
            .map(|(p, v)| format!("{}: {};", p.css_name(), v))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_names() {
        assert_eq!(StyleProperty::from_name("textColor"), Some(StyleProperty::Color));
        assert_eq!(StyleProperty::from_name("color"), Some(StyleProperty::Color));
        assert_eq!(
            StyleProperty::from_name("background-color"),
            Some(StyleProperty::BackgroundColor)
        );
        assert_eq!(StyleProperty::from_name("fontSize"), Some(StyleProperty::FontSize));
        assert_eq!(
            StyleProperty::from_name("--hover-color"),
            Some(StyleProperty::HoverColor)
        );
        assert_eq!(StyleProperty::from_name("zIndex"), None);
    }

    #[test]
    fn test_merge_later_wins() {
        let mut base = StyleOverride::new()
            .with(StyleProperty::Color, "#000")
            .with(StyleProperty::FontSize, "16px");
        base.merge(&StyleOverride::new().with(StyleProperty::Color, "#fff"));

        assert_eq!(base.get(StyleProperty::Color), Some("#fff"));
        assert_eq!(base.get(StyleProperty::FontSize), Some("16px"));
        assert_eq!(base.to_css(), "color: #fff; font-size: 16px;");
    }

    #[test]
    fn test_serializes_with_js_names() {
        let style = StyleOverride::new()
            .with(StyleProperty::BackgroundColor, "#eee")
            .with(StyleProperty::HoverColor, "#f00");
        let json = serde_json::to_value(&style).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "backgroundColor": "#eee", "--hover-color": "#f00" })
        );
    }
}
