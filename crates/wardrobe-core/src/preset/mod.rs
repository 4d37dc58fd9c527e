//! Canned prompts per category, grouped by theme.

mod catalog;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::operation::Operation;

/// Visual style applied to presets and instruction templates.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Theme {
    #[default]
    Cyberpunk,
    Fantasy,
}

impl Theme {
    /// Short style descriptor embedded in instruction templates.
    pub fn style(&self) -> &'static str {
        match self {
            Theme::Cyberpunk => "cyberpunk and futuristic sci-fi",
            Theme::Fantasy => "high fantasy and medieval storybook",
        }
    }

    pub fn all() -> Vec<Theme> {
        Theme::iter().collect()
    }
}

/// User-facing category of edits.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Category {
    #[default]
    Clothing,
    Modifications,
    Effects,
    Environment,
    Actions,
}

impl Category {
    /// The edit operation a category triggers.
    pub fn operation(&self) -> Operation {
        match self {
            Category::Clothing => Operation::Outfit,
            Category::Modifications => Operation::Adjustment,
            Category::Effects => Operation::Filter,
            Category::Environment => Operation::Background,
            Category::Actions => Operation::Action,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Clothing => "Clothing",
            Category::Modifications => "Modifications",
            Category::Effects => "Effects",
            Category::Environment => "Environment",
            Category::Actions => "Actions",
        }
    }

    pub fn all() -> Vec<Category> {
        Category::iter().collect()
    }
}

/// A named canned prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preset {
    pub name: &'static str,
    pub prompt: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<&'static str>,
}

/// Returns the presets of `category` for `theme`.
pub fn presets(theme: Theme, category: Category) -> &'static [Preset] {
    catalog::presets(theme, category)
}

/// Finds a preset by case-insensitive name.
pub fn find_preset(theme: Theme, category: Category, name: &str) -> Option<&'static Preset> {
    let name = name.trim();
    presets(theme, category)
        .iter()
        .find(|preset| preset.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_every_theme_has_presets_for_every_category() {
        for theme in Theme::all() {
            for category in Category::all() {
                let list = presets(theme, category);
                assert!(!list.is_empty(), "{theme}/{category} has no presets");
                for preset in list {
                    assert!(!preset.prompt.trim().is_empty());
                }
            }
        }
    }

    #[test]
    fn test_find_preset_ignores_case() {
        let preset = find_preset(Theme::Cyberpunk, Category::Environment, "neon alley").unwrap();
        assert_eq!(preset.name, "Neon Alley");
        assert!(preset.image_url.is_some());
        assert!(find_preset(Theme::Cyberpunk, Category::Environment, "Nowhere").is_none());
    }

    #[test]
    fn test_category_parsing_and_operation() {
        assert_eq!(Category::from_str("Clothing").unwrap(), Category::Clothing);
        assert_eq!(Category::from_str("effects").unwrap(), Category::Effects);
        assert_eq!(Category::Environment.operation(), Operation::Background);
        assert_eq!(Category::Modifications.operation(), Operation::Adjustment);
        assert!(Category::from_str("hats").is_err());
    }

    #[test]
    fn test_theme_display_roundtrips_through_serde_names() {
        assert_eq!(Theme::Fantasy.to_string(), "fantasy");
        assert_eq!(Theme::from_str("CYBERPUNK").unwrap(), Theme::Cyberpunk);
    }
}
