//! User preferences persisted alongside the cart

use super::Item;
use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Color theme
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl FromStr for Theme {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            _ => Err(()),
        }
    }
}

/// Gallery listing order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Most recently published first
    #[default]
    Newest,
    Oldest,
    PriceAsc,
    PriceDesc,
    /// Alphabetical by title
    Title,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::Oldest => "oldest",
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::Title => "title",
        }
    }

    /// Sort items in place. Ties fall back to publication order.
    pub fn sort(&self, items: &mut [Item]) {
        let newest_first = |a: &Item, b: &Item| {
            b.published_at
                .cmp(&a.published_at)
                .then_with(|| b.id.cmp(&a.id))
        };
        match self {
            Self::Newest => items.sort_by(newest_first),
            Self::Oldest => items.sort_by(|a, b| newest_first(b, a)),
            Self::PriceAsc => {
                items.sort_by(|a, b| a.price.cmp(&b.price).then_with(|| newest_first(a, b)))
            }
            Self::PriceDesc => {
                items.sort_by(|a, b| b.price.cmp(&a.price).then_with(|| newest_first(a, b)))
            }
            Self::Title => items.sort_by(|a, b| {
                a.title
                    .to_lowercase()
                    .cmp(&b.title.to_lowercase())
                    .then_with(|| newest_first(a, b))
            }),
        }
    }
}

impl FromStr for SortOrder {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "newest" => Ok(Self::Newest),
            "oldest" => Ok(Self::Oldest),
            "price_asc" => Ok(Self::PriceAsc),
            "price_desc" => Ok(Self::PriceDesc),
            "title" => Ok(Self::Title),
            _ => Err(()),
        }
    }
}

/// Named preference settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceKey {
    Theme,
    Currency,
    Language,
    Notifications,
    GallerySort,
}

impl PreferenceKey {
    pub const ALL: [PreferenceKey; 5] = [
        Self::Theme,
        Self::Currency,
        Self::Language,
        Self::Notifications,
        Self::GallerySort,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Theme => "theme",
            Self::Currency => "currency",
            Self::Language => "language",
            Self::Notifications => "notifications",
            Self::GallerySort => "gallery_sort",
        }
    }
}

impl FromStr for PreferenceKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "theme" => Ok(Self::Theme),
            "currency" => Ok(Self::Currency),
            "language" => Ok(Self::Language),
            "notifications" => Ok(Self::Notifications),
            "gallery_sort" | "sort" => Ok(Self::GallerySort),
            _ => Err(ValidationError::UnknownPreference(s.to_string())),
        }
    }
}

/// Flat user settings with defaults.
///
/// Missing fields in a persisted object decode to their defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Preferences {
    pub theme: Theme,

    /// ISO 4217 code used for display
    pub currency: String,

    /// ISO 639-1 language code
    pub language: String,

    pub notifications: bool,

    pub gallery_sort: SortOrder,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            currency: "COP".to_string(),
            language: "es".to_string(),
            notifications: true,
            gallery_sort: SortOrder::Newest,
        }
    }
}

impl Preferences {
    /// Current value of a setting in its string form
    pub fn get(&self, key: PreferenceKey) -> String {
        match key {
            PreferenceKey::Theme => self.theme.as_str().to_string(),
            PreferenceKey::Currency => self.currency.clone(),
            PreferenceKey::Language => self.language.clone(),
            PreferenceKey::Notifications => self.notifications.to_string(),
            PreferenceKey::GallerySort => self.gallery_sort.as_str().to_string(),
        }
    }

    /// Set a setting from its string form
    pub fn set(&mut self, key: PreferenceKey, value: &str) -> Result<(), ValidationError> {
        let invalid = || ValidationError::InvalidPreferenceValue {
            key: key.as_str().to_string(),
            value: value.to_string(),
        };

        match key {
            PreferenceKey::Theme => self.theme = value.parse().map_err(|_| invalid())?,
            PreferenceKey::Currency => {
                let code = value.trim();
                if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
                    return Err(invalid());
                }
                self.currency = code.to_ascii_uppercase();
            }
            PreferenceKey::Language => {
                let code = value.trim();
                if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphabetic() || c == '-') {
                    return Err(invalid());
                }
                self.language = code.to_ascii_lowercase();
            }
            PreferenceKey::Notifications => {
                self.notifications = match value.trim().to_lowercase().as_str() {
                    "true" | "on" | "yes" | "1" => true,
                    "false" | "off" | "no" | "0" => false,
                    _ => return Err(invalid()),
                }
            }
            PreferenceKey::GallerySort => {
                self.gallery_sort = value.parse().map_err(|_| invalid())?
            }
        }
        Ok(())
    }
}
