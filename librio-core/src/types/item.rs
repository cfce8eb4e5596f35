//! The published book offered for sale

use super::ItemPatch;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Opaque identifier of a catalog item.
///
/// Issued from the creation time in milliseconds, so ids of one store sort
/// in creation order. Ordering compares numerically for digit-only ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Wrap an existing id string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Id for an item created at the given millisecond timestamp
    pub fn from_millis(millis: u64) -> Self {
        Self(millis.to_string())
    }

    /// The millisecond token this id was issued from, if it is one
    pub fn millis(&self) -> Option<u64> {
        self.0.parse().ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Ord for ItemId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for ItemId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Availability of an item
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    /// Listed and purchasable
    #[default]
    Available,

    /// Held for a buyer
    Reserved,

    /// No longer for sale
    Sold,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Reserved => "reserved",
            Self::Sold => "sold",
        }
    }
}

impl std::str::FromStr for ItemStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "available" => Ok(Self::Available),
            "reserved" => Ok(Self::Reserved),
            "sold" => Ok(Self::Sold),
            other => Err(format!("unknown status: {}", other)),
        }
    }
}

/// A book published to the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    /// Unique identifier for this item
    pub id: ItemId,

    pub title: String,

    pub author: String,

    pub publisher: String,

    /// Publication year of the edition
    pub year: i32,

    pub genre: String,

    pub description: String,

    /// Unit price in the store currency
    pub price: Decimal,

    /// Cover image URI
    pub image: String,

    pub status: ItemStatus,

    /// Display name of whoever published the item
    pub seller: String,

    /// When the item was published
    pub published_at: DateTime<Utc>,

    /// When the item was last updated, if ever
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,

    /// Display-only counter, never incremented by the store
    #[serde(default)]
    pub views: u32,

    /// Display-only counter, never incremented by the store
    #[serde(default)]
    pub favorites: u32,
}

impl Item {
    /// Merge every field the patch sets and stamp the update time
    pub fn apply(&mut self, patch: ItemPatch, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(author) = patch.author {
            self.author = author.trim().to_string();
        }
        if let Some(publisher) = patch.publisher {
            self.publisher = publisher;
        }
        if let Some(year) = patch.year {
            self.year = year;
        }
        if let Some(genre) = patch.genre {
            self.genre = genre;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(image) = patch.image {
            self.image = image;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        self.updated_at = Some(now);
    }

    /// Case-insensitive match against title and author
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty()
            || self.title.to_lowercase().contains(&query)
            || self.author.to_lowercase().contains(&query)
    }
}
