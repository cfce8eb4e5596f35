//! Unvalidated input for creating or updating items

use super::{Item, ItemId, ItemStatus};
use crate::error::ValidationError;
use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PUBLISHER: &str = "Editorial no especificada";
pub const DEFAULT_GENRE: &str = "Sin género";
pub const DEFAULT_DESCRIPTION: &str = "Sin descripción disponible";
pub const DEFAULT_IMAGE: &str =
    "https://via.placeholder.com/300x400/8b5a8c/ffffff?text=Sin+Imagen";
pub const DEFAULT_SELLER: &str = "Usuario Actual";

/// Fields checked at the publish/update boundary
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DraftField {
    Title,
    Author,
    Price,
}

impl DraftField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Author => "author",
            Self::Price => "price",
        }
    }
}

/// Payload submitted by the publish form
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Draft {
    pub title: String,
    pub author: String,
    pub price: Decimal,
    pub publisher: Option<String>,
    pub year: Option<i32>,
    pub genre: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub seller: Option<String>,
}

impl Draft {
    /// Create a draft with the required fields
    pub fn new(title: impl Into<String>, author: impl Into<String>, price: Decimal) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            price,
            ..Default::default()
        }
    }

    pub fn with_publisher(mut self, publisher: impl Into<String>) -> Self {
        self.publisher = Some(publisher.into());
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_seller(mut self, seller: impl Into<String>) -> Self {
        self.seller = Some(seller.into());
        self
    }

    /// Check required fields, reporting every offending one
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut invalid = Vec::new();
        if self.title.trim().is_empty() {
            invalid.push(DraftField::Title);
        }
        if self.author.trim().is_empty() {
            invalid.push(DraftField::Author);
        }
        if self.price <= Decimal::ZERO {
            invalid.push(DraftField::Price);
        }

        if invalid.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::InvalidFields(invalid))
        }
    }

    /// Build the stored item, filling blank optional fields with defaults.
    /// Does not validate.
    pub fn into_item(self, id: ItemId, now: DateTime<Utc>) -> Item {
        Item {
            id,
            title: self.title.trim().to_string(),
            author: self.author.trim().to_string(),
            publisher: or_default(self.publisher, DEFAULT_PUBLISHER),
            year: self.year.unwrap_or_else(|| now.year()),
            genre: or_default(self.genre, DEFAULT_GENRE),
            description: or_default(self.description, DEFAULT_DESCRIPTION),
            price: self.price,
            image: or_default(self.image, DEFAULT_IMAGE),
            status: ItemStatus::Available,
            seller: or_default(self.seller, DEFAULT_SELLER),
            published_at: now,
            updated_at: None,
            views: 0,
            favorites: 0,
        }
    }
}

fn or_default(value: Option<String>, default: &str) -> String {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => default.to_string(),
    }
}

/// Partial update for an existing item; `None` leaves a field untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ItemPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub year: Option<i32>,
    pub genre: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub image: Option<String>,
    pub status: Option<ItemStatus>,
}

impl ItemPatch {
    /// A patch may not blank the title or author or make the price non-positive
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut invalid = Vec::new();
        if matches!(&self.title, Some(t) if t.trim().is_empty()) {
            invalid.push(DraftField::Title);
        }
        if matches!(&self.author, Some(a) if a.trim().is_empty()) {
            invalid.push(DraftField::Author);
        }
        if matches!(self.price, Some(p) if p <= Decimal::ZERO) {
            invalid.push(DraftField::Price);
        }

        if invalid.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::InvalidFields(invalid))
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
