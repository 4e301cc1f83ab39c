//! Product entities for grocery listings
//!
//! `RawProduct` is what a selector pass pulls out of a listing page before
//! any cleaning. `ProductRecord` is the canonical normalized unit that gets
//! exported and uploaded.

use serde::{Deserialize, Serialize};

/// Column order shared by the CSV export and the JSON record shape
pub const PRODUCT_COLUMNS: [&str; 9] = [
    "name",
    "supermarket",
    "quantity",
    "price",
    "promotion_description",
    "promotion_end_date_text",
    "product_url",
    "image_url",
    "embedding",
];

/// Unprocessed field values extracted from one product tile
///
/// Any field may be missing. The serde aliases accept the key names used by
/// the different retailer extraction schemas.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawProduct {
    #[serde(default, alias = "full_name", alias = "productName")]
    pub name: Option<String>,
    #[serde(default, alias = "productQuantity")]
    pub quantity: Option<String>,
    #[serde(default, alias = "productPrice")]
    pub price: Option<String>,
    #[serde(default, alias = "productPromotion")]
    pub promotion_description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub product_link: Option<String>,
}

impl RawProduct {
    /// Shorthand for a raw entry that only has a name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_quantity(mut self, quantity: impl Into<String>) -> Self {
        self.quantity = Some(quantity.into());
        self
    }

    pub fn with_price(mut self, price: impl Into<String>) -> Self {
        self.price = Some(price.into());
        self
    }

    pub fn with_promotion(mut self, promotion: impl Into<String>) -> Self {
        self.promotion_description = Some(promotion.into());
        self
    }

    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.product_link = Some(link.into());
        self
    }

    /// True when no selector produced anything for this tile
    pub fn is_empty(&self) -> bool {
        [
            &self.name,
            &self.quantity,
            &self.price,
            &self.promotion_description,
            &self.image_url,
            &self.product_link,
        ]
        .iter()
        .all(|field| field.as_deref().is_none_or(|v| v.trim().is_empty()))
    }
}

/// Canonical normalized product, the unit of storage and upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub name: String,
    pub supermarket: String,
    pub quantity: String,
    pub price: String,
    pub promotion_description: String,
    /// Reserved: no extractor fills this yet, it is always empty.
    pub promotion_end_date_text: String,
    pub product_url: String,
    pub image_url: String,
    pub embedding: Option<Vec<f32>>,
}

impl ProductRecord {
    /// Text sent to the embedding service for this product
    pub fn embedding_input(&self) -> String {
        format!("{} {} {}", self.name, self.quantity, self.price)
    }

    /// Lowercased name and price, or `None` when the price is empty.
    /// Records with equal keys are duplicates.
    pub fn dedup_key(&self) -> Option<(String, String)> {
        if self.price.is_empty() {
            return None;
        }
        Some((self.name.to_lowercase(), self.price.clone()))
    }

    /// Same product under the dedup rule: equal name ignoring case and an
    /// equal, non-empty price.
    pub fn is_duplicate_of(&self, other: &Self) -> bool {
        self.dedup_key().is_some_and(|key| Some(key) == other.dedup_key())
    }
}
