//! Product normalizer
//!
//! Turns raw selector output into canonical `ProductRecord`s for one site:
//! splits pack sizes off titles, formats prices, rebuilds product and image
//! URLs and drops duplicates. The routine is pure and order-preserving; it
//! never fails, malformed entries are skipped or given defaults.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::domain::product::{ProductRecord, RawProduct};
use crate::domain::services::quantity_rules::{self, QuantityRule};
use crate::domain::services::text_cleaning::{
    collapse_whitespace, extract_price, is_promotion_noise, slugify, slugify_with_quantity,
    space_number_and_unit,
};
use crate::domain::site_profile::{LinkFallback, PricePolicy, SiteProfile};

/// Counters for one normalization pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizationStats {
    pub received: usize,
    pub accepted: usize,
    pub rejected_name: usize,
    pub rejected_price: usize,
    pub duplicates: usize,
    pub fallback_urls: usize,
}

/// Where a product URL came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinkSource {
    Canonical,
    Fallback,
}

pub struct ProductNormalizer<'a> {
    profile: &'a SiteProfile,
    rules: &'a [QuantityRule],
}

impl<'a> ProductNormalizer<'a> {
    pub fn new(profile: &'a SiteProfile) -> Self {
        Self::with_rules(profile, quantity_rules::default_rules())
    }

    /// Normalizer using a custom quantity rule list
    pub fn with_rules(profile: &'a SiteProfile, rules: &'a [QuantityRule]) -> Self {
        Self { profile, rules }
    }

    pub fn normalize(&self, raw_products: &[RawProduct]) -> Vec<ProductRecord> {
        self.normalize_with_stats(raw_products).0
    }

    pub fn normalize_with_stats(
        &self,
        raw_products: &[RawProduct],
    ) -> (Vec<ProductRecord>, NormalizationStats) {
        let mut stats = NormalizationStats {
            received: raw_products.len(),
            ..NormalizationStats::default()
        };
        let mut cleaned: Vec<ProductRecord> = Vec::with_capacity(raw_products.len());
        let mut seen: HashSet<(String, String)> = HashSet::new();

        for (index, raw) in raw_products.iter().enumerate() {
            let Some((record, source)) = self.normalize_one(raw, index, &mut stats) else {
                continue;
            };

            if record.dedup_key().is_some_and(|key| !seen.insert(key)) {
                debug!("Skipping duplicate '{}' at {} (index {})", record.name, record.price, index);
                stats.duplicates += 1;
                continue;
            }

            if source == LinkSource::Fallback {
                stats.fallback_urls += 1;
            }
            cleaned.push(record);
        }

        stats.accepted = cleaned.len();
        debug!(
            "{}: normalized {}/{} products ({} bad names, {} bad prices, {} duplicates)",
            self.profile.supermarket,
            stats.accepted,
            stats.received,
            stats.rejected_name,
            stats.rejected_price,
            stats.duplicates
        );
        (cleaned, stats)
    }

    fn normalize_one(
        &self,
        raw: &RawProduct,
        index: usize,
        stats: &mut NormalizationStats,
    ) -> Option<(ProductRecord, LinkSource)> {
        let field = |value: &Option<String>| value.as_deref().unwrap_or_default().trim().to_string();

        let full_name = field(&raw.name);
        let quantity_field = field(&raw.quantity);
        let price_field = field(&raw.price);
        let promotion_field = field(&raw.promotion_description);
        let image_field = field(&raw.image_url);
        let link_field = field(&raw.product_link);

        let min_len = self.profile.min_name_length;
        if full_name.chars().count() < min_len.max(1) {
            debug!("Rejecting entry {} with short name '{}'", index, full_name);
            stats.rejected_name += 1;
            return None;
        }

        let (name, quantity) = if quantity_field.is_empty() {
            quantity_rules::extract_quantity(self.rules, &full_name, min_len)
                .map_or((full_name.clone(), String::new()), |found| {
                    (found.remainder, found.quantity)
                })
        } else {
            (full_name.clone(), quantity_field)
        };
        let name = collapse_whitespace(&name);

        let price = match extract_price(&price_field) {
            Some(price) => price,
            None if self.profile.price_policy == PricePolicy::RejectRecord => {
                debug!("Rejecting '{}': no price in '{}'", name, price_field);
                stats.rejected_price += 1;
                return None;
            }
            None => String::new(),
        };

        // Slugs use the pack size as listed; only the stored field gets unit spacing
        let listed_quantity = collapse_whitespace(&quantity);
        let quantity = space_number_and_unit(&listed_quantity);

        let promotion = collapse_whitespace(&promotion_field);
        let promotion = if is_promotion_noise(&promotion) {
            String::new()
        } else {
            promotion
        };

        let (product_url, source) = self.resolve_product_url(&link_field, &name, &listed_quantity);
        let image_url = self.resolve_image_url(&image_field);

        Some((
            ProductRecord {
                name,
                supermarket: self.profile.supermarket.display_name().to_string(),
                quantity,
                price,
                promotion_description: promotion,
                promotion_end_date_text: String::new(),
                product_url,
                image_url,
                embedding: None,
            },
            source,
        ))
    }

    /// Canonical product URL for a raw link, or the site's fallback
    fn resolve_product_url(&self, link: &str, name: &str, quantity: &str) -> (String, LinkSource) {
        let marker = self.profile.product_path_marker.as_str();

        if link.is_empty() {
            return (self.fallback_url(name, quantity), LinkSource::Fallback);
        }
        if link.starts_with(marker) {
            return (self.profile.absolute(link), LinkSource::Canonical);
        }
        if link.starts_with(&self.profile.canonical_product_prefix()) {
            return (link.to_string(), LinkSource::Canonical);
        }
        if let Some(start) = link.find(marker) {
            return (self.profile.absolute(&link[start..]), LinkSource::Canonical);
        }

        warn!("Unexpected product link format: {}", link);
        (self.fallback_url(name, quantity), LinkSource::Fallback)
    }

    fn fallback_url(&self, name: &str, quantity: &str) -> String {
        match &self.profile.link_fallback {
            LinkFallback::SearchQuery { path } => {
                format!("{}{}", self.profile.absolute(path), slugify(name))
            }
            LinkFallback::ProductSlug { path } => {
                format!("{}{}", self.profile.absolute(path), slugify_with_quantity(name, quantity))
            }
        }
    }

    fn resolve_image_url(&self, image: &str) -> String {
        if image.is_empty() || image.starts_with("http") {
            image.to_string()
        } else {
            self.profile.absolute(image)
        }
    }
}
