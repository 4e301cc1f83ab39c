//! Per-retailer site profiles
//!
//! A `SiteProfile` carries everything that differs between supermarkets:
//! origin, extraction selectors, category list, name/price policies and how
//! product links are rebuilt. The scraping pipeline and the normalizer are
//! shared and only ever read from a profile.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported retailers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Supermarket {
    ColdStorage,
    FairPrice,
    ShengSiong,
}

impl Supermarket {
    pub const ALL: [Self; 3] = [Self::ColdStorage, Self::FairPrice, Self::ShengSiong];

    /// Value written to `ProductRecord::supermarket`
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::ColdStorage => "Cold Storage",
            Self::FairPrice => "FairPrice",
            Self::ShengSiong => "Sheng Siong",
        }
    }

    /// Identifier used on the command line and in output file names
    pub const fn slug(self) -> &'static str {
        match self {
            Self::ColdStorage => "cold-storage",
            Self::FairPrice => "fairprice",
            Self::ShengSiong => "sheng-siong",
        }
    }

    /// File stem for exports, e.g. `coldstorage_products`
    pub fn export_stem(self) -> String {
        format!("{}_products", self.slug().replace('-', ""))
    }

    pub fn profile(self) -> SiteProfile {
        match self {
            Self::ColdStorage => SiteProfile::cold_storage(),
            Self::FairPrice => SiteProfile::fairprice(),
            Self::ShengSiong => SiteProfile::sheng_siong(),
        }
    }
}

impl fmt::Display for Supermarket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Supermarket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace(['_', ' '], "-");
        Self::ALL
            .into_iter()
            .find(|market| market.slug() == wanted || market.slug().replace('-', "") == wanted)
            .ok_or_else(|| {
                format!(
                    "unknown supermarket '{s}', expected one of: {}",
                    Self::ALL.map(Self::slug).join(", ")
                )
            })
    }
}

/// What to do with a record whose price field has no parsable amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricePolicy {
    /// Keep the record with an empty price
    BlankOnMissing,
    /// Drop the record entirely
    RejectRecord,
}

/// How a product URL is built when the raw link is missing or unusable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum LinkFallback {
    /// `origin + path + slug(name)`, e.g. `/en/search?q=`
    SearchQuery { path: String },
    /// `origin + path + slug(name)-slug(quantity)`, e.g. `/product/`
    ProductSlug { path: String },
}

/// How category listings are paged
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Pagination {
    /// Only the category URL itself is fetched
    Single,
    /// Page N is reached by replacing `first_segment` (e.g. `/1.html`) with `/N.html`
    PathIndex { first_segment: String },
}

impl Pagination {
    /// URL of the 1-based `page` for `base_url`, `None` past the last page
    pub fn page_url(&self, base_url: &str, page: u32) -> Option<String> {
        match self {
            Self::Single => (page == 1).then(|| base_url.to_string()),
            Self::PathIndex { first_segment } => {
                if page == 1 {
                    Some(base_url.to_string())
                } else if base_url.contains(first_segment.as_str()) {
                    let extension = first_segment
                        .rsplit_once('.')
                        .map(|(_, ext)| format!(".{ext}"))
                        .unwrap_or_default();
                    Some(base_url.replace(first_segment.as_str(), &format!("/{page}{extension}")))
                } else {
                    None
                }
            }
        }
    }
}

/// Slot of `RawProduct` a selector fills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawFieldKey {
    Name,
    Quantity,
    Price,
    PromotionDescription,
    ImageUrl,
    ProductLink,
}

/// Whether a field reads element text or an attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "attribute")]
pub enum FieldKind {
    Text,
    Attribute(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub field: RawFieldKey,
    pub selector: String,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub fn text(field: RawFieldKey, selector: &str) -> Self {
        Self {
            field,
            selector: selector.to_string(),
            kind: FieldKind::Text,
        }
    }

    pub fn attribute(field: RawFieldKey, selector: &str, attribute: &str) -> Self {
        Self {
            field,
            selector: selector.to_string(),
            kind: FieldKind::Attribute(attribute.to_string()),
        }
    }
}

/// CSS extraction schema: one base selector per product tile plus fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionSchema {
    pub base_selector: String,
    pub fields: Vec<FieldSpec>,
}

/// Complete per-retailer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteProfile {
    pub supermarket: Supermarket,
    /// Scheme and host without trailing slash, e.g. `https://coldstorage.com.sg`
    pub origin: String,
    /// Path fragment that identifies a canonical product link, e.g. `/en/p/`
    pub product_path_marker: String,
    pub link_fallback: LinkFallback,
    pub min_name_length: usize,
    pub price_policy: PricePolicy,
    pub pagination: Pagination,
    pub upload_batch_size: usize,
    pub schema: ExtractionSchema,
    /// Category used when running in test mode
    pub test_category_url: String,
    pub category_urls: Vec<String>,
}

impl SiteProfile {
    pub fn cold_storage() -> Self {
        use RawFieldKey::{ImageUrl, Name, Price, ProductLink, PromotionDescription, Quantity};

        Self {
            supermarket: Supermarket::ColdStorage,
            origin: "https://coldstorage.com.sg".to_string(),
            product_path_marker: "/en/p/".to_string(),
            link_fallback: LinkFallback::SearchQuery {
                path: "/en/search?q=".to_string(),
            },
            min_name_length: 2,
            price_policy: PricePolicy::BlankOnMissing,
            pagination: Pagination::PathIndex {
                first_segment: "/1.html".to_string(),
            },
            upload_batch_size: 5,
            schema: ExtractionSchema {
                base_selector: ".ware-wrapper, .row-container, .mg-r-10".to_string(),
                fields: vec![
                    FieldSpec::text(Name, ".name"),
                    FieldSpec::text(Quantity, ".unit, .pack-size, .size"),
                    FieldSpec::text(Price, ".price-box, .price"),
                    FieldSpec::text(PromotionDescription, ".pro-tag, .promotion-tag, .promo-text, .tag"),
                    FieldSpec::attribute(ImageUrl, ".el-image img, img", "src"),
                    FieldSpec::attribute(ProductLink, "a", "href"),
                ],
            },
            test_category_url: "https://coldstorage.com.sg/en/category/100011/1.html".to_string(),
            category_urls: [
                "157991", "157786", "100011", "100015", "100020", "100007", "100003",
                "100010", "100022", "100001", "100006", "100004", "100002", "100013",
            ]
            .iter()
            .map(|id| format!("https://coldstorage.com.sg/en/category/{id}/1.html"))
            .collect(),
        }
    }

    pub fn fairprice() -> Self {
        use RawFieldKey::{Name, Price, PromotionDescription, Quantity};

        Self {
            supermarket: Supermarket::FairPrice,
            origin: "https://www.fairprice.com.sg".to_string(),
            product_path_marker: "/product/".to_string(),
            link_fallback: LinkFallback::SearchQuery {
                path: "/search?query=".to_string(),
            },
            min_name_length: 2,
            price_policy: PricePolicy::BlankOnMissing,
            pagination: Pagination::Single,
            upload_batch_size: 5,
            schema: ExtractionSchema {
                base_selector: "div.sc-747538d2-0".to_string(),
                fields: vec![
                    FieldSpec::text(Name, "div.sc-747538d2-6 span.sc-747538d2-3"),
                    FieldSpec::text(Quantity, "div.sc-747538d2-6 span.sc-e94e62e6-2"),
                    FieldSpec::text(Price, "div.sc-747538d2-2 span.sc-747538d2-3"),
                    FieldSpec::text(PromotionDescription, "div.sc-747538d2-8 span.sc-ab6170a9-1"),
                ],
            },
            test_category_url: "https://www.fairprice.com.sg/category/international-selections"
                .to_string(),
            category_urls: [
                "electronics-5",
                "baby-child-toys",
                "bakery",
                "beauty--personal-care",
                "dairy-chilled-eggs",
                "drinks",
                "beer-wine-spirits",
                "food-cupboard-6",
                "frozen",
                "fruits-vegetables",
                "health--wellness",
                "housebrand-1",
                "household",
                "meat-seafood",
                "pet-supplies",
                "rice-noodles-cooking-ingredients",
                "snacks--confectionery",
                "electrical--lifestyle",
            ]
            .iter()
            .map(|category| format!("https://www.fairprice.com.sg/category/{category}"))
            .collect(),
        }
    }

    pub fn sheng_siong() -> Self {
        use RawFieldKey::{ImageUrl, Name, Price, PromotionDescription, Quantity};

        Self {
            supermarket: Supermarket::ShengSiong,
            origin: "https://shengsiong.com.sg".to_string(),
            product_path_marker: "/product/".to_string(),
            link_fallback: LinkFallback::ProductSlug {
                path: "/product/".to_string(),
            },
            min_name_length: 3,
            price_policy: PricePolicy::RejectRecord,
            pagination: Pagination::Single,
            upload_batch_size: 10,
            schema: ExtractionSchema {
                base_selector: ".product-preview".to_string(),
                fields: vec![
                    FieldSpec::text(Name, ".product-name"),
                    FieldSpec::text(Quantity, ".product-packSize"),
                    FieldSpec::text(Price, ".product-price span, .product-price .promo-price"),
                    FieldSpec::text(PromotionDescription, ".product-tag"),
                    FieldSpec::attribute(ImageUrl, ".product-img", "src"),
                ],
            },
            test_category_url: "https://shengsiong.com.sg/breakfast-spreads".to_string(),
            category_urls: [
                "breakfast-spreads",
                "dairy-chilled-eggs",
                "fruits",
                "vegetables",
                "meat-poultry-seafood",
                "beverages",
                "alcohol",
                "rice-noodles-pasta",
                "frozen-goods",
                "dried-food-herbs",
                "cooking-baking",
                "convenience-food-113",
                "snacks-confectioneries",
            ]
            .iter()
            .map(|category| format!("https://shengsiong.com.sg/{category}"))
            .collect(),
        }
    }

    /// Absolute URL for a path on this site
    pub fn absolute(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.origin)
        } else {
            format!("{}/{path}", self.origin)
        }
    }

    /// Canonical absolute prefix of product pages, e.g. `https://coldstorage.com.sg/en/p/`
    pub fn canonical_product_prefix(&self) -> String {
        format!("{}{}", self.origin, self.product_path_marker)
    }
}
