//! Domain module - products, retailer profiles and normalization
//!
//! Nothing in here touches the network or the filesystem.

pub mod product;
pub mod services;
pub mod site_profile;

pub use product::{ProductRecord, RawProduct, PRODUCT_COLUMNS};
pub use site_profile::{
    ExtractionSchema, FieldKind, FieldSpec, LinkFallback, Pagination, PricePolicy, RawFieldKey,
    SiteProfile, Supermarket,
};
