//! Schema-driven extraction of raw product tiles from listing HTML

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::domain::product::RawProduct;
use crate::domain::site_profile::{ExtractionSchema, FieldKind, RawFieldKey};
use crate::infrastructure::parsing_error::{ParsingError, ParsingResult};

struct CompiledField {
    field: RawFieldKey,
    selector: Selector,
    kind: FieldKind,
}

/// CSS extractor compiled from a site's `ExtractionSchema`
pub struct SelectorExtractor {
    base_selector: Selector,
    base_selector_text: String,
    fields: Vec<CompiledField>,
}

impl SelectorExtractor {
    /// Compile every selector of `schema` up front
    pub fn new(schema: &ExtractionSchema) -> ParsingResult<Self> {
        let fields = schema
            .fields
            .iter()
            .map(|spec| {
                Ok(CompiledField {
                    field: spec.field,
                    selector: compile(&spec.selector)?,
                    kind: spec.kind.clone(),
                })
            })
            .collect::<ParsingResult<Vec<_>>>()?;

        Ok(Self {
            base_selector: compile(&schema.base_selector)?,
            base_selector_text: schema.base_selector.clone(),
            fields,
        })
    }

    /// Raw products for every tile in `html`, in document order
    pub fn extract(&self, html: &str) -> Vec<RawProduct> {
        let document = Html::parse_document(html);
        let products: Vec<RawProduct> = document
            .select(&self.base_selector)
            .map(|tile| self.extract_tile(&tile))
            .filter(|product| !product.is_empty())
            .collect();

        debug!(
            "Extracted {} product tiles with '{}'",
            products.len(),
            self.base_selector_text
        );
        products
    }

    fn extract_tile(&self, tile: &ElementRef<'_>) -> RawProduct {
        let mut product = RawProduct::default();
        for compiled in &self.fields {
            let Some(element) = tile.select(&compiled.selector).next() else {
                continue;
            };
            let value = match &compiled.kind {
                FieldKind::Text => element_text(&element),
                FieldKind::Attribute(name) => element
                    .value()
                    .attr(name)
                    .map(|v| v.trim().to_string())
                    .unwrap_or_default(),
            };
            if value.is_empty() {
                continue;
            }
            let slot = match compiled.field {
                RawFieldKey::Name => &mut product.name,
                RawFieldKey::Quantity => &mut product.quantity,
                RawFieldKey::Price => &mut product.price,
                RawFieldKey::PromotionDescription => &mut product.promotion_description,
                RawFieldKey::ImageUrl => &mut product.image_url,
                RawFieldKey::ProductLink => &mut product.product_link,
            };
            *slot = Some(value);
        }
        product
    }
}

fn compile(selector: &str) -> ParsingResult<Selector> {
    Selector::parse(selector).map_err(|e| ParsingError::invalid_selector(selector, e))
}

fn element_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
