//! Small text helpers shared by the normalizer

use once_cell::sync::Lazy;
use regex::Regex;

static PRICE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$?(\d+(?:,\d{3})*(?:\.\d{2})?)").unwrap_or_else(|e| panic!("price pattern: {e}"))
});

static DIGIT_LETTER_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)([a-zA-Z]+)").unwrap_or_else(|e| panic!("unit spacing pattern: {e}")));

static SLUG_DISALLOWED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s-]").unwrap_or_else(|e| panic!("slug pattern: {e}")));

static SLUG_SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[-\s]+").unwrap_or_else(|e| panic!("slug separator pattern: {e}")));

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\W").unwrap_or_else(|e| panic!("non-word pattern: {e}")));

static DASH_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").unwrap_or_else(|e| panic!("dash pattern: {e}")));

/// Promotion labels that carry no promotional information
const PROMOTION_NOISE: [&str; 3] = ["new", "popular", "bestseller"];

/// Collapse every whitespace run to a single space and trim the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First currency amount in `text`, formatted as `$<amount>`
pub fn extract_price(text: &str) -> Option<String> {
    PRICE_PATTERN
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|amount| format!("${}", amount.as_str()))
}

/// "125g" -> "125 g", "2x500g" -> "2 x500 g"
pub fn space_number_and_unit(quantity: &str) -> String {
    DIGIT_LETTER_BOUNDARY.replace_all(quantity, "$1 $2").into_owned()
}

pub fn is_promotion_noise(promotion: &str) -> bool {
    let lowered = promotion.to_lowercase();
    lowered.is_empty() || PROMOTION_NOISE.contains(&lowered.as_str())
}

/// Lowercase, alphanumeric, hyphen-joined rendering of `text`
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    let kept = SLUG_DISALLOWED.replace_all(&lowered, "");
    SLUG_SEPARATORS
        .replace_all(&kept, "-")
        .trim_matches('-')
        .to_string()
}

/// Product slug with the quantity appended, as used for slug-built product URLs.
///
/// `quantity` is taken as listed: "400g" stays "400g", it is not unit-spaced.
pub fn slugify_with_quantity(name: &str, quantity: &str) -> String {
    let slug = slugify(name);
    if quantity.is_empty() {
        return slug;
    }
    let quantity_slug = NON_WORD.replace_all(&quantity.to_lowercase(), "-").into_owned();
    DASH_RUNS
        .replace_all(&format!("{slug}-{quantity_slug}"), "-")
        .trim_matches('-')
        .to_string()
}
