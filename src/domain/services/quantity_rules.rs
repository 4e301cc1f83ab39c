//! Ordered quantity extraction rules
//!
//! Product titles often carry the pack size at the end ("Milk Bread 400 g",
//! "Cola 6x330ml"). Rules are tried in order and the first one that matches
//! wins, so more specific patterns must come first.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Turns the captures of a matching rule into the quantity text
pub type QuantityHandler = fn(&Captures<'_>) -> String;

pub struct QuantityRule {
    pub name: &'static str,
    pub pattern: Regex,
    pub handler: QuantityHandler,
}

/// Quantity split off the end of a product title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantityMatch {
    pub rule: &'static str,
    pub quantity: String,
    /// Title with the quantity removed and trimmed
    pub remainder: String,
}

fn captured_token(caps: &Captures<'_>) -> String {
    caps.get(1).map_or_else(String::new, |m| m.as_str().trim().to_string())
}

fn multiplier_token(caps: &Captures<'_>) -> String {
    captured_token(caps).replace('X', "x")
}

fn rule(name: &'static str, pattern: &str, handler: QuantityHandler) -> QuantityRule {
    QuantityRule {
        name,
        // Patterns are literals below; a failure here is a programming error caught by tests.
        pattern: Regex::new(pattern).unwrap_or_else(|e| panic!("invalid quantity rule {name}: {e}")),
        handler,
    }
}

static DEFAULT_RULES: Lazy<Vec<QuantityRule>> = Lazy::new(|| {
    vec![
        rule(
            "compact_unit_or_count",
            r"(?i)\b(\d+(?:\.\d+)?(?:kg|g|ml|l|oz|lb|pc|pcs|pack|s))\b$",
            captured_token,
        ),
        rule(
            "compact_weight_volume",
            r"(?i)\b(\d+(?:\.\d+)?(?:kg|g|ml|l|oz|lb))\b$",
            captured_token,
        ),
        rule(
            "multiplier",
            r"(?i)\b(\d+(?:\.\d+)?x\d+(?:\.\d+)?(?:kg|g|ml|l|oz|lb))\b$",
            multiplier_token,
        ),
        rule(
            "spaced_unit_or_count",
            // The leading guard keeps "2.5 kg" from matching as "5 kg".
            r"(?i)(?:^|[^\d.])\b(\d+\s*(?:kg|g|ml|l|oz|lb|pc|pcs|pack|s))\b$",
            captured_token,
        ),
        rule(
            "spaced_decimal_weight_volume",
            r"(?i)\b(\d+(?:\.\d+)?\s*(?:kg|g|ml|l|oz|lb))\b$",
            captured_token,
        ),
    ]
});

/// The built-in rule list, in precedence order
pub fn default_rules() -> &'static [QuantityRule] {
    &DEFAULT_RULES
}

/// Find the first rule matching the end of `title`.
///
/// A match is only accepted when the remaining title keeps at least
/// `min_remainder` characters; otherwise the next rule is tried.
pub fn extract_quantity(
    rules: &[QuantityRule],
    title: &str,
    min_remainder: usize,
) -> Option<QuantityMatch> {
    rules.iter().find_map(|rule| {
        let caps = rule.pattern.captures(title)?;
        let token = caps.get(1)?;
        let remainder = format!("{}{}", &title[..token.start()], &title[token.end()..])
            .trim()
            .to_string();
        if remainder.chars().count() < min_remainder.max(1) {
            return None;
        }
        Some(QuantityMatch {
            rule: rule.name,
            quantity: (rule.handler)(&caps),
            remainder,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Milk Bread 400 g", "Milk Bread", "400 g", "spaced_unit_or_count")]
    #[case("Fresh Milk 1L", "Fresh Milk", "1L", "compact_unit_or_count")]
    #[case("Kiwi Fruit 6s", "Kiwi Fruit", "6s", "compact_unit_or_count")]
    #[case("Tissue Pack 10pcs", "Tissue Pack", "10pcs", "compact_unit_or_count")]
    #[case("Olive Oil 1.5kg", "Olive Oil", "1.5kg", "compact_unit_or_count")]
    #[case("Cola 6X330ml", "Cola", "6x330ml", "multiplier")]
    #[case("Rice 5 kg", "Rice", "5 kg", "spaced_unit_or_count")]
    #[case("Rice 2.5 kg", "Rice", "2.5 kg", "spaced_decimal_weight_volume")]
    fn extracts_trailing_quantity(
        #[case] title: &str,
        #[case] remainder: &str,
        #[case] quantity: &str,
        #[case] rule: &str,
    ) {
        let found = extract_quantity(default_rules(), title, 2).expect("quantity expected");
        assert_eq!(found.remainder, remainder);
        assert_eq!(found.quantity, quantity);
        assert_eq!(found.rule, rule);
    }

    #[rstest]
    #[case("Organic Bananas")]
    #[case("7 Up")]
    #[case("Pack of 400g Biscuits")]
    #[case("Milk 1000mAh")]
    fn leaves_titles_without_trailing_quantity(#[case] title: &str) {
        assert_eq!(extract_quantity(default_rules(), title, 2), None);
    }

    #[test]
    fn refuses_to_strip_the_whole_title() {
        assert_eq!(extract_quantity(default_rules(), "500g", 2), None);
        assert_eq!(extract_quantity(default_rules(), "A 500g", 2), None);
        assert!(extract_quantity(default_rules(), "Ab 500g", 2).is_some());
    }

    #[test]
    fn all_rules_compile() {
        assert_eq!(default_rules().len(), 5);
    }
}
