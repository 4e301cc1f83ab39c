//! Normalization behavior across the built-in retailer profiles

use grocery_price_scraper::domain::{PricePolicy, RawProduct, SiteProfile, Supermarket};
use grocery_price_scraper::infrastructure::read_json;
use grocery_price_scraper::ProductNormalizer;
use proptest::prelude::*;
use rstest::rstest;

#[rstest]
#[case(Supermarket::ColdStorage, "Cold Storage")]
#[case(Supermarket::FairPrice, "FairPrice")]
#[case(Supermarket::ShengSiong, "Sheng Siong")]
fn records_carry_the_retailer_name(#[case] market: Supermarket, #[case] expected: &str) {
    let profile = market.profile();
    let out = ProductNormalizer::new(&profile).normalize(&[RawProduct::named("Jasmine Rice 5 kg").with_price("$12.50")]);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].supermarket, expected);
    assert_eq!(out[0].name, "Jasmine Rice");
    assert_eq!(out[0].quantity, "5 kg");
}

#[test]
fn fairprice_raw_keys_deserialize_and_normalize() {
    let raw: Vec<RawProduct> = serde_json::from_str(
        r#"[
            {"productName": "Meiji Fresh Milk", "productQuantity": "2L", "productPrice": "$6.95",
             "productPromotion": "Buy 2 at $12.50", "productPromotionDuration": "Until 30 Nov"},
            {"productName": "F", "productPrice": "$1.00"},
            {"productName": "Gardenia Bread", "productPromotion": "Bestseller"}
        ]"#,
    )
    .unwrap();

    let profile = SiteProfile::fairprice();
    let out = ProductNormalizer::new(&profile).normalize(&raw);

    assert_eq!(out.len(), 2);
    assert_eq!(out[0].quantity, "2 L");
    assert_eq!(out[0].price, "$6.95");
    assert_eq!(out[0].promotion_description, "Buy 2 at $12.50");
    assert_eq!(out[0].promotion_end_date_text, "");
    assert_eq!(out[0].product_url, "https://www.fairprice.com.sg/search?query=meiji-fresh-milk");
    assert_eq!(out[1].price, "");
    assert_eq!(out[1].promotion_description, "");
}

#[test]
fn sheng_siong_requires_three_character_names_and_a_price() {
    let profile = SiteProfile::sheng_siong();
    assert_eq!(profile.price_policy, PricePolicy::RejectRecord);

    let out = ProductNormalizer::new(&profile).normalize(&[
        RawProduct::named("Ab").with_price("$1.00"),
        RawProduct::named("Abc").with_price("$1.00"),
        RawProduct::named("Kaya").with_price("n/a"),
    ]);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].name, "Abc");
    assert_eq!(out[0].product_url, "https://shengsiong.com.sg/product/abc");
}

#[test]
fn normalizes_a_raw_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("raw.json");
    std::fs::write(
        &input,
        r#"[{"full_name": "Salted Butter 250g", "price": "S$5.20", "product_link": "/en/p/42"},
            {"full_name": "Salted Butter 250g", "price": "$5.20"}]"#,
    )
    .unwrap();

    let profile = SiteProfile::cold_storage();
    let output = dir.path().join("out");
    let (products, paths) =
        grocery_price_scraper::application::normalize_raw_file(&profile, &input, &output).unwrap();

    assert_eq!(products.len(), 1);
    assert_eq!(products[0].product_url, "https://coldstorage.com.sg/en/p/42");
    let paths = paths.unwrap();
    assert!(paths.csv.ends_with("coldstorage_products.csv"));
    let saved: Vec<grocery_price_scraper::ProductRecord> = read_json(&paths.json).unwrap();
    assert_eq!(saved, products);
}

fn raw_product() -> impl Strategy<Value = RawProduct> {
    (
        prop::sample::select(vec!["Apple", "apple", "APPLE", "Pear", "Kiwi Fruit", "X"]),
        prop::option::of(prop::sample::select(vec!["$1.00", "$2.50", "free", ""])),
    )
        .prop_map(|(name, price)| {
            let raw = RawProduct::named(name);
            match price {
                Some(price) => raw.with_price(price),
                None => raw,
            }
        })
}

proptest! {
    #[test]
    fn output_has_no_duplicates_and_keeps_input_order(raw in prop::collection::vec(raw_product(), 0..40)) {
        let profile = SiteProfile::cold_storage();
        let out = ProductNormalizer::new(&profile).normalize(&raw);

        prop_assert!(out.len() <= raw.len());
        for (i, a) in out.iter().enumerate() {
            prop_assert!(a.name.chars().count() >= profile.min_name_length);
            for b in &out[i + 1..] {
                prop_assert!(!b.is_duplicate_of(a));
            }
        }

        // Output is a subsequence of the accepted inputs
        let mut inputs = raw.iter().filter_map(|r| r.name.as_deref());
        for record in &out {
            prop_assert!(inputs.any(|name| name == record.name));
        }
    }

    #[test]
    fn normalizing_twice_is_stable(raw in prop::collection::vec(raw_product(), 0..20)) {
        let profile = SiteProfile::cold_storage();
        let normalizer = ProductNormalizer::new(&profile);
        let first = normalizer.normalize(&raw);
        let second = normalizer.normalize(&raw);
        prop_assert_eq!(first, second);
    }
}
