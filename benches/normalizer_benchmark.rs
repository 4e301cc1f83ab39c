//! Normalizer throughput on synthetic listing output

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use grocery_price_scraper::domain::{RawProduct, SiteProfile};
use grocery_price_scraper::infrastructure::SelectorExtractor;
use grocery_price_scraper::ProductNormalizer;

const TITLES: [&str; 6] = [
    "Milk Bread 400 g",
    "Cola 6x330ml",
    "Jasmine Rice 2.5 kg",
    "Kiwi Fruit 6s",
    "Organic Bananas",
    "Greek Yoghurt 500g",
];

fn raw_products(count: usize) -> Vec<RawProduct> {
    (0..count)
        .map(|i| {
            RawProduct::named(format!("{} {}", i % 97, TITLES[i % TITLES.len()]))
                .with_price(format!("was ${}.90 now ${}.50", i % 30, i % 20))
                .with_promotion(if i % 3 == 0 { "NEW" } else { "2 for $5" })
                .with_link(if i % 4 == 0 { String::new() } else { format!("/en/p/{i}") })
        })
        .collect()
}

fn bench_normalize(c: &mut Criterion) {
    let profile = SiteProfile::cold_storage();
    let normalizer = ProductNormalizer::new(&profile);
    let mut group = c.benchmark_group("normalize");

    for size in [50, 500, 2000] {
        let input = raw_products(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &input, |b, input| {
            b.iter(|| normalizer.normalize(black_box(input)));
        });
    }
    group.finish();
}

fn bench_extract(c: &mut Criterion) {
    let extractor = SelectorExtractor::new(&SiteProfile::cold_storage().schema).unwrap();
    let tiles: String = (0..200)
        .map(|i| {
            format!(
                r#"<div class="ware-wrapper"><a href="/en/p/{i}"><img src="/img/{i}.png"></a>
                   <div class="name">{}</div><div class="price-box">${i}.90</div></div>"#,
                TITLES[i % TITLES.len()]
            )
        })
        .collect();
    let html = format!("<html><body>{tiles}</body></html>");

    c.bench_function("extract_200_tiles", |b| b.iter(|| extractor.extract(black_box(&html))));
}

criterion_group!(benches, bench_normalize, bench_extract);
criterion_main!(benches);
