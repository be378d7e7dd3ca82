use artsy_gateway::models::artsy::{self, ArtworkList, Embedded, SearchResults};
use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use serde_json::{json, Value};
use std::hint::black_box;

/// Search payload shaped like Artsy's, with every third thumbnail missing.
fn search_payload(n: usize) -> Value {
    let results: Vec<Value> = (0..n)
        .map(|i| {
            let thumbnail = if i % 3 == 0 {
                "/assets/shared/missing_image.png".to_string()
            } else {
                format!("https://d32dm0rphc51dk.cloudfront.net/{i}/square.jpg")
            };
            json!({
                "type": "artist",
                "title": format!("Artist {i}"),
                "_links": {
                    "self": { "href": format!("https://api.artsy.net/api/artists/{i:024x}") },
                    "thumbnail": { "href": thumbnail }
                }
            })
        })
        .collect();
    json!({ "total_count": n, "_embedded": { "results": results } })
}

fn artworks_payload(n: usize) -> Value {
    let artworks: Vec<Value> = (0..n)
        .map(|i| {
            json!({
                "id": format!("{i:024x}"),
                "title": if i % 2 == 0 { Value::Null } else { json!(format!("Work {i}")) },
                "date": "1907",
                "_links": { "thumbnail": { "href": format!("https://img/{i}.jpg") } }
            })
        })
        .collect();
    json!({ "_embedded": { "artworks": artworks } })
}

fn benchmark_reshaping(c: &mut Criterion) {
    let search = search_payload(10);
    let artworks = artworks_payload(10);

    let mut group = c.benchmark_group("reshape");

    group.bench_function("search_decode_and_map", |b| {
        b.iter(|| {
            let payload: Embedded<SearchResults> =
                serde_json::from_value(black_box(search.clone())).unwrap();
            artsy::map_search_results(payload.embedded.unwrap_or_default().results)
        })
    });

    let decoded: Embedded<SearchResults> = serde_json::from_value(search).unwrap();
    let results = decoded.embedded.unwrap_or_default().results;
    group.bench_function("search_map_only", |b| {
        b.iter_batched(
            || results.clone(),
            |results| artsy::map_search_results(black_box(results)),
            BatchSize::SmallInput,
        )
    });

    group.bench_function("artworks_decode_and_map", |b| {
        b.iter(|| {
            let payload: Embedded<ArtworkList> =
                serde_json::from_value(black_box(artworks.clone())).unwrap();
            artsy::map_artworks(payload.embedded.unwrap_or_default().artworks)
        })
    });

    group.finish();
}

criterion_group!(benches, benchmark_reshaping);
criterion_main!(benches);
