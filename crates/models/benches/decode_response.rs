//! Benchmarks for response decoding
//!
//! Run with: cargo bench --package alma-models

use alma_models::RecommendationResponse;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const FIXTURE: &str = include_str!("../tests/fixtures/recommendation_with_ear.json");

fn bench_decode_response(c: &mut Criterion) {
    c.bench_function("decode_recommendation_response", |b| {
        b.iter(|| {
            let response: RecommendationResponse =
                serde_json::from_str(black_box(FIXTURE)).unwrap();
            black_box(response)
        })
    });
}

fn bench_decode_and_validate(c: &mut Criterion) {
    c.bench_function("decode_and_validate", |b| {
        b.iter(|| {
            let response: RecommendationResponse =
                serde_json::from_str(black_box(FIXTURE)).unwrap();
            response.validate().unwrap();
            black_box(response)
        })
    });
}

fn bench_decode_annotated_image(c: &mut Criterion) {
    let response: RecommendationResponse = serde_json::from_str(FIXTURE).unwrap();
    let analysis = response.ear_analysis.unwrap();

    c.bench_function("decode_annotated_image", |b| {
        b.iter(|| black_box(analysis.annotated_image.decode().unwrap()))
    });
}

criterion_group!(
    benches,
    bench_decode_response,
    bench_decode_and_validate,
    bench_decode_annotated_image
);
criterion_main!(benches);
