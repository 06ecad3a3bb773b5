//! Benchmarks for the journal analysis core and local extraction
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use koru::extract::HeuristicExtractor;
use koru::journal::{analyze, StructuredRecord};
use serde_json::json;

const LEVELS: [&str; 3] = ["low", "medium", "high"];
const MOODS: [&str; 3] = ["bad", "neutral", "good"];

fn create_test_records(count: usize) -> Vec<StructuredRecord> {
    (0..count)
        .map(|i| {
            let symptoms: Vec<&str> = if i % 3 == 0 { vec!["headache", "fatigue"] } else { vec![] };
            let sleep = if i % 2 == 0 { "low" } else { "high" };
            let stress = LEVELS[i % 3];
            let mood = MOODS[(i + 1) % 3];

            let value = json!({
                "symptoms": symptoms,
                "sleep": sleep,
                "sleep_hours": 4.5 + (i % 5) as f64,
                "food": ["coffee"],
                "stress": stress,
                "exercise": i % 4 == 0,
                "mood": mood,
            });
            StructuredRecord::from_value(&value).unwrap()
        })
        .collect()
}

fn bench_analyze(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze");

    for size in [7, 60, 1000] {
        let records = create_test_records(size);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(format!("analyze_{}", size), |b| {
            b.iter(|| analyze(black_box(&records)))
        });
    }

    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let values: Vec<_> = create_test_records(60).iter().map(|r| r.to_value()).collect();

    c.bench_function("parse_records_60", |b| {
        b.iter(|| {
            values
                .iter()
                .map(|v| StructuredRecord::from_value(black_box(v)).unwrap())
                .count()
        })
    });
}

fn bench_heuristic_extract(c: &mut Criterion) {
    let extractor = HeuristicExtractor::new();
    let text = "Woke up with a headache after sleeping maybe five hours. Two coffees, \
                pizza for lunch, a bit stressed about the deadline. Skipped the gym.";

    c.bench_function("heuristic_extract", |b| {
        b.iter(|| extractor.extract_record(black_box(text)))
    });
}

criterion_group!(benches, bench_analyze, bench_parse, bench_heuristic_extract);
criterion_main!(benches);
