//! Criterion benchmarks for the parse → aggregate pipeline

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use vendtrack::parsers::{parse_events, DelimitedParser};
use vendtrack::services::{filter_records, Aggregator};

const ITEMS: [&str; 6] = ["可樂", "八寶粥", "綠茶", "咖啡", "礦泉水", "奶茶"];
const USERS: [(&str, &str); 5] = [
    ("362", "Ming Lin"),
    ("17", "Amy Chen"),
    ("88", "Jason Wu"),
    ("104", "Mei Huang"),
    ("9", "Kevin Tsai"),
];

/// Synthetic tab-delimited export with `rows` data rows
fn sample_export(rows: usize) -> String {
    let mut text = String::from("事件時間\t人臉辨識ID\t使用者名稱\t品名\t金額\n");
    for i in 0..rows {
        let (id, name) = USERS[i % USERS.len()];
        text.push_str(&format!(
            "2025-10-{:02} {:02}:{:02}:00\t{}\t{}\t{}\t{}\n",
            i % 28 + 1,
            i % 24,
            i % 60,
            id,
            name,
            ITEMS[i % ITEMS.len()],
            20 + (i % 4) * 5
        ));
    }
    text
}

/// Synthetic API payload with `rows` vend events
fn sample_events(rows: usize) -> Vec<u8> {
    let events: Vec<String> = (0..rows)
        .map(|i| {
            let (id, name) = USERS[i % USERS.len()];
            format!(
                r#"{{"eventTime":"2025-10-{:02}T{:02}:15:00","fid":"{}","targetUserName":"{}","productName":"{}","channel":{},"amount":{}}}"#,
                i % 28 + 1,
                i % 24,
                id,
                name,
                ITEMS[i % ITEMS.len()],
                i % 12 + 1,
                25
            )
        })
        .collect();
    format!("[{}]", events.join(",")).into_bytes()
}

fn bench_parse_text(c: &mut Criterion) {
    let parser = DelimitedParser::new();
    let mut group = c.benchmark_group("parser");

    for rows in [100, 2_000, 20_000] {
        let text = sample_export(rows);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::new("parse_text", rows), &text, |b, text| {
            b.iter(|| parser.parse_text(black_box(text)));
        });
    }

    group.finish();
}

fn bench_parse_events(c: &mut Criterion) {
    let payload = sample_events(2_000);
    let mut group = c.benchmark_group("parser");
    group.throughput(Throughput::Bytes(payload.len() as u64));

    group.bench_function("parse_events", |b| {
        b.iter(|| {
            // simd-json parses in place
            let mut bytes = payload.clone();
            parse_events(black_box(&mut bytes))
        });
    });

    group.finish();
}

fn bench_aggregate(c: &mut Criterion) {
    let records = DelimitedParser::new()
        .parse_text(&sample_export(20_000))
        .unwrap_or_default();
    if records.is_empty() {
        eprintln!("Warning: sample export produced no records");
        return;
    }

    let mut group = c.benchmark_group("aggregator");
    group.throughput(Throughput::Elements(records.len() as u64));

    group.bench_function("summarize", |b| {
        b.iter(|| Aggregator::summarize(black_box(&records)));
    });

    group.bench_function("filter_then_summarize", |b| {
        b.iter(|| {
            let matched = filter_records(black_box(&records), "ming");
            Aggregator::summarize(matched)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_parse_text, bench_parse_events, bench_aggregate);
criterion_main!(benches);
