#![allow(missing_docs)]
//! Benchmarks for reading and summarizing repository dumps.
//!
//! Dumps are generated in memory so the suite needs no fixtures on disk.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use repoinv::rayon_stats_pool::accumulate_batch_parallel;
use repoinv::{
    AggregateStats, CompletenessCalculator, MetadataSchema, Mode, OaiReader, Record, RecordView,
    RunConfig,
};

const PAYLOAD_OPEN: &str = concat!(
    r#"<oai_dc:dc xmlns:oai_dc="http://www.openarchives.org/OAI/2.0/oai_dc/" "#,
    r#"xmlns:dc="http://purl.org/dc/elements/1.1/">"#,
);

/// Build a Dublin Core dump of `count` records, every tenth one deleted.
fn synthetic_dump(count: usize) -> Vec<u8> {
    let mut xml = String::from(
        r#"<OAI-PMH xmlns="http://www.openarchives.org/OAI/2.0/"><ListRecords>"#,
    );
    for i in 0..count {
        let status = if i % 10 == 0 { r#" status="deleted""# } else { "" };
        xml.push_str(&format!(
            "<record><header{status}><identifier>oai:bench:{i}</identifier>\
             <datestamp>2020-01-01</datestamp></header><metadata>"
        ));
        xml.push_str(PAYLOAD_OPEN);
        xml.push_str(&format!(
            "<dc:title>Record {i}</dc:title><dc:creator>Author {i}</dc:creator>\
             <dc:subject>Rivers</dc:subject><dc:subject>Lakes</dc:subject>\
             <dc:date>20{:02}</dc:date><dc:identifier>http://example.org/{i}</dc:identifier>",
            i % 100
        ));
        xml.push_str("</oai_dc:dc></metadata></record>");
    }
    xml.push_str("</ListRecords></OAI-PMH>");
    xml.into_bytes()
}

/// Benchmark parsing 1,000 records without further processing.
fn benchmark_read_1k(c: &mut Criterion) {
    let dump = synthetic_dump(1_000);

    c.bench_function("read_1k_records", |b| {
        b.iter(|| {
            let count = OaiReader::new(black_box(dump.as_slice()))
                .filter_map(Result::ok)
                .count();
            black_box(count)
        });
    });
}

/// Benchmark streaming accumulation and scoring of 1,000 records.
fn benchmark_stats_1k(c: &mut Criterion) {
    let dump = synthetic_dump(1_000);
    let extractor = MetadataSchema::DublinCore.extractor();

    c.bench_function("stats_1k_records", |b| {
        b.iter(|| {
            let mut stats = AggregateStats::new();
            for record in OaiReader::new(black_box(dump.as_slice())).filter_map(Result::ok) {
                stats.accumulate(&RecordView::new(&record, extractor.as_ref()));
            }
            black_box(CompletenessCalculator::default().calculate(&stats).ok())
        });
    });
}

/// Benchmark a full dump-mode pass into a discarded buffer.
fn benchmark_dump_pass_1k(c: &mut Criterion) {
    let dump = synthetic_dump(1_000);
    let config = RunConfig::builder(MetadataSchema::DublinCore)
        .mode(Mode::Dump)
        .build()
        .unwrap();

    c.bench_function("dump_pass_1k_records", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(256 * 1024);
            repoinv::run(&config, OaiReader::new(black_box(dump.as_slice())), &mut out).unwrap();
            black_box(out.len())
        });
    });
}

/// Sequential versus rayon fold over 10,000 parsed records.
fn benchmark_parallel_fold_10k(c: &mut Criterion) {
    let records: Vec<Record> = OaiReader::new(synthetic_dump(10_000).as_slice())
        .filter_map(Result::ok)
        .collect();
    let extractor = MetadataSchema::DublinCore.extractor();

    let mut group = c.benchmark_group("fold_10k_records");
    group.bench_function("sequential", |b| {
        b.iter(|| {
            let mut stats = AggregateStats::new();
            for record in black_box(&records) {
                stats.accumulate(&RecordView::new(record, extractor.as_ref()));
            }
            black_box(stats.record_count)
        });
    });
    group.bench_function("parallel", |b| {
        b.iter(|| {
            let stats = accumulate_batch_parallel(black_box(&records), extractor.as_ref());
            black_box(stats.record_count)
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    benchmark_read_1k,
    benchmark_stats_1k,
    benchmark_dump_pass_1k,
    benchmark_parallel_fold_10k
);
criterion_main!(benches);
