//! Performance benchmarks for the linking pipeline

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use zettelwiki_core::{Document, DocumentId, LinkingConfig};
use zettelwiki_graph::{LinkEngine, NoteIndex, resolve};

/// Interconnected notes mixing explicit links, numeric references and tags
fn bench_corpus(size: u64) -> Vec<Document> {
    (1..=size)
        .map(|i| {
            let body = format!(
                "# Note {}\n\nThis is note {} linking to [[Note {}]] and #{}.\n\nTagged #bench and `[[Note {}]]` in code.",
                i,
                i,
                (i % size) + 1,
                ((i + 1) % size) + 1,
                i
            );
            Document::new(i, format!("Note {}", i), body).with_comments((i % 12) as u32)
        })
        .collect()
}

fn bench_link(c: &mut Criterion) {
    let mut group = c.benchmark_group("link");
    let engine = LinkEngine::default();

    for size in [10u64, 100, 500].iter() {
        let docs = bench_corpus(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &docs, |b, docs| {
            b.iter(|| engine.link(black_box(docs)))
        });
    }

    group.finish();
}

fn bench_auto_link(c: &mut Criterion) {
    let engine = LinkEngine::new(LinkingConfig {
        auto_link_keywords: true,
        ..Default::default()
    });
    let docs = bench_corpus(100);

    c.bench_function("link_with_auto_link_100", |b| {
        b.iter(|| engine.link(black_box(&docs)))
    });
}

fn bench_graph(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph");

    for size in [100u64, 1000].iter() {
        let corpus = LinkEngine::default().link(&bench_corpus(*size));
        group.bench_with_input(BenchmarkId::new("full", size), &corpus, |b, corpus| {
            b.iter(|| corpus.graph(black_box(None)))
        });
        group.bench_with_input(BenchmarkId::new("pruned", size), &corpus, |b, corpus| {
            b.iter(|| corpus.graph(black_box(Some(DocumentId(1)))))
        });
    }

    group.finish();
}

fn bench_resolve(c: &mut Criterion) {
    let index = NoteIndex::build(&bench_corpus(1000));

    c.bench_function("resolve_exact", |b| {
        b.iter(|| resolve(black_box("Note 500"), DocumentId(1), &index))
    });
    c.bench_function("resolve_fuzzy", |b| {
        b.iter(|| resolve(black_box("te 99"), DocumentId(1), &index))
    });
}

criterion_group!(benches, bench_link, bench_auto_link, bench_graph, bench_resolve);
criterion_main!(benches);
