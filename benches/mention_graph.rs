//! Benchmarks for mention graph construction and ranking.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use tweetnet::graph::{analytics, build_mention_graph, extract_mentions};
use tweetnet::record::Record;

fn synthetic_records(count: usize, users: usize) -> Vec<Record> {
    let mut rng = StdRng::seed_from_u64(0);
    (0..count)
        .map(|i| {
            let mentions: Vec<String> = (0..rng.gen_range(0..5))
                .map(|_| format!("@User{}", rng.gen_range(0..users)))
                .collect();
            Record::new(i.to_string())
                .with_author(format!("user{}", rng.gen_range(0..users)))
                .with_text(format!("some text {} and more", mentions.join(" ")))
        })
        .collect()
}

fn bench_extract(c: &mut Criterion) {
    let text = "RT thoughts on #GenAI from @OpenAI @AnthropicAI and @someone_else_here, cc @x";
    c.bench_function("extract_mentions", |bench| {
        bench.iter(|| black_box(extract_mentions(text).count()))
    });
}

fn bench_build(c: &mut Criterion) {
    let records = synthetic_records(10_000, 500);
    c.bench_function("build_mention_graph_10k", |bench| {
        bench.iter(|| black_box(build_mention_graph(&records)))
    });
}

fn bench_rank(c: &mut Criterion) {
    let records = synthetic_records(10_000, 500);
    let (graph, _) = build_mention_graph(&records);
    c.bench_function("rank_in_degree_500", |bench| {
        bench.iter(|| black_box(analytics::weighted_in_degree(&graph)))
    });
    c.bench_function("degree_centrality_500", |bench| {
        bench.iter(|| black_box(analytics::degree_centrality(&graph)))
    });
}

criterion_group!(benches, bench_extract, bench_build, bench_rank);
criterion_main!(benches);
