//! Decoder throughput benchmarks.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use nlui_client::config::FramePolicy;
use nlui_client::correlator::ConversationCorrelator;
use nlui_client::sink::CollectingSink;
use nlui_client::sse::decode_text;
use nlui_client::stream::Pipeline;

/// A chat stream with `deltas` content_delta frames and a closing done.
fn generate_stream(deltas: usize) -> String {
    let mut body = String::from("event: session\ndata: {\"session_id\":\"bench\"}\n\n");
    for i in 0..deltas {
        body.push_str(&format!(
            "event: content_delta\ndata: {{\"delta\":\"token {} with some text \"}}\n\n",
            i
        ));
    }
    body.push_str("event: done\ndata: {\"conversation_id\":\"bench-conv\"}\n\n");
    body
}

fn bench_decode_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_text");

    for deltas in [10, 100, 1000].iter() {
        let body = generate_stream(*deltas);
        group.throughput(Throughput::Bytes(body.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(deltas), &body, |b, body| {
            b.iter(|| decode_text(black_box(body)))
        });
    }

    group.finish();
}

fn bench_pipeline_chunked(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline_chunked");
    let body = generate_stream(500);
    group.throughput(Throughput::Bytes(body.len() as u64));

    for chunk_size in [16, 256, 4096].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(chunk_size),
            chunk_size,
            |b, &chunk_size| {
                b.iter(|| {
                    let mut sink = CollectingSink::new();
                    let mut pipeline =
                        Pipeline::new(ConversationCorrelator::new(), &mut sink, FramePolicy::Skip);
                    for chunk in body.as_bytes().chunks(chunk_size) {
                        let _ = pipeline.push_chunk(black_box(chunk));
                    }
                    let _ = pipeline.finish(false);
                    pipeline.delivered()
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_decode_text, bench_pipeline_chunked);
criterion_main!(benches);
