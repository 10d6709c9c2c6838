//! Benchmarks for the relay's request path.
//!
//! Run with: cargo bench --bench relay_bench
//!
//! These benchmarks measure the CPU-bound steps around the upstream call:
//! validation, prompt construction, answer framing, candidate extraction
//! and error classification.

use axum::http::Method;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use netassist_relay::{
    services::{build_prompt, classify, format_answer, validate_request, UpstreamFault},
    transformer::{extract_candidate_text, GenerateContentRequest},
};
use serde_json::json;

// ============================================================================
// Inbound Benchmarks
// ============================================================================

fn bench_validate_request(c: &mut Criterion) {
    let body = br#"{"message":"  Explique o handshake TCP e a diferenca para o UDP  "}"#;

    c.bench_function("validate_request", |b| {
        b.iter(|| validate_request(black_box(&Method::POST), black_box(body)))
    });
}

fn bench_build_prompt_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_prompt_scaling");

    for size in [16usize, 256, 4096] {
        let message = "a".repeat(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &message, |b, message| {
            b.iter(|| build_prompt(black_box(message)))
        });
    }

    group.finish();
}

fn bench_request_serialization(c: &mut Criterion) {
    let prompt = build_prompt("Como funciona o protocolo OSPF?");

    c.bench_function("generate_content_request_serialize", |b| {
        b.iter(|| {
            let request = GenerateContentRequest::from_prompt(black_box(prompt.clone()));
            serde_json::to_vec(&request)
        })
    });
}

// ============================================================================
// Outbound Benchmarks
// ============================================================================

fn bench_extract_and_format(c: &mut Criterion) {
    let body = json!({
        "candidates": [{
            "content": {
                "parts": [{ "text": "  O OSPF e um protocolo de roteamento link-state que usa o algoritmo de Dijkstra.  " }],
                "role": "model"
            },
            "finishReason": "STOP"
        }]
    });

    c.bench_function("extract_and_format_answer", |b| {
        b.iter(|| extract_candidate_text(black_box(&body)).map(format_answer))
    });

    c.bench_function("format_short_answer", |b| {
        b.iter(|| format_answer(black_box("OK")))
    });
}

fn bench_classify(c: &mut Criterion) {
    let faults = [
        UpstreamFault::Transport {
            timed_out: true,
            detail: "operation timed out".to_string(),
        },
        UpstreamFault::Status {
            status: 400,
            message: Some("API key not valid. Please pass a valid API key.".to_string()),
            reasons: vec!["API_KEY_INVALID".to_string()],
        },
        UpstreamFault::Status {
            status: 503,
            message: Some("The model is overloaded.".to_string()),
            reasons: vec![],
        },
    ];

    c.bench_function("classify_upstream_faults", |b| {
        b.iter(|| {
            for fault in &faults {
                black_box(classify(black_box(fault)));
            }
        })
    });
}

criterion_group!(
    inbound_benches,
    bench_validate_request,
    bench_build_prompt_scaling,
    bench_request_serialization,
);

criterion_group!(outbound_benches, bench_extract_and_format, bench_classify);

criterion_main!(inbound_benches, outbound_benches);
