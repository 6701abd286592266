//! Benchmarks for building and rendering conversations.
//!
//! Run with: cargo bench
//!
//! Inputs are synthetic chat messages mixing prose, code, lists and tables.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use unchat::builder::{build_batch, build_html, BuildConfig};
use unchat::{Conversation, Message, Metadata, OutputFormat, RenderOptions};

/// One assistant-style message fragment.
fn message_html(index: usize) -> String {
    format!(
        "<div class=\"markdown\">\
         <h2>Step {index}</h2>\
         <p>Here is <strong>part {index}</strong> of the answer with <code>inline</code> code \
         and a <a href=\"https://example.com/{index}\">link</a>.</p>\
         <pre><code class=\"language-rust\">fn step_{index}() -> usize {{ {index} }}</code></pre>\
         <ul><li>first</li><li>second<ul><li>nested</li></ul></li></ul>\
         <table><tr><th>Key</th><th>Value</th></tr><tr><td>n</td><td>{index}</td></tr></table>\
         <button>Copy</button>\
         </div>"
    )
}

fn create_conversation(message_count: usize) -> Conversation {
    let config = BuildConfig::default();
    let mut conv = Conversation::new(Metadata::new("Benchmark", "ChatGPT"));
    for i in 0..message_count {
        let nodes = build_html(&message_html(i), &config);
        conv.add_message(if i % 2 == 0 {
            Message::user(nodes)
        } else {
            Message::assistant(nodes)
        });
    }
    conv
}

/// Benchmark HTML fragment to node building.
fn bench_build(c: &mut Criterion) {
    let config = BuildConfig::default();
    let html = message_html(1);

    c.bench_function("build_message", |b| {
        b.iter(|| build_html(black_box(&html), &config));
    });
}

/// Benchmark batch building, sequential against rayon.
fn bench_build_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_batch");
    let fragments: Vec<String> = (0..64).map(message_html).collect();

    for parallel in [false, true] {
        let config = BuildConfig::default().with_parallel(parallel);
        let name = if parallel { "parallel" } else { "sequential" };
        group.bench_function(name, |b| {
            b.iter(|| build_batch(black_box(&fragments), &config));
        });
    }

    group.finish();
}

/// Benchmark rendering at various conversation sizes.
fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    let options = RenderOptions::new().with_frontmatter(true);

    for message_count in [10, 100, 500].iter() {
        let conv = create_conversation(*message_count);

        for format in [OutputFormat::Markdown, OutputFormat::Json, OutputFormat::Text] {
            group.bench_function(format!("{}_{}_messages", format, message_count), |b| {
                b.iter(|| unchat::render::render(black_box(&conv), format, &options));
            });
        }
    }

    group.finish();
}

/// Benchmark the one-call conversion.
fn bench_html_to_markdown(c: &mut Criterion) {
    let html: String = (0..20).map(message_html).collect();

    c.bench_function("html_to_markdown", |b| {
        b.iter(|| unchat::html_to_markdown(black_box(&html)));
    });
}

criterion_group!(
    benches,
    bench_build,
    bench_build_batch,
    bench_render,
    bench_html_to_markdown,
);
criterion_main!(benches);
