//! Query benchmarks.
//!
//! Measures parse + resolve time for scope-chain and invocation queries
//! on generated sources of increasing size, with the cursor near the end
//! of the file (the worst case for the pruned walk).

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use phpcursor::invocation::{ScanOptions, resolve_invocation};
use phpcursor::parser::parse_php;
use phpcursor::query::QueryEngine;
use phpcursor::scope_chain::resolve_scope_chain;

/// A class with `methods` methods, each with a few statements and a
/// fluent call chain.
fn generate_class(methods: usize) -> String {
    let mut src = String::from("<?php\nnamespace App;\n\nclass Service {\n");
    for i in 0..methods {
        src.push_str(&format!(
            "    public function method{i}($a, $b = []) {{\n        \
             if ($a > {i}) {{\n            \
             $this->repository->query()->where('id', $a)->limit({i});\n        \
             }}\n        \
             foreach ($b as $item) {{\n            \
             echo strlen($item);\n        \
             }}\n        \
             return array_map(fn($x) => $x * 2, $b);\n    \
             }}\n\n"
        ));
    }
    src.push_str("}\n");
    src
}

fn last_offset_of(src: &str, needle: &str) -> u32 {
    src.rfind(needle).map(|i| i as u32).unwrap_or(0)
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for methods in [10, 100, 500] {
        let src = generate_class(methods);
        group.bench_with_input(BenchmarkId::from_parameter(methods), &src, |b, src| {
            b.iter(|| parse_php(black_box(src)))
        });
    }
    group.finish();
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");
    for methods in [10, 100, 500] {
        let src = generate_class(methods);
        let tree = parse_php(&src);
        let offset = last_offset_of(&src, "'id'") + 2;

        group.bench_with_input(
            BenchmarkId::new("scope_chain", methods),
            &offset,
            |b, &offset| b.iter(|| resolve_scope_chain(tree.roots(), black_box(offset))),
        );
        group.bench_with_input(
            BenchmarkId::new("invocation", methods),
            &offset,
            |b, &offset| {
                b.iter(|| {
                    resolve_invocation(tree.roots(), &src, black_box(offset), ScanOptions::default())
                })
            },
        );
    }
    group.finish();
}

fn bench_end_to_end(c: &mut Criterion) {
    let src = generate_class(100);
    let offset = last_offset_of(&src, "strlen(") + 7;
    let engine = QueryEngine::default();

    c.bench_function("query/invocation_100_methods", |b| {
        b.iter(|| engine.invocation(black_box(&src), offset))
    });
    c.bench_function("query/scope_chain_100_methods", |b| {
        b.iter(|| engine.scope_chain(black_box(&src), offset, true))
    });
}

criterion_group!(benches, bench_parse, bench_resolve, bench_end_to_end);
criterion_main!(benches);
