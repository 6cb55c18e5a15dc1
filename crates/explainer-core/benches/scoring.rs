use criterion::{Criterion, criterion_group, criterion_main};
use explainer_core::model::FunctionRecord;
use explainer_core::scoring::select_top_n;
use std::hint::black_box;

fn synthetic_functions(count: u32) -> Vec<FunctionRecord> {
    (0..count)
        .map(|i| FunctionRecord {
            name: format!("func_{}", i),
            code: format!("def func_{}(): pass", i),
            docstring: if i % 3 == 0 { "doc".to_string() } else { String::new() },
            fan_in: (i * 7) % 13,
            fan_out: (i * 5) % 11,
            is_entry_point: i % 50 == 0,
        })
        .collect()
}

fn bench_select_top_n(c: &mut Criterion) {
    let functions = synthetic_functions(5_000);
    c.bench_function("select_top_n_5000", |b| {
        b.iter(|| select_top_n(black_box(&functions), black_box(10)))
    });
}

criterion_group!(benches, bench_select_top_n);
criterion_main!(benches);
