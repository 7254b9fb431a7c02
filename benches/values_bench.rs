use case_matrix::core::exclusion::ExclusionList;
use case_matrix::core::values::Values;
use case_matrix::infra::log::MemoryLog;
use case_matrix::{run_group, HarnessConfig, Target, TestCaseDescriptor, TestGroup, Value};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

fn bench_row_iteration(c: &mut Criterion) {
    let left = Values::column(0..300i64);
    let right = Values::column(0..300i64);

    c.bench_function("multiply_iterate_90k_rows", |b| {
        b.iter(|| black_box(left.multiply(&right).iter().count()));
    });

    c.bench_function("pseudo_multiply_iterate", |b| {
        b.iter(|| black_box(left.pseudo_multiply(&Values::column(0..7i64)).iter().count()));
    });
}

fn bench_exclusion_parse(c: &mut Criterion) {
    let directive = (0..200)
        .map(|i| format!("case_{}[{}..{}, {}]", i, i, i + 10, i * 3))
        .collect::<Vec<_>>()
        .join("; ");

    c.bench_function("parse_exclusion_directive", |b| {
        b.iter(|| black_box(ExclusionList::parse(&directive).map(|list| list.len())));
    });
}

fn bench_run_group(c: &mut Criterion) {
    let group = TestGroup::builder("bench")
        .case(
            Target::new("sum", vec![], |_| Ok(Value::Unit)),
            TestCaseDescriptor::marked(),
        )
        .case(
            Target::new("rows", vec![case_matrix::ParamType::Int], |_| Ok(Value::Unit)),
            TestCaseDescriptor::marked().column(Values::column(0..1000i64)),
        )
        .build();
    let config = HarnessConfig {
        exclude: vec!["rows[100..199]".to_string()],
        ..HarnessConfig::default()
    };

    c.bench_function("run_group_1000_rows", |b| {
        b.iter(|| {
            let log = MemoryLog::new();
            black_box(run_group(&group, &config, &log).map(|report| report.results.len()))
        });
    });
}

criterion_group!(benches, bench_row_iteration, bench_exclusion_parse, bench_run_group);
criterion_main!(benches);
