use academic_timetabler::parser::demo::demo_snapshot;
use academic_timetabler::scheduler::drivers::fast;
use academic_timetabler::scheduler::expansion::build_solver_context;
use academic_timetabler::types::GenerationSettings;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn fast_driver_benchmark(c: &mut Criterion) {
    let snapshot = demo_snapshot();
    let settings = GenerationSettings::default();
    let ctx = build_solver_context(&snapshot, &settings).expect("demo snapshot must expand cleanly");

    c.bench_function("fast_driver_demo_snapshot", |b| {
        b.iter(|| {
            let scored = fast::run(black_box(&ctx));
            black_box(scored.result.hard_conflicts)
        })
    });
}

fn expansion_benchmark(c: &mut Criterion) {
    let snapshot = demo_snapshot();
    let settings = GenerationSettings::default();

    c.bench_function("build_solver_context_demo_snapshot", |b| {
        b.iter(|| {
            let ctx = build_solver_context(black_box(&snapshot), black_box(&settings)).unwrap();
            black_box(ctx.request_count())
        })
    });
}

criterion_group!(benches, fast_driver_benchmark, expansion_benchmark);
criterion_main!(benches);
