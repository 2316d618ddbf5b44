//! Benchmarks for pipeline execution.

use chainflow::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tokio::runtime::Runtime;

fn forwarding_chain(length: usize) -> Pipeline<u64> {
    Pipeline::new((0..length).map(|_| {
        Handler::simple(|value: u64, ctx: ExecutionContext<u64>| async move {
            ctx.forward(value + 1)?;
            anyhow::Ok(())
        })
    }))
}

fn fan_out() -> Pipeline<u64, u64> {
    Pipeline::new([Handler::with_completion(
        |value: u64, ctx: ExecutionContext<u64, u64>, done: Completion<u64, u64>| async move {
            if value > 1 {
                ctx.spawn(value - 1);
                ctx.spawn(value - 2);
                done.done()?;
            } else {
                done.complete(value)?;
            }
            anyhow::Ok(())
        },
    )])
}

fn pipeline_benchmark(c: &mut Criterion) {
    let Ok(runtime) = Runtime::new() else {
        return;
    };

    let mut group = c.benchmark_group("forwarding_chain");
    for length in [1, 10, 100] {
        let pipeline = forwarding_chain(length);
        group.bench_with_input(BenchmarkId::from_parameter(length), &pipeline, |b, p| {
            b.to_async(&runtime).iter(|| async { black_box(p.execute(0).await) });
        });
    }
    group.finish();

    let pipeline = fan_out();
    c.bench_function("fan_out_fibonacci_12", |b| {
        b.to_async(&runtime)
            .iter(|| async { black_box(pipeline.execute(12).await.data.len()) });
    });
}

criterion_group!(benches, pipeline_benchmark);
criterion_main!(benches);
