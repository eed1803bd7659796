use criterion::{criterion_group, criterion_main, BatchSize, Criterion};

use airstark::air::example::FibAir;
use airstark::field::{F64, StarkField};
use airstark::fri::fold_layer;
use airstark::{Assertion, InputTree, ProofOptions, Stark};

fn fib_assertions(trace_length: usize) -> Vec<Assertion<F64>> {
    let mut r0 = F64::ONE;
    let mut r1 = F64::ONE;
    for _ in 0..trace_length - 1 {
        let next0 = r0 + r1;
        let next1 = r0 + r1 + r1;
        r0 = next0;
        r1 = next1;
    }
    vec![
        Assertion::new(0, 0, F64::ONE),
        Assertion::new(1, 0, F64::ONE),
        Assertion::new(1, trace_length - 1, r1),
    ]
}

fn bench_prove(c: &mut Criterion) {
    let mut group = c.benchmark_group("prove");
    for trace_length in [128usize, 1024] {
        let stark: Stark<F64, FibAir> = Stark::new(
            FibAir::new(trace_length),
            ProofOptions::default().with_extension_factor(8),
        )
        .unwrap();
        let assertions = fib_assertions(trace_length);
        let inputs = InputTree::group(vec![InputTree::tuple(vec![F64::ONE, F64::ONE])]);
        group.bench_function(format!("fib_{trace_length}"), |b| {
            b.iter(|| stark.prove(&assertions, &inputs, &[], &[]).unwrap());
        });
    }
    group.finish();
}

fn bench_verify(c: &mut Criterion) {
    let stark: Stark<F64, FibAir> = Stark::new(
        FibAir::new(1024),
        ProofOptions::default().with_extension_factor(8),
    )
    .unwrap();
    let assertions = fib_assertions(1024);
    let inputs = InputTree::group(vec![InputTree::tuple(vec![F64::ONE, F64::ONE])]);
    let proof = stark.prove(&assertions, &inputs, &[], &[]).unwrap();
    c.bench_function("verify/fib_1024", |b| {
        b.iter(|| stark.verify(&assertions, &proof, &[]).unwrap());
    });
}

fn bench_fold(c: &mut Criterion) {
    let root = F64::root_of_unity(14);
    let values: Vec<F64> = (0..1 << 14).map(|i| F64::from_u64(i * 17 + 3)).collect();
    let challenge = F64::from_u64(0x1234_5678);
    c.bench_function("fri/fold_16k", |b| {
        b.iter_batched(
            || values.clone(),
            |values| fold_layer(&values, challenge, root),
            BatchSize::LargeInput,
        );
    });
}

criterion_group!(benches, bench_prove, bench_verify, bench_fold);
criterion_main!(benches);
