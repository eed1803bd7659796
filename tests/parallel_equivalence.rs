//! Parallel and serial execution must produce bit-identical proofs.

use airstark::air::example::FibAir;
use airstark::field::F32;
use airstark::utils::set_parallelism;
use airstark::{Assertion, InputTree, ProofOptions, Stark, StarkField};

#[test]
fn serial_and_parallel_proofs_are_identical() {
    let stark: Stark<F32, FibAir> = Stark::new(
        FibAir::new(64),
        ProofOptions::default().with_extension_factor(8),
    )
    .unwrap();
    let assertions = vec![
        Assertion::new(0, 0, F32::from_u64(1)),
        Assertion::new(1, 0, F32::from_u64(1)),
        Assertion::new(1, 63, F32::from_u64(1_783_540_607)),
    ];
    let inputs = InputTree::group(vec![InputTree::tuple(vec![
        F32::from_u64(1),
        F32::from_u64(1),
    ])]);

    let parallel = {
        let _guard = set_parallelism(true);
        stark.prove(&assertions, &inputs, &[], &[]).unwrap()
    };
    let serial = {
        let _guard = set_parallelism(false);
        stark.prove(&assertions, &inputs, &[], &[]).unwrap()
    };

    assert_eq!(parallel, serial);
    assert_eq!(
        stark.serialize(&parallel).unwrap(),
        stark.serialize(&serial).unwrap()
    );
}
