//! Wire-format round-trips and tamper rejection.

use airstark::air::example::FibAir;
use airstark::field::F32;
use airstark::{Assertion, InputTree, ProofOptions, Proof, Stark, StarkField};
use proptest::prelude::*;

fn stark() -> Stark<F32, FibAir> {
    Stark::new(
        FibAir::new(64),
        ProofOptions::default().with_extension_factor(8),
    )
    .unwrap()
}

fn assertions() -> Vec<Assertion<F32>> {
    vec![
        Assertion::new(0, 0, F32::from_u64(1)),
        Assertion::new(1, 0, F32::from_u64(1)),
        Assertion::new(1, 63, F32::from_u64(1_783_540_607)),
    ]
}

fn proof() -> (Stark<F32, FibAir>, Proof<F32>) {
    let stark = stark();
    let inputs = InputTree::group(vec![InputTree::tuple(vec![
        F32::from_u64(1),
        F32::from_u64(1),
    ])]);
    let proof = stark.prove(&assertions(), &inputs, &[], &[]).unwrap();
    (stark, proof)
}

#[test]
fn roundtrip_is_byte_identical() {
    let (stark, original) = proof();
    let bytes = stark.serialize(&original).unwrap();
    let parsed = stark.parse(&bytes).unwrap();
    assert_eq!(parsed, original);
    assert_eq!(stark.serialize(&parsed).unwrap(), bytes);
}

#[test]
fn size_of_matches_serialized_length() {
    let (stark, proof) = proof();
    let bytes = stark.serialize(&proof).unwrap();
    assert_eq!(stark.size_of(&proof), bytes.len());
}

#[test]
fn truncated_buffers_are_rejected() {
    let (stark, proof) = proof();
    let bytes = stark.serialize(&proof).unwrap();
    for cut in [0, 1, 32, bytes.len() / 2, bytes.len() - 1] {
        assert!(stark.parse(&bytes[..cut]).is_err(), "cut at {cut}");
    }
}

#[test]
fn trailing_bytes_are_rejected() {
    let (stark, proof) = proof();
    let mut bytes = stark.serialize(&proof).unwrap();
    bytes.push(0);
    assert!(stark.parse(&bytes).is_err());
}

#[test]
fn parsed_proof_verifies() {
    let (stark, proof) = proof();
    let bytes = stark.serialize(&proof).unwrap();
    let parsed = stark.parse(&bytes).unwrap();
    stark.verify(&assertions(), &parsed, &[]).unwrap();
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    // statistical soundness: flipping any single bit of the wire encoding
    // must make the proof unusable
    #[test]
    fn bit_flips_are_rejected(index in 0usize..8192, bit in 0u8..8) {
        let (stark, proof) = proof();
        let mut bytes = stark.serialize(&proof).unwrap();
        let index = index % bytes.len();
        bytes[index] ^= 1 << bit;
        let rejected = match stark.parse(&bytes) {
            Err(_) => true,
            Ok(parsed) => stark.verify(&assertions(), &parsed, &[]).is_err(),
        };
        prop_assert!(rejected, "flip at byte {index} survived");
    }
}
