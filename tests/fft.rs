//! NTT and low-degree extension properties.

use airstark::fft::{evaluate_poly, interpolate_roots, ntt};
use airstark::fft::lde::{extend_registers, interpolate_registers, subsample};
use airstark::field::{get_power_series, polynomial, F128, F64, StarkField};
use proptest::prelude::*;

#[test]
fn interpolation_inverts_evaluation() {
    let root = F64::root_of_unity(5);
    let coefficients: Vec<F64> = (0..32).map(|i| F64::from_u64(i * 31 + 11)).collect();
    let values = evaluate_poly(&coefficients, root, 32);
    assert_eq!(interpolate_roots(&values, root), coefficients);
}

#[test]
fn transform_is_exact_for_the_wide_field() {
    let root = F128::root_of_unity(4);
    let coefficients: Vec<F128> =
        (0..16).map(|i| F128::from_u128(u128::MAX / (i + 2))).collect();
    let values = evaluate_poly(&coefficients, root, 16);
    for (k, &x) in get_power_series(root, 16).iter().enumerate() {
        assert_eq!(values[k], polynomial::eval_at(&coefficients, x));
    }
}

#[test]
fn extension_restricts_to_the_trace() {
    let trace_root = F64::root_of_unity(4);
    let rows: Vec<Vec<F64>> = (0..3)
        .map(|r| (0..16).map(|i| F64::from_u64((r * 1000 + i * i) as u64)).collect())
        .collect();
    let polynomials = interpolate_registers(&rows, trace_root);
    let extended = extend_registers(&polynomials, F64::root_of_unity(7), 128);
    for (row, original) in extended.iter().zip(rows.iter()) {
        assert_eq!(&subsample(row, 8), original);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn roundtrip_holds_for_arbitrary_values(seed in any::<u64>()) {
        let root = F64::root_of_unity(6);
        let mut values: Vec<F64> = (0..64)
            .map(|i| F64::from_u64(seed.wrapping_mul(i * 2 + 1).wrapping_add(i)))
            .collect();
        let original = values.clone();
        ntt(&mut values, root);
        let root_inv = root.inv().unwrap();
        ntt(&mut values, root_inv);
        let n_inv = F64::from_u64(64).inv().unwrap();
        for value in values.iter_mut() {
            *value = *value * n_inv;
        }
        prop_assert_eq!(values, original);
    }
}
