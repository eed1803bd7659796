//! Radix-2 number-theoretic transforms.
//!
//! Transforms are exact in the field: interpolation over a roots-of-unity
//! domain followed by evaluation reproduces the input bit for bit, which the
//! low-degree extension and composition pipeline depend on. Inputs and
//! outputs are in natural order; bit reversal happens internally.

use crate::field::StarkField;

pub mod lde;

/// Maximum supported domain size expressed as `log2(n)`.
pub const MAX_LOG2_DOMAIN_SIZE: u32 = 32;

/// In-place forward transform: `values[k] = sum_j values[j] * root^(j*k)`.
///
/// `root` must have exact multiplicative order `values.len()`.
pub fn ntt<F: StarkField>(values: &mut [F], root: F) {
    let n = values.len();
    assert!(n.is_power_of_two(), "domain size must be a power of two");
    debug_assert_eq!(root.exp(n as u128), F::ONE, "root order mismatch");
    debug_assert_ne!(root.exp((n / 2) as u128), F::ONE, "root order mismatch");

    bit_reverse_permute(values);

    let mut len = 2;
    while len <= n {
        let step_root = root.exp((n / len) as u128);
        let half = len / 2;
        for start in (0..n).step_by(len) {
            let mut w = F::ONE;
            for k in 0..half {
                let u = values[start + k];
                let v = values[start + k + half] * w;
                values[start + k] = u + v;
                values[start + k + half] = u - v;
                w = w * step_root;
            }
        }
        len <<= 1;
    }
}

/// In-place inverse transform; the left inverse of [`ntt`] with the same
/// root.
pub fn inverse_ntt<F: StarkField>(values: &mut [F], root: F) {
    let n = values.len();
    let root_inv = root.inv().expect("transform root is nonzero");
    ntt(values, root_inv);
    let n_inv = F::from_u64(n as u64)
        .inv()
        .expect("domain size is nonzero in the field");
    for value in values.iter_mut() {
        *value = *value * n_inv;
    }
}

/// Interpolates evaluations over the domain generated by `root` into
/// low-to-high polynomial coefficients.
pub fn interpolate_roots<F: StarkField>(values: &[F], root: F) -> Vec<F> {
    let mut coefficients = values.to_vec();
    inverse_ntt(&mut coefficients, root);
    coefficients
}

/// Evaluates a polynomial of degree `< domain_size` over the domain
/// generated by `root`, zero-padding the coefficients.
pub fn evaluate_poly<F: StarkField>(coefficients: &[F], root: F, domain_size: usize) -> Vec<F> {
    assert!(
        coefficients.len() <= domain_size,
        "polynomial does not fit the target domain",
    );
    let mut values = Vec::with_capacity(domain_size);
    values.extend_from_slice(coefficients);
    values.resize(domain_size, F::ZERO);
    ntt(&mut values, root);
    values
}

fn bit_reverse_permute<F: StarkField>(values: &mut [F]) {
    let n = values.len();
    let shift = usize::BITS - n.trailing_zeros();
    for i in 0..n {
        let j = i.reverse_bits().wrapping_shr(shift);
        if i < j {
            values.swap(i, j);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{get_power_series, F64, StarkField};

    #[test]
    fn transform_matches_naive_evaluation() {
        let root = F64::root_of_unity(3);
        let coefficients: Vec<F64> = (1..=8).map(F64::from_u64).collect();
        let values = evaluate_poly(&coefficients, root, 8);
        for (k, &x) in get_power_series(root, 8).iter().enumerate() {
            let expected = crate::field::polynomial::eval_at(&coefficients, x);
            assert_eq!(values[k], expected);
        }
    }

    #[test]
    fn inverse_roundtrips() {
        let root = F64::root_of_unity(4);
        let original: Vec<F64> = (0..16).map(|i| F64::from_u64(i * 19 + 7)).collect();
        let mut values = original.clone();
        ntt(&mut values, root);
        inverse_ntt(&mut values, root);
        assert_eq!(values, original);
    }
}
