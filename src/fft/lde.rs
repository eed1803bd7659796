//! Low-degree extension of trace registers.
//!
//! Each register row of the execution trace is interpolated over the trace
//! domain (inverse NTT) and re-evaluated over the enlarged evaluation domain
//! (forward NTT). Rows are independent, so the work is parallelised by row.

use super::{evaluate_poly, interpolate_roots};
use crate::field::StarkField;
use crate::utils;

/// Interpolates every register row over the trace domain, returning one
/// coefficient vector (degree `< T`) per register.
pub fn interpolate_registers<F: StarkField>(rows: &[Vec<F>], trace_root: F) -> Vec<Vec<F>> {
    utils::collect_indexed(rows.len(), |i| interpolate_roots(&rows[i], trace_root))
}

/// Evaluates every register polynomial over the domain generated by
/// `domain_root`, producing the evaluation matrix of shape
/// `(registers, domain_size)`.
pub fn extend_registers<F: StarkField>(
    polynomials: &[Vec<F>],
    domain_root: F,
    domain_size: usize,
) -> Vec<Vec<F>> {
    utils::collect_indexed(polynomials.len(), |i| {
        evaluate_poly(&polynomials[i], domain_root, domain_size)
    })
}

/// Reads the subset of an evaluation row that lies on a nested subdomain.
///
/// With `domain_size = stride * subdomain_size`, position `i` of the
/// subdomain corresponds to position `i * stride` of the enclosing domain.
pub fn subsample<F: StarkField>(evaluations: &[F], stride: usize) -> Vec<F> {
    evaluations.iter().copied().step_by(stride).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{get_power_series, polynomial, F64, StarkField};

    #[test]
    fn extension_agrees_with_trace_on_nested_positions() {
        let trace_root = F64::root_of_unity(3);
        let domain_root = F64::root_of_unity(6);
        let rows = vec![(0..8).map(|i| F64::from_u64(i * i + 1)).collect::<Vec<_>>()];

        let polys = interpolate_registers(&rows, trace_root);
        let extended = extend_registers(&polys, domain_root, 64);

        // the trace domain is the stride-8 subset of the evaluation domain
        let on_trace = subsample(&extended[0], 8);
        assert_eq!(on_trace, rows[0]);
    }

    #[test]
    fn extension_is_the_unique_low_degree_polynomial() {
        let trace_root = F64::root_of_unity(3);
        let domain_root = F64::root_of_unity(5);
        let rows = vec![(0..8).map(|i| F64::from_u64(3 * i + 5)).collect::<Vec<_>>()];

        let polys = interpolate_registers(&rows, trace_root);
        assert!(polys[0].len() <= 8);
        let extended = extend_registers(&polys, domain_root, 32);
        for (k, &x) in get_power_series(domain_root, 32).iter().enumerate() {
            assert_eq!(extended[0][k], polynomial::eval_at(&polys[0], x));
        }
    }
}
