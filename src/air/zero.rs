//! The zero polynomial `Z(x) = (x^T - 1) / (x - g^(T-1))`.
//!
//! `Z` vanishes exactly on the trace-domain steps `0..T-1`; dividing the
//! combined transition quotient by it removes the roots the constraints are
//! required to have. On the evaluation domain the numerator `x^T - 1` takes
//! only `k2` distinct values (one per coset of the trace domain), so the
//! numerators are stored once and indexed by `position mod k2`.

use core::fmt;

use crate::field::StarkField;

use super::context::EvaluationContext;

/// Failure raised when `Z` is evaluated on one of its zeros.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceDomainPoint;

impl fmt::Display for TraceDomainPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "zero polynomial evaluated on a trace-domain point")
    }
}

impl std::error::Error for TraceDomainPoint {}

pub struct ZeroPolynomial<F: StarkField> {
    trace_length: usize,
    extension_factor: usize,
    /// `(omega^T)^m - 1` for `m` in `0..k2`; entry 0 is zero.
    coset_numerators: Vec<F>,
    /// `g^(T-1)`, the unconstrained terminator step.
    last_step_x: F,
}

impl<F: StarkField> ZeroPolynomial<F> {
    pub fn new(context: &EvaluationContext<F>) -> Self {
        let trace_length = context.trace_length();
        let extension_factor = context.extension_factor();
        let omega_t = context.omega().exp(trace_length as u128);
        let mut coset_numerators = Vec::with_capacity(extension_factor);
        let mut acc = F::ONE;
        for _ in 0..extension_factor {
            coset_numerators.push(acc - F::ONE);
            acc = acc * omega_t;
        }
        let last_step_x = context.trace_generator().exp((trace_length - 1) as u128);
        Self {
            trace_length,
            extension_factor,
            coset_numerators,
            last_step_x,
        }
    }

    /// Numerator `x^T - 1` at an evaluation-domain position.
    pub fn numerator_at(&self, position: usize) -> F {
        self.coset_numerators[position % self.extension_factor]
    }

    /// Evaluates numerators and denominators over the whole evaluation
    /// domain: `k2` numerator values plus one denominator per position.
    pub fn evaluate_all(&self, domain: &[F]) -> (Vec<F>, Vec<F>) {
        let denominators = domain.iter().map(|&x| x - self.last_step_x).collect();
        (self.coset_numerators.clone(), denominators)
    }

    /// Evaluates `Z` at a single out-of-trace-domain point.
    pub fn evaluate_at(&self, x: F) -> Result<F, TraceDomainPoint> {
        let numerator = x.exp(self.trace_length as u128) - F::ONE;
        if numerator == F::ZERO {
            return Err(TraceDomainPoint);
        }
        let denominator_inv = (x - self.last_step_x)
            .inv()
            .expect("denominator is nonzero outside the trace domain");
        Ok(numerator * denominator_inv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{polynomial, F64};

    #[test]
    fn matches_direct_product_form() {
        let ctx = EvaluationContext::<F64>::new(8, 8, vec![1]).unwrap();
        let zero = ZeroPolynomial::new(&ctx);
        let g = ctx.trace_generator();

        // Z(x) = prod over steps 0..T-1 of (x - g^step)
        let x = F64::from_u64(123_456_789);
        let mut expected = F64::ONE;
        for step in 0..7u64 {
            expected = expected * (x - g.exp(step as u128));
        }
        assert_eq!(zero.evaluate_at(x).unwrap(), expected);
    }

    #[test]
    fn rejects_trace_domain_points() {
        let ctx = EvaluationContext::<F64>::new(8, 8, vec![1]).unwrap();
        let zero = ZeroPolynomial::new(&ctx);
        let g = ctx.trace_generator();
        assert_eq!(zero.evaluate_at(g.exp(3)), Err(TraceDomainPoint));
    }

    #[test]
    fn numerators_cycle_per_coset() {
        let ctx = EvaluationContext::<F64>::new(16, 8, vec![1]).unwrap();
        let zero = ZeroPolynomial::new(&ctx);
        let domain = ctx.build_evaluation_domain();
        for (position, &x) in domain.iter().enumerate() {
            let direct = polynomial::eval_at(
                &{
                    // x^T - 1 as coefficients
                    let mut coefficients = vec![F64::ZERO; 17];
                    coefficients[0] = -F64::ONE;
                    coefficients[16] = F64::ONE;
                    coefficients
                },
                x,
            );
            assert_eq!(zero.numerator_at(position), direct);
        }
    }
}
