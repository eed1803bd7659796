//! Boundary constraint groups.
//!
//! Assertions sharing a register are combined into one group: the asserted
//! `(g^step, value)` points are Lagrange-interpolated into a single
//! per-register polynomial `I_r`, and the group's quotient is
//! `B_r(x) = (P_r(x) - I_r(x)) / prod(x - g^step)`. This keeps the boundary
//! polynomial count equal to the number of asserted registers rather than
//! the number of assertions.

use crate::field::{batch_inverse, polynomial, StarkField};

use super::context::EvaluationContext;
use super::Assertion;

/// Combined boundary constraints for one state register.
#[derive(Debug, Clone)]
pub struct BoundaryGroup<F: StarkField> {
    register: usize,
    /// Asserted steps, ascending.
    steps: Vec<usize>,
    /// `g^step` for each asserted step.
    step_points: Vec<F>,
    /// Low-to-high coefficients of the interpolant `I_r`.
    interpolant: Vec<F>,
}

impl<F: StarkField> BoundaryGroup<F> {
    pub fn register(&self) -> usize {
        self.register
    }

    pub fn steps(&self) -> &[usize] {
        &self.steps
    }

    /// Evaluates the boundary quotient over the whole evaluation domain
    /// given the register's extended evaluations.
    ///
    /// Divisors vanish only on asserted trace steps; those positions are
    /// excluded from querying, so the zero-maps-to-zero inversion is safe.
    pub fn evaluate_over(&self, register_evaluations: &[F], domain: &[F]) -> Vec<F> {
        let divisors: Vec<F> = domain
            .iter()
            .map(|&x| {
                self.step_points
                    .iter()
                    .fold(F::ONE, |acc, &point| acc * (x - point))
            })
            .collect();
        let inverses = batch_inverse(&divisors);
        register_evaluations
            .iter()
            .zip(domain.iter())
            .zip(inverses.iter())
            .map(|((&value, &x), &inverse)| {
                (value - polynomial::eval_at(&self.interpolant, x)) * inverse
            })
            .collect()
    }

    /// Evaluates the boundary quotient at a single out-of-trace-domain
    /// point, given the register's value there.
    pub fn evaluate_at(&self, x: F, register_value: F) -> F {
        let divisor = self
            .step_points
            .iter()
            .fold(F::ONE, |acc, &point| acc * (x - point));
        let divisor_inv = divisor
            .inv()
            .expect("boundary divisor is nonzero outside the trace domain");
        (register_value - polynomial::eval_at(&self.interpolant, x)) * divisor_inv
    }
}

/// Groups assertions by register (ascending) and builds each group's
/// interpolant. Assertions must already be validated.
pub fn group_assertions<F: StarkField>(
    context: &EvaluationContext<F>,
    assertions: &[Assertion<F>],
) -> Vec<BoundaryGroup<F>> {
    let mut sorted: Vec<&Assertion<F>> = assertions.iter().collect();
    sorted.sort_by_key(|assertion| (assertion.register, assertion.step));

    let g = context.trace_generator();
    let mut groups: Vec<BoundaryGroup<F>> = Vec::new();
    for assertion in sorted {
        let point = g.exp(assertion.step as u128);
        match groups.last_mut() {
            Some(group) if group.register == assertion.register => {
                group.steps.push(assertion.step);
                group.step_points.push(point);
            }
            _ => groups.push(BoundaryGroup {
                register: assertion.register,
                steps: vec![assertion.step],
                step_points: vec![point],
                interpolant: Vec::new(),
            }),
        }
    }

    let mut values_by_group: Vec<Vec<F>> = groups
        .iter()
        .map(|group| vec![F::ZERO; group.steps.len()])
        .collect();
    for assertion in assertions {
        for (group, values) in groups.iter().zip(values_by_group.iter_mut()) {
            if group.register == assertion.register {
                let slot = group
                    .steps
                    .iter()
                    .position(|&step| step == assertion.step)
                    .expect("assertion step present in its group");
                values[slot] = assertion.value;
            }
        }
    }
    for (group, values) in groups.iter_mut().zip(values_by_group.iter()) {
        group.interpolant = polynomial::interpolate(&group.step_points, values);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::F64;

    #[test]
    fn interpolant_passes_through_asserted_points() {
        let ctx = EvaluationContext::<F64>::new(16, 8, vec![1]).unwrap();
        let assertions = vec![
            Assertion::new(0, 0, F64::from_u64(5)),
            Assertion::new(0, 15, F64::from_u64(77)),
            Assertion::new(1, 3, F64::from_u64(9)),
        ];
        let groups = group_assertions(&ctx, &assertions);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].register(), 0);
        assert_eq!(groups[0].steps(), &[0, 15]);

        let g = ctx.trace_generator();
        let interpolant = &groups[0].interpolant;
        assert_eq!(
            polynomial::eval_at(interpolant, g.exp(0)),
            F64::from_u64(5)
        );
        assert_eq!(
            polynomial::eval_at(interpolant, g.exp(15)),
            F64::from_u64(77)
        );
    }

    #[test]
    fn quotient_is_exact_for_satisfied_assertions() {
        // register polynomial P(x) = 3x + 2 asserted at two steps
        let ctx = EvaluationContext::<F64>::new(16, 8, vec![1]).unwrap();
        let g = ctx.trace_generator();
        let p = |x: F64| F64::from_u64(3) * x + F64::from_u64(2);
        let assertions = vec![
            Assertion::new(0, 2, p(g.exp(2))),
            Assertion::new(0, 9, p(g.exp(9))),
        ];
        let groups = group_assertions(&ctx, &assertions);

        // B = (P - I) / prod(x - g^s) must itself be a polynomial: since
        // deg P = 1 and both points match, P == I and B is zero everywhere
        let x = F64::from_u64(987_654_321);
        assert_eq!(groups[0].evaluate_at(x, p(x)), F64::ZERO);
    }
}
