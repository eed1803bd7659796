//! The composition polynomial.
//!
//! Transition constraints are evaluated over the composition domain, degree
//! adjusted, combined under transcript-drawn alpha coefficients, extended to
//! the evaluation domain and divided by the zero polynomial; boundary
//! quotients join under beta coefficients. If and only if every constraint
//! is satisfied, the result agrees with a polynomial of degree at most
//! `composition_degree` on every evaluation-domain position off the trace
//! domain.
//!
//! Pointwise division maps the trace-domain positions to zero (the batch
//! inversion sends zero numerators to zero); those positions carry no
//! low-degree guarantee and are excluded from query derivation end to end.
//!
//! Coefficient order is part of the protocol: one alpha per constraint in
//! declaration order, then one per degree-adjusted copy grouped by effective
//! degree ascending; one beta per asserted register ascending, doubled when
//! the boundary adjustment applies. Prover and verifier must consume
//! coefficients identically or verification diverges.

use std::collections::BTreeMap;

use crate::fft::{evaluate_poly, interpolate_roots};
use crate::field::{batch_inverse, get_power_series, StarkField};
use crate::transcript::{Transcript, TranscriptError, TranscriptLabel};
use crate::utils;

use super::boundary::BoundaryGroup;
use super::context::EvaluationContext;
use super::zero::{TraceDomainPoint, ZeroPolynomial};
use super::Air;

/// Transcript-drawn combination coefficients.
#[derive(Debug, Clone)]
pub struct CompositionCoefficients<F> {
    pub transition: Vec<F>,
    pub boundary: Vec<F>,
}

/// One degree-adjusted constraint copy: `Q_c(x) * x^exponent`.
struct Adjustment {
    constraint: usize,
    coefficient: usize,
    series: usize,
}

struct AdjustmentPlan {
    adjustments: Vec<Adjustment>,
    exponents: Vec<u128>,
}

fn adjustment_plan<F: StarkField>(context: &EvaluationContext<F>) -> AdjustmentPlan {
    let combination_degree = context.combination_degree();
    let trace_length = context.trace_length();

    let mut by_degree: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (constraint, &degree) in context.constraint_degrees().iter().enumerate() {
        let effective = degree * trace_length;
        if effective < combination_degree {
            by_degree.entry(effective).or_default().push(constraint);
        }
    }

    let mut adjustments = Vec::new();
    let mut exponents = Vec::new();
    let mut coefficient = context.constraint_degrees().len();
    for (effective, constraints) in by_degree {
        let series = exponents.len();
        exponents.push((combination_degree - effective) as u128);
        for constraint in constraints {
            adjustments.push(Adjustment {
                constraint,
                coefficient,
                series,
            });
            coefficient += 1;
        }
    }
    AdjustmentPlan {
        adjustments,
        exponents,
    }
}

/// Number of alpha coefficients: original constraints plus adjusted copies.
pub fn transition_coefficient_count<F: StarkField>(context: &EvaluationContext<F>) -> usize {
    context.constraint_degrees().len() + adjustment_plan(context).adjustments.len()
}

/// Exponent of the boundary degree adjustment, when one applies.
fn boundary_adjustment<F: StarkField>(context: &EvaluationContext<F>) -> Option<u128> {
    let composition_degree = context.composition_degree();
    let trace_length = context.trace_length();
    if composition_degree > trace_length {
        Some((composition_degree - trace_length) as u128)
    } else {
        None
    }
}

/// Number of beta coefficients: one per asserted register, doubled when the
/// boundary adjustment applies.
pub fn boundary_coefficient_count<F: StarkField>(
    context: &EvaluationContext<F>,
    boundary_groups: &[BoundaryGroup<F>],
) -> usize {
    let factor = if boundary_adjustment(context).is_some() {
        2
    } else {
        1
    };
    boundary_groups.len() * factor
}

/// Draws alpha then beta coefficients from the transcript.
pub fn draw_coefficients<F: StarkField>(
    context: &EvaluationContext<F>,
    boundary_groups: &[BoundaryGroup<F>],
    transcript: &mut Transcript,
) -> Result<CompositionCoefficients<F>, TranscriptError> {
    let transition = transcript.challenge_felts(
        TranscriptLabel::ConstraintCoefficients,
        transition_coefficient_count(context),
    )?;
    let boundary = transcript.challenge_felts(
        TranscriptLabel::ConstraintCoefficients,
        boundary_coefficient_count(context, boundary_groups),
    )?;
    Ok(CompositionCoefficients {
        transition,
        boundary,
    })
}

/// Evaluates the composition polynomial over the whole evaluation domain.
///
/// `trace_evaluations` holds every register row extended to the evaluation
/// domain; `domain` is the matching power series.
pub fn evaluate_over_domain<F: StarkField, A: Air<F>>(
    context: &EvaluationContext<F>,
    air: &A,
    trace_evaluations: &[Vec<F>],
    domain: &[F],
    boundary_groups: &[BoundaryGroup<F>],
    coefficients: &CompositionCoefficients<F>,
) -> Vec<F> {
    let counts = air.register_counts();
    let constraint_count = context.constraint_degrees().len();
    let size_c = context.composition_domain_size();
    let stride = context.composition_stride();
    let k1 = context.composition_factor();
    let n = context.evaluation_domain_size();

    debug_assert_eq!(
        coefficients.transition.len(),
        transition_coefficient_count(context)
    );
    debug_assert_eq!(
        coefficients.boundary.len(),
        boundary_coefficient_count(context, boundary_groups)
    );

    let plan = adjustment_plan(context);
    let series: Vec<Vec<F>> = plan
        .exponents
        .iter()
        .map(|&exponent| get_power_series(context.composition_generator().exp(exponent), size_c))
        .collect();

    // combined transition quotient numerator over the composition domain
    let qc: Vec<F> = utils::collect_indexed(size_c, |i| {
        let base = i * stride;
        let next_base = ((i + k1) % size_c) * stride;
        let current: Vec<F> = (0..counts.state)
            .map(|r| trace_evaluations[r][base])
            .collect();
        let next: Vec<F> = (0..counts.state)
            .map(|r| trace_evaluations[r][next_base])
            .collect();
        let readonly: Vec<F> = (counts.state..counts.total())
            .map(|r| trace_evaluations[r][base])
            .collect();

        let mut evaluations = vec![F::ZERO; constraint_count];
        air.evaluate_constraints(&current, &next, &readonly, &mut evaluations);

        let mut acc = F::ZERO;
        for (constraint, &value) in evaluations.iter().enumerate() {
            acc = acc + coefficients.transition[constraint] * value;
        }
        for adjustment in &plan.adjustments {
            acc = acc
                + coefficients.transition[adjustment.coefficient]
                    * evaluations[adjustment.constraint]
                    * series[adjustment.series][i];
        }
        acc
    });

    // low-degree extension of QC from the composition to the evaluation
    // domain, then pointwise division by Z
    let qc_coefficients = interpolate_roots(&qc, context.composition_generator());
    let qc_extended = evaluate_poly(&qc_coefficients, context.omega(), n);

    let zero = ZeroPolynomial::new(context);
    let (numerators, denominators) = zero.evaluate_all(domain);
    let numerator_inverses = batch_inverse(&numerators);
    let k2 = context.extension_factor();
    let mut composition = utils::collect_indexed(n, |j| {
        qc_extended[j] * denominators[j] * numerator_inverses[j % k2]
    });

    let boundary_series =
        boundary_adjustment(context).map(|exponent| get_power_series(context.omega().exp(exponent), n));
    for (group_index, group) in boundary_groups.iter().enumerate() {
        let quotient = group.evaluate_over(&trace_evaluations[group.register()], domain);
        let beta = coefficients.boundary[group_index];
        for (slot, &value) in composition.iter_mut().zip(quotient.iter()) {
            *slot = *slot + beta * value;
        }
        if let Some(series) = &boundary_series {
            let beta_adjusted = coefficients.boundary[boundary_groups.len() + group_index];
            for ((slot, &value), &factor) in composition
                .iter_mut()
                .zip(quotient.iter())
                .zip(series.iter())
            {
                *slot = *slot + beta_adjusted * value * factor;
            }
        }
    }
    composition
}

/// Evaluates the composition polynomial at a single point, the verifier's
/// scalar path.
///
/// `current` and `next` are state-register rows at `x` and `g*x`;
/// `readonly` is the full readonly row at `x`. Fails on trace-domain
/// points, which query derivation never produces.
#[allow(clippy::too_many_arguments)]
pub fn evaluate_at<F: StarkField, A: Air<F>>(
    context: &EvaluationContext<F>,
    air: &A,
    x: F,
    current: &[F],
    next: &[F],
    readonly: &[F],
    boundary_groups: &[BoundaryGroup<F>],
    coefficients: &CompositionCoefficients<F>,
) -> Result<F, TraceDomainPoint> {
    let constraint_count = context.constraint_degrees().len();
    let mut evaluations = vec![F::ZERO; constraint_count];
    air.evaluate_constraints(current, next, readonly, &mut evaluations);

    let plan = adjustment_plan(context);
    let mut qc = F::ZERO;
    for (constraint, &value) in evaluations.iter().enumerate() {
        qc = qc + coefficients.transition[constraint] * value;
    }
    for adjustment in &plan.adjustments {
        qc = qc
            + coefficients.transition[adjustment.coefficient]
                * evaluations[adjustment.constraint]
                * x.exp(plan.exponents[adjustment.series]);
    }

    let zero = ZeroPolynomial::new(context);
    let z = zero.evaluate_at(x)?;
    let mut result = qc * z.inv().expect("Z is nonzero off the trace domain");

    let adjustment_exponent = boundary_adjustment(context);
    for (group_index, group) in boundary_groups.iter().enumerate() {
        let quotient = group.evaluate_at(x, current[group.register()]);
        result = result + coefficients.boundary[group_index] * quotient;
        if let Some(exponent) = adjustment_exponent {
            result = result
                + coefficients.boundary[boundary_groups.len() + group_index]
                    * quotient
                    * x.exp(exponent);
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::air::boundary::group_assertions;
    use crate::air::example::FibAir;
    use crate::air::trace::build_trace;
    use crate::air::{Assertion, InputTree};
    use crate::fft::lde::{extend_registers, interpolate_registers};
    use crate::field::{polynomial, F64};
    use crate::hash::HashAlgorithm;

    struct Fixture {
        context: EvaluationContext<F64>,
        air: FibAir,
        trace_evaluations: Vec<Vec<F64>>,
        domain: Vec<F64>,
        boundary_groups: Vec<BoundaryGroup<F64>>,
        coefficients: CompositionCoefficients<F64>,
    }

    fn fixture() -> Fixture {
        let air = FibAir::new(8);
        let context = EvaluationContext::<F64>::new(8, 8, vec![1, 1]).unwrap();
        let inputs = InputTree::group(vec![InputTree::tuple(vec![F64::ONE, F64::ONE])]);
        let (trace, _) = build_trace(&air, &inputs, &[], &[]).unwrap();

        let polys = interpolate_registers(trace.registers(), context.trace_generator());
        let trace_evaluations = extend_registers(
            &polys,
            context.omega(),
            context.evaluation_domain_size(),
        );
        let domain = context.build_evaluation_domain();

        let assertions = vec![
            Assertion::new(0, 0, F64::ONE),
            Assertion::new(1, 0, F64::ONE),
            Assertion::new(1, 7, trace.get(1, 7)),
        ];
        let boundary_groups = group_assertions(&context, &assertions);

        let mut transcript = Transcript::new(HashAlgorithm::Blake2s256, b"composition-test");
        transcript
            .absorb(TranscriptLabel::PublicInputs, b"fixture")
            .unwrap();
        transcript
            .absorb_digest(TranscriptLabel::TraceRoot, &[3u8; 32])
            .unwrap();
        let coefficients = draw_coefficients(&context, &boundary_groups, &mut transcript).unwrap();

        Fixture {
            context,
            air,
            trace_evaluations,
            domain,
            boundary_groups,
            coefficients,
        }
    }

    #[test]
    fn scalar_path_matches_domain_evaluation() {
        let f = fixture();
        let composition = evaluate_over_domain(
            &f.context,
            &f.air,
            &f.trace_evaluations,
            &f.domain,
            &f.boundary_groups,
            &f.coefficients,
        );

        let k2 = f.context.extension_factor();
        let n = f.context.evaluation_domain_size();
        for position in [1usize, 5, 13, 27, 50, 63] {
            assert_ne!(position % k2, 0);
            let next_position = (position + k2) % n;
            let current: Vec<F64> = (0..2)
                .map(|r| f.trace_evaluations[r][position])
                .collect();
            let next: Vec<F64> = (0..2)
                .map(|r| f.trace_evaluations[r][next_position])
                .collect();
            let readonly: Vec<F64> = (2..4)
                .map(|r| f.trace_evaluations[r][position])
                .collect();
            let scalar = evaluate_at(
                &f.context,
                &f.air,
                f.domain[position],
                &current,
                &next,
                &readonly,
                &f.boundary_groups,
                &f.coefficients,
            )
            .unwrap();
            assert_eq!(scalar, composition[position]);
        }
    }

    #[test]
    fn composition_is_low_degree_off_the_trace_domain() {
        let f = fixture();
        let composition = evaluate_over_domain(
            &f.context,
            &f.air,
            &f.trace_evaluations,
            &f.domain,
            &f.boundary_groups,
            &f.coefficients,
        );

        let k2 = f.context.extension_factor();
        let bound = f.context.composition_degree();
        let clean: Vec<usize> = (0..composition.len())
            .filter(|position| position % k2 != 0)
            .collect();
        let sample: Vec<usize> = clean.iter().copied().take(bound + 1).collect();
        let xs: Vec<F64> = sample.iter().map(|&p| f.domain[p]).collect();
        let ys: Vec<F64> = sample.iter().map(|&p| composition[p]).collect();
        let interpolant = polynomial::interpolate(&xs, &ys);
        for &position in &clean {
            assert_eq!(
                polynomial::eval_at(&interpolant, f.domain[position]),
                composition[position],
                "composition deviates from a degree-{bound} polynomial at {position}",
            );
        }
    }
}
