//! Small example AIRs used by tests and benchmarks.

use crate::field::StarkField;

use super::{Air, RegisterCounts};

/// Two-register Fibonacci-style AIR: `[r0, r1] -> [r0 + r1, r0 + 2*r1]`.
///
/// Both registers are seeded from a single input tuple; the transition is
/// linear, so the composition factor is 1 and any extension factor in
/// `[2, 32]` is admissible.
pub struct FibAir {
    trace_length: usize,
}

impl FibAir {
    pub fn new(trace_length: usize) -> Self {
        Self { trace_length }
    }
}

impl<F: StarkField> Air<F> for FibAir {
    fn register_counts(&self) -> RegisterCounts {
        RegisterCounts {
            state: 2,
            input: 2,
            public: 0,
            secret: 0,
        }
    }

    fn constraint_degrees(&self) -> Vec<usize> {
        vec![1, 1]
    }

    fn steps_per_segment(&self) -> usize {
        self.trace_length
    }

    fn init_state(&self, inputs: &[F]) -> Vec<F> {
        vec![inputs[0], inputs[1]]
    }

    fn transition(&self, state: &[F], _readonly: &[F]) -> Vec<F> {
        vec![state[0] + state[1], state[0] + state[1] + state[1]]
    }

    fn evaluate_constraints(&self, current: &[F], next: &[F], _readonly: &[F], result: &mut [F]) {
        result[0] = next[0] - (current[0] + current[1]);
        result[1] = next[1] - (current[0] + current[1] + current[1]);
    }
}

/// Cubic accumulator with a step counter, one input register and a cyclic
/// boundary mask.
///
/// Per segment the accumulator is seeded with the segment input `i` and
/// advances as `r -> r^3 + i`; the counter resets to zero and increments.
/// Constraints are masked by a public cyclic register that is zero on each
/// segment's last step, so they hold across segment boundaries and the
/// terminator. Declared degrees are 4 and 2, which exercises constraint
/// grouping, transition degree adjustment and boundary degree adjustment.
pub struct CubicAir {
    segment_steps: usize,
}

impl CubicAir {
    pub fn new(segment_steps: usize) -> Self {
        Self { segment_steps }
    }

    /// The mask pattern matching `segment_steps`: all ones with a trailing
    /// zero.
    pub fn mask<F: StarkField>(&self) -> Vec<F> {
        let mut mask = vec![F::ONE; self.segment_steps];
        mask[self.segment_steps - 1] = F::ZERO;
        mask
    }
}

impl<F: StarkField> Air<F> for CubicAir {
    fn register_counts(&self) -> RegisterCounts {
        RegisterCounts {
            state: 2,
            input: 1,
            public: 1,
            secret: 0,
        }
    }

    fn constraint_degrees(&self) -> Vec<usize> {
        vec![4, 2]
    }

    fn steps_per_segment(&self) -> usize {
        self.segment_steps
    }

    fn init_state(&self, inputs: &[F]) -> Vec<F> {
        vec![inputs[0], F::ZERO]
    }

    fn transition(&self, state: &[F], readonly: &[F]) -> Vec<F> {
        let input = readonly[0];
        vec![state[0] * state[0] * state[0] + input, state[1] + F::ONE]
    }

    fn evaluate_constraints(&self, current: &[F], next: &[F], readonly: &[F], result: &mut [F]) {
        let input = readonly[0];
        let mask = readonly[1];
        result[0] = mask * (next[0] - (current[0] * current[0] * current[0] + input));
        result[1] = mask * (next[1] - (current[1] + F::ONE));
    }
}
