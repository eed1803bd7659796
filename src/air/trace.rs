//! Execution trace construction.
//!
//! The builder unrolls the input tree into segments, materialises the
//! readonly registers (segment inputs held constant, cyclic public and
//! secret patterns), then runs `init_state` / `transition` per segment. The
//! resulting matrix has one row per register and one column per step.
//!
//! The builder also records the trace shape (input-tree node counts per
//! nesting depth); it travels in the proof so the verifier can recover the
//! trace length.

use core::fmt;

use crate::field::StarkField;

use super::{flatten_inputs, Air, InputError, InputTree, RegisterCounts};

/// Input-tree node counts per nesting depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceShape(pub Vec<u32>);

impl TraceShape {
    /// Number of leaf segments, the last-depth count.
    pub fn total_segments(&self) -> usize {
        *self.0.last().unwrap_or(&0) as usize
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }
}

/// A transition or terminal-state constraint violated by the built trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnsatisfiedConstraint {
    pub constraint: usize,
    pub step: usize,
}

impl fmt::Display for UnsatisfiedConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "transition constraint {} violated at step {}",
            self.constraint, self.step
        )
    }
}

impl std::error::Error for UnsatisfiedConstraint {}

/// Execution trace matrix of shape `(registers, steps)`.
///
/// Row order: state registers, then input, public and secret readonly
/// registers.
#[derive(Debug, Clone)]
pub struct TraceTable<F: StarkField> {
    counts: RegisterCounts,
    length: usize,
    registers: Vec<Vec<F>>,
}

impl<F: StarkField> TraceTable<F> {
    pub fn counts(&self) -> &RegisterCounts {
        &self.counts
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn registers(&self) -> &[Vec<F>] {
        &self.registers
    }

    pub fn get(&self, register: usize, step: usize) -> F {
        self.registers[register][step]
    }

    /// State register values at `step`.
    pub fn state_row(&self, step: usize) -> Vec<F> {
        (0..self.counts.state)
            .map(|register| self.registers[register][step])
            .collect()
    }

    /// Readonly register values at `step`, in input/public/secret order.
    pub fn readonly_row(&self, step: usize) -> Vec<F> {
        (self.counts.state..self.counts.total())
            .map(|register| self.registers[register][step])
            .collect()
    }
}

/// Runs the AIR over the input streams and auxiliary patterns.
pub fn build_trace<F: StarkField, A: Air<F>>(
    air: &A,
    inputs: &InputTree<F>,
    public_aux: &[Vec<F>],
    secret_aux: &[Vec<F>],
) -> Result<(TraceTable<F>, TraceShape), InputError> {
    let counts = air.register_counts();
    let (segments, shape) = flatten_inputs(air.loop_depth(), counts.input, inputs)?;
    let steps = air.steps_per_segment();
    let length = steps * segments.len();

    validate_aux_patterns(public_aux, counts.public, length)?;
    validate_aux_patterns(secret_aux, counts.secret, length)?;

    let mut registers = vec![vec![F::ZERO; length]; counts.total()];

    // readonly registers first, so the state loop can read them
    for (j, segment) in segments.iter().enumerate() {
        let start = j * steps;
        for (r, &value) in segment.iter().enumerate() {
            registers[counts.state + r][start..start + steps].fill(value);
        }
    }
    for (r, pattern) in public_aux.iter().enumerate() {
        let row = &mut registers[counts.state + counts.input + r];
        for (step, slot) in row.iter_mut().enumerate() {
            *slot = pattern[step % pattern.len()];
        }
    }
    for (r, pattern) in secret_aux.iter().enumerate() {
        let row = &mut registers[counts.state + counts.input + counts.public + r];
        for (step, slot) in row.iter_mut().enumerate() {
            *slot = pattern[step % pattern.len()];
        }
    }

    for (j, segment) in segments.iter().enumerate() {
        let start = j * steps;
        let mut state = air.init_state(segment);
        if state.len() != counts.state {
            return Err(InputError::InitWidthMismatch {
                expected: counts.state,
                got: state.len(),
            });
        }
        for offset in 0..steps {
            let step = start + offset;
            for (r, &value) in state.iter().enumerate() {
                registers[r][step] = value;
            }
            if offset + 1 < steps {
                let readonly: Vec<F> = (counts.state..counts.total())
                    .map(|register| registers[register][step])
                    .collect();
                let next = air.transition(&state, &readonly);
                if next.len() != counts.state {
                    return Err(InputError::TransitionWidthMismatch {
                        expected: counts.state,
                        got: next.len(),
                    });
                }
                state = next;
            }
        }
    }

    let trace = TraceTable {
        counts,
        length,
        registers,
    };
    Ok((trace, TraceShape(shape)))
}

pub(crate) fn validate_aux_patterns<F: StarkField>(
    patterns: &[Vec<F>],
    expected: usize,
    trace_length: usize,
) -> Result<(), InputError> {
    if patterns.len() != expected {
        return Err(InputError::AuxiliaryCountMismatch {
            expected,
            got: patterns.len(),
        });
    }
    for pattern in patterns {
        if pattern.is_empty() || !pattern.len().is_power_of_two() || pattern.len() > trace_length {
            return Err(InputError::AuxiliaryPatternLength {
                got: pattern.len(),
            });
        }
    }
    Ok(())
}

/// Checks that every transition constraint holds at steps `[0, T-1)`; the
/// terminator step is unconstrained.
pub fn validate_transitions<F: StarkField, A: Air<F>>(
    air: &A,
    trace: &TraceTable<F>,
) -> Result<(), UnsatisfiedConstraint> {
    let constraint_count = air.constraint_degrees().len();
    let mut result = vec![F::ZERO; constraint_count];
    for step in 0..trace.length() - 1 {
        let current = trace.state_row(step);
        let next = trace.state_row(step + 1);
        let readonly = trace.readonly_row(step);
        air.evaluate_constraints(&current, &next, &readonly, &mut result);
        for (constraint, &value) in result.iter().enumerate() {
            if value != F::ZERO {
                return Err(UnsatisfiedConstraint { constraint, step });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::air::example::FibAir;
    use crate::field::F64;

    fn fib_inputs() -> InputTree<F64> {
        InputTree::group(vec![InputTree::tuple(vec![F64::ONE, F64::ONE])])
    }

    #[test]
    fn builder_unrolls_and_satisfies_transitions() {
        let air = FibAir::new(16);
        let (trace, shape) = build_trace(&air, &fib_inputs(), &[], &[]).unwrap();
        assert_eq!(trace.length(), 16);
        assert_eq!(shape, TraceShape(vec![1]));
        assert_eq!(trace.get(0, 0), F64::ONE);
        assert_eq!(trace.get(1, 1), F64::from_u64(3));
        validate_transitions(&air, &trace).unwrap();
    }

    #[test]
    fn tampered_trace_fails_validation() {
        let air = FibAir::new(16);
        let (mut trace, _) = build_trace(&air, &fib_inputs(), &[], &[]).unwrap();
        trace.registers[0][7] = F64::from_u64(999);
        let err = validate_transitions(&air, &trace).unwrap_err();
        assert_eq!(err.step, 6);
    }

    #[test]
    fn input_arity_is_validated() {
        let air = FibAir::new(16);
        let inputs = InputTree::group(vec![InputTree::tuple(vec![F64::ONE])]);
        assert_eq!(
            build_trace(&air, &inputs, &[], &[]).unwrap_err(),
            InputError::InputArityMismatch {
                expected: 2,
                got: 1
            }
        );
    }

    #[test]
    fn cyclic_patterns_repeat() {
        use crate::air::example::CubicAir;
        let air = CubicAir::new(8);
        let inputs = InputTree::group(vec![
            InputTree::tuple(vec![F64::from_u64(42)]),
            InputTree::tuple(vec![F64::from_u64(43)]),
        ]);
        let mut mask = vec![F64::ONE; 8];
        mask[7] = F64::ZERO;
        let (trace, shape) = build_trace(&air, &inputs, &[mask], &[]).unwrap();
        assert_eq!(shape.total_segments(), 2);
        assert_eq!(trace.length(), 16);
        // input register holds the segment seed
        assert_eq!(trace.get(2, 3), F64::from_u64(42));
        assert_eq!(trace.get(2, 11), F64::from_u64(43));
        // mask register cycles with period 8
        assert_eq!(trace.get(3, 7), F64::ZERO);
        assert_eq!(trace.get(3, 15), F64::ZERO);
        assert_eq!(trace.get(3, 9), F64::ONE);
        validate_transitions(&air, &trace).unwrap();
    }
}
