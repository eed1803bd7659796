//! Configuration and input validation limits.

use airstark::air::context::ContextError;
use airstark::air::example::FibAir;
use airstark::air::{Air, RegisterCounts};
use airstark::field::F64;
use airstark::{
    Assertion, ConfigError, InputError, InputTree, ProofOptions, ProverError, Stark, StarkField,
};

/// Minimal AIR with a single degree-2 constraint: `r' = r^2`.
struct SquareAir;

impl<F: StarkField> Air<F> for SquareAir {
    fn register_counts(&self) -> RegisterCounts {
        RegisterCounts {
            state: 1,
            input: 1,
            public: 0,
            secret: 0,
        }
    }

    fn constraint_degrees(&self) -> Vec<usize> {
        vec![2]
    }

    fn steps_per_segment(&self) -> usize {
        16
    }

    fn init_state(&self, inputs: &[F]) -> Vec<F> {
        vec![inputs[0]]
    }

    fn transition(&self, state: &[F], _readonly: &[F]) -> Vec<F> {
        vec![state[0] * state[0]]
    }

    fn evaluate_constraints(&self, current: &[F], next: &[F], _readonly: &[F], result: &mut [F]) {
        result[0] = next[0] - current[0] * current[0];
    }
}

#[test]
fn extension_factor_below_twice_composition_factor_is_rejected() {
    // max degree 2 -> k1 = 2, so extension factor 2 is out of range
    let result: Result<Stark<F64, SquareAir>, _> = Stark::new(
        SquareAir,
        ProofOptions::default().with_extension_factor(2),
    );
    assert!(matches!(
        result.err(),
        Some(ConfigError::Context(
            ContextError::ExtensionFactorOutOfRange { got: 2, min: 4, .. }
        ))
    ));

    // extension factor 4 is the smallest admissible choice
    let result: Result<Stark<F64, SquareAir>, _> = Stark::new(
        SquareAir,
        ProofOptions::default().with_extension_factor(4),
    );
    assert!(result.is_ok());
}

#[test]
fn non_power_of_two_extension_factor_is_rejected() {
    let result: Result<Stark<F64, SquareAir>, _> = Stark::new(
        SquareAir,
        ProofOptions::default().with_extension_factor(12),
    );
    assert!(matches!(
        result.err(),
        Some(ConfigError::Context(
            ContextError::ExtensionFactorNotPowerOfTwo { got: 12 }
        ))
    ));
}

#[test]
fn query_budgets_are_capped() {
    let result: Result<Stark<F64, FibAir>, _> = Stark::new(
        FibAir::new(64),
        ProofOptions::default().with_exe_query_count(129),
    );
    assert!(matches!(
        result.err(),
        Some(ConfigError::ExeQueryCount { got: 129 })
    ));

    let result: Result<Stark<F64, FibAir>, _> = Stark::new(
        FibAir::new(64),
        ProofOptions::default().with_fri_query_count(65),
    );
    assert!(matches!(
        result.err(),
        Some(ConfigError::FriQueryCount { got: 65 })
    ));
}

#[test]
fn empty_assertions_are_rejected() {
    let stark: Stark<F64, FibAir> = Stark::new(
        FibAir::new(64),
        ProofOptions::default().with_extension_factor(8),
    )
    .unwrap();
    let inputs = InputTree::group(vec![InputTree::tuple(vec![F64::ONE, F64::ONE])]);
    let err = stark.prove(&[], &inputs, &[], &[]).unwrap_err();
    assert_eq!(err, ProverError::Input(InputError::NoAssertions));
}

#[test]
fn out_of_range_assertions_are_rejected() {
    let stark: Stark<F64, FibAir> = Stark::new(
        FibAir::new(64),
        ProofOptions::default().with_extension_factor(8),
    )
    .unwrap();
    let inputs = InputTree::group(vec![InputTree::tuple(vec![F64::ONE, F64::ONE])]);

    let assertions = vec![Assertion::new(5, 0, F64::ONE)];
    assert_eq!(
        stark.prove(&assertions, &inputs, &[], &[]).unwrap_err(),
        ProverError::Input(InputError::AssertionRegisterOutOfRange {
            register: 5,
            states: 2
        })
    );

    let assertions = vec![Assertion::new(0, 64, F64::ONE)];
    assert_eq!(
        stark.prove(&assertions, &inputs, &[], &[]).unwrap_err(),
        ProverError::Input(InputError::AssertionStepOutOfRange {
            step: 64,
            trace_length: 64
        })
    );
}

#[test]
fn mismatched_input_depth_is_rejected() {
    let stark: Stark<F64, FibAir> = Stark::new(
        FibAir::new(64),
        ProofOptions::default().with_extension_factor(8),
    )
    .unwrap();
    let assertions = vec![Assertion::new(0, 0, F64::ONE)];
    let inputs = InputTree::tuple(vec![F64::ONE, F64::ONE]);
    assert_eq!(
        stark.prove(&assertions, &inputs, &[], &[]).unwrap_err(),
        ProverError::Input(InputError::InputDepthMismatch)
    );
}

#[test]
fn options_roundtrip_through_json() {
    let options = ProofOptions::default()
        .with_extension_factor(16)
        .with_fri_query_count(48);
    let encoded = serde_json::to_string(&options).unwrap();
    let decoded: ProofOptions = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, options);
}

#[test]
fn unsatisfiable_trace_is_refused() {
    // seeding fibonacci with values that contradict a mid-trace assertion
    let stark: Stark<F64, FibAir> = Stark::new(
        FibAir::new(64),
        ProofOptions::default().with_extension_factor(8),
    )
    .unwrap();
    let inputs = InputTree::group(vec![InputTree::tuple(vec![F64::ONE, F64::ONE])]);
    let assertions = vec![Assertion::new(0, 5, F64::from_u64(1234))];
    assert_eq!(
        stark.prove(&assertions, &inputs, &[], &[]).unwrap_err(),
        ProverError::AssertionViolation {
            register: 0,
            step: 5
        }
    );
}
