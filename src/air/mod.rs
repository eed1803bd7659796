//! Algebraic intermediate representation contract and input handling.
//!
//! The engine consumes a compiled AIR through the [`Air`] trait: a transition
//! function over mutable state registers, a constraint evaluator over two
//! consecutive rows plus the readonly registers, and the declared constraint
//! degrees. The front-end DSL that produces such an object is outside this
//! crate.
//!
//! Readonly registers come in three kinds, laid out after the state
//! registers in the order input, public, secret:
//!
//! - *input* registers mirror the input tuple that seeded the current
//!   segment and are witness data;
//! - *public* registers are cyclic patterns supplied to both prover and
//!   verifier;
//! - *secret* registers are cyclic patterns known only to the prover and
//!   committed alongside the state registers.

use core::fmt;

use crate::field::StarkField;

pub mod boundary;
pub mod composition;
pub mod context;
pub mod example;
pub mod trace;
pub mod zero;

/// Number of registers of each kind in an AIR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterCounts {
    /// Mutable state registers driven by the transition function.
    pub state: usize,
    /// Readonly registers mirroring the segment input tuple.
    pub input: usize,
    /// Readonly cyclic registers known to both parties.
    pub public: usize,
    /// Readonly cyclic registers known only to the prover.
    pub secret: usize,
}

impl RegisterCounts {
    /// Total readonly registers.
    pub fn readonly(&self) -> usize {
        self.input + self.public + self.secret
    }

    /// Total registers, the row count of the execution trace.
    pub fn total(&self) -> usize {
        self.state + self.readonly()
    }

    /// Registers committed into trace-tree leaves: state, input and secret.
    /// Public registers are re-derived by the verifier.
    pub fn committed(&self) -> usize {
        self.state + self.input + self.secret
    }
}

/// A boundary constraint: the named state register must hold `value` at
/// `step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assertion<F> {
    pub register: usize,
    pub step: usize,
    pub value: F,
}

impl<F> Assertion<F> {
    pub fn new(register: usize, step: usize, value: F) -> Self {
        Self {
            register,
            step,
            value,
        }
    }
}

/// Input streams as a uniform-depth tree of tuples.
///
/// Nesting depth must equal the AIR's declared loop depth; each leaf tuple
/// seeds one trace segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputTree<F> {
    Tuple(Vec<F>),
    Group(Vec<InputTree<F>>),
}

impl<F> InputTree<F> {
    pub fn tuple(values: Vec<F>) -> Self {
        InputTree::Tuple(values)
    }

    pub fn group(children: Vec<InputTree<F>>) -> Self {
        InputTree::Group(children)
    }
}

/// Executable form of an algebraic intermediate representation.
pub trait Air<F: StarkField>: Send + Sync {
    fn register_counts(&self) -> RegisterCounts;

    /// Declared degree of each transition constraint, in evaluator output
    /// order. Degrees are upper bounds on the algebraic degree in register
    /// variables and must be at least 1.
    fn constraint_degrees(&self) -> Vec<usize>;

    /// Nesting depth of the input streams.
    fn loop_depth(&self) -> usize {
        1
    }

    /// Trace steps contributed by each input tuple.
    fn steps_per_segment(&self) -> usize;

    /// Seeds the state registers from a segment's input tuple.
    fn init_state(&self, inputs: &[F]) -> Vec<F>;

    /// Computes the next state row from the current state and readonly rows.
    fn transition(&self, state: &[F], readonly: &[F]) -> Vec<F>;

    /// Evaluates every transition constraint; a satisfied transition yields
    /// all zeros. `result` has one slot per declared constraint.
    fn evaluate_constraints(&self, current: &[F], next: &[F], readonly: &[F], result: &mut [F]);
}

/// Validation failures for caller-supplied inputs and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputError {
    /// At least one assertion is required.
    NoAssertions,
    /// An assertion names a register outside the state registers.
    AssertionRegisterOutOfRange { register: usize, states: usize },
    /// An assertion names a step outside the trace.
    AssertionStepOutOfRange { step: usize, trace_length: usize },
    /// Two assertions target the same register and step.
    DuplicateAssertion { register: usize, step: usize },
    /// The input tree nesting does not match the declared loop depth.
    InputDepthMismatch,
    /// A leaf tuple has the wrong arity.
    InputArityMismatch { expected: usize, got: usize },
    /// Input groups must contain at least one child.
    EmptyInputGroup,
    /// Wrong number of auxiliary register patterns.
    AuxiliaryCountMismatch { expected: usize, got: usize },
    /// Auxiliary patterns must have power-of-two length at most the trace
    /// length.
    AuxiliaryPatternLength { got: usize },
    /// The state seed returned by `init_state` has the wrong width.
    InitWidthMismatch { expected: usize, got: usize },
    /// The transition function returned the wrong number of registers.
    TransitionWidthMismatch { expected: usize, got: usize },
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::NoAssertions => write!(f, "at least one assertion is required"),
            InputError::AssertionRegisterOutOfRange { register, states } => {
                write!(
                    f,
                    "assertion register {register} outside {states} state registers"
                )
            }
            InputError::AssertionStepOutOfRange { step, trace_length } => {
                write!(f, "assertion step {step} outside trace of {trace_length}")
            }
            InputError::DuplicateAssertion { register, step } => {
                write!(f, "duplicate assertion for register {register} step {step}")
            }
            InputError::InputDepthMismatch => {
                write!(f, "input nesting does not match declared loop depth")
            }
            InputError::InputArityMismatch { expected, got } => {
                write!(f, "input tuple arity {got}, expected {expected}")
            }
            InputError::EmptyInputGroup => write!(f, "input group must not be empty"),
            InputError::AuxiliaryCountMismatch { expected, got } => {
                write!(f, "{got} auxiliary patterns supplied, expected {expected}")
            }
            InputError::AuxiliaryPatternLength { got } => {
                write!(
                    f,
                    "auxiliary pattern length {got} is not a power of two within the trace"
                )
            }
            InputError::InitWidthMismatch { expected, got } => {
                write!(f, "init produced {got} registers, expected {expected}")
            }
            InputError::TransitionWidthMismatch { expected, got } => {
                write!(f, "transition produced {got} registers, expected {expected}")
            }
        }
    }
}

impl std::error::Error for InputError {}

/// Flattens an input tree into segment tuples, validating the declared
/// depth and arity, and recording the node count per depth.
pub(crate) fn flatten_inputs<F: StarkField>(
    depth: usize,
    arity: usize,
    inputs: &InputTree<F>,
) -> Result<(Vec<Vec<F>>, Vec<u32>), InputError> {
    if depth == 0 {
        return Err(InputError::InputDepthMismatch);
    }
    let mut segments = Vec::new();
    let mut shape = vec![0u32; depth];
    walk_inputs(inputs, depth, arity, &mut shape, &mut segments)?;
    Ok((segments, shape))
}

fn walk_inputs<F: StarkField>(
    node: &InputTree<F>,
    remaining: usize,
    arity: usize,
    shape: &mut [u32],
    segments: &mut Vec<Vec<F>>,
) -> Result<(), InputError> {
    match node {
        InputTree::Group(children) if remaining > 0 => {
            if children.is_empty() {
                return Err(InputError::EmptyInputGroup);
            }
            let depth_index = shape.len() - remaining;
            shape[depth_index] += children.len() as u32;
            for child in children {
                walk_inputs(child, remaining - 1, arity, shape, segments)?;
            }
            Ok(())
        }
        InputTree::Tuple(values) if remaining == 0 => {
            if values.len() != arity {
                return Err(InputError::InputArityMismatch {
                    expected: arity,
                    got: values.len(),
                });
            }
            segments.push(values.clone());
            Ok(())
        }
        _ => Err(InputError::InputDepthMismatch),
    }
}

/// Validates an assertion set against the register layout and trace length.
pub(crate) fn validate_assertions<F: StarkField>(
    counts: &RegisterCounts,
    trace_length: usize,
    assertions: &[Assertion<F>],
) -> Result<(), InputError> {
    if assertions.is_empty() {
        return Err(InputError::NoAssertions);
    }
    for (i, assertion) in assertions.iter().enumerate() {
        if assertion.register >= counts.state {
            return Err(InputError::AssertionRegisterOutOfRange {
                register: assertion.register,
                states: counts.state,
            });
        }
        if assertion.step >= trace_length {
            return Err(InputError::AssertionStepOutOfRange {
                step: assertion.step,
                trace_length,
            });
        }
        for other in &assertions[..i] {
            if other.register == assertion.register && other.step == assertion.step {
                return Err(InputError::DuplicateAssertion {
                    register: assertion.register,
                    step: assertion.step,
                });
            }
        }
    }
    Ok(())
}
