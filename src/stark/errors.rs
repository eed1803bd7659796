//! Public error surface of proving and verification.

use core::fmt;

use crate::air::context::ContextError;
use crate::air::trace::UnsatisfiedConstraint;
use crate::air::InputError;
use crate::fri::FriError;
use crate::merkle::MerkleError;
use crate::transcript::TranscriptError;

/// Failures raised while generating a proof. The prover never emits a
/// partial proof: any failure aborts the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProverError {
    /// Caller-supplied inputs or assertions are malformed.
    Input(InputError),
    /// The trace implied by the inputs cannot be proven with the
    /// configured parameters.
    Context(ContextError),
    /// The executed trace violates a transition constraint.
    Unsatisfied(UnsatisfiedConstraint),
    /// The executed trace contradicts an assertion.
    AssertionViolation { register: usize, step: usize },
    /// The composition polynomial exceeds its degree bound; the proof
    /// would be rejected, so proving refuses instead.
    CompositionDegree,
    /// Internal transcript sequencing failure.
    Transcript(TranscriptError),
    /// Internal commitment failure.
    Merkle(MerkleError),
    /// Internal FRI failure.
    Fri(FriError),
}

impl fmt::Display for ProverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProverError::Input(inner) => write!(f, "input: {inner}"),
            ProverError::Context(inner) => write!(f, "context: {inner}"),
            ProverError::Unsatisfied(inner) => write!(f, "{inner}"),
            ProverError::AssertionViolation { register, step } => {
                write!(f, "trace contradicts assertion on register {register} step {step}")
            }
            ProverError::CompositionDegree => {
                write!(f, "composition polynomial exceeds its degree bound")
            }
            ProverError::Transcript(inner) => write!(f, "transcript: {inner}"),
            ProverError::Merkle(inner) => write!(f, "commitment: {inner}"),
            ProverError::Fri(inner) => write!(f, "fri: {inner}"),
        }
    }
}

impl std::error::Error for ProverError {}

impl From<InputError> for ProverError {
    fn from(inner: InputError) -> Self {
        ProverError::Input(inner)
    }
}

impl From<ContextError> for ProverError {
    fn from(inner: ContextError) -> Self {
        ProverError::Context(inner)
    }
}

impl From<TranscriptError> for ProverError {
    fn from(inner: TranscriptError) -> Self {
        ProverError::Transcript(inner)
    }
}

impl From<MerkleError> for ProverError {
    fn from(inner: MerkleError) -> Self {
        ProverError::Merkle(inner)
    }
}

impl From<FriError> for ProverError {
    fn from(inner: FriError) -> Self {
        match inner {
            FriError::DegreeExceeded => ProverError::CompositionDegree,
            other => ProverError::Fri(other),
        }
    }
}

/// Reasons a proof is rejected. Every variant is a final verdict; nothing
/// is retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    /// Assertions or public auxiliary inputs are malformed.
    Input(InputError),
    /// The trace shape implies parameters the engine cannot serve.
    Context(ContextError),
    /// A structural field of the proof does not match the parameters.
    Structure { what: &'static str },
    /// The trace opening does not match the trace root.
    TraceCommitment,
    /// The composition opening does not match the composition root.
    CompositionCommitment,
    /// A committed leaf is not canonically encoded.
    MalformedLeaf,
    /// The recomputed composition value disagrees with the commitment.
    CompositionMismatch { position: usize },
    /// The low-degree argument failed.
    Fri(FriError),
    /// Transcript replay failed.
    Transcript(TranscriptError),
}

impl fmt::Display for VerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerifyError::Input(inner) => write!(f, "input: {inner}"),
            VerifyError::Context(inner) => write!(f, "context: {inner}"),
            VerifyError::Structure { what } => write!(f, "proof structure mismatch: {what}"),
            VerifyError::TraceCommitment => write!(f, "trace commitment verification failed"),
            VerifyError::CompositionCommitment => {
                write!(f, "composition commitment verification failed")
            }
            VerifyError::MalformedLeaf => write!(f, "committed leaf is not canonical"),
            VerifyError::CompositionMismatch { position } => {
                write!(f, "composition reconstruction mismatch at position {position}")
            }
            VerifyError::Fri(inner) => write!(f, "fri: {inner}"),
            VerifyError::Transcript(inner) => write!(f, "transcript: {inner}"),
        }
    }
}

impl std::error::Error for VerifyError {}

impl From<InputError> for VerifyError {
    fn from(inner: InputError) -> Self {
        VerifyError::Input(inner)
    }
}

impl From<ContextError> for VerifyError {
    fn from(inner: ContextError) -> Self {
        VerifyError::Context(inner)
    }
}

impl From<TranscriptError> for VerifyError {
    fn from(inner: TranscriptError) -> Self {
        VerifyError::Transcript(inner)
    }
}

impl From<FriError> for VerifyError {
    fn from(inner: FriError) -> Self {
        VerifyError::Fri(inner)
    }
}
