//! Proof parameter selection and validation.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::air::context::ContextError;
use crate::hash::HashAlgorithm;

/// Default and maximum query budgets.
pub const DEFAULT_EXE_QUERY_COUNT: usize = 80;
pub const MAX_EXE_QUERY_COUNT: usize = 128;
pub const DEFAULT_FRI_QUERY_COUNT: usize = 40;
pub const MAX_FRI_QUERY_COUNT: usize = 64;

/// Caller-selected proof parameters.
///
/// All validation happens at [`crate::stark::Stark::new`]; the options are
/// serde-serializable so deployments can pin them in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofOptions {
    /// Evaluation-domain blowup `k2`; `None` selects the smallest factor
    /// admissible for the AIR's constraint degrees.
    pub extension_factor: Option<usize>,
    /// Trace spot-check count.
    pub exe_query_count: usize,
    /// FRI query count.
    pub fri_query_count: usize,
    /// Hash backing commitments and the transcript.
    pub hash: HashAlgorithm,
}

impl Default for ProofOptions {
    fn default() -> Self {
        Self {
            extension_factor: None,
            exe_query_count: DEFAULT_EXE_QUERY_COUNT,
            fri_query_count: DEFAULT_FRI_QUERY_COUNT,
            hash: HashAlgorithm::default(),
        }
    }
}

impl ProofOptions {
    pub fn with_extension_factor(mut self, extension_factor: usize) -> Self {
        self.extension_factor = Some(extension_factor);
        self
    }

    pub fn with_exe_query_count(mut self, count: usize) -> Self {
        self.exe_query_count = count;
        self
    }

    pub fn with_fri_query_count(mut self, count: usize) -> Self {
        self.fri_query_count = count;
        self
    }

    pub fn with_hash(mut self, hash: HashAlgorithm) -> Self {
        self.hash = hash;
        self
    }
}

/// Configuration rejected at engine construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Domain or degree parameters are invalid.
    Context(ContextError),
    /// The AIR declares no state registers.
    NoStateRegisters,
    /// Steps per segment must be a positive power of two.
    InvalidSegmentSteps { got: usize },
    /// The AIR declares a zero loop depth.
    ZeroLoopDepth,
    /// Execution query count outside `[1, 128]`.
    ExeQueryCount { got: usize },
    /// FRI query count outside `[1, 64]`.
    FriQueryCount { got: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Context(inner) => write!(f, "{inner}"),
            ConfigError::NoStateRegisters => write!(f, "AIR declares no state registers"),
            ConfigError::InvalidSegmentSteps { got } => {
                write!(f, "steps per segment {got} is not a positive power of two")
            }
            ConfigError::ZeroLoopDepth => write!(f, "AIR declares a zero loop depth"),
            ConfigError::ExeQueryCount { got } => {
                write!(
                    f,
                    "execution query count {got} outside [1, {MAX_EXE_QUERY_COUNT}]"
                )
            }
            ConfigError::FriQueryCount { got } => {
                write!(f, "fri query count {got} outside [1, {MAX_FRI_QUERY_COUNT}]")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ContextError> for ConfigError {
    fn from(inner: ContextError) -> Self {
        ConfigError::Context(inner)
    }
}
