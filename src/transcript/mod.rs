//! Deterministic, domain-separated Fiat–Shamir transcript.
//!
//! The transcript is the single source of verifier randomness. Prover and
//! verifier absorb the same byte strings under the same labels in the same
//! order; any divergence yields different challenges and immediate proof
//! rejection. A stage tracker enforces the canonical protocol order:
//!
//! ```text
//! public inputs -> trace root -> constraint coefficients
//!               -> composition root -> (fold challenge -> layer root)*
//!               -> execution query seed -> fri query seed
//! ```
//!
//! Challenges are squeezed from a counter-mode XOF keyed by the running
//! state, the label tag and a monotone challenge counter; every squeeze is
//! mixed back into the state so later challenges depend on earlier ones.

use core::fmt;

use crate::field::StarkField;
use crate::hash::{HashAlgorithm, DIGEST_SIZE};

const PROTOCOL_TAG: &[u8] = b"AIRSTARK-TRANSCRIPT-V1";

// Derivation stops after this many draws per requested position, so
// undersized domains terminate deterministically on both sides.
const POSITION_DRAW_FACTOR: usize = 16;

/// Labels naming every absorb and challenge operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptLabel {
    /// Digest binding assertions, public auxiliary inputs and trace shape.
    PublicInputs,
    /// Root of the trace evaluation tree.
    TraceRoot,
    /// Constraint combination coefficients (alpha then beta draws).
    ConstraintCoefficients,
    /// Root of the composition evaluation tree.
    CompositionRoot,
    /// Root of the FRI column tree produced by fold `layer`.
    FriLayerRoot(u8),
    /// Folding challenge consumed by fold `layer`.
    FriFoldChallenge(u8),
    /// Execution-trace spot check position stream.
    ExeQuerySeed,
    /// FRI query position stream.
    FriQuerySeed,
}

impl TranscriptLabel {
    fn domain_tag(self) -> [u8; 8] {
        let (code, arg): (u32, u32) = match self {
            TranscriptLabel::PublicInputs => (1, 0),
            TranscriptLabel::TraceRoot => (2, 0),
            TranscriptLabel::ConstraintCoefficients => (3, 0),
            TranscriptLabel::CompositionRoot => (4, 0),
            TranscriptLabel::FriLayerRoot(layer) => (5, layer as u32),
            TranscriptLabel::FriFoldChallenge(layer) => (6, layer as u32),
            TranscriptLabel::ExeQuerySeed => (7, 0),
            TranscriptLabel::FriQuerySeed => (8, 0),
        };
        let mut tag = [0u8; 8];
        tag[..4].copy_from_slice(&code.to_le_bytes());
        tag[4..].copy_from_slice(&arg.to_le_bytes());
        tag
    }
}

/// Errors surfaced when the canonical operation order is violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptError {
    /// The label is not valid in the current stage.
    InvalidLabel,
    /// A position challenge was requested over an empty range.
    RangeZero,
}

impl fmt::Display for TranscriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranscriptError::InvalidLabel => {
                write!(f, "transcript operation out of canonical order")
            }
            TranscriptError::RangeZero => write!(f, "position challenge over empty range"),
        }
    }
}

impl std::error::Error for TranscriptError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    ExpectPublic,
    ExpectTraceRoot,
    Coefficients { drawn: bool },
    Fri { layer: u8, expect_root: bool },
    ExpectFriQueries,
    Finished,
}

impl Stage {
    fn apply_absorb(self, label: TranscriptLabel) -> Result<Self, TranscriptError> {
        match (self, label) {
            (Stage::ExpectPublic, TranscriptLabel::PublicInputs) => Ok(Stage::ExpectTraceRoot),
            (Stage::ExpectTraceRoot, TranscriptLabel::TraceRoot) => {
                Ok(Stage::Coefficients { drawn: false })
            }
            (Stage::Coefficients { drawn: true }, TranscriptLabel::CompositionRoot) => {
                Ok(Stage::Fri {
                    layer: 0,
                    expect_root: false,
                })
            }
            (
                Stage::Fri {
                    layer,
                    expect_root: true,
                },
                TranscriptLabel::FriLayerRoot(index),
            ) if index == layer => Ok(Stage::Fri {
                layer: layer + 1,
                expect_root: false,
            }),
            _ => Err(TranscriptError::InvalidLabel),
        }
    }

    fn apply_challenge(self, label: TranscriptLabel) -> Result<Self, TranscriptError> {
        match (self, label) {
            (Stage::Coefficients { .. }, TranscriptLabel::ConstraintCoefficients) => {
                Ok(Stage::Coefficients { drawn: true })
            }
            (
                Stage::Fri {
                    layer,
                    expect_root: false,
                },
                TranscriptLabel::FriFoldChallenge(index),
            ) if index == layer => Ok(Stage::Fri {
                layer,
                expect_root: true,
            }),
            (
                Stage::Fri {
                    expect_root: false, ..
                },
                TranscriptLabel::ExeQuerySeed,
            ) => Ok(Stage::ExpectFriQueries),
            (Stage::ExpectFriQueries, TranscriptLabel::FriQuerySeed) => Ok(Stage::Finished),
            _ => Err(TranscriptError::InvalidLabel),
        }
    }
}

/// Fiat–Shamir transcript bound to one proving or verification run.
pub struct Transcript {
    algorithm: HashAlgorithm,
    state: [u8; DIGEST_SIZE],
    stage: Stage,
    challenge_counter: u64,
}

impl Transcript {
    /// Seeds the transcript with the protocol tag and the public parameter
    /// encoding. Both sides must supply identical bytes.
    pub fn new(algorithm: HashAlgorithm, parameters: &[u8]) -> Self {
        let state = algorithm.hash_parts(&[PROTOCOL_TAG, parameters]);
        Self {
            algorithm,
            state,
            stage: Stage::ExpectPublic,
            challenge_counter: 0,
        }
    }

    fn mix(&mut self, label: TranscriptLabel, data: &[u8]) {
        self.state = self.algorithm.hash_parts(&[
            &self.state,
            &label.domain_tag(),
            &(data.len() as u64).to_le_bytes(),
            data,
        ]);
    }

    /// Absorbs canonical bytes under the supplied label.
    pub fn absorb(&mut self, label: TranscriptLabel, data: &[u8]) -> Result<(), TranscriptError> {
        self.stage = self.stage.apply_absorb(label)?;
        self.mix(label, data);
        Ok(())
    }

    /// Absorbs a 32-byte commitment digest.
    pub fn absorb_digest(
        &mut self,
        label: TranscriptLabel,
        digest: &[u8; DIGEST_SIZE],
    ) -> Result<(), TranscriptError> {
        self.absorb(label, digest)
    }

    fn challenge_xof(&mut self, label: TranscriptLabel) -> Result<crate::hash::Xof, TranscriptError> {
        self.stage = self.stage.apply_challenge(label)?;
        self.challenge_counter += 1;
        let mut seed = Vec::with_capacity(DIGEST_SIZE + 16);
        seed.extend_from_slice(&self.state);
        seed.extend_from_slice(&label.domain_tag());
        seed.extend_from_slice(&self.challenge_counter.to_le_bytes());
        Ok(self.algorithm.xof(&seed))
    }

    /// Draws `count` field element challenges.
    pub fn challenge_felts<F: StarkField>(
        &mut self,
        label: TranscriptLabel,
        count: usize,
    ) -> Result<Vec<F>, TranscriptError> {
        let mut xof = self.challenge_xof(label)?;
        let mut raw = vec![0u8; count * 2 * F::ELEMENT_BYTES];
        xof.fill(&mut raw);
        let felts = raw
            .chunks(2 * F::ELEMENT_BYTES)
            .map(F::from_xof_bytes)
            .collect();
        self.mix(label, &raw);
        Ok(felts)
    }

    /// Draws a single field element challenge.
    pub fn challenge_felt<F: StarkField>(
        &mut self,
        label: TranscriptLabel,
    ) -> Result<F, TranscriptError> {
        Ok(self.challenge_felts(label, 1)?[0])
    }

    /// Draws up to `count` distinct positions in `[0, range)`, skipping
    /// multiples of `exclude_multiples_of` (no exclusion when 0).
    ///
    /// Positions are returned in draw order. Derivation caps the number of
    /// draws, so ranges with fewer admissible positions than requested yield
    /// a shorter list, identically on prover and verifier.
    pub fn challenge_positions(
        &mut self,
        label: TranscriptLabel,
        count: usize,
        range: usize,
        exclude_multiples_of: usize,
    ) -> Result<Vec<usize>, TranscriptError> {
        if range == 0 {
            return Err(TranscriptError::RangeZero);
        }
        let mut xof = self.challenge_xof(label)?;
        let mut positions = Vec::with_capacity(count);
        let mut drawn = Vec::with_capacity(count * 8);
        for _ in 0..count * POSITION_DRAW_FACTOR {
            if positions.len() == count {
                break;
            }
            let word = xof.next_u64();
            drawn.extend_from_slice(&word.to_le_bytes());
            let position = (word % range as u64) as usize;
            if exclude_multiples_of != 0 && position % exclude_multiples_of == 0 {
                continue;
            }
            if positions.contains(&position) {
                continue;
            }
            positions.push(position);
        }
        self.mix(label, &drawn);
        Ok(positions)
    }

    /// Digest of the current transcript state, for diagnostics and tests.
    pub fn state_digest(&self) -> [u8; DIGEST_SIZE] {
        self.state
    }
}
