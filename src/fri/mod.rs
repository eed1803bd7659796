//! FRI low-degree testing with quartic folding.
//!
//! The codeword of length `N` is viewed as four columns of `N/4` co-located
//! values: row `i` holds the evaluations at `x_i * mu^m` where `mu` is a
//! primitive fourth root of unity. Committing groups each row into one
//! Merkle leaf. A transcript challenge `s` folds every row through its
//! degree-3 interpolant `p_i`, producing the next codeword `p_i(s)` over the
//! domain `{x^4}`. Folding stops once the codeword fits in 256 values; the
//! remainder ships raw and is bound to the last commitment by rebuilding its
//! tree.
//!
//! Positions on the trace domain (indices that are multiples of the
//! extension factor) carry no low-degree guarantee; quartic folding keeps
//! them confined to the same residue class at every layer, so query
//! derivation and the remainder degree check exclude exactly those indices.

use core::fmt;

use crate::field::{get_power_series, polynomial, StarkField};
use crate::merkle::MerkleError;
use crate::transcript::TranscriptError;

mod proof;
mod prover;
mod verifier;

pub use proof::{FriLayerProof, FriProof};
pub use prover::{commit, open, FriCommitment};
pub use verifier::{verify, FriVerifierParams};

/// Evaluations combined per fold.
pub const FOLDING_FACTOR: usize = 4;

/// Largest codeword transmitted raw instead of folded further.
pub const MAX_REMAINDER_LENGTH: usize = 256;

/// Number of folds applied to a codeword of `domain_size` values.
pub fn num_layers(mut domain_size: usize) -> usize {
    let mut layers = 0;
    while domain_size > MAX_REMAINDER_LENGTH {
        domain_size /= FOLDING_FACTOR;
        layers += 1;
    }
    layers
}

/// Inclusive degree bound remaining after `layers` folds.
pub fn final_degree_bound(max_degree: usize, layers: usize) -> usize {
    let mut bound = max_degree;
    for _ in 0..layers {
        bound /= FOLDING_FACTOR;
    }
    bound
}

/// Failures raised by the FRI prover and verifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FriError {
    LayerCountMismatch { expected: usize, got: usize },
    RemainderLengthMismatch { expected: usize, got: usize },
    ChallengeCountMismatch { expected: usize, got: usize },
    Commitment { layer: usize },
    MalformedLeaf { layer: usize },
    FoldMismatch { layer: usize, position: usize },
    RemainderCommitment,
    DegreeExceeded,
    Transcript(TranscriptError),
    Merkle(MerkleError),
}

impl fmt::Display for FriError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FriError::LayerCountMismatch { expected, got } => {
                write!(f, "expected {expected} fri layers, proof has {got}")
            }
            FriError::RemainderLengthMismatch { expected, got } => {
                write!(f, "expected remainder of {expected} values, got {got}")
            }
            FriError::ChallengeCountMismatch { expected, got } => {
                write!(f, "expected {expected} fold challenges, got {got}")
            }
            FriError::Commitment { layer } => {
                write!(f, "merkle verification failed at fri layer {layer}")
            }
            FriError::MalformedLeaf { layer } => {
                write!(f, "malformed leaf encoding at fri layer {layer}")
            }
            FriError::FoldMismatch { layer, position } => {
                write!(f, "fold mismatch at layer {layer} position {position}")
            }
            FriError::RemainderCommitment => {
                write!(f, "remainder does not match the last layer commitment")
            }
            FriError::DegreeExceeded => write!(f, "remainder exceeds the degree bound"),
            FriError::Transcript(inner) => write!(f, "transcript: {inner}"),
            FriError::Merkle(inner) => write!(f, "merkle: {inner}"),
        }
    }
}

impl std::error::Error for FriError {}

impl From<TranscriptError> for FriError {
    fn from(inner: TranscriptError) -> Self {
        FriError::Transcript(inner)
    }
}

impl From<MerkleError> for FriError {
    fn from(inner: MerkleError) -> Self {
        FriError::Merkle(inner)
    }
}

/// Serializes a codeword into quartic Merkle leaves: leaf `i` holds the
/// big-endian encodings of `values[i + m * (len/4)]` for `m` in `0..4`.
pub fn to_quartic_leaves<F: StarkField>(values: &[F]) -> Vec<Vec<u8>> {
    let quarter = values.len() / FOLDING_FACTOR;
    (0..quarter)
        .map(|i| {
            let mut blob = Vec::with_capacity(FOLDING_FACTOR * F::ELEMENT_BYTES);
            for m in 0..FOLDING_FACTOR {
                values[i + m * quarter].write_be(&mut blob);
            }
            blob
        })
        .collect()
}

/// Interpolates one row's four co-located values and evaluates the
/// interpolant at the fold challenge.
///
/// The row's points are `x_i * mu^m`, so the interpolant coefficients are
/// `a_j * x_i^-j` with `a = iNTT_4(values)`; evaluating at `s` reduces to a
/// Horner pass in `t = s * x_i^-1`.
pub fn fold_row<F: StarkField>(
    values: &[F; 4],
    x_inv: F,
    challenge: F,
    mu_inv: F,
    quarter_inv: F,
) -> F {
    let mut coefficients = [F::ZERO; 4];
    let mut w = F::ONE;
    for slot in coefficients.iter_mut() {
        let horner = ((values[3] * w + values[2]) * w + values[1]) * w + values[0];
        *slot = horner * quarter_inv;
        w = w * mu_inv;
    }
    let t = challenge * x_inv;
    ((coefficients[3] * t + coefficients[2]) * t + coefficients[1]) * t + coefficients[0]
}

/// Folds a whole codeword: `result[i] = p_i(challenge)` over the squared
/// domain `{x^4}`.
pub fn fold_layer<F: StarkField>(values: &[F], challenge: F, domain_root: F) -> Vec<F> {
    let quarter = values.len() / FOLDING_FACTOR;
    let mu = domain_root.exp(quarter as u128);
    let mu_inv = mu.inv().expect("fourth root of unity is nonzero");
    let quarter_inv = F::from_u64(4).inv().expect("4 is invertible");
    let root_inv = domain_root.inv().expect("domain root is nonzero");
    let x_inverses = get_power_series(root_inv, quarter);
    crate::utils::collect_indexed(quarter, |i| {
        fold_row(
            &[
                values[i],
                values[i + quarter],
                values[i + 2 * quarter],
                values[i + 3 * quarter],
            ],
            x_inverses[i],
            challenge,
            mu_inv,
            quarter_inv,
        )
    })
}

/// Checks that the remainder values on non-excluded positions agree with a
/// polynomial of degree at most `max_degree`.
pub fn check_remainder_degree<F: StarkField>(
    remainder: &[F],
    domain_root: F,
    max_degree: usize,
    exclude_multiples_of: usize,
) -> Result<(), FriError> {
    let clean: Vec<usize> = (0..remainder.len())
        .filter(|i| exclude_multiples_of == 0 || i % exclude_multiples_of != 0)
        .collect();
    if clean.len() <= max_degree + 1 {
        return Ok(());
    }
    let domain = get_power_series(domain_root, remainder.len());
    let sample = &clean[..max_degree + 1];
    let xs: Vec<F> = sample.iter().map(|&i| domain[i]).collect();
    let ys: Vec<F> = sample.iter().map(|&i| remainder[i]).collect();
    let interpolant = polynomial::interpolate(&xs, &ys);
    for &i in &clean[max_degree + 1..] {
        if polynomial::eval_at(&interpolant, domain[i]) != remainder[i] {
            return Err(FriError::DegreeExceeded);
        }
    }
    Ok(())
}
