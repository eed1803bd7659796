//! Complete binary Merkle trees over opaque leaf blobs.
//!
//! Every committed vector in the proof system has a power-of-two length, so
//! trees are always complete and need no padding rules. Leaf hashing is
//! data-parallel by position; all other behavior is strictly deterministic.

use core::fmt;

use crate::hash::{HashAlgorithm, DIGEST_SIZE};
use crate::utils;

mod proof;

pub use proof::{verify_batch, BatchMerkleProof};

/// Errors surfaced by tree construction and proof handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MerkleError {
    /// A tree needs at least two leaves.
    TooFewLeaves { got: usize },
    /// Leaf counts must be powers of two.
    LeafCountNotPowerOfTwo { got: usize },
    /// No positions were supplied for an opening.
    EmptyPositions,
    /// Positions must be strictly increasing.
    PositionsNotSorted,
    /// A position exceeds the leaf count.
    PositionOutOfRange { position: usize, leaves: usize },
    /// More than 256 positions were requested in one batch.
    TooManyPositions { got: usize },
    /// The proof depth does not match the committed tree.
    DepthMismatch { expected: u8, got: u8 },
    /// The proof carries the wrong number of values or node columns.
    ShapeMismatch,
    /// A node column ran out of (or retained unused) sibling hashes.
    NodeCountMismatch,
    /// The recomputed root does not match the commitment.
    RootMismatch,
}

impl fmt::Display for MerkleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MerkleError::TooFewLeaves { got } => {
                write!(f, "merkle tree needs at least two leaves, got {got}")
            }
            MerkleError::LeafCountNotPowerOfTwo { got } => {
                write!(f, "merkle leaf count {got} is not a power of two")
            }
            MerkleError::EmptyPositions => write!(f, "no positions supplied for opening"),
            MerkleError::PositionsNotSorted => {
                write!(f, "opening positions must be strictly increasing")
            }
            MerkleError::PositionOutOfRange { position, leaves } => {
                write!(f, "position {position} outside tree with {leaves} leaves")
            }
            MerkleError::TooManyPositions { got } => {
                write!(f, "batch of {got} positions exceeds the limit of 256")
            }
            MerkleError::DepthMismatch { expected, got } => {
                write!(f, "proof depth {got} does not match tree depth {expected}")
            }
            MerkleError::ShapeMismatch => write!(f, "proof shape does not match positions"),
            MerkleError::NodeCountMismatch => {
                write!(f, "sibling node count does not match the opening")
            }
            MerkleError::RootMismatch => write!(f, "recomputed root does not match commitment"),
        }
    }
}

impl std::error::Error for MerkleError {}

/// A fully materialised Merkle tree.
///
/// The tree stores hashes only; leaf blobs stay with the caller and are
/// passed back in when building openings, which keeps peak memory at one
/// digest per node.
pub struct MerkleTree {
    // levels[0] holds leaf hashes, the last level holds the root
    levels: Vec<Vec<[u8; DIGEST_SIZE]>>,
}

impl MerkleTree {
    /// Hashes the leaf blobs and builds all interior levels.
    pub fn build(algorithm: HashAlgorithm, leaves: &[Vec<u8>]) -> Result<Self, MerkleError> {
        if leaves.len() < 2 {
            return Err(MerkleError::TooFewLeaves { got: leaves.len() });
        }
        if !leaves.len().is_power_of_two() {
            return Err(MerkleError::LeafCountNotPowerOfTwo { got: leaves.len() });
        }

        let hashed = utils::collect_indexed(leaves.len(), |i| algorithm.hash(&leaves[i]));

        let mut levels = Vec::with_capacity(leaves.len().trailing_zeros() as usize + 1);
        levels.push(hashed);
        while levels.last().expect("at least one level").len() > 1 {
            let current = levels.last().expect("at least one level");
            let next = utils::collect_indexed(current.len() / 2, |i| {
                algorithm.hash_parts(&[&current[2 * i], &current[2 * i + 1]])
            });
            levels.push(next);
        }

        Ok(Self { levels })
    }

    pub fn root(&self) -> [u8; DIGEST_SIZE] {
        self.levels.last().expect("root level")[0]
    }

    /// Number of hashing levels above the leaves.
    pub fn depth(&self) -> u8 {
        (self.levels.len() - 1) as u8
    }

    pub fn leaf_count(&self) -> usize {
        self.levels[0].len()
    }

    /// Builds a batched multi-proof for strictly increasing `positions`.
    ///
    /// Only sibling hashes that cannot be derived from the opened leaves
    /// themselves are included.
    pub fn prove_batch(
        &self,
        positions: &[usize],
        leaves: &[Vec<u8>],
    ) -> Result<BatchMerkleProof, MerkleError> {
        validate_positions(positions, self.leaf_count())?;

        let values = positions.iter().map(|&p| leaves[p].clone()).collect();
        let mut nodes: Vec<Vec<[u8; DIGEST_SIZE]>> = vec![Vec::new(); positions.len()];

        // entries pair a tree index with the proof column that owns it;
        // when siblings merge, the left entry's column carries on
        let mut entries: Vec<(usize, usize)> = positions
            .iter()
            .enumerate()
            .map(|(column, &position)| (position, column))
            .collect();

        for level in &self.levels[..self.levels.len() - 1] {
            let mut next = Vec::with_capacity(entries.len());
            let mut i = 0;
            while i < entries.len() {
                let (index, column) = entries[i];
                let sibling = index ^ 1;
                if i + 1 < entries.len() && entries[i + 1].0 == sibling {
                    i += 2;
                } else {
                    nodes[column].push(level[sibling]);
                    i += 1;
                }
                next.push((index >> 1, column));
            }
            entries = next;
        }

        Ok(BatchMerkleProof {
            values,
            nodes,
            depth: self.depth(),
        })
    }
}

pub(crate) fn validate_positions(positions: &[usize], leaves: usize) -> Result<(), MerkleError> {
    if positions.is_empty() {
        return Err(MerkleError::EmptyPositions);
    }
    if positions.len() > 256 {
        return Err(MerkleError::TooManyPositions {
            got: positions.len(),
        });
    }
    for window in positions.windows(2) {
        if window[0] >= window[1] {
            return Err(MerkleError::PositionsNotSorted);
        }
    }
    let last = *positions.last().expect("non-empty positions");
    if last >= leaves {
        return Err(MerkleError::PositionOutOfRange {
            position: last,
            leaves,
        });
    }
    Ok(())
}
