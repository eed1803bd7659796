//! Batched Merkle multi-proofs.
//!
//! A batch proof carries the opened leaf blobs, one sibling-hash column per
//! opened position, and the tree depth. Verification replays the same
//! bottom-up pairing walk the proof builder used: whenever both children of
//! a node are derivable from opened leaves the sibling hash is omitted, so
//! the proof stores exactly the hashes the verifier cannot compute.

use crate::hash::{HashAlgorithm, DIGEST_SIZE};

use super::MerkleError;

/// Batched multi-proof over a set of strictly increasing positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchMerkleProof {
    /// Opened leaf blobs, in position order.
    pub values: Vec<Vec<u8>>,
    /// Per-position sibling hashes, bottom-up, minus derivable ones.
    pub nodes: Vec<Vec<[u8; DIGEST_SIZE]>>,
    /// Number of hashing levels above the leaves.
    pub depth: u8,
}

/// Verifies a batched multi-proof against `root`.
///
/// `leaf_count` fixes the tree geometry; the proof depth must match it and
/// every sibling column must be consumed exactly.
pub fn verify_batch(
    algorithm: HashAlgorithm,
    root: &[u8; DIGEST_SIZE],
    positions: &[usize],
    proof: &BatchMerkleProof,
    leaf_count: usize,
) -> Result<(), MerkleError> {
    super::validate_positions(positions, leaf_count)?;
    if !leaf_count.is_power_of_two() {
        return Err(MerkleError::LeafCountNotPowerOfTwo { got: leaf_count });
    }
    let expected_depth = leaf_count.trailing_zeros() as u8;
    if proof.depth != expected_depth {
        return Err(MerkleError::DepthMismatch {
            expected: expected_depth,
            got: proof.depth,
        });
    }
    if proof.values.len() != positions.len() || proof.nodes.len() != positions.len() {
        return Err(MerkleError::ShapeMismatch);
    }

    let mut entries: Vec<(usize, usize, [u8; DIGEST_SIZE])> = positions
        .iter()
        .enumerate()
        .map(|(column, &position)| (position, column, algorithm.hash(&proof.values[column])))
        .collect();
    let mut cursors = vec![0usize; positions.len()];

    for _ in 0..proof.depth {
        let mut next = Vec::with_capacity(entries.len());
        let mut i = 0;
        while i < entries.len() {
            let (index, column, hash) = entries[i];
            let sibling = index ^ 1;
            let parent = if i + 1 < entries.len() && entries[i + 1].0 == sibling {
                let paired = algorithm.hash_parts(&[&hash, &entries[i + 1].2]);
                i += 2;
                paired
            } else {
                let node = *proof.nodes[column]
                    .get(cursors[column])
                    .ok_or(MerkleError::NodeCountMismatch)?;
                cursors[column] += 1;
                i += 1;
                if index & 1 == 0 {
                    algorithm.hash_parts(&[&hash, &node])
                } else {
                    algorithm.hash_parts(&[&node, &hash])
                }
            };
            next.push((index >> 1, column, parent));
        }
        entries = next;
    }

    for (column, cursor) in cursors.iter().enumerate() {
        if *cursor != proof.nodes[column].len() {
            return Err(MerkleError::NodeCountMismatch);
        }
    }

    if entries.len() != 1 || entries[0].2 != *root {
        return Err(MerkleError::RootMismatch);
    }
    Ok(())
}
