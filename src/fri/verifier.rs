//! FRI verifier.

use crate::field::StarkField;
use crate::hash::HashAlgorithm;
use crate::merkle::{verify_batch, MerkleTree};

use super::prover::sorted_unique;
use super::proof::FriProof;
use super::{
    check_remainder_degree, final_degree_bound, fold_row, num_layers, to_quartic_leaves, FriError,
    FOLDING_FACTOR,
};

/// Parameters the verifier derives from the proof context.
pub struct FriVerifierParams {
    /// Size of the committed evaluation domain.
    pub domain_size: usize,
    /// Inclusive degree bound of the first-layer codeword.
    pub max_degree: usize,
    /// Positions to exclude from the remainder degree check (the extension
    /// factor).
    pub exclude_multiples_of: usize,
    pub algorithm: HashAlgorithm,
}

/// Verifies a FRI argument.
///
/// `first_root` is the composition commitment, `fold_challenges` the
/// transcript-replayed challenges and `positions` the first-layer query
/// rows.
pub fn verify<F: StarkField>(
    proof: &FriProof<F>,
    first_root: [u8; 32],
    fold_challenges: &[F],
    positions: &[usize],
    omega: F,
    params: &FriVerifierParams,
) -> Result<(), FriError> {
    let layer_count = num_layers(params.domain_size);
    if proof.layers.len() != layer_count {
        return Err(FriError::LayerCountMismatch {
            expected: layer_count,
            got: proof.layers.len(),
        });
    }
    if fold_challenges.len() != layer_count {
        return Err(FriError::ChallengeCountMismatch {
            expected: layer_count,
            got: fold_challenges.len(),
        });
    }
    let expected_remainder = params.domain_size >> (2 * layer_count);
    if proof.remainder.len() != expected_remainder {
        return Err(FriError::RemainderLengthMismatch {
            expected: expected_remainder,
            got: proof.remainder.len(),
        });
    }

    let quarter_inv = F::from_u64(4).inv().expect("4 is invertible");
    let mut current = sorted_unique(positions);
    let mut rows = params.domain_size / FOLDING_FACTOR;
    let mut domain_root = omega;
    let mut source_root = first_root;

    for (layer, layer_proof) in proof.layers.iter().enumerate() {
        let next_rows = rows / FOLDING_FACTOR;
        let next_positions =
            sorted_unique(&current.iter().map(|p| p % next_rows).collect::<Vec<_>>());

        verify_batch(
            params.algorithm,
            &source_root,
            &current,
            &layer_proof.poly_proof,
            rows,
        )
        .map_err(|_| FriError::Commitment { layer })?;
        verify_batch(
            params.algorithm,
            &layer_proof.column_root,
            &next_positions,
            &layer_proof.column_proof,
            next_rows,
        )
        .map_err(|_| FriError::Commitment { layer })?;

        let source_rows = parse_rows::<F>(&layer_proof.poly_proof.values, layer)?;
        let column_rows = parse_rows::<F>(&layer_proof.column_proof.values, layer)?;

        let mu = domain_root.exp(rows as u128);
        let mu_inv = mu.inv().expect("fourth root of unity is nonzero");
        for (&position, values) in current.iter().zip(source_rows.iter()) {
            let x_inv = domain_root
                .exp(position as u128)
                .inv()
                .expect("domain point is nonzero");
            let folded = fold_row(values, x_inv, fold_challenges[layer], mu_inv, quarter_inv);

            let column_index = next_positions
                .binary_search(&(position % next_rows))
                .expect("folded position present by construction");
            let committed = column_rows[column_index][position / next_rows];
            if folded != committed {
                return Err(FriError::FoldMismatch { layer, position });
            }
        }

        source_root = layer_proof.column_root;
        current = next_positions;
        rows = next_rows;
        domain_root = domain_root.exp(FOLDING_FACTOR as u128);
    }

    // the remainder must reproduce the last committed tree bit for bit
    let leaves = to_quartic_leaves(&proof.remainder);
    let tree = MerkleTree::build(params.algorithm, &leaves)?;
    if tree.root() != source_root {
        return Err(FriError::RemainderCommitment);
    }

    check_remainder_degree(
        &proof.remainder,
        domain_root,
        final_degree_bound(params.max_degree, layer_count),
        params.exclude_multiples_of,
    )
}

fn parse_rows<F: StarkField>(blobs: &[Vec<u8>], layer: usize) -> Result<Vec<[F; 4]>, FriError> {
    blobs
        .iter()
        .map(|blob| {
            if blob.len() != FOLDING_FACTOR * F::ELEMENT_BYTES {
                return Err(FriError::MalformedLeaf { layer });
            }
            let mut row = [F::ZERO; 4];
            for (slot, chunk) in row.iter_mut().zip(blob.chunks(F::ELEMENT_BYTES)) {
                *slot = F::from_be_slice(chunk).ok_or(FriError::MalformedLeaf { layer })?;
            }
            Ok(row)
        })
        .collect()
}
