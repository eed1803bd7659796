//! FRI prover: folding commitments and query openings.

use crate::field::StarkField;
use crate::hash::HashAlgorithm;
use crate::merkle::MerkleTree;
use crate::transcript::{Transcript, TranscriptLabel};

use super::proof::{FriLayerProof, FriProof};
use super::{
    check_remainder_degree, final_degree_bound, fold_layer, num_layers, to_quartic_leaves,
    FriError, FOLDING_FACTOR,
};

struct CommittedLayer<F: StarkField> {
    values: Vec<F>,
    leaves: Vec<Vec<u8>>,
    tree: MerkleTree,
}

/// All folding layers with their trees, retained between the commit and
/// open phases.
pub struct FriCommitment<F: StarkField> {
    layers: Vec<CommittedLayer<F>>,
    remainder: Vec<F>,
}

impl<F: StarkField> FriCommitment<F> {
    pub fn remainder(&self) -> &[F] {
        &self.remainder
    }

    /// Row count of the first layer, the query position range.
    pub fn first_layer_rows(&self) -> usize {
        self.layers[0].values.len() / FOLDING_FACTOR
    }

    /// Opens the first-layer tree (the composition commitment) directly,
    /// for the spot-check protocol.
    pub fn prove_first_layer(
        &self,
        positions: &[usize],
    ) -> Result<crate::merkle::BatchMerkleProof, crate::merkle::MerkleError> {
        self.layers[0].tree.prove_batch(positions, &self.layers[0].leaves)
    }
}

/// Folds the committed codeword down to the remainder, absorbing each
/// column root and drawing each fold challenge in canonical order.
///
/// The first layer's tree is the composition commitment; its root has
/// already been absorbed by the caller. The prover re-checks the remainder
/// degree so an unsatisfiable composition is rejected before a proof is
/// emitted.
pub fn commit<F: StarkField>(
    first_values: Vec<F>,
    first_leaves: Vec<Vec<u8>>,
    first_tree: MerkleTree,
    omega: F,
    max_degree: usize,
    exclude_multiples_of: usize,
    algorithm: HashAlgorithm,
    transcript: &mut Transcript,
) -> Result<FriCommitment<F>, FriError> {
    let layer_count = num_layers(first_values.len());
    let mut layers = Vec::with_capacity(layer_count + 1);
    layers.push(CommittedLayer {
        values: first_values,
        leaves: first_leaves,
        tree: first_tree,
    });

    let mut domain_root = omega;
    for layer in 0..layer_count {
        let challenge: F =
            transcript.challenge_felt(TranscriptLabel::FriFoldChallenge(layer as u8))?;
        let source = layers.last().expect("at least the first layer");
        let column = fold_layer(&source.values, challenge, domain_root);
        domain_root = domain_root.exp(FOLDING_FACTOR as u128);

        let leaves = to_quartic_leaves(&column);
        let tree = MerkleTree::build(algorithm, &leaves)?;
        transcript.absorb_digest(TranscriptLabel::FriLayerRoot(layer as u8), &tree.root())?;
        layers.push(CommittedLayer {
            values: column,
            leaves,
            tree,
        });
    }

    let remainder = layers
        .last()
        .expect("at least the first layer")
        .values
        .clone();
    check_remainder_degree(
        &remainder,
        domain_root,
        final_degree_bound(max_degree, layer_count),
        exclude_multiples_of,
    )?;

    Ok(FriCommitment { layers, remainder })
}

/// Opens every layer at the queried rows.
///
/// `positions` index the first layer's rows; deeper layers fold them by
/// reduction modulo the shrinking row count.
pub fn open<F: StarkField>(
    commitment: &FriCommitment<F>,
    positions: &[usize],
) -> Result<FriProof<F>, FriError> {
    let mut current = sorted_unique(positions);
    let mut proof_layers = Vec::with_capacity(commitment.layers.len() - 1);
    for window in commitment.layers.windows(2) {
        let source = &window[0];
        let column = &window[1];
        let next_rows = column.values.len() / FOLDING_FACTOR;
        let next_positions = sorted_unique(&current.iter().map(|p| p % next_rows).collect::<Vec<_>>());

        let poly_proof = source.tree.prove_batch(&current, &source.leaves)?;
        let column_proof = column.tree.prove_batch(&next_positions, &column.leaves)?;
        proof_layers.push(FriLayerProof {
            column_root: column.tree.root(),
            column_proof,
            poly_proof,
        });
        current = next_positions;
    }

    Ok(FriProof {
        layers: proof_layers,
        remainder: commitment.remainder.clone(),
    })
}

pub(crate) fn sorted_unique(positions: &[usize]) -> Vec<usize> {
    let mut sorted = positions.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    sorted
}
