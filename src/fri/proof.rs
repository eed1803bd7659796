//! FRI proof containers.

use crate::field::StarkField;
use crate::merkle::BatchMerkleProof;

/// Commitments and openings produced by one fold.
///
/// `poly_proof` opens the source tree (the composition tree for the first
/// fold, otherwise the previous column tree) at the queried rows;
/// `column_proof` opens the column tree holding the folded values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FriLayerProof {
    pub column_root: [u8; 32],
    pub column_proof: BatchMerkleProof,
    pub poly_proof: BatchMerkleProof,
}

/// Complete FRI argument: one component per fold plus the raw remainder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FriProof<F: StarkField> {
    pub layers: Vec<FriLayerProof>,
    pub remainder: Vec<F>,
}
