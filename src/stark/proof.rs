//! The proof object.

use crate::air::trace::TraceShape;
use crate::field::StarkField;
use crate::fri::FriProof;
use crate::merkle::BatchMerkleProof;

/// A complete STARK proof.
///
/// `ev_proof.values` holds the spot-checked trace leaves (state, input and
/// secret register values per queried position); `lc_proof` opens the
/// composition commitment at the same spot-check positions; `fri` carries
/// the low-degree argument; `trace_shape` records how the input streams
/// were unrolled so the verifier can recover the trace length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proof<F: StarkField> {
    pub ev_root: [u8; 32],
    pub ev_proof: BatchMerkleProof,
    pub lc_root: [u8; 32],
    pub lc_proof: BatchMerkleProof,
    pub fri: FriProof<F>,
    pub trace_shape: TraceShape,
}

impl<F: StarkField> Proof<F> {
    /// Serialized size in bytes; always equal to `serialize(...)`'s length.
    pub fn size_in_bytes(&self) -> usize {
        let merkle = |proof: &BatchMerkleProof| {
            let values: usize = proof.values.iter().map(|blob| blob.len()).sum();
            let nodes: usize = proof
                .nodes
                .iter()
                .map(|column| 1 + 32 * column.len())
                .sum::<usize>();
            1 + values + 1 + nodes + 1
        };
        let mut size = 32 + merkle(&self.ev_proof);
        size += 32 + merkle(&self.lc_proof);
        size += 1;
        for layer in &self.fri.layers {
            size += 32 + merkle(&layer.column_proof) + merkle(&layer.poly_proof);
        }
        size += 1 + self.fri.remainder.len() * F::ELEMENT_BYTES;
        size += 1 + self.trace_shape.0.len() * 4;
        size
    }
}
