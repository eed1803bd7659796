//! Proof wire format.
//!
//! Layout, in order: trace root and batched trace proof; composition root
//! and proof; FRI component count, then per component a column root, column
//! proof and poly proof; the raw remainder; the trace shape. Framing
//! integers are little-endian, field elements big-endian. One-byte array
//! counts use the `0 encodes 256` convention; node columns are limited to
//! 127 entries and anything larger is rejected outright.

use crate::air::trace::TraceShape;
use crate::field::StarkField;
use crate::fri::{FriLayerProof, FriProof, FOLDING_FACTOR};
use crate::merkle::BatchMerkleProof;
use crate::ser::{
    read_count256, read_digest, read_felt, read_u32, read_u8, write_count256, write_digest,
    write_felt, write_u32, write_u8, ByteReader, SerError, SerKind, SerResult,
};

use super::proof::Proof;

const MAX_NODE_COLUMN_LENGTH: usize = 127;

/// Serializes a proof for the given trace-leaf width.
pub fn write_proof<F: StarkField>(proof: &Proof<F>, ev_width: usize) -> SerResult<Vec<u8>> {
    let mut out = Vec::with_capacity(proof.size_in_bytes());
    write_digest(&mut out, &proof.ev_root);
    write_merkle_proof(&mut out, &proof.ev_proof, ev_width)?;
    write_digest(&mut out, &proof.lc_root);
    let lc_width = FOLDING_FACTOR * F::ELEMENT_BYTES;
    write_merkle_proof(&mut out, &proof.lc_proof, lc_width)?;

    if proof.fri.layers.len() > u8::MAX as usize {
        return Err(SerError::InvalidLength {
            kind: SerKind::Fri,
            field: "component count",
        });
    }
    write_u8(&mut out, proof.fri.layers.len() as u8);
    for layer in &proof.fri.layers {
        write_digest(&mut out, &layer.column_root);
        write_merkle_proof(&mut out, &layer.column_proof, lc_width)?;
        write_merkle_proof(&mut out, &layer.poly_proof, lc_width)?;
    }

    if proof.fri.remainder.is_empty() || proof.fri.remainder.len() > 256 {
        return Err(SerError::InvalidLength {
            kind: SerKind::Fri,
            field: "remainder length",
        });
    }
    write_count256(&mut out, proof.fri.remainder.len());
    for &value in &proof.fri.remainder {
        write_felt(&mut out, value);
    }

    let shape = &proof.trace_shape.0;
    if shape.is_empty() || shape.len() > u8::MAX as usize {
        return Err(SerError::InvalidLength {
            kind: SerKind::TraceShape,
            field: "depth",
        });
    }
    write_u8(&mut out, shape.len() as u8);
    for &count in shape {
        write_u32(&mut out, count);
    }
    Ok(out)
}

/// Parses a proof serialized with [`write_proof`], rejecting trailing
/// bytes.
pub fn read_proof<F: StarkField>(bytes: &[u8], ev_width: usize) -> SerResult<Proof<F>> {
    let mut cursor = ByteReader::new(bytes);
    let ev_root = read_digest(&mut cursor, SerKind::Proof, "trace root")?;
    let ev_proof = read_merkle_proof(&mut cursor, ev_width)?;
    let lc_root = read_digest(&mut cursor, SerKind::Proof, "composition root")?;
    let lc_width = FOLDING_FACTOR * F::ELEMENT_BYTES;
    let lc_proof = read_merkle_proof(&mut cursor, lc_width)?;

    let component_count = read_u8(&mut cursor, SerKind::Fri, "component count")? as usize;
    let mut layers = Vec::with_capacity(component_count);
    for _ in 0..component_count {
        let column_root = read_digest(&mut cursor, SerKind::Fri, "column root")?;
        let column_proof = read_merkle_proof(&mut cursor, lc_width)?;
        let poly_proof = read_merkle_proof(&mut cursor, lc_width)?;
        layers.push(FriLayerProof {
            column_root,
            column_proof,
            poly_proof,
        });
    }

    let remainder_length = read_count256(&mut cursor, SerKind::Fri, "remainder length")?;
    let mut remainder = Vec::with_capacity(remainder_length);
    for _ in 0..remainder_length {
        remainder.push(read_felt::<F>(&mut cursor, SerKind::Fri, "remainder value")?);
    }

    let depth = read_u8(&mut cursor, SerKind::TraceShape, "depth")? as usize;
    if depth == 0 {
        return Err(SerError::InvalidLength {
            kind: SerKind::TraceShape,
            field: "depth",
        });
    }
    let mut shape = Vec::with_capacity(depth);
    for _ in 0..depth {
        shape.push(read_u32(&mut cursor, SerKind::TraceShape, "loop count")?);
    }

    cursor.ensure_consumed()?;
    Ok(Proof {
        ev_root,
        ev_proof,
        lc_root,
        lc_proof,
        fri: FriProof { layers, remainder },
        trace_shape: TraceShape(shape),
    })
}

fn write_merkle_proof(
    out: &mut Vec<u8>,
    proof: &BatchMerkleProof,
    width: usize,
) -> SerResult<()> {
    if proof.values.is_empty() || proof.values.len() > 256 {
        return Err(SerError::InvalidLength {
            kind: SerKind::Merkle,
            field: "value count",
        });
    }
    write_count256(out, proof.values.len());
    for blob in &proof.values {
        if blob.len() != width {
            return Err(SerError::InvalidValue {
                kind: SerKind::Merkle,
                field: "leaf width",
            });
        }
        out.extend_from_slice(blob);
    }

    if proof.nodes.is_empty() || proof.nodes.len() > 256 {
        return Err(SerError::InvalidLength {
            kind: SerKind::Merkle,
            field: "node column count",
        });
    }
    write_count256(out, proof.nodes.len());
    for column in &proof.nodes {
        if column.len() > MAX_NODE_COLUMN_LENGTH {
            return Err(SerError::InvalidLength {
                kind: SerKind::Merkle,
                field: "node column length",
            });
        }
        write_u8(out, column.len() as u8);
        for node in column {
            write_digest(out, node);
        }
    }
    write_u8(out, proof.depth);
    Ok(())
}

fn read_merkle_proof(cursor: &mut ByteReader<'_>, width: usize) -> SerResult<BatchMerkleProof> {
    let value_count = read_count256(cursor, SerKind::Merkle, "value count")?;
    let mut values = Vec::with_capacity(value_count);
    for _ in 0..value_count {
        let blob = cursor.take(width, SerKind::Merkle, "leaf value")?;
        values.push(blob.to_vec());
    }

    let column_count = read_count256(cursor, SerKind::Merkle, "node column count")?;
    let mut nodes = Vec::with_capacity(column_count);
    for _ in 0..column_count {
        let length = read_u8(cursor, SerKind::Merkle, "node column length")? as usize;
        if length > MAX_NODE_COLUMN_LENGTH {
            return Err(SerError::InvalidLength {
                kind: SerKind::Merkle,
                field: "node column length",
            });
        }
        let mut column = Vec::with_capacity(length);
        for _ in 0..length {
            column.push(read_digest(cursor, SerKind::Merkle, "node")?);
        }
        nodes.push(column);
    }

    let depth = read_u8(cursor, SerKind::Merkle, "depth")?;
    Ok(BatchMerkleProof {
        values,
        nodes,
        depth,
    })
}
