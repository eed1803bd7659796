//! Canonical byte-level serialization vocabulary.
//!
//! Framing integers are little-endian; field elements are fixed-width
//! big-endian and validated for canonicality on read. Decoders operate on a
//! bounds-checked [`ByteReader`] and reject truncated buffers, out-of-range
//! counts and trailing bytes.

use core::fmt;

use crate::field::StarkField;

/// Size in bytes of every digest handled by the proof system.
pub const DIGEST_SIZE: usize = 32;

/// Context markers used when reporting serialization failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerKind {
    /// Top-level proof framing.
    Proof,
    /// Batched Merkle proof section.
    Merkle,
    /// FRI component payload.
    Fri,
    /// Trace shape trailer.
    TraceShape,
}

impl fmt::Display for SerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerKind::Proof => write!(f, "proof"),
            SerKind::Merkle => write!(f, "merkle proof"),
            SerKind::Fri => write!(f, "fri proof"),
            SerKind::TraceShape => write!(f, "trace shape"),
        }
    }
}

/// Canonical serialization error surfaced while encoding or decoding data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerError {
    /// Input ended before the expected number of bytes were read.
    UnexpectedEnd {
        kind: SerKind,
        field: &'static str,
    },
    /// A length prefix exceeded the configured bounds.
    InvalidLength {
        kind: SerKind,
        field: &'static str,
    },
    /// Encountered an out-of-range or non-canonical value.
    InvalidValue {
        kind: SerKind,
        field: &'static str,
    },
    /// Additional bytes remained after consuming the expected payload.
    TrailingBytes { consumed: usize, remaining: usize },
}

impl fmt::Display for SerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerError::UnexpectedEnd { kind, field } => {
                write!(f, "unexpected end of input in {kind} while reading {field}")
            }
            SerError::InvalidLength { kind, field } => {
                write!(f, "invalid length prefix in {kind} for {field}")
            }
            SerError::InvalidValue { kind, field } => {
                write!(f, "invalid value in {kind} for {field}")
            }
            SerError::TrailingBytes {
                consumed,
                remaining,
            } => {
                write!(
                    f,
                    "{remaining} trailing bytes after consuming {consumed} bytes"
                )
            }
        }
    }
}

impl std::error::Error for SerError {}

/// Convenient alias for serialization results.
pub type SerResult<T> = Result<T, SerError>;

/// Bounds-checked forward cursor over a byte slice.
pub struct ByteReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// Takes exactly `count` bytes, failing if the buffer is exhausted.
    pub fn take(
        &mut self,
        count: usize,
        kind: SerKind,
        field: &'static str,
    ) -> SerResult<&'a [u8]> {
        if self.remaining() < count {
            return Err(SerError::UnexpectedEnd { kind, field });
        }
        let slice = &self.data[self.position..self.position + count];
        self.position += count;
        Ok(slice)
    }

    /// Fails unless the entire buffer has been consumed.
    pub fn ensure_consumed(&self) -> SerResult<()> {
        if self.remaining() != 0 {
            return Err(SerError::TrailingBytes {
                consumed: self.position,
                remaining: self.remaining(),
            });
        }
        Ok(())
    }
}

pub fn write_u8(out: &mut Vec<u8>, value: u8) {
    out.push(value);
}

pub fn read_u8(cursor: &mut ByteReader<'_>, kind: SerKind, field: &'static str) -> SerResult<u8> {
    Ok(cursor.take(1, kind, field)?[0])
}

pub fn write_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

pub fn read_u32(cursor: &mut ByteReader<'_>, kind: SerKind, field: &'static str) -> SerResult<u32> {
    let bytes = cursor.take(4, kind, field)?;
    Ok(u32::from_le_bytes(bytes.try_into().expect("4-byte slice")))
}

pub fn write_digest(out: &mut Vec<u8>, digest: &[u8; DIGEST_SIZE]) {
    out.extend_from_slice(digest);
}

pub fn read_digest(
    cursor: &mut ByteReader<'_>,
    kind: SerKind,
    field: &'static str,
) -> SerResult<[u8; DIGEST_SIZE]> {
    let bytes = cursor.take(DIGEST_SIZE, kind, field)?;
    Ok(bytes.try_into().expect("digest-size slice"))
}

/// Writes a field element in canonical big-endian order.
pub fn write_felt<F: StarkField>(out: &mut Vec<u8>, value: F) {
    value.write_be(out);
}

/// Reads a canonical big-endian field element, rejecting values `>= p`.
pub fn read_felt<F: StarkField>(
    cursor: &mut ByteReader<'_>,
    kind: SerKind,
    field: &'static str,
) -> SerResult<F> {
    let bytes = cursor.take(F::ELEMENT_BYTES, kind, field)?;
    F::from_be_slice(bytes).ok_or(SerError::InvalidValue { kind, field })
}

/// Writes a count in the 1-byte convention where 0 encodes 256.
///
/// `count` must be in `[1, 256]`.
pub fn write_count256(out: &mut Vec<u8>, count: usize) {
    debug_assert!((1..=256).contains(&count));
    out.push((count % 256) as u8);
}

/// Reads a 1-byte count where 0 encodes 256.
pub fn read_count256(
    cursor: &mut ByteReader<'_>,
    kind: SerKind,
    field: &'static str,
) -> SerResult<usize> {
    let raw = read_u8(cursor, kind, field)?;
    Ok(if raw == 0 { 256 } else { raw as usize })
}
