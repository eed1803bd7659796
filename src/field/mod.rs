//! Prime-field capability handles used by the proving pipeline.
//!
//! The engine is generic over [`StarkField`]. A conforming field exposes
//! canonical modular arithmetic, a multiplicative generator with a known
//! 2-adic subgroup (for radix-2 NTTs), fixed-width big-endian encoding (the
//! commitment leaf convention) and uniform reduction of transcript XOF bytes.
//!
//! Three fields ship with the crate: [`F32`], [`F64`] (Goldilocks) and
//! [`F128`].

use core::fmt;
use core::ops::{Add, Mul, Neg, Sub};

mod f128;
mod f32;
mod f64;
pub mod polynomial;

pub use self::f128::F128;
pub use self::f32::F32;
pub use self::f64::F64;

/// Capability interface of a prime field with a smooth 2-adic subgroup.
pub trait StarkField:
    Copy
    + Clone
    + PartialEq
    + Eq
    + Default
    + fmt::Debug
    + fmt::Display
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
    + Send
    + Sync
    + 'static
{
    /// Prime modulus of the field.
    const MODULUS: u128;

    /// Canonical encoding width in bytes.
    const ELEMENT_BYTES: usize;

    /// Largest `v` such that `2^v` divides `MODULUS - 1`.
    const TWO_ADICITY: u32;

    /// Generator of the multiplicative group (or at minimum a quadratic
    /// non-residue, which is what exact-order root derivation requires).
    const GENERATOR: Self;

    const ZERO: Self;
    const ONE: Self;

    fn from_u64(value: u64) -> Self;

    fn from_u128(value: u128) -> Self;

    /// Canonical representative in `[0, MODULUS)`.
    fn as_u128(self) -> u128;

    /// Modular exponentiation by square-and-multiply.
    fn exp(self, power: u128) -> Self {
        let mut result = Self::ONE;
        let mut base = self;
        let mut power = power;
        while power > 0 {
            if power & 1 == 1 {
                result = result * base;
            }
            base = base * base;
            power >>= 1;
        }
        result
    }

    /// Multiplicative inverse; `None` for zero.
    fn inv(self) -> Option<Self> {
        if self == Self::ZERO {
            return None;
        }
        Some(self.exp(Self::MODULUS - 2))
    }

    /// Appends the canonical fixed-width big-endian encoding.
    fn write_be(self, out: &mut Vec<u8>) {
        let bytes = self.as_u128().to_be_bytes();
        out.extend_from_slice(&bytes[16 - Self::ELEMENT_BYTES..]);
    }

    /// Decodes a canonical big-endian element; `None` if the slice has the
    /// wrong width or encodes a value `>= MODULUS`.
    fn from_be_slice(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != Self::ELEMENT_BYTES {
            return None;
        }
        let mut value: u128 = 0;
        for &byte in bytes {
            value = (value << 8) | byte as u128;
        }
        if value >= Self::MODULUS {
            return None;
        }
        Some(Self::from_u128(value))
    }

    /// Reduces a transcript XOF block into a field element.
    ///
    /// Callers supply `2 * ELEMENT_BYTES` bytes so the reduction bias is
    /// negligible.
    fn from_xof_bytes(bytes: &[u8]) -> Self {
        let radix = Self::from_u64(256);
        let mut acc = Self::ZERO;
        for &byte in bytes {
            acc = acc * radix + Self::from_u64(byte as u64);
        }
        acc
    }

    /// Returns an element of exact multiplicative order `2^log2_order`.
    fn root_of_unity(log2_order: u32) -> Self {
        assert!(
            log2_order <= Self::TWO_ADICITY,
            "field has no subgroup of order 2^{log2_order}",
        );
        Self::GENERATOR.exp((Self::MODULUS - 1) >> log2_order)
    }
}

/// Computes the multiplicative inverse of every element, mapping zero to
/// zero. Uses a single inversion plus `3n` multiplications.
///
/// The zero-to-zero convention is what the composition pipeline relies on
/// when dividing evaluations pointwise over a domain containing zeros of the
/// divisor.
pub fn batch_inverse<F: StarkField>(values: &[F]) -> Vec<F> {
    let mut result = vec![F::ZERO; values.len()];
    let mut acc = F::ONE;
    for (slot, &value) in result.iter_mut().zip(values.iter()) {
        *slot = acc;
        if value != F::ZERO {
            acc = acc * value;
        }
    }
    let mut acc_inv = acc
        .inv()
        .expect("product of nonzero elements is nonzero");
    for (slot, &value) in result.iter_mut().zip(values.iter()).rev() {
        if value == F::ZERO {
            *slot = F::ZERO;
            continue;
        }
        *slot = *slot * acc_inv;
        acc_inv = acc_inv * value;
    }
    result
}

/// Returns `[1, base, base^2, ..., base^(length-1)]`.
pub fn get_power_series<F: StarkField>(base: F, length: usize) -> Vec<F> {
    let mut series = Vec::with_capacity(length);
    let mut acc = F::ONE;
    for _ in 0..length {
        series.push(acc);
        acc = acc * base;
    }
    series
}
