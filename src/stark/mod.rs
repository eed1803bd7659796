//! The public proving and verification engine.

use core::marker::PhantomData;

use crate::air::context::{composition_factor, validate_extension_factor};
use crate::air::trace::TraceShape;
use crate::air::{Air, Assertion, InputTree, RegisterCounts};
use crate::field::StarkField;
use crate::hash::HashAlgorithm;
use crate::ser::SerResult;

mod errors;
mod options;
mod proof;
mod prover;
mod ser;
mod verifier;

pub use errors::{ProverError, VerifyError};
pub use options::{
    ConfigError, ProofOptions, DEFAULT_EXE_QUERY_COUNT, DEFAULT_FRI_QUERY_COUNT,
    MAX_EXE_QUERY_COUNT, MAX_FRI_QUERY_COUNT,
};
pub use proof::Proof;

/// A STARK engine bound to one AIR and one parameter set.
///
/// Construction performs all configuration validation; afterwards `prove`
/// and `verify` can only fail for input or proof reasons.
pub struct Stark<F: StarkField, A: Air<F>> {
    air: A,
    extension_factor: usize,
    composition_factor: usize,
    exe_query_count: usize,
    fri_query_count: usize,
    hash: HashAlgorithm,
    _field: PhantomData<F>,
}

impl<F: StarkField, A: Air<F>> Stark<F, A> {
    pub fn new(air: A, options: ProofOptions) -> Result<Self, ConfigError> {
        let counts = air.register_counts();
        if counts.state == 0 {
            return Err(ConfigError::NoStateRegisters);
        }
        if air.loop_depth() == 0 {
            return Err(ConfigError::ZeroLoopDepth);
        }
        let steps = air.steps_per_segment();
        if steps == 0 || !steps.is_power_of_two() {
            return Err(ConfigError::InvalidSegmentSteps { got: steps });
        }

        let k1 = composition_factor(&air.constraint_degrees())?;
        let extension_factor = options.extension_factor.unwrap_or(2 * k1);
        validate_extension_factor(extension_factor, k1)?;

        if options.exe_query_count == 0 || options.exe_query_count > MAX_EXE_QUERY_COUNT {
            return Err(ConfigError::ExeQueryCount {
                got: options.exe_query_count,
            });
        }
        if options.fri_query_count == 0 || options.fri_query_count > MAX_FRI_QUERY_COUNT {
            return Err(ConfigError::FriQueryCount {
                got: options.fri_query_count,
            });
        }

        Ok(Self {
            air,
            extension_factor,
            composition_factor: k1,
            exe_query_count: options.exe_query_count,
            fri_query_count: options.fri_query_count,
            hash: options.hash,
            _field: PhantomData,
        })
    }

    pub fn air(&self) -> &A {
        &self.air
    }

    pub fn extension_factor(&self) -> usize {
        self.extension_factor
    }

    pub fn hash_algorithm(&self) -> HashAlgorithm {
        self.hash
    }

    /// Estimated soundness in bits: FRI query soundness capped by the
    /// 128-bit collision security of the 256-bit hashes.
    pub fn security_level(&self) -> u32 {
        let bits_per_query = (self.extension_factor / self.composition_factor)
            .trailing_zeros()
            .max(1);
        (self.fri_query_count as u32 * bits_per_query).min(128)
    }

    /// Generates a proof that executing the AIR over `inputs` yields a
    /// trace satisfying every transition constraint and `assertions`.
    pub fn prove(
        &self,
        assertions: &[Assertion<F>],
        inputs: &InputTree<F>,
        public_aux: &[Vec<F>],
        secret_aux: &[Vec<F>],
    ) -> Result<Proof<F>, ProverError> {
        prover::prove(self, assertions, inputs, public_aux, secret_aux)
    }

    /// Verifies a proof against `assertions` and the public auxiliary
    /// patterns. The diagnostic reason travels in the error.
    pub fn verify(
        &self,
        assertions: &[Assertion<F>],
        proof: &Proof<F>,
        public_aux: &[Vec<F>],
    ) -> Result<(), VerifyError> {
        verifier::verify(self, assertions, proof, public_aux)
    }

    /// Serializes a proof into the wire format.
    pub fn serialize(&self, proof: &Proof<F>) -> SerResult<Vec<u8>> {
        ser::write_proof(proof, self.ev_leaf_width())
    }

    /// Parses a proof from the wire format, rejecting malformed buffers.
    pub fn parse(&self, bytes: &[u8]) -> SerResult<Proof<F>> {
        ser::read_proof(bytes, self.ev_leaf_width())
    }

    /// Serialized proof size in bytes.
    pub fn size_of(&self, proof: &Proof<F>) -> usize {
        proof.size_in_bytes()
    }

    fn counts(&self) -> RegisterCounts {
        self.air.register_counts()
    }

    fn ev_leaf_width(&self) -> usize {
        self.counts().committed() * F::ELEMENT_BYTES
    }

    /// Indices of the committed trace rows: state, input and secret
    /// registers, skipping the verifier-derivable public registers.
    fn committed_row_indices(&self) -> Vec<usize> {
        let counts = self.counts();
        let mut rows: Vec<usize> = (0..counts.state + counts.input).collect();
        rows.extend(counts.state + counts.input + counts.public..counts.total());
        rows
    }

    /// Canonical encoding of all public parameters, the transcript seed.
    fn parameter_bytes(&self) -> Vec<u8> {
        let counts = self.counts();
        let mut bytes = Vec::with_capacity(96);
        bytes.extend_from_slice(&F::MODULUS.to_be_bytes());
        bytes.push(F::ELEMENT_BYTES as u8);
        bytes.extend_from_slice(&(self.extension_factor as u32).to_le_bytes());
        bytes.extend_from_slice(&(self.exe_query_count as u32).to_le_bytes());
        bytes.extend_from_slice(&(self.fri_query_count as u32).to_le_bytes());
        bytes.push(match self.hash {
            HashAlgorithm::Sha256 => 1,
            HashAlgorithm::Blake2s256 => 2,
        });
        for count in [counts.state, counts.input, counts.public, counts.secret] {
            bytes.extend_from_slice(&(count as u32).to_le_bytes());
        }
        let degrees = self.air.constraint_degrees();
        bytes.extend_from_slice(&(degrees.len() as u32).to_le_bytes());
        for degree in degrees {
            bytes.extend_from_slice(&(degree as u32).to_le_bytes());
        }
        bytes.extend_from_slice(&(self.air.steps_per_segment() as u32).to_le_bytes());
        bytes.extend_from_slice(&(self.air.loop_depth() as u32).to_le_bytes());
        bytes
    }

    /// Digest binding assertions, public auxiliary patterns and the trace
    /// shape; the first transcript absorption.
    fn public_input_digest(
        &self,
        assertions: &[Assertion<F>],
        public_aux: &[Vec<F>],
        shape: &TraceShape,
    ) -> [u8; 32] {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(assertions.len() as u32).to_le_bytes());
        for assertion in assertions {
            bytes.extend_from_slice(&(assertion.register as u32).to_le_bytes());
            bytes.extend_from_slice(&(assertion.step as u32).to_le_bytes());
            assertion.value.write_be(&mut bytes);
        }
        bytes.extend_from_slice(&(public_aux.len() as u32).to_le_bytes());
        for pattern in public_aux {
            bytes.extend_from_slice(&(pattern.len() as u32).to_le_bytes());
            for &value in pattern {
                value.write_be(&mut bytes);
            }
        }
        bytes.push(shape.0.len() as u8);
        for &count in &shape.0 {
            bytes.extend_from_slice(&count.to_le_bytes());
        }
        self.hash.hash(&bytes)
    }
}

/// Spot-check positions plus their next-row companions, sorted and
/// deduplicated for the trace-tree opening.
fn augmented_positions(positions: &[usize], extension_factor: usize, domain_size: usize) -> Vec<usize> {
    let mut augmented = Vec::with_capacity(positions.len() * 2);
    for &position in positions {
        augmented.push(position);
        augmented.push((position + extension_factor) % domain_size);
    }
    augmented.sort_unstable();
    augmented.dedup();
    augmented
}

/// Composition-tree leaf indices covering the spot-check positions.
fn lc_positions(positions: &[usize], quarter: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = positions.iter().map(|&p| p % quarter).collect();
    indices.sort_unstable();
    indices.dedup();
    indices
}
