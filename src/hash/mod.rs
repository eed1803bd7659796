//! Runtime-selected hash capability.
//!
//! The hash drives both Merkle commitments and the Fiat–Shamir transcript.
//! Both supported algorithms produce 32-byte digests; the choice is part of
//! the proof parameters, so prover and verifier must agree on it.
//!
//! [`Xof`] is a deterministic counter-mode extendable output stream built
//! from the selected hash: each block is the digest of the previous state
//! concatenated with a little-endian block counter.

use blake2::Blake2s256;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Size in bytes of every supported digest.
pub const DIGEST_SIZE: usize = 32;

/// Hash function selection for commitments and the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum HashAlgorithm {
    /// SHA-256.
    #[default]
    Sha256,
    /// BLAKE2s with a 256-bit digest.
    Blake2s256,
}

impl HashAlgorithm {
    /// Hashes a single byte slice.
    pub fn hash(self, data: &[u8]) -> [u8; DIGEST_SIZE] {
        self.hash_parts(&[data])
    }

    /// Hashes the concatenation of the given parts without materialising it.
    pub fn hash_parts(self, parts: &[&[u8]]) -> [u8; DIGEST_SIZE] {
        match self {
            HashAlgorithm::Sha256 => {
                let mut hasher = Sha256::new();
                for part in parts {
                    hasher.update(part);
                }
                hasher.finalize().into()
            }
            HashAlgorithm::Blake2s256 => {
                let mut hasher = Blake2s256::new();
                for part in parts {
                    hasher.update(part);
                }
                hasher.finalize().into()
            }
        }
    }

    /// Creates a deterministic output stream seeded by `seed`.
    pub fn xof(self, seed: &[u8]) -> Xof {
        Xof {
            algorithm: self,
            state: self.hash_parts(&[seed, b"/XOF"]),
            counter: 0,
        }
    }
}

/// Counter-mode extendable output stream over the selected hash.
#[derive(Debug, Clone)]
pub struct Xof {
    algorithm: HashAlgorithm,
    state: [u8; DIGEST_SIZE],
    counter: u64,
}

impl Xof {
    fn squeeze_block(&mut self) -> [u8; DIGEST_SIZE] {
        let block = self
            .algorithm
            .hash_parts(&[&self.state, &self.counter.to_le_bytes()]);
        self.state = block;
        self.counter = self.counter.wrapping_add(1);
        block
    }

    /// Returns the next 64 bits of the stream.
    pub fn next_u64(&mut self) -> u64 {
        let block = self.squeeze_block();
        u64::from_le_bytes(block[0..8].try_into().expect("8-byte slice"))
    }

    /// Fills `output` with bytes from the stream.
    pub fn fill(&mut self, output: &mut [u8]) {
        let mut remaining = output;
        while !remaining.is_empty() {
            let block = self.squeeze_block();
            let take = remaining.len().min(block.len());
            let (dst, rest) = remaining.split_at_mut(take);
            dst.copy_from_slice(&block[..take]);
            remaining = rest;
        }
    }
}
