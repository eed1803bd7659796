#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

//! Transparent STARK proving and verification engine.
//!
//! The crate consumes a constraint system expressed as an algebraic
//! intermediate representation (an [`Air`] implementation), executes it over
//! input streams to produce an execution trace, and emits a compact proof
//! that the trace satisfies every transition and boundary constraint. The
//! proof is verified in sublinear time from the committed Merkle roots, a
//! handful of spot-checked trace rows and a FRI low-degree argument over the
//! constraint composition polynomial.
//!
//! The pipeline is deterministic end to end: all verifier challenges are
//! derived from a Fiat–Shamir [`transcript::Transcript`] seeded by the
//! protocol parameters and the committed roots, so two proving runs over
//! identical inputs produce byte-identical proofs.
//!
//! ```
//! use airstark::{Assertion, InputTree, ProofOptions, Stark, StarkField};
//! use airstark::air::example::FibAir;
//! use airstark::field::F32;
//!
//! let stark = Stark::new(FibAir::new(64), ProofOptions::default()).unwrap();
//! let assertions = vec![
//!     Assertion::new(0, 0, F32::from_u64(1)),
//!     Assertion::new(1, 0, F32::from_u64(1)),
//!     Assertion::new(1, 63, F32::from_u64(1_783_540_607)),
//! ];
//! let inputs = InputTree::group(vec![InputTree::tuple(vec![
//!     F32::from_u64(1),
//!     F32::from_u64(1),
//! ])]);
//! let proof = stark.prove(&assertions, &inputs, &[], &[]).unwrap();
//! assert!(stark.verify(&assertions, &proof, &[]).is_ok());
//! ```

pub mod air;
pub mod fft;
pub mod field;
pub mod fri;
pub mod hash;
pub mod merkle;
pub mod ser;
pub mod stark;
pub mod transcript;
pub mod utils;

pub use air::{Air, Assertion, InputError, InputTree, RegisterCounts};
pub use field::StarkField;
pub use hash::HashAlgorithm;
pub use stark::{ConfigError, Proof, ProofOptions, ProverError, Stark, VerifyError};
