/*!
This crate provides the cryptographic toolkit used by the zkCheck escrow
protocol:

- Claim commitments: the hash chain that binds an escrowed check to its
  secret claim conditions, and the auxiliary digests (pubkey hashes,
  address hash heads) carried in a claim's public signals.
- Verification of claim proofs: a Groth16-style pairing equation over
  BLS12-381 evaluated against a fixed, per-deployment verifying key.

Proof *generation* is deliberately absent. The escrow only ever checks a
proof built elsewhere, so the verification side is exposed as a pure
function behind the [`ProofVerifier`](groth16::ProofVerifier) trait and
can be substituted in tests.
*/

#![warn(missing_docs)]
#![warn(missing_copy_implementations, missing_debug_implementations)]
#![warn(unused_qualifications, unused_results)]
#![warn(future_incompatible)]
#![warn(unused)]
#![forbid(rustdoc::broken_intra_doc_links)]

pub mod commitment;
pub mod groth16;

mod serde;

#[cfg(feature = "sqlite")]
mod sqlite;

pub use crate::serde::SerializeElement;

use thiserror::*;

/// Error types that may arise when handling proof material.
#[derive(Debug, Error, Clone, Copy)]
pub enum Error {
    /// Caused by bytes that are not the canonical compressed encoding of a
    /// curve point.
    #[error("invalid curve point encoding for {0}")]
    InvalidPointEncoding(&'static str),
}

/// The result of a verification of some property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "the result of a verification should always be checked"]
pub enum Verification {
    /// A verification succeeded.
    Verified,
    /// A verification failed.
    Failed,
}

impl From<bool> for Verification {
    fn from(verified: bool) -> Self {
        if verified {
            Verification::Verified
        } else {
            Verification::Failed
        }
    }
}

impl Verification {
    /// True if the verification succeeded.
    pub fn is_verified(self) -> bool {
        matches!(self, Verification::Verified)
    }
}

/// Trait synonym for a cryptographically secure random number generator.
pub trait Rng: rand::CryptoRng + rand::RngCore {}
impl<T: rand::CryptoRng + rand::RngCore> Rng for T {}

mod common {
    //! Common types used internally.

    pub use bls12_381::{pairing, G1Affine, G1Projective, G2Affine, G2Projective, Scalar};
}
