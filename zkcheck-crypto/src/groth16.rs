/*!
Verification of claim proofs: a Groth16-style pairing check over BLS12-381.

A claim proof demonstrates, in zero knowledge, that the claimant holds the
secret behind a check's commitment, that the claim was authorized by a key
matching a registered [`PubkeyHash`], and that the authorization names a
specific receiver and expiry. The escrow sees only the proof elements and
the [`PublicSignals`]; it learns nothing about the secret itself.

Verification evaluates the standard equation

```text
e(A, B) = e(alpha, beta) * e(L, gamma) * e(C, delta)
```

where `L` is the public-input accumulator formed from the verifying key's
input coefficients and the scalar representation of the signals. The
[`VerifyingKey`] is fixed when an escrow instance is deployed.

Verification is exposed behind the [`ProofVerifier`] trait so protocol
tests can substitute a stub and exercise the escrow state machine without
generating real proofs.
*/

use crate::{
    commitment::{HashHead, PubkeyHash, TargetHash2},
    common::*,
    serde::SerializeElement,
    Error, Verification,
};
use ::serde::{Deserialize, Serialize};

/// Number of public signals bound by a claim proof.
pub const SIGNAL_COUNT: usize = 4;

/// The public signals accompanying a claim proof.
///
/// These are the values the proof commits to; the escrow cross-checks each
/// of them against its own state before the pairing equation is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicSignals {
    /// Latest ledger time (seconds) at which the authorization is valid.
    pub expires_at: u32,
    /// The intermediate claim digest; opens the check's commitment.
    pub target_hash2: TargetHash2,
    /// Digest of the authorizing verifier key.
    pub pubkey_hash: PubkeyHash,
    /// Truncated digest of the receiver address.
    pub receiver_address_hash_head: HashHead,
}

impl PublicSignals {
    /// The scalar representation of the signals, in the order they are fed
    /// to the pairing equation.
    ///
    /// The 256-bit digests are mapped into the field by wide reduction of
    /// their little-endian interpretation; the map need not be invertible,
    /// only deterministic and shared with the prover.
    pub fn to_scalars(&self) -> [Scalar; SIGNAL_COUNT] {
        [
            Scalar::from(u64::from(self.expires_at)),
            wide_scalar(self.target_hash2.as_bytes()),
            wide_scalar(self.pubkey_hash.as_bytes()),
            wide_scalar(self.receiver_address_hash_head.as_bytes()),
        ]
    }
}

fn wide_scalar(bytes: &[u8; 32]) -> Scalar {
    let mut wide = [0; 64];
    wide[..32].copy_from_slice(bytes);
    Scalar::from_bytes_wide(&wide)
}

/// A claim proof, as decoded from the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Proof {
    #[serde(with = "SerializeElement")]
    pi_a: G1Affine,
    #[serde(with = "SerializeElement")]
    pi_b: G2Affine,
    #[serde(with = "SerializeElement")]
    pi_c: G1Affine,
}

impl Proof {
    /// Assemble a proof from its curve elements.
    pub fn new(pi_a: G1Affine, pi_b: G2Affine, pi_c: G1Affine) -> Self {
        Proof { pi_a, pi_b, pi_c }
    }

    /// Decode a proof from the compressed encodings carried on the wire.
    ///
    /// Fails if any blob is not a canonical compressed point in the
    /// expected group.
    pub fn from_bytes(pi_a: &[u8; 48], pi_b: &[u8; 96], pi_c: &[u8; 48]) -> Result<Self, Error> {
        let pi_a = Option::from(G1Affine::from_compressed(pi_a))
            .ok_or(Error::InvalidPointEncoding("pi_a"))?;
        let pi_b = Option::from(G2Affine::from_compressed(pi_b))
            .ok_or(Error::InvalidPointEncoding("pi_b"))?;
        let pi_c = Option::from(G1Affine::from_compressed(pi_c))
            .ok_or(Error::InvalidPointEncoding("pi_c"))?;

        Ok(Proof { pi_a, pi_b, pi_c })
    }

    /// The compressed wire encoding of the proof elements.
    pub fn to_bytes(&self) -> ([u8; 48], [u8; 96], [u8; 48]) {
        (
            self.pi_a.to_compressed(),
            self.pi_b.to_compressed(),
            self.pi_c.to_compressed(),
        )
    }

    /// Check whether the proof is well-formed.
    ///
    /// This checks that the first element is not the identity; a proof with
    /// `A = 1` trivializes the left pairing and must never verify.
    pub fn is_well_formed(&self) -> bool {
        !bool::from(self.pi_a.is_identity())
    }
}

/// The fixed verification parameters of an escrow deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[allow(missing_copy_implementations)]
pub struct VerifyingKey {
    #[serde(with = "SerializeElement")]
    alpha_g1: G1Affine,
    #[serde(with = "SerializeElement")]
    beta_g2: G2Affine,
    #[serde(with = "SerializeElement")]
    gamma_g2: G2Affine,
    #[serde(with = "SerializeElement")]
    delta_g2: G2Affine,
    /// Input coefficients: one constant term plus one per public signal.
    #[serde(with = "SerializeElement")]
    ic: [G1Affine; SIGNAL_COUNT + 1],
}

#[cfg(feature = "sqlite")]
crate::impl_sqlx_for_bincode_ty!(VerifyingKey);

impl VerifyingKey {
    /// Assemble a verifying key from its curve elements.
    pub fn new(
        alpha_g1: G1Affine,
        beta_g2: G2Affine,
        gamma_g2: G2Affine,
        delta_g2: G2Affine,
        ic: [G1Affine; SIGNAL_COUNT + 1],
    ) -> Self {
        VerifyingKey {
            alpha_g1,
            beta_g2,
            gamma_g2,
            delta_g2,
            ic,
        }
    }

    /// Verify a claim proof against the given public signals.
    pub fn verify(&self, proof: &Proof, signals: &PublicSignals) -> Verification {
        if !proof.is_well_formed() {
            return Verification::Failed;
        }

        // L = ic[0] + sum( ic[i+1] * [signal i] )
        let mut accumulator = G1Projective::from(self.ic[0]);
        for (coefficient, signal) in self.ic[1..].iter().zip(signals.to_scalars().iter()) {
            accumulator += coefficient * signal;
        }

        let lhs = pairing(&proof.pi_a, &proof.pi_b);
        let rhs = pairing(&self.alpha_g1, &self.beta_g2)
            + pairing(&G1Affine::from(accumulator), &self.gamma_g2)
            + pairing(&proof.pi_c, &self.delta_g2);

        Verification::from(lhs == rhs)
    }
}

/// The seam between the escrow state machine and proof verification.
///
/// The production implementation is [`Groth16Verifier`]; test suites
/// substitute stubs to drive the state machine without real proofs.
pub trait ProofVerifier {
    /// Verify a claim proof against its public signals and a verifying key.
    fn verify(
        &self,
        proof: &Proof,
        signals: &PublicSignals,
        verifying_key: &VerifyingKey,
    ) -> Verification;
}

/// The pairing-based verifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct Groth16Verifier;

impl ProofVerifier for Groth16Verifier {
    fn verify(
        &self,
        proof: &Proof,
        signals: &PublicSignals,
        verifying_key: &VerifyingKey,
    ) -> Verification {
        verifying_key.verify(proof, signals)
    }
}
