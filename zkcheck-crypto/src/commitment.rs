/*!
Claim commitments: the hash values that bind an escrowed check to its claim
conditions.

A check is opened against a 256-bit commitment, [`TargetHash3`]. The claim
secret is never revealed on-ledger; instead, the claimant's proof exposes
the intermediate digest [`TargetHash2`] as a public signal, and the escrow
recomputes the commitment from that signal and the check's [`Salt`]:

```text
target_hash3 = SHA3-256( target_hash2 || salt )
```

The pair satisfies the usual hash-lock properties:

*Correctness*: a commitment derived from a digest and salt always matches.

*Security*: given a commitment, an adversary can produce a matching
(digest, salt) pair with only negligible probability.

The salt is drawn per check, so a digest published while cashing one check
cannot be replayed against another check built from the same secret.
*/

use crate::Verification;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};

/// Per-check 128-bit salt, chosen by the check creator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Salt([u8; 16]);

impl Salt {
    /// Construct a salt from its big-endian byte representation.
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Salt(bytes)
    }

    /// The big-endian byte representation of the salt.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

/// The intermediate claim digest, revealed as a public signal while cashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetHash2([u8; 32]);

impl TargetHash2 {
    /// Construct a digest from its big-endian byte representation.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        TargetHash2(bytes)
    }

    /// The big-endian byte representation of the digest.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// The commitment stored in an open check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetHash3([u8; 32]);

impl TargetHash3 {
    /// Construct a commitment from its big-endian byte representation.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        TargetHash3(bytes)
    }

    /// The big-endian byte representation of the commitment.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Derive the commitment for a claim digest under the given salt.
    pub fn derive(digest: &TargetHash2, salt: &Salt) -> Self {
        let mut hasher = Sha3_256::new();
        hasher.update(digest.as_bytes());
        hasher.update(salt.as_bytes());

        let mut bytes = [0; 32];
        bytes.copy_from_slice(&hasher.finalize());
        TargetHash3(bytes)
    }

    /// Check that a revealed claim digest opens this commitment under the
    /// given salt.
    pub fn matches(&self, digest: &TargetHash2, salt: &Salt) -> Verification {
        Verification::from(*self == TargetHash3::derive(digest, salt))
    }
}

/// SHA3-256 digest of an authorized verifier's public key.
///
/// The escrow registry stores only these digests; raw key material never
/// appears on-ledger. Authority over a check is demonstrated by a proof,
/// not by revealing the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PubkeyHash([u8; 32]);

impl PubkeyHash {
    /// Construct a pubkey hash from its big-endian byte representation.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        PubkeyHash(bytes)
    }

    /// The big-endian byte representation of the hash.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Digest a verifier's public key encoding.
    pub fn digest(key: &[u8]) -> Self {
        let mut bytes = [0; 32];
        bytes.copy_from_slice(&Sha3_256::digest(key));
        PubkeyHash(bytes)
    }
}

/// Truncated digest of a receiver address, as carried in a claim's public
/// signals.
///
/// Only the first 128 bits of the SHA3-256 digest are significant; the tail
/// is zero. The truncation keeps the signal well inside the scalar field of
/// the proof system regardless of how the prover encodes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashHead([u8; 32]);

impl HashHead {
    /// Construct a hash head from its 256-bit wire representation.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        HashHead(bytes)
    }

    /// The 256-bit wire representation of the hash head.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Digest arbitrary bytes and keep the head.
    pub fn of(bytes: &[u8]) -> Self {
        let digest = Sha3_256::digest(bytes);
        let mut head = [0; 32];
        head[..16].copy_from_slice(&digest[..16]);
        HashHead(head)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn commitment_is_correct() {
        let digest = TargetHash2::from_bytes([0x17; 32]);
        let salt = Salt::from_bytes([0x2b; 16]);

        let commitment = TargetHash3::derive(&digest, &salt);
        assert!(commitment.matches(&digest, &salt).is_verified());
    }

    #[test]
    fn commitment_does_not_open_on_wrong_digest() {
        let digest = TargetHash2::from_bytes([0x17; 32]);
        let salt = Salt::from_bytes([0x2b; 16]);

        let commitment = TargetHash3::derive(&digest, &salt);
        let bad_digest = TargetHash2::from_bytes([0x18; 32]);
        assert!(!commitment.matches(&bad_digest, &salt).is_verified());
    }

    #[test]
    fn commitment_does_not_open_on_wrong_salt() {
        let digest = TargetHash2::from_bytes([0x17; 32]);
        let salt = Salt::from_bytes([0x2b; 16]);

        let commitment = TargetHash3::derive(&digest, &salt);
        let bad_salt = Salt::from_bytes([0x2c; 16]);
        assert!(!commitment.matches(&digest, &bad_salt).is_verified());
    }

    #[test]
    fn salt_separates_commitments() {
        let digest = TargetHash2::from_bytes([0x17; 32]);

        let first = TargetHash3::derive(&digest, &Salt::from_bytes([1; 16]));
        let second = TargetHash3::derive(&digest, &Salt::from_bytes([2; 16]));
        assert_ne!(first, second);
    }

    #[test]
    fn hash_head_tail_is_zero() {
        let head = HashHead::of(b"some address encoding");
        assert_eq!(&head.as_bytes()[16..], &[0; 16]);
    }

    #[test]
    fn hash_head_distinguishes_inputs() {
        assert_ne!(HashHead::of(b"first"), HashHead::of(b"second"));
    }
}
