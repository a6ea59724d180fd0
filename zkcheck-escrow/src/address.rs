//! Account addresses: a signed workchain id plus a 256-bit account hash.

use serde::{Deserialize, Serialize};
use std::fmt;
use zkcheck_crypto::commitment::HashHead;

/// A standard account address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    workchain: i8,
    hash: [u8; 32],
}

impl Address {
    /// Construct an address from its parts.
    pub fn new(workchain: i8, hash: [u8; 32]) -> Self {
        Address { workchain, hash }
    }

    /// The workchain this account lives in.
    pub fn workchain(&self) -> i8 {
        self.workchain
    }

    /// The 256-bit account hash.
    pub fn hash(&self) -> &[u8; 32] {
        &self.hash
    }

    /// True if the address can receive a payout.
    ///
    /// Only the base workchain (0) and the masterchain (-1) are routable
    /// destinations.
    pub fn is_routable(&self) -> bool {
        matches!(self.workchain, -1 | 0)
    }

    /// The canonical byte encoding: workchain byte followed by the hash.
    pub fn to_bytes(&self) -> [u8; 33] {
        let mut bytes = [0; 33];
        bytes[0] = self.workchain as u8;
        bytes[1..].copy_from_slice(&self.hash);
        bytes
    }

    /// The truncated digest of this address, as bound by claim proofs.
    pub fn hash_head(&self) -> HashHead {
        HashHead::of(&self.to_bytes())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.workchain)?;
        for byte in &self.hash {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}
