//! Escrow checks and the table of outstanding entries.

use crate::{address::Address, Coins, EscrowError, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use zkcheck_crypto::commitment::{Salt, TargetHash3};

/// An opaque 20-bit check identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct CheckId(u32);

impl CheckId {
    /// Width of a check id on the wire.
    pub const BITS: u32 = 20;
    /// Largest representable check id.
    pub const MAX: u32 = (1 << Self::BITS) - 1;

    /// Construct a check id, or None if the value does not fit in 20 bits.
    pub fn new(raw: u32) -> Option<Self> {
        if raw <= Self::MAX {
            Some(CheckId(raw))
        } else {
            None
        }
    }

    /// The numeric value of the id.
    pub fn to_u32(self) -> u32 {
        self.0
    }
}

/// An open escrow entry.
///
/// The commitment fields bind the check to its claim conditions; see
/// [`zkcheck_crypto::commitment`]. `sender` is the creator and the sole
/// account allowed to cancel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Check {
    /// Locked value: native units, or token units for a token-funded check.
    pub amount: Coins,
    /// The asset wallet that funded this check; None for a native check.
    pub jetton_wallet: Option<Address>,
    /// Per-check salt for the commitment chain.
    pub salt: Salt,
    /// The claim commitment.
    pub target_hash3: TargetHash3,
    /// Registry indices of the verifier keys that may authorize cashing.
    /// Any single one suffices.
    pub pubkey_indices: Vec<u16>,
    /// Optional payout comment.
    pub comment: Option<String>,
    /// Ledger time the check was opened.
    pub created_at: Timestamp,
    /// The creator, and sole canceller.
    pub sender: Address,
}

#[cfg(feature = "sqlite")]
zkcheck_crypto::impl_sqlx_for_bincode_ty!(Check);

/// The keyed table of outstanding checks.
///
/// A check id maps to at most one live entry; closed checks are removed
/// outright, never tombstoned.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CheckStore {
    checks: BTreeMap<CheckId, Check>,
}

impl CheckStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a check under an id that must not be occupied.
    pub fn insert(&mut self, id: CheckId, check: Check) -> Result<(), EscrowError> {
        if self.checks.contains_key(&id) {
            return Err(EscrowError::CheckAlreadyExists);
        }
        let _ = self.checks.insert(id, check);
        Ok(())
    }

    /// Look up an open check.
    pub fn get(&self, id: CheckId) -> Option<&Check> {
        self.checks.get(&id)
    }

    /// Close a check, returning the entry if it was open.
    pub fn remove(&mut self, id: CheckId) -> Option<Check> {
        self.checks.remove(&id)
    }

    /// Iterate over the open checks in id order.
    pub fn iter(&self) -> impl Iterator<Item = (CheckId, &Check)> {
        self.checks.iter().map(|(id, check)| (*id, check))
    }

    /// Number of open checks.
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    /// True if no checks are open.
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}
