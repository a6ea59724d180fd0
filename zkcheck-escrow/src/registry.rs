//! The registry of authorized verifier key hashes.
//!
//! Indices are 1-based, assigned sequentially, and never reused: removing
//! an entry leaves a gap, and the next addition continues from the
//! monotonic `last_index`. Entries record when they were added so the
//! state machine can enforce the key-maturation window before a key may
//! authorize cashing.

use crate::{EscrowError, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use zkcheck_crypto::commitment::PubkeyHash;

/// A registered verifier key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PubkeyEntry {
    /// Digest of the key; raw key material is never stored.
    pub key_hash: PubkeyHash,
    /// Ledger time the key was registered.
    pub added_at: Timestamp,
}

#[cfg(feature = "sqlite")]
zkcheck_crypto::impl_sqlx_for_bincode_ty!(PubkeyEntry);

/// The ordered, indexable set of authorized verifier keys.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PubkeyRegistry {
    entries: BTreeMap<u16, PubkeyEntry>,
    last_index: u16,
}

impl PubkeyRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a key hash, returning its assigned index.
    pub fn add(&mut self, key_hash: PubkeyHash, now: Timestamp) -> Result<u16, EscrowError> {
        // The index space is monotonic; exhaustion is rejected, not wrapped.
        let index = self
            .last_index
            .checked_add(1)
            .ok_or(EscrowError::InvalidPubkeyIndex)?;

        self.last_index = index;
        let _ = self.entries.insert(
            index,
            PubkeyEntry {
                key_hash,
                added_at: now,
            },
        );
        Ok(index)
    }

    /// Delete the entry at an index.
    ///
    /// An index outside the range ever assigned is rejected as invalid; an
    /// in-range index whose entry was already removed is reported as not
    /// found.
    pub fn remove(&mut self, index: u16) -> Result<PubkeyEntry, EscrowError> {
        if index == 0 || index > self.last_index {
            return Err(EscrowError::InvalidPubkeyIndex);
        }
        self.entries
            .remove(&index)
            .ok_or(EscrowError::PubkeyNotFound)
    }

    /// Look up the entry at an index.
    pub fn resolve(&self, index: u16) -> Result<&PubkeyEntry, EscrowError> {
        self.entries.get(&index).ok_or(EscrowError::PubkeyNotFound)
    }

    /// The registered entries, in index order.
    pub fn entries(&self) -> &BTreeMap<u16, PubkeyEntry> {
        &self.entries
    }

    /// The highest index ever assigned.
    pub fn last_index(&self) -> u16 {
        self.last_index
    }
}
