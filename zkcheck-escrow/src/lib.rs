/*!
Proof-gated escrow checks over a deterministic, message-driven ledger
instance.

A *check* locks funds under an opaque 20-bit id and a secret commitment.
Whoever holds the claim secret can have a designated off-chain verifier
authorize payout to an arbitrary receiving account; the authorization
reaches the escrow as a zero-knowledge proof, not as a wallet signature.
This decouples "who may claim" from "who controls the receiving account",
which is what makes payment links, claim codes, and relayer-assisted
redemption possible.

## Lifecycle

A check id moves `absent → open → absent`; there are no other states and
closed checks leave no tombstones.

- **Create**: a value-bearing [`CreateCheck`](codec::CreateCheck) message
  opens a check funded by the attached native value, minus a gas reserve.
  Token-funded checks arrive wrapped in a transfer notification from a
  registered asset wallet, carrying the same create record as forward
  payload.
- **Cash**: an externally-submitted, unsigned [`CashCheck`] message names a
  receiver and carries a claim proof. Ten validations gate the payout, in
  fixed order, from cheap lookups to the pairing check; the first failure
  rejects the whole message with state untouched. On success the check is
  paid out and removed. Anyone may submit a valid claim; the proof is the
  only authority.
- **Cancel**: the creator, and only the creator, can reclaim an open check
  for a fixed fee.

Administrative operations (pubkey registry maintenance, access-control
updates, raw message forwarding) are gated on a sudo-controller account.

The state machine in [`escrow`] owns its stores ([`CheckStore`],
[`PubkeyRegistry`], [`AccessControl`]) and is generic over the
[`ProofVerifier`](zkcheck_crypto::groth16::ProofVerifier) seam, so the
whole protocol is testable without generating proofs.

[`CashCheck`]: codec::CashCheck
*/

#![warn(missing_docs)]
#![warn(missing_copy_implementations, missing_debug_implementations)]
#![warn(unused_qualifications, unused_results)]
#![warn(future_incompatible)]
#![warn(unused)]
#![forbid(rustdoc::broken_intra_doc_links)]

pub mod codec;
pub mod escrow;
pub mod fees;

mod acl;
mod address;
mod check;
mod registry;

pub use acl::AccessControl;
pub use address::Address;
pub use check::{Check, CheckId, CheckStore};
pub use escrow::{Config, Envelope, Escrow, Outgoing};
pub use registry::{PubkeyEntry, PubkeyRegistry};
pub use zkcheck_crypto::Verification;

use thiserror::*;

// Logger target
pub(crate) const LOG: &str = "zkcheck";

/// Native currency value, in units of 10⁻⁹.
pub type Coins = u128;

/// Ledger time, in seconds.
pub type Timestamp = u32;

/// The closed error taxonomy of the escrow state machine.
///
/// Errors are evaluated in fixed order per handler; the first violation
/// rejects the whole operation and leaves state byte-for-byte unchanged.
/// Retry policy lives entirely outside this crate.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EscrowError {
    /// The caller is not the current sudo-controller.
    #[error("caller is not the sudoer")]
    UnauthorizedSudoer,

    /// A check with this id is already open.
    #[error("a check with this id is already open")]
    CheckAlreadyExists,
    /// The attached value does not cover the gas reserve.
    #[error("attached value does not cover the gas reserve")]
    InsufficientFunds,
    /// The operation record is structurally invalid.
    #[error("operation record is structurally invalid")]
    InvalidPayload,
    /// The opcode is unknown, or not accepted on this path.
    #[error("unknown or unsupported operation")]
    InvalidOp,
    /// A token-transfer notification carried no forward payload.
    #[error("token transfer notification carries no forward payload")]
    MissingForwardPayload,

    /// No open check exists with this id.
    #[error("no open check with this id")]
    CheckNotFound,
    /// The receiver address is absent or not routable.
    #[error("receiver address is malformed")]
    InvalidReceiverAddress,
    /// The claim proof does not verify.
    #[error("claim proof does not verify")]
    IncorrectProof,
    /// The claim authorization has expired.
    #[error("claim authorization has expired")]
    AuthDateTooOld,
    /// The proof names a different receiver than the message.
    #[error("receiver address does not match the proof")]
    ReceiverAddressMismatch,
    /// The revealed claim digest does not open the check's commitment.
    #[error("claim commitment does not match")]
    TargetHash3Mismatch,
    /// The notification was not sent by a registered asset wallet.
    #[error("notification is not from a registered asset wallet")]
    UnauthorizedJettonWallet,
    /// The proof's pubkey hash differs from the registry entry.
    #[error("pubkey hash does not match the registry entry")]
    PubkeyHashMismatch,
    /// No pubkey is registered at this index.
    #[error("no pubkey registered at this index")]
    PubkeyNotFound,
    /// The pubkey index is out of range, or not authorized by the check.
    #[error("pubkey index is invalid for this check")]
    InvalidPubkeyIndex,
    /// The pubkey is younger than the maturation window.
    #[error("pubkey is too recent to authorize cashing")]
    PubkeyTooFresh,

    /// Someone other than the creator tried to cancel.
    #[error("only the check creator may cancel")]
    UnauthorizedCancel,
    /// The attached value does not cover the cancel fee.
    #[error("attached value does not cover the cancel fee")]
    InsufficientCancelFee,
}

impl EscrowError {
    /// The ledger abort code for this error.
    pub fn code(&self) -> u16 {
        match self {
            EscrowError::UnauthorizedSudoer => 400,
            EscrowError::CheckAlreadyExists => 410,
            EscrowError::InsufficientFunds => 411,
            EscrowError::InvalidPayload => 412,
            EscrowError::InvalidOp => 413,
            EscrowError::MissingForwardPayload => 414,
            EscrowError::CheckNotFound => 420,
            EscrowError::InvalidReceiverAddress => 421,
            EscrowError::IncorrectProof => 422,
            EscrowError::AuthDateTooOld => 423,
            EscrowError::ReceiverAddressMismatch => 424,
            EscrowError::TargetHash3Mismatch => 425,
            EscrowError::UnauthorizedJettonWallet => 426,
            EscrowError::PubkeyHashMismatch => 427,
            EscrowError::PubkeyNotFound => 428,
            EscrowError::InvalidPubkeyIndex => 429,
            EscrowError::PubkeyTooFresh => 430,
            EscrowError::UnauthorizedCancel => 440,
            EscrowError::InsufficientCancelFee => 441,
        }
    }
}

impl From<codec::CodecError> for EscrowError {
    fn from(err: codec::CodecError) -> Self {
        match err {
            codec::CodecError::UnknownOpcode(_) => EscrowError::InvalidOp,
            _ => EscrowError::InvalidPayload,
        }
    }
}
