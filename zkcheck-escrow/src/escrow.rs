/*!
The escrow state machine.

An [`Escrow`] owns the three mutable structures of an instance (the
[`CheckStore`], the [`PubkeyRegistry`], and the [`AccessControl`] triple)
and applies decoded operations to them one at a time. Handlers validate
everything before they mutate anything, so a rejected operation leaves
state byte-for-byte unchanged; there is no partial effect to roll back and
nothing is retried internally.

Messages arrive on two paths, mirroring the ledger's message classes:

- [`receive_internal`](Escrow::receive_internal) for value-bearing
  messages from accounts: create, cancel, token notifications, and the
  administrative operations.
- [`receive_external`](Escrow::receive_external) for unsigned external
  messages: cashing only. Anyone may submit a cash message; the claim
  proof is the sole authority, by design.

Successful handlers return the outgoing payment actions they produced;
emitting them on the wire is the host's concern.
*/

use crate::{
    acl::AccessControl,
    address::Address,
    check::{Check, CheckId, CheckStore},
    codec::{CashCheck, CreateCheck, Operation, SetAcl, SudoerRequest, TransferNotification},
    fees,
    registry::PubkeyRegistry,
    Coins, EscrowError, Timestamp, LOG,
};
use log::{info, warn};
use zkcheck_crypto::{
    commitment::PubkeyHash,
    groth16::{Proof, ProofVerifier, VerifyingKey},
    Verification,
};

/// Minimum age of a registry key before it may authorize cashing, in
/// seconds.
///
/// A rotation-safety window: even if the sudoer key is compromised and a
/// rogue verifier key is registered, no check can be drained through it
/// until the window has passed.
pub const MIN_PUBKEY_AGE: Timestamp = 900;

/// Deployment parameters of an escrow instance.
#[derive(Debug, Clone)]
pub struct Config {
    /// Distinguishes parallel deployments sharing one code hash.
    pub instance_id: u32,
    /// The initial sudo-controller, installed without an authorization
    /// check.
    pub sudoer: Address,
    /// The fixed verification parameters for claim proofs.
    pub verifying_key: VerifyingKey,
}

/// Sender, value, and arrival time of an internal message.
#[derive(Debug, Clone, Copy)]
pub struct Envelope {
    /// The account the message came from.
    pub sender: Address,
    /// Native value attached to the message.
    pub value: Coins,
    /// Ledger time the message is processed at.
    pub now: Timestamp,
}

/// An outgoing payment action produced by a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outgoing {
    /// A native-currency transfer.
    Transfer {
        /// Destination account.
        to: Address,
        /// Value to deliver.
        value: Coins,
        /// Payout comment, if the check carried one.
        comment: Option<String>,
    },
    /// A token payout routed through an asset wallet.
    JettonTransfer {
        /// The asset wallet asked to perform the transfer.
        wallet: Address,
        /// Destination account.
        to: Address,
        /// Token amount to deliver.
        amount: Coins,
        /// Native value attached to cover the wallet's fees.
        attach: Coins,
        /// Payout comment, if the check carried one.
        comment: Option<String>,
    },
    /// A raw message forwarded on the sudoer's authority.
    Raw {
        /// The message body, passed through untouched.
        body: Vec<u8>,
        /// Ledger send mode.
        send_mode: u8,
    },
}

/// A deployed escrow instance.
#[derive(Debug)]
pub struct Escrow<V> {
    instance_id: u32,
    verifying_key: VerifyingKey,
    acl: AccessControl,
    checks: CheckStore,
    pubkeys: PubkeyRegistry,
    verifier: V,
}

impl<V: ProofVerifier> Escrow<V> {
    /// Deploy an instance from its configuration.
    pub fn new(config: Config, verifier: V) -> Self {
        Escrow {
            instance_id: config.instance_id,
            verifying_key: config.verifying_key,
            acl: AccessControl::new(config.sudoer),
            checks: CheckStore::new(),
            pubkeys: PubkeyRegistry::new(),
            verifier,
        }
    }

    /// Apply a value-bearing message from an account.
    pub fn receive_internal(
        &mut self,
        envelope: &Envelope,
        body: &[u8],
    ) -> Result<Vec<Outgoing>, EscrowError> {
        match Operation::decode(body)? {
            Operation::CreateCheck(record) => self.create_native(envelope, record),
            Operation::TransferNotification(record) => self.create_from_notification(envelope, record),
            Operation::CancelCheck { check_id } => self.cancel_check(envelope, check_id),
            Operation::AddPubkey { key_hash } => self.add_pubkey(envelope, key_hash),
            Operation::RemovePubkey { index } => self.remove_pubkey(envelope, index),
            Operation::SetAcl(record) => self.set_acl(envelope, record),
            Operation::SudoerRequest(record) => self.sudoer_request(envelope, record),
            // Cashing carries no account signature and is only accepted on
            // the external path.
            Operation::CashCheck(_) => Err(EscrowError::InvalidOp),
        }
    }

    /// Apply an externally-submitted, unsigned message.
    pub fn receive_external(
        &mut self,
        now: Timestamp,
        body: &[u8],
    ) -> Result<Vec<Outgoing>, EscrowError> {
        match Operation::decode(body)? {
            Operation::CashCheck(record) => self.cash_check(now, record),
            _ => Err(EscrowError::InvalidOp),
        }
    }

    /// Look up an open check.
    pub fn check_info(&self, check_id: CheckId) -> Result<&Check, EscrowError> {
        self.checks.get(check_id).ok_or(EscrowError::CheckNotFound)
    }

    /// The verifier key registry.
    pub fn pubkeys(&self) -> &PubkeyRegistry {
        &self.pubkeys
    }

    /// The current access-control triple.
    pub fn acl(&self) -> &AccessControl {
        &self.acl
    }

    /// The instance discriminator this escrow was deployed with.
    pub fn instance_id(&self) -> u32 {
        self.instance_id
    }

    fn create_native(
        &mut self,
        envelope: &Envelope,
        record: CreateCheck,
    ) -> Result<Vec<Outgoing>, EscrowError> {
        if self.checks.get(record.check_id).is_some() {
            return Err(EscrowError::CheckAlreadyExists);
        }
        if envelope.value <= fees::CREATE_GAS {
            return Err(EscrowError::InsufficientFunds);
        }
        let amount = envelope.value - fees::CREATE_GAS;

        self.open_check(record, amount, None, envelope.sender, envelope.now)
    }

    fn create_from_notification(
        &mut self,
        envelope: &Envelope,
        notification: TransferNotification,
    ) -> Result<Vec<Outgoing>, EscrowError> {
        // Only a registered asset wallet may vouch for the embedded
        // original sender.
        if !self.acl.is_registered_jetton_wallet(&envelope.sender) {
            return Err(EscrowError::UnauthorizedJettonWallet);
        }

        let payload = notification
            .forward_payload
            .ok_or(EscrowError::MissingForwardPayload)?;
        let record = match Operation::decode(&payload) {
            Ok(Operation::CreateCheck(record)) => record,
            Ok(_) => return Err(EscrowError::InvalidOp),
            Err(err) => return Err(err.into()),
        };

        if self.checks.get(record.check_id).is_some() {
            return Err(EscrowError::CheckAlreadyExists);
        }
        // The gas reserve comes from the native envelope, not the tokens.
        if envelope.value < fees::JETTON_CREATE_GAS {
            return Err(EscrowError::InsufficientFunds);
        }

        self.open_check(
            record,
            notification.amount,
            Some(envelope.sender),
            notification.sender,
            envelope.now,
        )
    }

    fn open_check(
        &mut self,
        record: CreateCheck,
        amount: Coins,
        jetton_wallet: Option<Address>,
        sender: Address,
        now: Timestamp,
    ) -> Result<Vec<Outgoing>, EscrowError> {
        if record.pubkey_indices.is_empty() {
            return Err(EscrowError::InvalidPayload);
        }

        let check_id = record.check_id;
        self.checks.insert(
            check_id,
            Check {
                amount,
                jetton_wallet,
                salt: record.salt,
                target_hash3: record.target_hash3,
                pubkey_indices: record.pubkey_indices,
                comment: record.comment,
                created_at: now,
                sender,
            },
        )?;

        info!(
            target: LOG,
            "opened check {} for {} units from {}",
            check_id.to_u32(),
            amount,
            sender
        );
        Ok(Vec::new())
    }

    fn cash_check(
        &mut self,
        now: Timestamp,
        record: CashCheck,
    ) -> Result<Vec<Outgoing>, EscrowError> {
        let check = self
            .checks
            .get(record.check_id)
            .ok_or(EscrowError::CheckNotFound)?;

        let receiver = record
            .receiver
            .filter(Address::is_routable)
            .ok_or(EscrowError::InvalidReceiverAddress)?;

        if !check.pubkey_indices.contains(&record.pubkey_index) {
            return Err(EscrowError::InvalidPubkeyIndex);
        }
        let entry = *self.pubkeys.resolve(record.pubkey_index)?;

        if now.saturating_sub(entry.added_at) < MIN_PUBKEY_AGE {
            return Err(EscrowError::PubkeyTooFresh);
        }
        if record.signals.expires_at < now {
            return Err(EscrowError::AuthDateTooOld);
        }

        if let Verification::Failed = check
            .target_hash3
            .matches(&record.signals.target_hash2, &check.salt)
        {
            return Err(EscrowError::TargetHash3Mismatch);
        }
        if record.signals.pubkey_hash != entry.key_hash {
            return Err(EscrowError::PubkeyHashMismatch);
        }
        if record.signals.receiver_address_hash_head != receiver.hash_head() {
            return Err(EscrowError::ReceiverAddressMismatch);
        }

        let proof = Proof::from_bytes(
            &record.proof.pi_a,
            &record.proof.pi_b,
            &record.proof.pi_c,
        )
        .map_err(|_| EscrowError::IncorrectProof)?;
        if let Verification::Failed =
            self.verifier
                .verify(&proof, &record.signals, &self.verifying_key)
        {
            return Err(EscrowError::IncorrectProof);
        }

        // All ten gates passed; the check closes and pays out.
        let check = self
            .checks
            .remove(record.check_id)
            .ok_or(EscrowError::CheckNotFound)?;

        info!(
            target: LOG,
            "cashed check {} to {}",
            record.check_id.to_u32(),
            receiver
        );

        let payout = match check.jetton_wallet {
            None => Outgoing::Transfer {
                to: receiver,
                value: check.amount.saturating_sub(fees::CASH_GAS),
                comment: check.comment,
            },
            Some(wallet) => Outgoing::JettonTransfer {
                wallet,
                to: receiver,
                amount: check.amount,
                attach: if check.comment.is_none() {
                    fees::TINY_JETTON_TRANSFER_FEE
                } else {
                    fees::JETTON_TRANSFER_FEE
                },
                comment: check.comment,
            },
        };
        Ok(vec![payout])
    }

    fn cancel_check(
        &mut self,
        envelope: &Envelope,
        check_id: CheckId,
    ) -> Result<Vec<Outgoing>, EscrowError> {
        let check = self.checks.get(check_id).ok_or(EscrowError::CheckNotFound)?;

        if check.sender != envelope.sender {
            return Err(EscrowError::UnauthorizedCancel);
        }
        if envelope.value < fees::CANCEL_FEE {
            return Err(EscrowError::InsufficientCancelFee);
        }

        let check = self
            .checks
            .remove(check_id)
            .ok_or(EscrowError::CheckNotFound)?;

        info!(target: LOG, "cancelled check {}", check_id.to_u32());

        let refund = match check.jetton_wallet {
            // The fee is retained from the locked value.
            None => Outgoing::Transfer {
                to: check.sender,
                value: check.amount.saturating_sub(fees::CANCEL_FEE),
                comment: None,
            },
            // Token checks refund the full token amount; the fee is
            // retained from the attached native value instead.
            Some(wallet) => Outgoing::JettonTransfer {
                wallet,
                to: check.sender,
                amount: check.amount,
                attach: fees::TINY_JETTON_TRANSFER_FEE,
                comment: None,
            },
        };
        Ok(vec![refund])
    }

    fn add_pubkey(
        &mut self,
        envelope: &Envelope,
        key_hash: PubkeyHash,
    ) -> Result<Vec<Outgoing>, EscrowError> {
        self.ensure_sudoer(envelope)?;

        let index = self.pubkeys.add(key_hash, envelope.now)?;
        info!(target: LOG, "registered pubkey at index {}", index);
        Ok(Vec::new())
    }

    fn remove_pubkey(
        &mut self,
        envelope: &Envelope,
        index: u16,
    ) -> Result<Vec<Outgoing>, EscrowError> {
        self.ensure_sudoer(envelope)?;

        let stranded = self
            .checks
            .iter()
            .filter(|(_, check)| check.pubkey_indices.contains(&index))
            .count();

        let _ = self.pubkeys.remove(index)?;
        if stranded > 0 {
            // Rotation wins over open checks; their creators can still
            // cancel.
            warn!(
                target: LOG,
                "removed pubkey {} still referenced by {} open check(s)",
                index,
                stranded
            );
        } else {
            info!(target: LOG, "removed pubkey {}", index);
        }
        Ok(Vec::new())
    }

    fn set_acl(&mut self, envelope: &Envelope, record: SetAcl) -> Result<Vec<Outgoing>, EscrowError> {
        self.ensure_sudoer(envelope)?;

        self.acl.replace(
            record.sudoer,
            record.primary_jetton_wallet,
            record.secondary_jetton_wallet,
        );
        info!(target: LOG, "access control replaced");
        Ok(Vec::new())
    }

    fn sudoer_request(
        &mut self,
        envelope: &Envelope,
        record: SudoerRequest,
    ) -> Result<Vec<Outgoing>, EscrowError> {
        self.ensure_sudoer(envelope)?;

        Ok(vec![Outgoing::Raw {
            body: record.message,
            send_mode: record.send_mode,
        }])
    }

    fn ensure_sudoer(&self, envelope: &Envelope) -> Result<(), EscrowError> {
        if self.acl.is_sudoer(&envelope.sender) {
            Ok(())
        } else {
            Err(EscrowError::UnauthorizedSudoer)
        }
    }
}
