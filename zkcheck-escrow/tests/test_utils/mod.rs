#![allow(dead_code)]

use bls12_381::{G1Affine, G2Affine};
use zkcheck_crypto::commitment::{PubkeyHash, Salt, TargetHash2, TargetHash3};
use zkcheck_crypto::groth16::{Proof, ProofVerifier, PublicSignals, VerifyingKey};
use zkcheck_crypto::Verification;
use zkcheck_escrow::codec::{CashCheck, CreateCheck, Operation, ProofBlob, SetAcl};
use zkcheck_escrow::{fees, Address, CheckId, Config, Envelope, Escrow};

/// Baseline ledger time for the tests.
pub const NOW: u32 = 1_700_000_000;

pub fn sudoer() -> Address {
    Address::new(0, [0xaa; 32])
}

pub fn creator() -> Address {
    Address::new(0, [0xbb; 32])
}

pub fn receiver() -> Address {
    Address::new(0, [0xcc; 32])
}

pub fn wallet() -> Address {
    Address::new(0, [0xdd; 32])
}

/// A verifier that ignores the proof and returns a fixed verdict, so the
/// state machine can be driven without generating real proofs.
#[derive(Debug, Clone, Copy)]
pub struct StubVerifier(pub Verification);

impl ProofVerifier for StubVerifier {
    fn verify(&self, _: &Proof, _: &PublicSignals, _: &VerifyingKey) -> Verification {
        self.0
    }
}

pub fn test_verifying_key() -> VerifyingKey {
    let g1 = G1Affine::generator();
    let g2 = G2Affine::generator();
    VerifyingKey::new(g1, g2, g2, g2, [g1; 5])
}

pub fn escrow(verdict: Verification) -> Escrow<StubVerifier> {
    Escrow::new(
        Config {
            instance_id: 1,
            sudoer: sudoer(),
            verifying_key: test_verifying_key(),
        },
        StubVerifier(verdict),
    )
}

pub fn salt() -> Salt {
    Salt::from_bytes([0x5a; 16])
}

pub fn claim_digest() -> TargetHash2 {
    TargetHash2::from_bytes([0x7e; 32])
}

pub fn commitment() -> TargetHash3 {
    TargetHash3::derive(&claim_digest(), &salt())
}

pub fn verifier_key_hash() -> PubkeyHash {
    PubkeyHash::digest(b"verifier service key")
}

pub fn envelope(sender: Address, value: u128) -> Envelope {
    Envelope {
        sender,
        value,
        now: NOW,
    }
}

/// Register the standard verifier key hash at the given time; returns its
/// index.
pub fn register_pubkey(escrow: &mut Escrow<StubVerifier>, added_at: u32) -> u16 {
    let body = Operation::AddPubkey {
        key_hash: verifier_key_hash(),
    }
    .encode();
    escrow
        .receive_internal(
            &Envelope {
                sender: sudoer(),
                value: fees::TRANSFER_FEE,
                now: added_at,
            },
            &body,
        )
        .unwrap();
    escrow.pubkeys().last_index()
}

/// Register the standard wallet as the primary asset wallet.
pub fn register_wallet(escrow: &mut Escrow<StubVerifier>) {
    let body = Operation::SetAcl(SetAcl {
        sudoer: Some(sudoer()),
        primary_jetton_wallet: Some(wallet()),
        secondary_jetton_wallet: None,
    })
    .encode();
    escrow
        .receive_internal(&envelope(sudoer(), fees::TRANSFER_FEE), &body)
        .unwrap();
}

pub fn check_id(raw: u32) -> CheckId {
    CheckId::new(raw).unwrap()
}

pub fn create_record(id: u32, indices: Vec<u16>, comment: Option<&str>) -> CreateCheck {
    CreateCheck {
        check_id: check_id(id),
        salt: salt(),
        target_hash3: commitment(),
        pubkey_indices: indices,
        comment: comment.map(String::from),
    }
}

/// Open a native check locking `locked` units, authorized by index 1.
pub fn create_native_check(escrow: &mut Escrow<StubVerifier>, id: u32, locked: u128) {
    let body = Operation::CreateCheck(create_record(id, vec![1], None)).encode();
    escrow
        .receive_internal(&envelope(creator(), locked + fees::CREATE_GAS), &body)
        .unwrap();
}

/// Proof blobs that decompress to valid curve points; the stub verifier
/// never looks at them.
pub fn well_formed_proof_blob() -> ProofBlob {
    ProofBlob {
        pi_a: G1Affine::generator().to_compressed(),
        pi_b: G2Affine::generator().to_compressed(),
        pi_c: G1Affine::generator().to_compressed(),
    }
}

pub fn signals_for(receiver: &Address, expires_at: u32) -> PublicSignals {
    PublicSignals {
        expires_at,
        target_hash2: claim_digest(),
        pubkey_hash: verifier_key_hash(),
        receiver_address_hash_head: receiver.hash_head(),
    }
}

pub fn cash_body(id: u32, index: u16, to: Option<Address>, signals: PublicSignals) -> Vec<u8> {
    Operation::CashCheck(CashCheck {
        check_id: check_id(id),
        receiver: to,
        pubkey_index: index,
        signals,
        proof: well_formed_proof_blob(),
    })
    .encode()
}
