mod test_utils;

use test_utils::*;
use zkcheck_crypto::commitment::PubkeyHash;
use zkcheck_escrow::codec::{Operation, SetAcl, SudoerRequest};
use zkcheck_escrow::{fees, Address, EscrowError, Outgoing, Verification};

#[test]
fn pubkey_registration_requires_the_sudoer() {
    let mut escrow = escrow(Verification::Verified);

    let body = Operation::AddPubkey {
        key_hash: verifier_key_hash(),
    }
    .encode();
    assert_eq!(
        escrow.receive_internal(&envelope(creator(), fees::TRANSFER_FEE), &body),
        Err(EscrowError::UnauthorizedSudoer)
    );
    assert_eq!(escrow.pubkeys().last_index(), 0);
}

#[test]
fn registration_appends_and_removal_leaves_a_gap() {
    let mut escrow = escrow(Verification::Verified);

    assert_eq!(register_pubkey(&mut escrow, NOW), 1);
    assert_eq!(register_pubkey(&mut escrow, NOW), 2);

    let body = Operation::RemovePubkey { index: 2 }.encode();
    escrow
        .receive_internal(&envelope(sudoer(), fees::TRANSFER_FEE), &body)
        .unwrap();

    assert!(matches!(
        escrow.pubkeys().resolve(2),
        Err(EscrowError::PubkeyNotFound)
    ));
    // The counter never rewinds.
    assert_eq!(escrow.pubkeys().last_index(), 2);
    assert_eq!(register_pubkey(&mut escrow, NOW), 3);
}

#[test]
fn out_of_range_removal_is_invalid() {
    let mut escrow = escrow(Verification::Verified);

    let body = Operation::RemovePubkey { index: 7 }.encode();
    assert_eq!(
        escrow.receive_internal(&envelope(sudoer(), fees::TRANSFER_FEE), &body),
        Err(EscrowError::InvalidPubkeyIndex)
    );
}

#[test]
fn acl_updates_require_the_sudoer() {
    let mut escrow = escrow(Verification::Verified);

    let body = Operation::SetAcl(SetAcl {
        sudoer: Some(creator()),
        primary_jetton_wallet: None,
        secondary_jetton_wallet: None,
    })
    .encode();
    assert_eq!(
        escrow.receive_internal(&envelope(creator(), fees::TRANSFER_FEE), &body),
        Err(EscrowError::UnauthorizedSudoer)
    );
}

#[test]
fn replacing_the_sudoer_hands_over_control() {
    let mut escrow = escrow(Verification::Verified);
    let successor = Address::new(0, [0x21; 32]);

    let body = Operation::SetAcl(SetAcl {
        sudoer: Some(successor),
        primary_jetton_wallet: None,
        secondary_jetton_wallet: None,
    })
    .encode();
    escrow
        .receive_internal(&envelope(sudoer(), fees::TRANSFER_FEE), &body)
        .unwrap();

    let add = Operation::AddPubkey {
        key_hash: verifier_key_hash(),
    }
    .encode();
    assert_eq!(
        escrow.receive_internal(&envelope(sudoer(), fees::TRANSFER_FEE), &add),
        Err(EscrowError::UnauthorizedSudoer)
    );
    escrow
        .receive_internal(&envelope(successor, fees::TRANSFER_FEE), &add)
        .unwrap();
    assert_eq!(escrow.pubkeys().last_index(), 1);
}

#[test]
fn clearing_the_sudoer_disables_admin_operations() {
    let mut escrow = escrow(Verification::Verified);

    let body = Operation::SetAcl(SetAcl {
        sudoer: None,
        primary_jetton_wallet: None,
        secondary_jetton_wallet: None,
    })
    .encode();
    escrow
        .receive_internal(&envelope(sudoer(), fees::TRANSFER_FEE), &body)
        .unwrap();

    let add = Operation::AddPubkey {
        key_hash: PubkeyHash::digest(b"late key"),
    }
    .encode();
    assert_eq!(
        escrow.receive_internal(&envelope(sudoer(), fees::TRANSFER_FEE), &add),
        Err(EscrowError::UnauthorizedSudoer)
    );
}

#[test]
fn sudoer_request_forwards_the_message_untouched() {
    let mut escrow = escrow(Verification::Verified);

    let body = Operation::SudoerRequest(SudoerRequest {
        message: vec![0xde, 0xad, 0xbe, 0xef],
        send_mode: 64,
    })
    .encode();
    let outgoing = escrow
        .receive_internal(&envelope(sudoer(), fees::TRANSFER_FEE), &body)
        .unwrap();

    assert_eq!(
        outgoing,
        vec![Outgoing::Raw {
            body: vec![0xde, 0xad, 0xbe, 0xef],
            send_mode: 64,
        }]
    );
}

#[test]
fn removing_a_referenced_key_strands_cashing_but_not_cancel() {
    let mut escrow = escrow(Verification::Verified);
    assert_eq!(register_pubkey(&mut escrow, NOW - 3_600), 1);
    create_native_check(&mut escrow, 7, 1_000_000_000);

    // Rotation wins: the sole authorizing key of an open check may be
    // removed.
    let body = Operation::RemovePubkey { index: 1 }.encode();
    escrow
        .receive_internal(&envelope(sudoer(), fees::TRANSFER_FEE), &body)
        .unwrap();

    let cash = cash_body(7, 1, Some(receiver()), signals_for(&receiver(), NOW + 600));
    assert_eq!(
        escrow.receive_external(NOW, &cash),
        Err(EscrowError::PubkeyNotFound)
    );

    // The creator can still recover the funds.
    let cancel = Operation::CancelCheck {
        check_id: check_id(7),
    }
    .encode();
    let outgoing = escrow
        .receive_internal(&envelope(creator(), fees::CANCEL_FEE), &cancel)
        .unwrap();
    assert_eq!(outgoing.len(), 1);
}
