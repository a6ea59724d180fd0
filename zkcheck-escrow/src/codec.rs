/*!
The binary message codec.

Operation records are bit-granular, big-endian bitstrings serialized into
byte buffers with a *completion tag*: a single 1-bit appended after the
payload, then zero padding to the byte boundary. The tag lets the exact
bit length survive a byte-oriented transport; a buffer whose final byte is
zero has no tag and is structurally invalid.

Every record starts with a 32-bit opcode, followed by opcode-specific
fixed-width fields. Variable content (proof material, public signals,
forwarded payloads) travels in length-framed sub-records: a 16-bit byte
count followed by that many bytes. Addresses use a 2-bit tag (`00` absent,
`10` standard), `coins` values a 4-bit byte-length prefix.

The codec performs structural validation only: field widths, framing,
completion tags. Whether a decoded record is *meaningful* is the state
machine's concern.
*/

use crate::{address::Address, check::CheckId, Coins};
use std::convert::TryFrom;
use thiserror::*;
use zkcheck_crypto::commitment::{HashHead, PubkeyHash, Salt, TargetHash2, TargetHash3};
use zkcheck_crypto::groth16::PublicSignals;

/// Opcode tags of the escrow operation records.
pub mod opcodes {
    /// Open a check funded by the attached native value.
    pub const CREATE_CHECK: u32 = 0x6a3f_7c7f;
    /// Token-transfer notification wrapping a create record.
    pub const JETTON_TRANSFER_NOTIFICATION: u32 = 0x7362_d09c;
    /// Cash an open check against a claim proof.
    pub const CASH_CHECK: u32 = 0x69e7_ac28;
    /// Reclaim an open check as its creator.
    pub const CANCEL_CHECK: u32 = 0x4a1c_5e3b;
    /// Register a verifier key hash.
    pub const ADD_PUBKEY: u32 = 0x7d4b_3e91;
    /// Delete a registered verifier key.
    pub const REMOVE_PUBKEY: u32 = 0x8f5c_2a73;
    /// Replace the access-control triple.
    pub const SET_ACL: u32 = 0x996c_7334;
    /// Forward an arbitrary outgoing message.
    pub const SUDOER_REQUEST: u32 = 0x5e2a_5f0a;
}

/// Structural decoding failures.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    /// The buffer is empty or its final byte carries no completion tag.
    #[error("message is missing its completion tag")]
    MissingCompletionTag,
    /// The message ended before a field could be read in full.
    #[error("message is shorter than the record requires")]
    Truncated,
    /// The 32-bit opcode tag is not one of the known operations.
    #[error("unknown opcode {0:#010x}")]
    UnknownOpcode(u32),
    /// An address field uses an encoding the escrow does not accept.
    #[error("unsupported address encoding")]
    UnsupportedAddress,
    /// A length-framed sub-record has the wrong size for its slot.
    #[error("sub-record has {got} bytes where {expected} were expected")]
    BadRefLength {
        /// The size the slot requires.
        expected: usize,
        /// The size found on the wire.
        got: usize,
    },
    /// A comment tail is not a whole number of UTF-8 bytes.
    #[error("comment tail is malformed")]
    MalformedComment,
    /// Payload bits remain after the end of the record.
    #[error("trailing bits after the end of the record")]
    TrailingBits,
    /// A fixed-width field holds a value outside its domain.
    #[error("field value out of range: {0}")]
    ValueOutOfRange(&'static str),
}

/// A decoded escrow operation.
///
/// The eight incoming operation kinds form a closed union, so dispatch in
/// the state machine is exhaustive by construction.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Open a check funded by attached native value.
    CreateCheck(CreateCheck),
    /// Token-transfer notification, wrapping a create record.
    TransferNotification(TransferNotification),
    /// Cash an open check against a claim proof.
    CashCheck(CashCheck),
    /// Reclaim an open check as its creator.
    CancelCheck {
        /// The check to reclaim.
        check_id: CheckId,
    },
    /// Register a verifier key hash.
    AddPubkey {
        /// Digest of the key being registered.
        key_hash: PubkeyHash,
    },
    /// Delete a registered verifier key.
    RemovePubkey {
        /// The registry index to delete.
        index: u16,
    },
    /// Replace the access-control triple.
    SetAcl(SetAcl),
    /// Forward an arbitrary outgoing message.
    SudoerRequest(SudoerRequest),
}

/// The create record: commitment material and authorization set for a new
/// check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCheck {
    /// Id the check will be opened under.
    pub check_id: CheckId,
    /// Per-check salt for the commitment chain.
    pub salt: Salt,
    /// The claim commitment.
    pub target_hash3: TargetHash3,
    /// Registry indices allowed to authorize cashing (at most 31).
    pub pubkey_indices: Vec<u16>,
    /// Optional payout comment, carried as the record's string tail.
    pub comment: Option<String>,
}

/// A token-transfer notification from an asset wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferNotification {
    /// Query id of the token standard; opaque to the escrow.
    pub query_id: u64,
    /// Token amount received.
    pub amount: Coins,
    /// The account that sent the tokens to the wallet.
    pub sender: Address,
    /// The embedded create record, if any.
    pub forward_payload: Option<Vec<u8>>,
}

/// The cash record: receiver, authorization, signals, and proof.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CashCheck {
    /// The check being claimed.
    pub check_id: CheckId,
    /// Requested payout destination; validated by the state machine.
    pub receiver: Option<Address>,
    /// Registry index of the authorizing key. Four bits on the wire.
    pub pubkey_index: u16,
    /// The public signals the proof commits to.
    pub signals: PublicSignals,
    /// The proof elements, still in compressed wire form.
    pub proof: ProofBlob,
}

/// Compressed proof elements as carried on the wire.
///
/// Decompression is deferred to verification time: a blob that frames
/// correctly but encodes no valid curve point is an invalid *claim*, not
/// an invalid *message*.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProofBlob {
    /// Compressed G1 element A.
    pub pi_a: [u8; 48],
    /// Compressed G2 element B.
    pub pi_b: [u8; 96],
    /// Compressed G1 element C.
    pub pi_c: [u8; 48],
}

/// The access-control replacement triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetAcl {
    /// New sudoer; absent clears the slot.
    pub sudoer: Option<Address>,
    /// New primary asset wallet; absent clears the slot.
    pub primary_jetton_wallet: Option<Address>,
    /// New secondary asset wallet; absent clears the slot.
    pub secondary_jetton_wallet: Option<Address>,
}

/// An arbitrary message forwarded on the sudoer's authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SudoerRequest {
    /// The raw outgoing message body.
    pub message: Vec<u8>,
    /// Send mode passed through to the ledger.
    pub send_mode: u8,
}

impl Operation {
    /// Encode the operation into its wire buffer.
    ///
    /// Sub-records are limited to 65535 bytes; longer ones are a caller
    /// error.
    pub fn encode(&self) -> Vec<u8> {
        let mut writer = BitWriter::new();
        match self {
            Operation::CreateCheck(record) => {
                writer.put_uint(u128::from(opcodes::CREATE_CHECK), 32);
                record.encode_into(&mut writer);
            }
            Operation::TransferNotification(record) => {
                writer.put_uint(u128::from(opcodes::JETTON_TRANSFER_NOTIFICATION), 32);
                writer.put_uint(u128::from(record.query_id), 64);
                writer.put_coins(record.amount);
                writer.put_address(Some(&record.sender));
                match &record.forward_payload {
                    Some(payload) => {
                        writer.put_bit(true);
                        writer.put_ref(payload);
                    }
                    None => writer.put_bit(false),
                }
            }
            Operation::CashCheck(record) => {
                writer.put_uint(u128::from(opcodes::CASH_CHECK), 32);
                writer.put_uint(u128::from(record.check_id.to_u32()), CheckId::BITS);
                writer.put_address(record.receiver.as_ref());
                writer.put_uint(u128::from(record.pubkey_index), 4);
                writer.put_ref(&signals_to_bytes(&record.signals));
                writer.put_ref(&record.proof.pi_a);
                writer.put_ref(&record.proof.pi_b);
                writer.put_ref(&record.proof.pi_c);
            }
            Operation::CancelCheck { check_id } => {
                writer.put_uint(u128::from(opcodes::CANCEL_CHECK), 32);
                writer.put_uint(u128::from(check_id.to_u32()), CheckId::BITS);
            }
            Operation::AddPubkey { key_hash } => {
                writer.put_uint(u128::from(opcodes::ADD_PUBKEY), 32);
                writer.put_slice(key_hash.as_bytes());
            }
            Operation::RemovePubkey { index } => {
                writer.put_uint(u128::from(opcodes::REMOVE_PUBKEY), 32);
                writer.put_uint(u128::from(*index), 16);
            }
            Operation::SetAcl(record) => {
                writer.put_uint(u128::from(opcodes::SET_ACL), 32);
                writer.put_address(record.sudoer.as_ref());
                writer.put_address(record.primary_jetton_wallet.as_ref());
                writer.put_address(record.secondary_jetton_wallet.as_ref());
            }
            Operation::SudoerRequest(record) => {
                writer.put_uint(u128::from(opcodes::SUDOER_REQUEST), 32);
                writer.put_ref(&record.message);
                writer.put_uint(u128::from(record.send_mode), 8);
            }
        }
        writer.finish()
    }

    /// Decode an operation from its wire buffer.
    pub fn decode(buf: &[u8]) -> Result<Self, CodecError> {
        let mut reader = BitReader::new(buf)?;
        let opcode = reader.take_uint(32)? as u32;

        let operation = match opcode {
            opcodes::CREATE_CHECK => Operation::CreateCheck(CreateCheck::decode_from(&mut reader)?),
            opcodes::JETTON_TRANSFER_NOTIFICATION => {
                let query_id = reader.take_uint(64)? as u64;
                let amount = reader.take_coins()?;
                let sender = reader
                    .take_address()?
                    .ok_or(CodecError::UnsupportedAddress)?;
                let forward_payload = if reader.take_bit()? {
                    Some(reader.take_ref()?)
                } else {
                    None
                };
                reader.expect_end()?;
                Operation::TransferNotification(TransferNotification {
                    query_id,
                    amount,
                    sender,
                    forward_payload,
                })
            }
            opcodes::CASH_CHECK => {
                let check_id = reader.take_check_id()?;
                let receiver = reader.take_address()?;
                let pubkey_index = reader.take_uint(4)? as u16;
                let signals = signals_from_bytes(&reader.take_ref()?)?;
                let proof = ProofBlob {
                    pi_a: ref_to_array(reader.take_ref()?)?,
                    pi_b: ref_to_array(reader.take_ref()?)?,
                    pi_c: ref_to_array(reader.take_ref()?)?,
                };
                reader.expect_end()?;
                Operation::CashCheck(CashCheck {
                    check_id,
                    receiver,
                    pubkey_index,
                    signals,
                    proof,
                })
            }
            opcodes::CANCEL_CHECK => {
                let check_id = reader.take_check_id()?;
                reader.expect_end()?;
                Operation::CancelCheck { check_id }
            }
            opcodes::ADD_PUBKEY => {
                let key_hash = PubkeyHash::from_bytes(reader.take_array()?);
                reader.expect_end()?;
                Operation::AddPubkey { key_hash }
            }
            opcodes::REMOVE_PUBKEY => {
                let index = reader.take_uint(16)? as u16;
                reader.expect_end()?;
                Operation::RemovePubkey { index }
            }
            opcodes::SET_ACL => {
                let record = SetAcl {
                    sudoer: reader.take_address()?,
                    primary_jetton_wallet: reader.take_address()?,
                    secondary_jetton_wallet: reader.take_address()?,
                };
                reader.expect_end()?;
                Operation::SetAcl(record)
            }
            opcodes::SUDOER_REQUEST => {
                let message = reader.take_ref()?;
                let send_mode = reader.take_uint(8)? as u8;
                reader.expect_end()?;
                Operation::SudoerRequest(SudoerRequest { message, send_mode })
            }
            other => return Err(CodecError::UnknownOpcode(other)),
        };

        Ok(operation)
    }
}

impl CreateCheck {
    fn encode_into(&self, writer: &mut BitWriter) {
        writer.put_uint(u128::from(self.check_id.to_u32()), CheckId::BITS);
        writer.put_slice(self.salt.as_bytes());
        writer.put_slice(self.target_hash3.as_bytes());
        writer.put_uint(self.pubkey_indices.len() as u128, 5);
        for index in &self.pubkey_indices {
            writer.put_uint(u128::from(*index), 16);
        }
        if let Some(comment) = &self.comment {
            writer.put_slice(comment.as_bytes());
        }
    }

    fn decode_from(reader: &mut BitReader<'_>) -> Result<Self, CodecError> {
        let check_id = reader.take_check_id()?;
        let salt = Salt::from_bytes(reader.take_array()?);
        let target_hash3 = TargetHash3::from_bytes(reader.take_array()?);

        let count = reader.take_uint(5)? as usize;
        let mut pubkey_indices = Vec::with_capacity(count);
        for _ in 0..count {
            pubkey_indices.push(reader.take_uint(16)? as u16);
        }

        let comment = reader.take_tail_string()?;
        Ok(CreateCheck {
            check_id,
            salt,
            target_hash3,
            pubkey_indices,
            comment,
        })
    }
}

fn signals_to_bytes(signals: &PublicSignals) -> [u8; 100] {
    let mut bytes = [0; 100];
    bytes[..4].copy_from_slice(&signals.expires_at.to_be_bytes());
    bytes[4..36].copy_from_slice(signals.target_hash2.as_bytes());
    bytes[36..68].copy_from_slice(signals.pubkey_hash.as_bytes());
    bytes[68..].copy_from_slice(signals.receiver_address_hash_head.as_bytes());
    bytes
}

fn signals_from_bytes(bytes: &[u8]) -> Result<PublicSignals, CodecError> {
    if bytes.len() != 100 {
        return Err(CodecError::BadRefLength {
            expected: 100,
            got: bytes.len(),
        });
    }

    let mut expires_at = [0; 4];
    expires_at.copy_from_slice(&bytes[..4]);
    let mut target_hash2 = [0; 32];
    target_hash2.copy_from_slice(&bytes[4..36]);
    let mut pubkey_hash = [0; 32];
    pubkey_hash.copy_from_slice(&bytes[36..68]);
    let mut hash_head = [0; 32];
    hash_head.copy_from_slice(&bytes[68..]);

    Ok(PublicSignals {
        expires_at: u32::from_be_bytes(expires_at),
        target_hash2: TargetHash2::from_bytes(target_hash2),
        pubkey_hash: PubkeyHash::from_bytes(pubkey_hash),
        receiver_address_hash_head: HashHead::from_bytes(hash_head),
    })
}

fn ref_to_array<const N: usize>(bytes: Vec<u8>) -> Result<[u8; N], CodecError> {
    <[u8; N]>::try_from(bytes.as_slice()).map_err(|_| CodecError::BadRefLength {
        expected: N,
        got: bytes.len(),
    })
}

/// Big-endian bit-level writer backing [`Operation::encode`].
#[derive(Debug, Default)]
struct BitWriter {
    bytes: Vec<u8>,
    bit_len: usize,
}

impl BitWriter {
    fn new() -> Self {
        Self::default()
    }

    fn put_bit(&mut self, bit: bool) {
        let byte_index = self.bit_len / 8;
        if byte_index == self.bytes.len() {
            self.bytes.push(0);
        }
        if bit {
            self.bytes[byte_index] |= 0x80 >> (self.bit_len % 8);
        }
        self.bit_len += 1;
    }

    fn put_uint(&mut self, value: u128, bits: u32) {
        debug_assert!(bits == 128 || value >> bits == 0, "value wider than field");
        for shift in (0..bits).rev() {
            self.put_bit((value >> shift) & 1 == 1);
        }
    }

    fn put_slice(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.put_uint(u128::from(*byte), 8);
        }
    }

    fn put_coins(&mut self, value: Coins) {
        debug_assert!(value >> 120 == 0, "coins value wider than 120 bits");
        let byte_len = (128 - value.leading_zeros() + 7) / 8;
        self.put_uint(u128::from(byte_len), 4);
        for position in (0..byte_len).rev() {
            self.put_uint((value >> (8 * position)) & 0xff, 8);
        }
    }

    fn put_address(&mut self, address: Option<&Address>) {
        match address {
            None => self.put_uint(0b00, 2),
            Some(address) => {
                self.put_uint(0b10, 2);
                self.put_bit(false); // no anycast
                self.put_uint(u128::from(address.workchain() as u8), 8);
                self.put_slice(address.hash());
            }
        }
    }

    fn put_ref(&mut self, bytes: &[u8]) {
        assert!(bytes.len() <= usize::from(u16::MAX), "sub-record too long");
        self.put_uint(bytes.len() as u128, 16);
        self.put_slice(bytes);
    }

    fn finish(mut self) -> Vec<u8> {
        // Completion tag: one set bit, zero padding to the byte boundary.
        self.put_bit(true);
        self.bytes
    }
}

/// Big-endian bit-level reader backing [`Operation::decode`].
#[derive(Debug)]
struct BitReader<'a> {
    bytes: &'a [u8],
    pos: usize,
    len: usize,
}

impl<'a> BitReader<'a> {
    fn new(buf: &'a [u8]) -> Result<Self, CodecError> {
        let last = *buf.last().ok_or(CodecError::MissingCompletionTag)?;
        if last == 0 {
            return Err(CodecError::MissingCompletionTag);
        }
        let len = buf.len() * 8 - 1 - last.trailing_zeros() as usize;
        Ok(BitReader {
            bytes: buf,
            pos: 0,
            len,
        })
    }

    fn remaining(&self) -> usize {
        self.len - self.pos
    }

    fn take_bit(&mut self) -> Result<bool, CodecError> {
        if self.pos >= self.len {
            return Err(CodecError::Truncated);
        }
        let bit = self.bytes[self.pos / 8] & (0x80 >> (self.pos % 8)) != 0;
        self.pos += 1;
        Ok(bit)
    }

    fn take_uint(&mut self, bits: u32) -> Result<u128, CodecError> {
        if self.remaining() < bits as usize {
            return Err(CodecError::Truncated);
        }
        let mut value = 0u128;
        for _ in 0..bits {
            value = (value << 1) | u128::from(self.take_bit()?);
        }
        Ok(value)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let mut out = [0; N];
        for byte in out.iter_mut() {
            *byte = self.take_uint(8)? as u8;
        }
        Ok(out)
    }

    fn take_bytes(&mut self, count: usize) -> Result<Vec<u8>, CodecError> {
        if self.remaining() < count * 8 {
            return Err(CodecError::Truncated);
        }
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            out.push(self.take_uint(8)? as u8);
        }
        Ok(out)
    }

    fn take_check_id(&mut self) -> Result<CheckId, CodecError> {
        let raw = self.take_uint(CheckId::BITS)? as u32;
        CheckId::new(raw).ok_or(CodecError::ValueOutOfRange("check id"))
    }

    fn take_coins(&mut self) -> Result<Coins, CodecError> {
        let byte_len = self.take_uint(4)?;
        let mut value: Coins = 0;
        for _ in 0..byte_len {
            value = (value << 8) | Coins::from(self.take_uint(8)? as u8);
        }
        Ok(value)
    }

    fn take_address(&mut self) -> Result<Option<Address>, CodecError> {
        match self.take_uint(2)? {
            0b00 => Ok(None),
            0b10 => {
                if self.take_bit()? {
                    // Anycast routing is not part of this escrow's surface.
                    return Err(CodecError::UnsupportedAddress);
                }
                let workchain = self.take_uint(8)? as u8 as i8;
                let hash = self.take_array()?;
                Ok(Some(Address::new(workchain, hash)))
            }
            _ => Err(CodecError::UnsupportedAddress),
        }
    }

    fn take_ref(&mut self) -> Result<Vec<u8>, CodecError> {
        let byte_len = self.take_uint(16)? as usize;
        self.take_bytes(byte_len)
    }

    fn take_tail_string(&mut self) -> Result<Option<String>, CodecError> {
        if self.remaining() % 8 != 0 {
            return Err(CodecError::MalformedComment);
        }
        let bytes = self.take_bytes(self.remaining() / 8)?;
        if bytes.is_empty() {
            return Ok(None);
        }
        String::from_utf8(bytes)
            .map(Some)
            .map_err(|_| CodecError::MalformedComment)
    }

    fn expect_end(&self) -> Result<(), CodecError> {
        if self.remaining() == 0 {
            Ok(())
        } else {
            Err(CodecError::TrailingBits)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn check_id(raw: u32) -> CheckId {
        CheckId::new(raw).unwrap()
    }

    #[test]
    fn cancel_check_wire_fixture() {
        let encoded = Operation::CancelCheck {
            check_id: check_id(7),
        }
        .encode();
        assert_eq!(encoded, hex::decode("4a1c5e3b000078").unwrap());
    }

    #[test]
    fn create_check_round_trips() {
        let record = CreateCheck {
            check_id: check_id(0xabcde),
            salt: Salt::from_bytes([0x11; 16]),
            target_hash3: TargetHash3::from_bytes([0x22; 32]),
            pubkey_indices: vec![1, 4, 300],
            comment: Some("coffee ☕".to_string()),
        };

        let decoded = Operation::decode(&Operation::CreateCheck(record.clone()).encode()).unwrap();
        assert_eq!(decoded, Operation::CreateCheck(record));
    }

    #[test]
    fn cash_check_round_trips() {
        let record = CashCheck {
            check_id: check_id(7),
            receiver: Some(Address::new(0, [0x33; 32])),
            pubkey_index: 5,
            signals: PublicSignals {
                expires_at: 1_750_000_000,
                target_hash2: TargetHash2::from_bytes([0x44; 32]),
                pubkey_hash: PubkeyHash::from_bytes([0x55; 32]),
                receiver_address_hash_head: HashHead::from_bytes([0x66; 32]),
            },
            proof: ProofBlob {
                pi_a: [0x77; 48],
                pi_b: [0x88; 96],
                pi_c: [0x99; 48],
            },
        };

        let decoded = Operation::decode(&Operation::CashCheck(record).encode()).unwrap();
        assert_eq!(decoded, Operation::CashCheck(record));
    }

    #[test]
    fn set_acl_round_trips_absent_fields() {
        let record = SetAcl {
            sudoer: Some(Address::new(-1, [0x01; 32])),
            primary_jetton_wallet: None,
            secondary_jetton_wallet: Some(Address::new(0, [0x02; 32])),
        };

        let decoded = Operation::decode(&Operation::SetAcl(record).encode()).unwrap();
        assert_eq!(decoded, Operation::SetAcl(record));
    }

    #[test]
    fn notification_round_trips_with_and_without_payload() {
        let inner = Operation::CreateCheck(CreateCheck {
            check_id: check_id(9),
            salt: Salt::from_bytes([0; 16]),
            target_hash3: TargetHash3::from_bytes([0; 32]),
            pubkey_indices: vec![1],
            comment: None,
        })
        .encode();

        for forward_payload in vec![Some(inner), None] {
            let record = TransferNotification {
                query_id: 42,
                amount: 1_000_000,
                sender: Address::new(0, [0x07; 32]),
                forward_payload,
            };
            let decoded =
                Operation::decode(&Operation::TransferNotification(record.clone()).encode())
                    .unwrap();
            assert_eq!(decoded, Operation::TransferNotification(record));
        }
    }

    #[test]
    fn empty_and_tagless_buffers_are_rejected() {
        assert_eq!(
            Operation::decode(&[]),
            Err(CodecError::MissingCompletionTag)
        );
        assert_eq!(
            Operation::decode(&[0x4a, 0x1c, 0x5e, 0x3b, 0x00]),
            Err(CodecError::MissingCompletionTag)
        );
    }

    #[test]
    fn short_records_are_rejected() {
        // A cancel record cut off right after the opcode.
        assert_eq!(
            Operation::decode(&[0x4a, 0x1c, 0x5e, 0x3b, 0x80]),
            Err(CodecError::Truncated)
        );
    }

    #[test]
    fn unknown_opcodes_are_rejected() {
        let mut writer = BitWriter::new();
        writer.put_uint(0xdead_beef, 32);
        assert_eq!(
            Operation::decode(&writer.finish()),
            Err(CodecError::UnknownOpcode(0xdead_beef))
        );
    }

    #[test]
    fn trailing_bits_are_rejected() {
        let mut writer = BitWriter::new();
        writer.put_uint(u128::from(opcodes::CANCEL_CHECK), 32);
        writer.put_uint(7, CheckId::BITS);
        writer.put_uint(0, 8); // stray byte past the record
        assert_eq!(
            Operation::decode(&writer.finish()),
            Err(CodecError::TrailingBits)
        );
    }

    #[test]
    fn bad_address_tags_are_rejected() {
        let mut writer = BitWriter::new();
        writer.put_uint(u128::from(opcodes::SET_ACL), 32);
        writer.put_uint(0b01, 2); // neither absent nor standard
        assert_eq!(
            Operation::decode(&writer.finish()),
            Err(CodecError::UnsupportedAddress)
        );
    }

    #[test]
    fn ragged_comment_tails_are_rejected() {
        let mut writer = BitWriter::new();
        writer.put_uint(u128::from(opcodes::CREATE_CHECK), 32);
        writer.put_uint(7, CheckId::BITS);
        writer.put_slice(&[0x11; 16]);
        writer.put_slice(&[0x22; 32]);
        writer.put_uint(0, 5);
        writer.put_bit(true); // half a comment byte
        assert_eq!(
            Operation::decode(&writer.finish()),
            Err(CodecError::MalformedComment)
        );
    }

    #[test]
    fn wrong_signal_frame_size_is_rejected() {
        let mut writer = BitWriter::new();
        writer.put_uint(u128::from(opcodes::CASH_CHECK), 32);
        writer.put_uint(7, CheckId::BITS);
        writer.put_address(Some(&Address::new(0, [0x33; 32])));
        writer.put_uint(1, 4);
        writer.put_ref(&[0; 99]); // one byte short of a signal record
        assert_eq!(
            Operation::decode(&writer.finish()),
            Err(CodecError::BadRefLength {
                expected: 100,
                got: 99
            })
        );
    }

    #[test]
    fn coins_round_trip_boundary_values() {
        for value in vec![0u128, 1, 255, 256, 1_000_000_000, (1 << 120) - 1] {
            let mut writer = BitWriter::new();
            writer.put_coins(value);
            let buf = writer.finish();
            let mut reader = BitReader::new(&buf).unwrap();
            assert_eq!(reader.take_coins().unwrap(), value);
        }
    }
}
