//! The fee schedule, in units of 10⁻⁹ of the native currency.
//!
//! Gas reserves are withheld when a check is opened so that cashing, which
//! arrives as an external message with no value of its own, can be paid
//! for out of the instance balance. The cancel fee is fixed and retained.

use crate::Coins;

/// Reserve withheld from the attached value of a native create.
pub const CREATE_GAS: Coins = 6_000_000;
/// Reserve required on the native envelope of a token-funded create.
pub const JETTON_CREATE_GAS: Coins = 7_000_000;
/// Deducted from a native payout to cover cashing.
pub const CASH_GAS: Coins = 50_000_000;
/// Cost of a plain native transfer.
pub const TRANSFER_FEE: Coins = 3_000_000;
/// Fixed fee retained when a creator reclaims an unclaimed check.
pub const CANCEL_FEE: Coins = 100_000_000;
/// Native value attached to a token payout.
pub const JETTON_TRANSFER_FEE: Coins = 50_000_000;
/// Native value attached to a minimal-payload token payout.
pub const TINY_JETTON_TRANSFER_FEE: Coins = 18_000_000;
