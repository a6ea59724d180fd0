//! Access control: the sudo-controller and the linked asset wallets.

use crate::address::Address;
use serde::{Deserialize, Serialize};

/// The administrative accounts of an escrow instance.
///
/// The sudoer gates registry maintenance, access-control updates, and raw
/// message forwarding. The asset wallets are the only accounts whose
/// transfer notifications may fund token-based checks. Fields are replaced
/// wholesale by `SetAcl`; clearing the sudoer permanently disables
/// administrative operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessControl {
    sudoer: Option<Address>,
    primary_jetton_wallet: Option<Address>,
    secondary_jetton_wallet: Option<Address>,
}

impl AccessControl {
    /// Access control as installed at deployment: a sudoer, no wallets.
    pub(crate) fn new(sudoer: Address) -> Self {
        AccessControl {
            sudoer: Some(sudoer),
            primary_jetton_wallet: None,
            secondary_jetton_wallet: None,
        }
    }

    /// True if the account is the current sudoer.
    pub fn is_sudoer(&self, who: &Address) -> bool {
        self.sudoer.as_ref() == Some(who)
    }

    /// True if the account is a registered asset wallet.
    pub fn is_registered_jetton_wallet(&self, who: &Address) -> bool {
        self.primary_jetton_wallet.as_ref() == Some(who)
            || self.secondary_jetton_wallet.as_ref() == Some(who)
    }

    /// Replace the whole triple; absent fields are cleared.
    pub(crate) fn replace(
        &mut self,
        sudoer: Option<Address>,
        primary_jetton_wallet: Option<Address>,
        secondary_jetton_wallet: Option<Address>,
    ) {
        self.sudoer = sudoer;
        self.primary_jetton_wallet = primary_jetton_wallet;
        self.secondary_jetton_wallet = secondary_jetton_wallet;
    }

    /// The current sudoer, if any.
    pub fn sudoer(&self) -> Option<&Address> {
        self.sudoer.as_ref()
    }

    /// The primary asset wallet, if set.
    pub fn primary_jetton_wallet(&self) -> Option<&Address> {
        self.primary_jetton_wallet.as_ref()
    }

    /// The secondary asset wallet, if set.
    pub fn secondary_jetton_wallet(&self) -> Option<&Address> {
        self.secondary_jetton_wallet.as_ref()
    }
}
