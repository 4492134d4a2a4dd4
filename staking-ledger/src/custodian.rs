//! The token custodian seam.
//!
//! The ledger never mutates balances itself.  Deposits and withdrawals are
//! delegated to a [`TokenCustodian`], which moves tokens between holder
//! accounts and the ledger's custody account.

use {
    log::*,
    solana_pubkey::Pubkey,
    std::collections::HashMap,
    thiserror::Error,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CustodyError {
    #[error("insufficient funds: {needed} needed, {available} available")]
    InsufficientFunds { needed: u128, available: u128 },

    #[error("balance overflow crediting {account}")]
    BalanceOverflow { account: Pubkey },

    #[error("transfer rejected: {reason}")]
    Rejected { reason: String },

    #[error("failed to reverse payout to {account}: {reason}")]
    ReversalFailed { account: Pubkey, reason: String },
}

/// Holds token balances and executes transfers on the ledger's instruction.
///
/// A transfer either completes in full or returns an error and moves nothing.
pub trait TokenCustodian {
    /// Moves `amount` from `from` into the ledger's custody account.
    fn transfer_in(&mut self, from: &Pubkey, amount: u128) -> Result<(), CustodyError>;

    /// Moves `amount` out of the ledger's custody account to `to`.
    fn transfer_out(&mut self, to: &Pubkey, amount: u128) -> Result<(), CustodyError>;

    /// Returns the balance held by `address`.
    fn balance_of(&self, address: &Pubkey) -> u128;

    /// Moves every `(to, amount)` out of custody, or none of them.
    ///
    /// Transfers run in order.  When one fails, the ones already made are
    /// returned to custody in reverse order and the failure is reported.
    fn transfer_out_all(&mut self, transfers: &[(Pubkey, u128)]) -> Result<(), CustodyError> {
        for (done, (to, amount)) in transfers.iter().enumerate() {
            let Err(err) = self.transfer_out(to, *amount) else {
                continue;
            };
            warn!("payout of {amount} to {to} failed ({err}), reversing {done} transfers");
            for (paid, amount) in transfers.iter().take(done).rev() {
                self.transfer_in(paid, *amount).map_err(|undo| {
                    error!("reversing payout of {amount} to {paid} failed: {undo}");
                    CustodyError::ReversalFailed {
                        account: *paid,
                        reason: undo.to_string(),
                    }
                })?;
            }
            return Err(err);
        }
        Ok(())
    }
}

impl<C: TokenCustodian + ?Sized> TokenCustodian for Box<C> {
    fn transfer_in(&mut self, from: &Pubkey, amount: u128) -> Result<(), CustodyError> {
        (**self).transfer_in(from, amount)
    }

    fn transfer_out(&mut self, to: &Pubkey, amount: u128) -> Result<(), CustodyError> {
        (**self).transfer_out(to, amount)
    }

    fn balance_of(&self, address: &Pubkey) -> u128 {
        (**self).balance_of(address)
    }

    fn transfer_out_all(&mut self, transfers: &[(Pubkey, u128)]) -> Result<(), CustodyError> {
        (**self).transfer_out_all(transfers)
    }
}

/// Balance-map custodian for simulations and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCustodian {
    custody_account: Pubkey,
    balances: HashMap<Pubkey, u128>,
}

impl InMemoryCustodian {
    pub fn new(custody_account: Pubkey) -> Self {
        Self {
            custody_account,
            balances: HashMap::new(),
        }
    }

    pub fn custody_account(&self) -> &Pubkey {
        &self.custody_account
    }

    /// Mints `amount` into `account`.
    pub fn credit(&mut self, account: &Pubkey, amount: u128) -> Result<(), CustodyError> {
        let balance = self.balances.entry(*account).or_default();
        *balance = balance
            .checked_add(amount)
            .ok_or(CustodyError::BalanceOverflow { account: *account })?;
        Ok(())
    }

    fn move_tokens(&mut self, from: &Pubkey, to: &Pubkey, amount: u128) -> Result<(), CustodyError> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(CustodyError::InsufficientFunds {
                needed: amount,
                available,
            });
        }
        if from == to {
            return Ok(());
        }
        let credited = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(CustodyError::BalanceOverflow { account: *to })?;
        self.balances.insert(*from, available.saturating_sub(amount));
        self.balances.insert(*to, credited);
        Ok(())
    }
}

impl TokenCustodian for InMemoryCustodian {
    fn transfer_in(&mut self, from: &Pubkey, amount: u128) -> Result<(), CustodyError> {
        let custody = self.custody_account;
        self.move_tokens(from, &custody, amount)
    }

    fn transfer_out(&mut self, to: &Pubkey, amount: u128) -> Result<(), CustodyError> {
        let custody = self.custody_account;
        self.move_tokens(&custody, to, amount)
    }

    fn balance_of(&self, address: &Pubkey) -> u128 {
        self.balances.get(address).copied().unwrap_or_default()
    }
}
