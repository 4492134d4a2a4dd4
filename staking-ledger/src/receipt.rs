//! Results returned by ledger write operations.

use {
    serde::{Deserialize, Serialize},
    solana_pubkey::Pubkey,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeStartReceipt {
    pub stake_id: u64,
    /// Position of the new stake in the owner's list.
    pub stake_index: usize,
    pub stake_shares: u128,
    pub locked_day: u64,
    /// Share rate the stake was priced at.
    pub share_rate: u128,
}

/// Figures of a stake closed (or previewed) on `settlement_day`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeSettlement {
    pub stake_id: u64,
    pub owner: Pubkey,
    pub settlement_day: u64,
    pub payout: u128,
    /// Penalty before capping at `principal + payout`.
    pub penalty: u128,
    pub capped_penalty: u128,
    pub stake_return: u128,
    /// Tokens returned to the closing day's payout: the pool's half of the
    /// penalty plus payout accrued after maturity.
    pub redistributed: u128,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingReceipt {
    pub first_day: u64,
    pub days_count: u64,
    pub amount_per_day: u128,
    /// Tokens pulled from the funder.
    pub total: u128,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatchUpReport {
    pub first_day: u64,
    /// `daily_data_count` after the update.
    pub end_day: u64,
    /// Days still unprocessed below the requested day.
    pub remaining_days: u64,
}

impl CatchUpReport {
    pub fn days_processed(&self) -> u64 {
        self.end_day.saturating_sub(self.first_day)
    }

    pub fn is_complete(&self) -> bool {
        self.remaining_days == 0
    }
}
