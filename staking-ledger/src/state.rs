use {
    crate::{constants::INITIAL_SHARE_RATE, daily::DailyRewardLedger},
    borsh::{BorshDeserialize, BorshSerialize},
    serde::{Deserialize, Serialize},
    solana_pubkey::Pubkey,
    std::collections::BTreeMap,
};

/// Lifecycle phase of a stake, derived from the current day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StakePhase {
    /// Created, shares join the pool on `locked_day`.
    Pending,
    /// Accruing payout.
    Active,
    /// Committed duration fully served, still open.
    Matured,
    /// `unlocked_day` is set.
    Closed,
}

/// A locked-deposit position.
///
/// `staked_amount` and `stake_shares` never change after creation, and
/// `unlocked_day` moves from 0 to the closing day exactly once.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct Stake {
    /// Globally unique, assigned in creation order starting at 1.
    pub stake_id: u64,
    pub owner: Pubkey,
    /// Principal in token base units.
    pub staked_amount: u128,
    pub stake_shares: u128,
    /// First day the stake accrues payout (start day + 1).
    pub locked_day: u64,
    /// Committed duration in days.
    pub staked_days: u64,
    /// Day the stake was closed, 0 while open.
    pub unlocked_day: u64,
}

impl Stake {
    pub fn is_open(&self) -> bool {
        self.unlocked_day == 0
    }

    /// First day past the committed duration.
    pub fn maturity_day(&self) -> u64 {
        self.locked_day.saturating_add(self.staked_days)
    }

    pub fn served_days(&self, day: u64) -> u64 {
        day.saturating_sub(self.locked_day)
    }

    pub fn phase(&self, day: u64) -> StakePhase {
        if !self.is_open() {
            StakePhase::Closed
        } else if day < self.locked_day {
            StakePhase::Pending
        } else if day < self.maturity_day() {
            StakePhase::Active
        } else {
            StakePhase::Matured
        }
    }
}

/// Ledger-wide totals.
///
/// `stake_shares_total + next_stake_shares_total` equals the shares of every
/// open stake, and `locked_stake_total` equals their principal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct GlobalState {
    pub locked_stake_total: u128,
    /// Shares in the accruing pool.
    pub stake_shares_total: u128,
    /// Shares of stakes whose `locked_day` has not been processed yet.
    pub next_stake_shares_total: u128,
    /// Capped penalties assessed since launch.
    pub stake_penalty_total: u128,
    /// Principal per share, scaled by `SHARE_RATE_SCALE`.  Never decreases.
    pub share_rate: u128,
    /// Days whose per-share payout has been fixed.
    pub daily_data_count: u64,
}

impl Default for GlobalState {
    fn default() -> Self {
        Self {
            locked_stake_total: 0,
            stake_shares_total: 0,
            next_stake_shares_total: 0,
            stake_penalty_total: 0,
            share_rate: INITIAL_SHARE_RATE,
            daily_data_count: 0,
        }
    }
}

/// Reward record of one day.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct DailyDatum {
    /// Tokens funded for (or redistributed into) this day.
    pub day_payout_total: u128,
    /// Payout per share scaled by `PAYOUT_INDEX_SCALE`; fixed once processed.
    pub day_share_payout: u128,
    /// Share pool the day was divided over; 0 until processed.
    pub day_stake_shares_total: u128,
}

/// Complete persisted state of a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Default, BorshSerialize, BorshDeserialize)]
pub struct LedgerState {
    pub globals: GlobalState,
    pub daily: DailyRewardLedger,
    /// Stakes per owner, in insertion order modulo swap-removal.
    pub stakes: BTreeMap<Pubkey, Vec<Stake>>,
    /// Id assigned to the next stake.
    pub next_stake_id: u64,
}

impl LedgerState {
    pub fn new() -> Self {
        Self {
            next_stake_id: 1,
            ..Self::default()
        }
    }

    pub fn stakes_of(&self, owner: &Pubkey) -> &[Stake] {
        self.stakes.get(owner).map(Vec::as_slice).unwrap_or_default()
    }

    /// All stakes with `unlocked_day == 0`.
    pub fn open_stakes(&self) -> impl Iterator<Item = &Stake> {
        self.stakes.values().flatten().filter(|stake| stake.is_open())
    }
}
