//! Per-day reward registry and lazy accrual.
//!
//! Funding is recorded per future day.  Catch-up fixes the per-share payout of
//! each unprocessed day against that day's share pool and extends a
//! cumulative index, so the payout of any stake over any day window is one
//! subtraction:
//!
//! ```text
//! index[0]     = 0
//! index[d + 1] = index[d] + day_share_payout[d]
//! payout       = shares * (index[to] - index[from]) / PAYOUT_INDEX_SCALE
//! ```
//!
//! Catch-up is split into [`DailyRewardLedger::plan_catch_up`], which only
//! reads, and [`DailyRewardLedger::commit_catch_up`], so an operation can
//! settle against the caught-up view and abandon it if a later step fails.

use {
    crate::{
        constants::PAYOUT_INDEX_SCALE,
        error::StakingError,
        math::{checked_add, checked_sub, mul_div},
        state::{DailyDatum, GlobalState},
    },
    borsh::{BorshDeserialize, BorshSerialize},
    log::*,
    std::collections::BTreeMap,
};

/// Read access to the cumulative per-share payout index.
pub trait PayoutIndex {
    /// `index[day]`: per-share payout of all days before `day`.
    fn index_at(&self, day: u64) -> Result<u128, StakingError>;

    /// Payout earned by `shares` over days `[from_day, to_day)`.
    fn accrued(&self, shares: u128, from_day: u64, to_day: u64) -> Result<u128, StakingError> {
        if to_day <= from_day {
            return Ok(0);
        }
        let delta = checked_sub(self.index_at(to_day)?, self.index_at(from_day)?)?;
        mul_div(shares, delta, PAYOUT_INDEX_SCALE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct DailyRewardLedger {
    /// Day records; days without an entry have no funding.
    days: BTreeMap<u64, DailyDatum>,
    /// `cumulative_index[d]` for every `d <= processed_days()`.
    cumulative_index: Vec<u128>,
    /// Shares joining the pool on the keyed day.
    pending_shares: BTreeMap<u64, u128>,
    /// Undistributed payout carried into the next processed day.
    carry: u128,
}

impl Default for DailyRewardLedger {
    fn default() -> Self {
        Self {
            days: BTreeMap::new(),
            cumulative_index: vec![0],
            pending_shares: BTreeMap::new(),
            carry: 0,
        }
    }
}

impl DailyRewardLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of days whose per-share payout is fixed.
    pub fn processed_days(&self) -> u64 {
        u64::try_from(self.cumulative_index.len().saturating_sub(1)).unwrap_or(u64::MAX)
    }

    pub fn carry(&self) -> u128 {
        self.carry
    }

    pub fn datum(&self, day: u64) -> DailyDatum {
        self.days.get(&day).copied().unwrap_or_default()
    }

    pub fn day_payout_total(&self, day: u64) -> u128 {
        self.datum(day).day_payout_total
    }

    /// Shares scheduled to join the pool on `day`.
    pub fn pending_shares(&self, day: u64) -> u128 {
        self.pending_shares.get(&day).copied().unwrap_or_default()
    }

    /// Sum of all scheduled shares.  Equals `next_stake_shares_total`.
    pub fn pending_shares_total(&self) -> Result<u128, StakingError> {
        self.pending_shares
            .values()
            .try_fold(0u128, |total, shares| checked_add(total, *shares))
    }

    // -----------------------------------------------------------------------
    // Funding
    // -----------------------------------------------------------------------

    /// Adds `amount_per_day` to each day in `[first_day, first_day + days_count)`.
    pub fn fund(
        &mut self,
        amount_per_day: u128,
        first_day: u64,
        days_count: u64,
    ) -> Result<(), StakingError> {
        let updates = self.plan_funding(amount_per_day, first_day, days_count)?;
        self.apply_funding(updates);
        Ok(())
    }

    /// New payout totals for [`Self::fund`], computed without writing.
    pub fn plan_funding(
        &self,
        amount_per_day: u128,
        first_day: u64,
        days_count: u64,
    ) -> Result<Vec<(u64, u128)>, StakingError> {
        let end_day = first_day
            .checked_add(days_count)
            .ok_or(StakingError::ArithmeticOverflow)?;
        (first_day..end_day)
            .map(|day| {
                checked_add(self.day_payout_total(day), amount_per_day).map(|total| (day, total))
            })
            .collect()
    }

    pub fn apply_funding(&mut self, updates: Vec<(u64, u128)>) {
        for (day, total) in updates {
            self.set_day_payout_total(day, total);
        }
    }

    /// Overwrites the payout total of an unprocessed day.
    pub fn set_day_payout_total(&mut self, day: u64, total: u128) {
        self.days.entry(day).or_default().day_payout_total = total;
    }

    // -----------------------------------------------------------------------
    // Pending share schedule
    // -----------------------------------------------------------------------

    /// Shares that would be scheduled for `day` after adding `shares`.
    pub fn pending_shares_after(&self, day: u64, shares: u128) -> Result<u128, StakingError> {
        checked_add(self.pending_shares(day), shares)
    }

    /// Replaces the shares scheduled for `day`; zero clears the entry.
    pub fn set_pending_shares(&mut self, day: u64, shares: u128) {
        if shares == 0 {
            self.pending_shares.remove(&day);
        } else {
            self.pending_shares.insert(day, shares);
        }
    }

    // -----------------------------------------------------------------------
    // Catch-up
    // -----------------------------------------------------------------------

    /// Computes the effect of processing every day before `target_day`
    /// without modifying the ledger.  A target at or below
    /// [`Self::processed_days`] yields an empty plan.
    pub fn plan_catch_up(
        &self,
        globals: &GlobalState,
        target_day: u64,
    ) -> Result<CatchUp, StakingError> {
        let first_day = self.processed_days();
        let end_day = target_day.max(first_day);
        let mut plan = CatchUp {
            first_day,
            end_day,
            processed: Vec::new(),
            index_tail: Vec::new(),
            activated_days: Vec::new(),
            stake_shares_total: globals.stake_shares_total,
            next_stake_shares_total: globals.next_stake_shares_total,
            carry: self.carry,
        };
        let mut index = self.cumulative_index.last().copied().unwrap_or_default();

        for day in first_day..end_day {
            if let Some(shares) = self.pending_shares.get(&day) {
                plan.stake_shares_total = checked_add(plan.stake_shares_total, *shares)?;
                plan.next_stake_shares_total = checked_sub(plan.next_stake_shares_total, *shares)?;
                plan.activated_days.push(day);
            }

            let funded = self.day_payout_total(day);
            let distributable = checked_add(funded, plan.carry)?;
            let day_share_payout = if plan.stake_shares_total == 0 {
                plan.carry = distributable;
                0
            } else {
                plan.carry = 0;
                mul_div(distributable, PAYOUT_INDEX_SCALE, plan.stake_shares_total)?
            };
            index = checked_add(index, day_share_payout)?;

            plan.processed.push(DailyDatum {
                day_payout_total: funded,
                day_share_payout,
                day_stake_shares_total: plan.stake_shares_total,
            });
            plan.index_tail.push(index);
        }

        Ok(plan)
    }

    /// Applies a plan produced by [`Self::plan_catch_up`] against the current
    /// state.
    pub fn commit_catch_up(&mut self, plan: CatchUp) {
        if plan.first_day != self.processed_days() {
            warn!(
                "discarding stale catch-up plan starting at day {} (processed {})",
                plan.first_day,
                self.processed_days()
            );
            return;
        }
        for (day, datum) in (plan.first_day..plan.end_day).zip(plan.processed) {
            if datum.day_payout_total != 0 || datum.day_share_payout != 0 {
                debug!(
                    "day {day}: payout {} over {} shares, {} per share",
                    datum.day_payout_total, datum.day_stake_shares_total, datum.day_share_payout
                );
            }
            self.days.insert(day, datum);
        }
        for day in plan.activated_days {
            self.pending_shares.remove(&day);
        }
        self.cumulative_index.extend(plan.index_tail);
        self.carry = plan.carry;
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Records for days `[from_day, to_day)`.
    pub fn range(&self, from_day: u64, to_day: u64) -> Vec<DailyDatum> {
        (from_day..to_day).map(|day| self.datum(day)).collect()
    }
}

impl PayoutIndex for DailyRewardLedger {
    fn index_at(&self, day: u64) -> Result<u128, StakingError> {
        usize::try_from(day)
            .ok()
            .and_then(|day| self.cumulative_index.get(day))
            .copied()
            .ok_or(StakingError::FutureDay {
                day,
                current_day: self.processed_days(),
            })
    }
}

/// The outcome of catching up a [`DailyRewardLedger`], not yet applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatchUp {
    first_day: u64,
    end_day: u64,
    processed: Vec<DailyDatum>,
    /// `index[first_day + 1 ..= end_day]`.
    index_tail: Vec<u128>,
    activated_days: Vec<u64>,
    stake_shares_total: u128,
    next_stake_shares_total: u128,
    carry: u128,
}

impl CatchUp {
    /// First day processed by this plan.
    pub fn first_day(&self) -> u64 {
        self.first_day
    }

    /// `daily_data_count` once applied.
    pub fn end_day(&self) -> u64 {
        self.end_day
    }

    pub fn days_processed(&self) -> u64 {
        self.end_day.saturating_sub(self.first_day)
    }

    /// Pool shares once applied.
    pub fn stake_shares_total(&self) -> u128 {
        self.stake_shares_total
    }

    /// Scheduled shares once applied.
    pub fn next_stake_shares_total(&self) -> u128 {
        self.next_stake_shares_total
    }

    /// Whether shares scheduled for `day` were still scheduled after this plan.
    pub fn leaves_pending(&self, day: u64) -> bool {
        day >= self.end_day
    }

    /// Writes the plan's totals into `globals`.
    pub fn apply_totals(&self, globals: &mut GlobalState) {
        globals.stake_shares_total = self.stake_shares_total;
        globals.next_stake_shares_total = self.next_stake_shares_total;
        globals.daily_data_count = self.end_day;
    }

    /// The index as it reads once this plan is applied to `ledger`.
    pub fn view<'a>(&'a self, ledger: &'a DailyRewardLedger) -> AccrualView<'a> {
        AccrualView {
            ledger,
            catch_up: self,
        }
    }
}

/// A [`DailyRewardLedger`] seen through an unapplied [`CatchUp`].
#[derive(Debug, Clone, Copy)]
pub struct AccrualView<'a> {
    ledger: &'a DailyRewardLedger,
    catch_up: &'a CatchUp,
}

impl PayoutIndex for AccrualView<'_> {
    fn index_at(&self, day: u64) -> Result<u128, StakingError> {
        if day <= self.catch_up.first_day {
            return self.ledger.index_at(day);
        }
        day.checked_sub(self.catch_up.first_day)
            .and_then(|offset| offset.checked_sub(1))
            .and_then(|offset| usize::try_from(offset).ok())
            .and_then(|offset| self.catch_up.index_tail.get(offset))
            .copied()
            .ok_or(StakingError::FutureDay {
                day,
                current_day: self.catch_up.end_day,
            })
    }
}
