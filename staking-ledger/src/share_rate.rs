//! Principal-to-share conversion.
//!
//! The share rate only rises.  It is raised from the outcome of stakes that
//! close at full maturity with no penalty, so new shares are always priced
//! against the best payout the ledger has actually delivered.

use {
    crate::{
        constants::{
            AMOUNT_BONUS_FLOOR, AMOUNT_BONUS_MAX, AMOUNT_BONUS_SCALE, DURATION_BONUS_DAYS,
            DURATION_BONUS_MAX_EXTRA_DAYS, SHARE_RATE_SCALE,
        },
        error::StakingError,
        math::{checked_add, mul_div},
    },
    log::*,
};

/// Bonus shares (before rate conversion) earned by `amount` committed for
/// `days`.
///
/// ```text
/// bonus = amount * min(days - 1, 1080) / 60
///       + amount * min(max(amount - 50_000, 0), 1_000_000) / 2_000_000
/// ```
pub fn bonus_shares(amount: u128, days: u64) -> Result<u128, StakingError> {
    let extra_days = days
        .saturating_sub(1)
        .min(DURATION_BONUS_MAX_EXTRA_DAYS);
    let duration_bonus = mul_div(
        amount,
        u128::from(extra_days),
        u128::from(DURATION_BONUS_DAYS),
    )?;
    let bonus_amount = amount
        .saturating_sub(AMOUNT_BONUS_FLOOR)
        .min(AMOUNT_BONUS_MAX);
    let amount_bonus = mul_div(amount, bonus_amount, AMOUNT_BONUS_SCALE)?;
    checked_add(duration_bonus, amount_bonus)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShareRateController {
    share_rate: u128,
}

impl ShareRateController {
    pub fn new(share_rate: u128) -> Self {
        Self { share_rate }
    }

    pub fn current_rate(&self) -> u128 {
        self.share_rate
    }

    /// Smallest principal accepted, in base units: the share rate itself.
    pub fn minimum_stake(&self) -> u128 {
        self.share_rate
    }

    pub fn check_minimum(&self, amount: u128) -> Result<(), StakingError> {
        let minimum = self.minimum_stake();
        if amount < minimum {
            return Err(StakingError::BelowMinimum { amount, minimum });
        }
        Ok(())
    }

    /// Shares issued for `amount` committed for `days`.
    pub fn stake_shares(&self, amount: u128, days: u64) -> Result<u128, StakingError> {
        let boosted = checked_add(amount, bonus_shares(amount, days)?)?;
        mul_div(boosted, SHARE_RATE_SCALE, self.share_rate)
    }

    /// Returns the raised rate implied by a stake that returned
    /// `stake_return` for `stake_shares` over `staked_days`, or `None` if it
    /// does not beat the current rate.
    pub fn observe(
        &self,
        stake_return: u128,
        staked_days: u64,
        stake_shares: u128,
    ) -> Result<Option<u128>, StakingError> {
        if stake_shares == 0 {
            return Ok(None);
        }
        let boosted = checked_add(stake_return, bonus_shares(stake_return, staked_days)?)?;
        let candidate = mul_div(boosted, SHARE_RATE_SCALE, stake_shares)?;
        if candidate > self.share_rate {
            debug!("share rate {} -> {candidate}", self.share_rate);
            Ok(Some(candidate))
        } else {
            Ok(None)
        }
    }
}
