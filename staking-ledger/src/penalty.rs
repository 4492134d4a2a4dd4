//! Early and late exit penalties.
//!
//! ```text
//! served < staked   early: window w = max(ceil(staked / 2), 30)
//!                     served == 0   principal
//!                     served <  w   payout * w / served
//!                     otherwise     payout of the first w days
//! served >= staked  late:  late = day - maturity
//!                     late <= 30    0
//!                     otherwise     (principal + payout) * (late - 30) / 100, capped
//! ```
//!
//! The assessed penalty is capped at `principal + payout`.

use {
    crate::{
        config::PenaltyRouting,
        constants::{early_penalty_days, LATE_PENALTY_GRACE_DAYS, LATE_PENALTY_SCALE_DAYS},
        daily::PayoutIndex,
        error::StakingError,
        math::{apply_bps, checked_add, checked_sub, mul_div},
        state::Stake,
    },
    serde::{Deserialize, Serialize},
};

/// Payout and penalty of a stake as of one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PenaltyAssessment {
    pub payout: u128,
    pub penalty: u128,
    pub capped_penalty: u128,
    pub stake_return: u128,
}

/// Assesses `stake` as if it closed on `day`.
pub fn assess(
    stake: &Stake,
    day: u64,
    index: &impl PayoutIndex,
) -> Result<PenaltyAssessment, StakingError> {
    let served_days = stake.served_days(day);
    let maturity_day = stake.maturity_day();
    let payout = index.accrued(stake.stake_shares, stake.locked_day, day.min(maturity_day))?;
    let total = checked_add(stake.staked_amount, payout)?;

    let penalty = if served_days < stake.staked_days {
        early_penalty(stake, served_days, payout, index)?
    } else {
        late_penalty(total, day.saturating_sub(maturity_day))?
    };
    let capped_penalty = penalty.min(total);

    Ok(PenaltyAssessment {
        payout,
        penalty,
        capped_penalty,
        stake_return: checked_sub(total, capped_penalty)?,
    })
}

pub fn early_penalty(
    stake: &Stake,
    served_days: u64,
    payout: u128,
    index: &impl PayoutIndex,
) -> Result<u128, StakingError> {
    let penalty_days = early_penalty_days(stake.staked_days);
    if served_days == 0 {
        return Ok(stake.staked_amount);
    }
    if served_days < penalty_days {
        return mul_div(payout, u128::from(penalty_days), u128::from(served_days));
    }
    let window_end = stake
        .locked_day
        .checked_add(penalty_days)
        .ok_or(StakingError::ArithmeticOverflow)?;
    index.accrued(stake.stake_shares, stake.locked_day, window_end)
}

/// Penalty on `total` (principal plus payout) for closing `late_days` after
/// maturity.
pub fn late_penalty(total: u128, late_days: u64) -> Result<u128, StakingError> {
    let ramp_days = late_days.saturating_sub(LATE_PENALTY_GRACE_DAYS);
    if ramp_days == 0 {
        return Ok(0);
    }
    if ramp_days >= LATE_PENALTY_SCALE_DAYS {
        return Ok(total);
    }
    mul_div(
        total,
        u128::from(ramp_days),
        u128::from(LATE_PENALTY_SCALE_DAYS),
    )
}

/// Where a capped penalty goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PenaltyDisposition {
    /// Added back to the closing day's payout.
    pub redistributed: u128,
    /// Paid to the penalty recipient.
    pub recipient: u128,
    /// Paid to the penalty sink.
    pub burn: u128,
}

impl PenaltyDisposition {
    pub fn split(capped_penalty: u128, routing: &PenaltyRouting) -> Result<Self, StakingError> {
        let sink = apply_bps(capped_penalty, routing.sink_share_bps)?;
        let recipient = apply_bps(sink, routing.recipient_bps)?;
        Ok(Self {
            redistributed: checked_sub(capped_penalty, sink)?,
            recipient,
            burn: checked_sub(sink, recipient)?,
        })
    }

    /// Tokens leaving custody.
    pub fn outbound(&self) -> Result<u128, StakingError> {
        checked_add(self.recipient, self.burn)
    }
}
