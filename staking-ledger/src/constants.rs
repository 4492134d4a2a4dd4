//! Staking policy constants.
//!
//! Durations, bonus curves, penalty windows and fixed-point scales.  These are
//! build-time policy; only the addresses, launch time, penalty routing ratios
//! and the catch-up budget are configurable (see [`crate::config`]).

/// Seconds per day, used to derive the current day from the launch timestamp.
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Basis points denominator (10_000 bps = 100%).
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Decimals of the staked token.
pub const TOKEN_DECIMALS: u32 = 18;

/// One whole token in base units.
pub const ONE_TOKEN: u128 = 10u128.pow(TOKEN_DECIMALS);

// ---------------------------------------------------------------------------
// Stake duration
// ---------------------------------------------------------------------------

/// Shortest commitment accepted by `stake_start`.
pub const MIN_STAKE_DAYS: u64 = 30;

/// Longest commitment accepted by `stake_start`.
pub const MAX_STAKE_DAYS: u64 = 5_555;

/// Served days during which `stake_end` is rejected outright.
pub const HARD_LOCK_DAYS: u64 = 15;

// ---------------------------------------------------------------------------
// Penalties
// ---------------------------------------------------------------------------

/// Lower bound of the early-penalty window.  The window is half the committed
/// duration (rounded up) but never shorter than this.
pub const EARLY_PENALTY_MIN_DAYS: u64 = 30;

/// Days past maturity during which an open stake is not penalized.
pub const LATE_PENALTY_GRACE_DAYS: u64 = 30;

/// Days over which the late penalty ramps from 0% to 100% after the grace.
pub const LATE_PENALTY_SCALE_DAYS: u64 = 100;

/// Share of the capped penalty that leaves the reward pool (the rest is
/// redistributed to stakers through the current day's payout).
pub const PENALTY_SINK_SHARE_BPS: u16 = 5_000;

/// Share of the sink portion paid to the penalty recipient; the remainder goes
/// to the burn sink.
pub const PENALTY_RECIPIENT_BPS: u16 = 6_000;

// ---------------------------------------------------------------------------
// Share bonuses
//
//   bonus = amount * min(days - 1, DURATION_BONUS_MAX_EXTRA_DAYS) / DURATION_BONUS_DAYS
//         + amount * min(max(amount - AMOUNT_BONUS_FLOOR, 0), AMOUNT_BONUS_MAX) / AMOUNT_BONUS_SCALE
// ---------------------------------------------------------------------------

/// Extra days that earn one additional share per unit of principal (+100%).
pub const DURATION_BONUS_DAYS: u64 = 60;

/// Extra days beyond which the duration bonus stops growing (18 x 60 = +1800%).
pub const DURATION_BONUS_MAX_EXTRA_DAYS: u64 = 1_080;

/// Principal below which no amount bonus is granted.
pub const AMOUNT_BONUS_FLOOR: u128 = 50_000 * ONE_TOKEN;

/// Principal above the floor that earns a +100% amount bonus.
pub const AMOUNT_BONUS_SCALE: u128 = 2_000_000 * ONE_TOKEN;

/// Principal above the floor at which the amount bonus is capped (+50%).
pub const AMOUNT_BONUS_MAX: u128 = 1_000_000 * ONE_TOKEN;

// ---------------------------------------------------------------------------
// Fixed-point scales
// ---------------------------------------------------------------------------

/// Share rate fixed point: `SHARE_RATE_SCALE` means one token per share.
pub const SHARE_RATE_SCALE: u128 = 100_000;

/// Share rate at launch (1.0).
pub const INITIAL_SHARE_RATE: u128 = SHARE_RATE_SCALE;

/// Fixed point of the per-share payout index.
pub const PAYOUT_INDEX_SCALE: u128 = 10u128.pow(18);

// ---------------------------------------------------------------------------
// Ranges
// ---------------------------------------------------------------------------

/// Longest span a single `fund_rewards` call may cover.
pub const MAX_FUND_DAYS: u64 = 365;

/// Longest window returned by `daily_data_range`.
pub const MAX_DAILY_DATA_RANGE: u64 = 3_650;

/// Default number of days a single catch-up may close.
pub const DEFAULT_MAX_CATCH_UP_DAYS: u64 = 1_000;

/// Returns the early-penalty window for a commitment of `staked_days`.
pub fn early_penalty_days(staked_days: u64) -> u64 {
    staked_days
        .div_ceil(2)
        .max(EARLY_PENALTY_MIN_DAYS)
}

/// Returns `true` if `days` is an accepted commitment length.
pub fn is_valid_stake_duration(days: u64) -> bool {
    (MIN_STAKE_DAYS..=MAX_STAKE_DAYS).contains(&days)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_early_penalty_days() {
        assert_eq!(early_penalty_days(30), 30);
        assert_eq!(early_penalty_days(59), 30);
        assert_eq!(early_penalty_days(200), 100);
        assert_eq!(early_penalty_days(365), 183);
        assert_eq!(early_penalty_days(730), 365);
    }

    #[test]
    fn test_valid_durations() {
        assert!(!is_valid_stake_duration(0));
        assert!(!is_valid_stake_duration(MIN_STAKE_DAYS - 1));
        assert!(is_valid_stake_duration(MIN_STAKE_DAYS));
        assert!(is_valid_stake_duration(MAX_STAKE_DAYS));
        assert!(!is_valid_stake_duration(MAX_STAKE_DAYS + 1));
    }

    #[test]
    fn test_duration_bonus_cap_is_eighteen_units() {
        assert_eq!(DURATION_BONUS_MAX_EXTRA_DAYS / DURATION_BONUS_DAYS, 18);
        assert_eq!(AMOUNT_BONUS_MAX * 2, AMOUNT_BONUS_SCALE);
    }
}
