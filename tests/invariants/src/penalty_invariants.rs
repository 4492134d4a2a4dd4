//! Property-based tests for penalty and share arithmetic.
//!
//! Properties tested:
//! 1. Return plus capped penalty equals principal plus payout.
//! 2. The late penalty never decreases as lateness grows.
//! 3. A penalty disposition accounts for every token of the penalty.
//! 4. Bonus shares never decrease with amount or duration.
//! 5. Staying past the early window never costs more than the payout.

#[cfg(test)]
mod tests {
    use {
        proptest::prelude::*,
        sharestake_staking_ledger::{
            constants::{early_penalty_days, ONE_TOKEN},
            daily::PayoutIndex,
            penalty::{assess, late_penalty, PenaltyDisposition},
            share_rate::bonus_shares,
            PenaltyRouting, Stake, StakingError,
        },
        solana_pubkey::Pubkey,
    };

    /// Index growing by a fixed per-share payout every day.
    struct FlatIndex(u128);

    impl PayoutIndex for FlatIndex {
        fn index_at(&self, day: u64) -> Result<u128, StakingError> {
            self.0
                .checked_mul(u128::from(day))
                .ok_or(StakingError::ArithmeticOverflow)
        }
    }

    fn stake(amount: u128, shares: u128, locked_day: u64, staked_days: u64) -> Stake {
        Stake {
            stake_id: 1,
            owner: Pubkey::new_from_array([7; 32]),
            staked_amount: amount,
            stake_shares: shares,
            locked_day,
            staked_days,
            unlocked_day: 0,
        }
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // 1. Settlement conserves principal plus payout
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(1000))]

        #[test]
        fn return_and_penalty_partition_the_total(
            amount in 1..=10_000_000u64,
            share_multiple in 1..=20u64,
            staked_days in 30..=5_555u64,
            locked_day in 1..=1_000u64,
            elapsed in 0..=7_000u64,
            per_share in 0..=10_000_000_000_000_000u128,
        ) {
            let amount = u128::from(amount) * ONE_TOKEN;
            let shares = amount * u128::from(share_multiple);
            let stake = stake(amount, shares, locked_day, staked_days);
            let day = locked_day + elapsed;

            let assessment = assess(&stake, day, &FlatIndex(per_share)).unwrap();
            let total = amount + assessment.payout;

            prop_assert!(assessment.capped_penalty <= total);
            prop_assert_eq!(assessment.capped_penalty, assessment.penalty.min(total));
            prop_assert_eq!(assessment.stake_return + assessment.capped_penalty, total);
            if elapsed == 0 {
                prop_assert_eq!(assessment.stake_return, 0);
            }
        }
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // 2. Late penalty is monotonic
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(1000))]

        #[test]
        fn late_penalty_never_decreases(
            total in 0..=u128::from(u64::MAX) * ONE_TOKEN,
            late_days in 0..=200u64,
            extra in 0..=200u64,
        ) {
            let earlier = late_penalty(total, late_days).unwrap();
            let later = late_penalty(total, late_days + extra).unwrap();
            prop_assert!(earlier <= later);
            prop_assert!(later <= total);
            if late_days <= 30 {
                prop_assert_eq!(earlier, 0);
            }
            if late_days >= 130 {
                prop_assert_eq!(earlier, total);
            }
        }
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // 3. Disposition accounts for the whole penalty
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(1000))]

        #[test]
        fn disposition_sums_to_penalty(
            penalty in 0..=u128::from(u64::MAX) * ONE_TOKEN,
            sink_share_bps in 0..=10_000u16,
            recipient_bps in 0..=10_000u16,
        ) {
            let routing = PenaltyRouting { sink_share_bps, recipient_bps };
            let disposition = PenaltyDisposition::split(penalty, &routing).unwrap();
            prop_assert_eq!(
                disposition.redistributed + disposition.recipient + disposition.burn,
                penalty
            );
            prop_assert_eq!(
                disposition.outbound().unwrap(),
                penalty - disposition.redistributed
            );
        }
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // 4. Bonus shares are monotonic
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(1000))]

        #[test]
        fn bonus_shares_grow_with_amount_and_days(
            amount in 0..=5_000_000u64,
            more_amount in 0..=5_000_000u64,
            days in 1..=5_555u64,
            more_days in 0..=5_555u64,
        ) {
            let amount = u128::from(amount) * ONE_TOKEN;
            let larger = amount + u128::from(more_amount) * ONE_TOKEN;
            let base = bonus_shares(amount, days).unwrap();

            prop_assert!(base <= bonus_shares(larger, days).unwrap());
            prop_assert!(base <= bonus_shares(amount, days + more_days).unwrap());
            // Duration adds at most +1800%, amount at most +50%.
            prop_assert!(base <= amount * 18 + amount / 2);
        }
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // 5. Past the early window the principal is safe
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(1000))]

        #[test]
        fn early_exit_after_window_keeps_principal(
            amount in 1..=10_000_000u64,
            staked_days in 30..=5_555u64,
            offset in any::<u64>(),
            per_share in 0..=10_000_000_000_000_000u128,
        ) {
            let amount = u128::from(amount) * ONE_TOKEN;
            let window = early_penalty_days(staked_days);
            let span = staked_days.saturating_sub(window);
            prop_assume!(span > 0);
            let served = window + offset % span;

            let stake = stake(amount, amount, 1, staked_days);
            let assessment = assess(&stake, 1 + served, &FlatIndex(per_share)).unwrap();
            prop_assert!(assessment.capped_penalty <= assessment.payout);
            prop_assert!(assessment.stake_return >= amount);
        }
    }
}
