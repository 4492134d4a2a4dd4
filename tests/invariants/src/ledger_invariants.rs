//! Property-based tests for ledger-wide accounting.
//!
//! Properties tested:
//! 1. Share and principal totals match the open stakes after every operation.
//! 2. The share rate never decreases.
//! 3. A status query returns exactly what ending the stake returns.
//! 4. Tokens are conserved and custody always covers settlements.
//! 5. Funding adds exactly the funded amount to every covered day.

#[cfg(test)]
mod tests {
    use {
        proptest::prelude::*,
        sharestake_staking_ledger::{
            constants::ONE_TOKEN, InMemoryCustodian, ManualClock, StakingConfig, StakingError,
            StakingLedger, TokenCustodian,
        },
        solana_pubkey::Pubkey,
    };

    const USERS: usize = 4;
    const USER_BALANCE: u128 = 1_000_000_000 * ONE_TOKEN;
    const FUNDER_BALANCE: u128 = 1_000_000_000_000 * ONE_TOKEN;

    #[derive(Debug, Clone)]
    enum Op {
        Start { user: usize, amount: u64, days: u64 },
        End { user: usize, index: usize },
        GoodAccounting { caller: usize, user: usize, index: usize },
        Fund { amount: u64, days: u64, shift: u64 },
        Advance { days: u64 },
        Update,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => (0..USERS, 1..=5_000u64, 30..=400u64)
                .prop_map(|(user, amount, days)| Op::Start { user, amount, days }),
            2 => (0..USERS, 0..3usize).prop_map(|(user, index)| Op::End { user, index }),
            1 => (0..USERS, 0..USERS, 0..3usize)
                .prop_map(|(caller, user, index)| Op::GoodAccounting { caller, user, index }),
            2 => (1..=100u64, 1..=365u64, 0..=30u64)
                .prop_map(|(amount, days, shift)| Op::Fund { amount, days, shift }),
            3 => (1..=45u64).prop_map(|days| Op::Advance { days }),
            1 => Just(Op::Update),
        ]
    }

    struct World {
        ledger: StakingLedger<InMemoryCustodian, ManualClock>,
        clock: ManualClock,
        users: Vec<Pubkey>,
        funder: Pubkey,
        accounts: Vec<Pubkey>,
        supply: u128,
    }

    fn world() -> World {
        let custody = Pubkey::new_from_array([100; 32]);
        let recipient = Pubkey::new_from_array([101; 32]);
        let sink = Pubkey::new_from_array([102; 32]);
        let funder = Pubkey::new_from_array([50; 32]);
        let users: Vec<Pubkey> = (1..=USERS as u8)
            .map(|i| Pubkey::new_from_array([i; 32]))
            .collect();

        let mut custodian = InMemoryCustodian::new(custody);
        custodian.credit(&funder, FUNDER_BALANCE).unwrap();
        for user in &users {
            custodian.credit(user, USER_BALANCE).unwrap();
        }
        let config = StakingConfig {
            custody_account: custody,
            penalty_recipient: recipient,
            penalty_sink: sink,
            ..StakingConfig::default()
        };
        let clock = ManualClock::new(0);
        let ledger = StakingLedger::new(config, custodian, clock.clone()).unwrap();

        let mut accounts = users.clone();
        accounts.extend([custody, recipient, sink, funder]);
        World {
            ledger,
            clock,
            users,
            funder,
            accounts,
            supply: FUNDER_BALANCE + USER_BALANCE * USERS as u128,
        }
    }

    /// Rejections are expected; broken arithmetic or an insolvent custody
    /// account are not.
    fn check_outcome<T>(result: &Result<T, StakingError>) -> Result<(), TestCaseError> {
        if let Err(err) = result {
            prop_assert!(
                !matches!(
                    err,
                    StakingError::ArithmeticOverflow | StakingError::Custody(_)
                ),
                "unexpected failure: {err}"
            );
        }
        Ok(())
    }

    fn apply(w: &mut World, op: &Op) -> Result<(), TestCaseError> {
        match *op {
            Op::Start { user, amount, days } => {
                let result =
                    w.ledger
                        .stake_start(&w.users[user], u128::from(amount) * ONE_TOKEN, days);
                check_outcome(&result)?;
            }
            Op::End { user, index } => {
                let owner = w.users[user];
                let stake_id = w
                    .ledger
                    .stake_lists(&owner, index)
                    .map(|stake| stake.stake_id)
                    .unwrap_or_default();
                let status = w.ledger.get_stake_status(&owner, index, stake_id);
                let ended = w.ledger.stake_end(&owner, index, stake_id);
                check_outcome(&ended)?;
                prop_assert_eq!(status, ended);
            }
            Op::GoodAccounting {
                caller,
                user,
                index,
            } => {
                let owner = w.users[user];
                let stake_id = w
                    .ledger
                    .stake_lists(&owner, index)
                    .map(|stake| stake.stake_id)
                    .unwrap_or_default();
                let result =
                    w.ledger
                        .stake_good_accounting(&w.users[caller], &owner, index, stake_id);
                check_outcome(&result)?;
            }
            Op::Fund {
                amount,
                days,
                shift,
            } => {
                let result = w.ledger.fund_rewards(
                    &w.funder,
                    u128::from(amount) * ONE_TOKEN,
                    days,
                    shift,
                );
                check_outcome(&result)?;
            }
            Op::Advance { days } => w.clock.advance_days(days),
            Op::Update => {
                let today = w.ledger.current_day().unwrap();
                let result = w.ledger.daily_data_update(today);
                check_outcome(&result)?;
            }
        }
        Ok(())
    }

    fn check_invariants(w: &World) -> Result<(), TestCaseError> {
        let state = w.ledger.snapshot();
        let globals = state.globals;

        let open_shares: u128 = state.open_stakes().map(|stake| stake.stake_shares).sum();
        let open_principal: u128 = state.open_stakes().map(|stake| stake.staked_amount).sum();
        prop_assert_eq!(
            globals.stake_shares_total + globals.next_stake_shares_total,
            open_shares
        );
        prop_assert_eq!(globals.locked_stake_total, open_principal);
        prop_assert_eq!(
            state.daily.pending_shares_total().ok(),
            Some(globals.next_stake_shares_total)
        );
        prop_assert_eq!(state.daily.processed_days(), globals.daily_data_count);

        let supply: u128 = w
            .accounts
            .iter()
            .map(|account| w.ledger.custodian().balance_of(account))
            .sum();
        prop_assert_eq!(supply, w.supply);
        Ok(())
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // 1-4. Accounting over random histories
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn accounting_holds_over_random_histories(
            ops in prop::collection::vec(op_strategy(), 1..40),
        ) {
            let mut w = world();
            let mut share_rate = w.ledger.share_rate();

            for op in &ops {
                apply(&mut w, op)?;
                check_invariants(&w)?;

                let current = w.ledger.share_rate();
                prop_assert!(
                    current >= share_rate,
                    "share rate fell from {} to {} after {:?}",
                    share_rate,
                    current,
                    op
                );
                share_rate = current;
            }
        }
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // 5. Funding round trip
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        #[test]
        fn funding_adds_exactly_the_amount_per_day(
            amount in 1..=1_000u64,
            days in 1..=365u64,
            shift in 0..=100u64,
            elapsed in 0..=50u64,
        ) {
            let mut w = world();
            let amount = u128::from(amount) * ONE_TOKEN;
            w.ledger
                .stake_start(&w.users[0], 100 * ONE_TOKEN, 30)
                .unwrap();
            w.clock.advance_days(elapsed);

            let first_day = w.ledger.current_day().unwrap() + 1 + shift;
            let before = w.ledger.daily_data_range(first_day, first_day + days).unwrap();
            let receipt = w.ledger.fund_rewards(&w.funder, amount, days, shift).unwrap();
            prop_assert_eq!(receipt.first_day, first_day);

            w.clock.advance_days(elapsed);
            let today = w.ledger.current_day().unwrap();
            w.ledger.daily_data_update(today).unwrap();

            let after = w.ledger.daily_data_range(first_day, first_day + days).unwrap();
            prop_assert_eq!(after.len(), before.len());
            for (before, after) in before.iter().zip(&after) {
                prop_assert_eq!(after.day_payout_total, before.day_payout_total + amount);
            }
            check_invariants(&w)?;
        }
    }
}
