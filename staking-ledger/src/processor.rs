//! The stake lifecycle engine.
//!
//! Every write operation samples the clock once, computes its complete effect
//! against a catch-up plan, moves tokens through the custodian and only then
//! commits ledger state.  A failed operation leaves nothing behind.

use {
    crate::{
        clock::{day_since_launch, Clock},
        config::{ConfigError, StakingConfig},
        constants::{
            is_valid_stake_duration, HARD_LOCK_DAYS, MAX_DAILY_DATA_RANGE, MAX_FUND_DAYS,
            MAX_STAKE_DAYS, MIN_STAKE_DAYS,
        },
        custodian::{CustodyError, TokenCustodian},
        daily::{CatchUp, PayoutIndex},
        error::StakingError,
        math::{checked_add, checked_add_days, checked_sub},
        penalty::{assess, PenaltyDisposition},
        receipt::{CatchUpReport, FundingReceipt, StakeSettlement, StakeStartReceipt},
        share_rate::{bonus_shares, ShareRateController},
        state::{DailyDatum, GlobalState, LedgerState, Stake, StakePhase},
    },
    log::*,
    solana_pubkey::Pubkey,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SettleMode {
    /// Owner closes the stake and receives the return.
    End,
    /// Anyone settles a matured stake; the return stays in custody.
    GoodAccounting,
}

/// Effects of settling an open stake.
#[derive(Debug, Clone)]
struct Release {
    disposition: PenaltyDisposition,
    /// Remaining shares scheduled for the stake's `locked_day`, when its
    /// shares had not joined the pool yet.
    pending: Option<(u64, u128)>,
    /// New payout total of the settlement day.
    day_payout_total: u128,
}

/// A fully computed, not yet applied settlement.
#[derive(Debug, Clone)]
struct Settlement {
    catch_up: CatchUp,
    stake: Stake,
    index: usize,
    outcome: StakeSettlement,
    /// Globals once this settlement is committed.
    globals: GlobalState,
    release: Option<Release>,
}

pub struct StakingLedger<C, K> {
    config: StakingConfig,
    custodian: C,
    clock: K,
    state: LedgerState,
}

impl<C: TokenCustodian, K: Clock> StakingLedger<C, K> {
    pub fn new(config: StakingConfig, custodian: C, clock: K) -> Result<Self, ConfigError> {
        Self::from_snapshot(config, custodian, clock, LedgerState::new())
    }

    /// Restores a ledger from a [`LedgerState`] taken with [`Self::snapshot`].
    pub fn from_snapshot(
        config: StakingConfig,
        custodian: C,
        clock: K,
        state: LedgerState,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(
            "staking ledger at day {} with {} owners, launch {}",
            state.globals.daily_data_count,
            state.stakes.len(),
            config.launch_timestamp
        );
        Ok(Self {
            config,
            custodian,
            clock,
            state,
        })
    }

    pub fn snapshot(&self) -> LedgerState {
        self.state.clone()
    }

    pub fn config(&self) -> &StakingConfig {
        &self.config
    }

    pub fn custodian(&self) -> &C {
        &self.custodian
    }

    pub fn custodian_mut(&mut self) -> &mut C {
        &mut self.custodian
    }

    pub fn clock(&self) -> &K {
        &self.clock
    }

    // -----------------------------------------------------------------------
    // Read surface
    // -----------------------------------------------------------------------

    /// Whole days since launch.
    pub fn current_day(&self) -> Result<u64, StakingError> {
        day_since_launch(self.config.launch_timestamp, self.clock.unix_timestamp())
    }

    pub fn globals(&self) -> GlobalState {
        self.state.globals
    }

    pub fn share_rate(&self) -> u128 {
        self.state.globals.share_rate
    }

    pub fn stake_count(&self, owner: &Pubkey) -> usize {
        self.state.stakes_of(owner).len()
    }

    pub fn stake_lists(&self, owner: &Pubkey, stake_index: usize) -> Result<Stake, StakingError> {
        let stakes = self.state.stakes_of(owner);
        stakes
            .get(stake_index)
            .copied()
            .ok_or(StakingError::InvalidStakeIndex {
                index: stake_index,
                count: stakes.len(),
            })
    }

    /// Day records for `[from_day, to_day)`.
    pub fn daily_data_range(
        &self,
        from_day: u64,
        to_day: u64,
    ) -> Result<Vec<DailyDatum>, StakingError> {
        if from_day > to_day {
            return Err(StakingError::InvalidDayRange {
                from: from_day,
                to: to_day,
            });
        }
        let requested = to_day.saturating_sub(from_day);
        if requested > MAX_DAILY_DATA_RANGE {
            return Err(StakingError::RangeTooLarge {
                requested,
                max: MAX_DAILY_DATA_RANGE,
            });
        }
        Ok(self.state.daily.range(from_day, to_day))
    }

    pub fn stake_start_bonus_shares(&self, amount: u128, days: u64) -> Result<u128, StakingError> {
        bonus_shares(amount, days)
    }

    /// What [`Self::stake_end`] would compute right now, without side effects.
    pub fn get_stake_status(
        &self,
        owner: &Pubkey,
        stake_index: usize,
        stake_id: u64,
    ) -> Result<StakeSettlement, StakingError> {
        let today = self.current_day()?;
        self.plan_settlement(today, owner, stake_index, stake_id, SettleMode::End)
            .map(|settlement| settlement.outcome)
    }

    // -----------------------------------------------------------------------
    // Write surface
    // -----------------------------------------------------------------------

    pub fn stake_start(
        &mut self,
        owner: &Pubkey,
        amount: u128,
        days: u64,
    ) -> Result<StakeStartReceipt, StakingError> {
        let today = self.current_day()?;

        // --- Validate ---
        if !is_valid_stake_duration(days) {
            return Err(if days < MIN_STAKE_DAYS {
                StakingError::DurationTooShort {
                    days,
                    min: MIN_STAKE_DAYS,
                }
            } else {
                StakingError::DurationTooLong {
                    days,
                    max: MAX_STAKE_DAYS,
                }
            });
        }
        let controller = ShareRateController::new(self.state.globals.share_rate);
        controller.check_minimum(amount)?;

        // --- Plan ---
        let stake_shares = controller.stake_shares(amount, days)?;
        let locked_day = checked_add_days(today, 1)?;
        let stake_id = self.state.next_stake_id;
        let next_stake_id = stake_id
            .checked_add(1)
            .ok_or(StakingError::ArithmeticOverflow)?;
        let mut globals = self.state.globals;
        globals.next_stake_shares_total = checked_add(globals.next_stake_shares_total, stake_shares)?;
        globals.locked_stake_total = checked_add(globals.locked_stake_total, amount)?;
        let pending = self
            .state
            .daily
            .pending_shares_after(locked_day, stake_shares)?;

        // --- Transfer in ---
        self.custodian.transfer_in(owner, amount)?;

        // --- Commit ---
        let stake = Stake {
            stake_id,
            owner: *owner,
            staked_amount: amount,
            stake_shares,
            locked_day,
            staked_days: days,
            unlocked_day: 0,
        };
        self.state.daily.set_pending_shares(locked_day, pending);
        self.state.globals = globals;
        self.state.next_stake_id = next_stake_id;
        let stakes = self.state.stakes.entry(*owner).or_default();
        stakes.push(stake);
        let stake_index = stakes.len().saturating_sub(1);

        info!(
            "stake {stake_id} started by {owner}: {amount} for {days} days, {stake_shares} shares, locked day {locked_day}"
        );
        Ok(StakeStartReceipt {
            stake_id,
            stake_index,
            stake_shares,
            locked_day,
            share_rate: controller.current_rate(),
        })
    }

    /// Closes the owner's stake at `stake_index`, paying out its return.
    pub fn stake_end(
        &mut self,
        owner: &Pubkey,
        stake_index: usize,
        stake_id: u64,
    ) -> Result<StakeSettlement, StakingError> {
        let today = self.current_day()?;
        let settlement = self.plan_settlement(today, owner, stake_index, stake_id, SettleMode::End)?;

        // --- Transfer out ---
        let mut transfers = vec![(*owner, settlement.outcome.stake_return)];
        if let Some(release) = &settlement.release {
            transfers.extend(self.penalty_transfers(&release.disposition));
        }
        self.pay_out(&transfers)?;

        // --- Commit ---
        let outcome = settlement.outcome;
        let was_open = settlement.release.is_some();
        self.commit_settlement(settlement, owner);
        if let Some(stakes) = self.state.stakes.get_mut(owner) {
            if stake_index < stakes.len() {
                stakes.swap_remove(stake_index);
            }
            if stakes.is_empty() {
                self.state.stakes.remove(owner);
            }
        }

        info!(
            "stake {stake_id} of {owner} ended on day {today}: return {}, payout {}, penalty {}{}",
            outcome.stake_return,
            outcome.payout,
            outcome.capped_penalty,
            if was_open { "" } else { " (good accounted)" }
        );
        Ok(outcome)
    }

    /// Settles a matured stake on behalf of its owner.  Shares leave the pool
    /// and the penalty is disposed of, but the return stays in custody until
    /// the owner calls [`Self::stake_end`].
    pub fn stake_good_accounting(
        &mut self,
        caller: &Pubkey,
        owner: &Pubkey,
        stake_index: usize,
        stake_id: u64,
    ) -> Result<StakeSettlement, StakingError> {
        let today = self.current_day()?;
        let settlement = self.plan_settlement(
            today,
            owner,
            stake_index,
            stake_id,
            SettleMode::GoodAccounting,
        )?;

        // --- Transfer out ---
        if let Some(release) = &settlement.release {
            let transfers = self.penalty_transfers(&release.disposition);
            self.pay_out(&transfers)?;
        }

        // --- Commit ---
        let outcome = settlement.outcome;
        self.commit_settlement(settlement, owner);
        if let Some(stake) = self
            .state
            .stakes
            .get_mut(owner)
            .and_then(|stakes| stakes.get_mut(stake_index))
        {
            stake.unlocked_day = today;
        }

        info!(
            "stake {stake_id} of {owner} good accounted by {caller} on day {today}: return {} held, penalty {}",
            outcome.stake_return, outcome.capped_penalty
        );
        Ok(outcome)
    }

    /// Adds `amount_per_day` to each of `days_count` days starting
    /// `shift_in_days` after tomorrow, pulling the total from `funder`.
    pub fn fund_rewards(
        &mut self,
        funder: &Pubkey,
        amount_per_day: u128,
        days_count: u64,
        shift_in_days: u64,
    ) -> Result<FundingReceipt, StakingError> {
        if amount_per_day == 0 || days_count == 0 {
            return Err(StakingError::ZeroFunding);
        }
        if days_count > MAX_FUND_DAYS {
            return Err(StakingError::RangeTooLarge {
                requested: days_count,
                max: MAX_FUND_DAYS,
            });
        }
        let today = self.current_day()?;
        let first_day = checked_add_days(checked_add_days(today, 1)?, shift_in_days)?;
        let total = amount_per_day
            .checked_mul(u128::from(days_count))
            .ok_or(StakingError::ArithmeticOverflow)?;
        let updates = self
            .state
            .daily
            .plan_funding(amount_per_day, first_day, days_count)?;

        self.custodian.transfer_in(funder, total)?;
        self.state.daily.apply_funding(updates);

        info!("{funder} funded {amount_per_day} per day for days {first_day}..+{days_count}");
        Ok(FundingReceipt {
            first_day,
            days_count,
            amount_per_day,
            total,
        })
    }

    /// Processes unprocessed days before `before_day`, at most
    /// `max_catch_up_days` of them.
    pub fn daily_data_update(&mut self, before_day: u64) -> Result<CatchUpReport, StakingError> {
        let today = self.current_day()?;
        if before_day > today {
            return Err(StakingError::FutureDay {
                day: before_day,
                current_day: today,
            });
        }
        let processed = self.state.daily.processed_days();
        let target = before_day.min(processed.saturating_add(self.config.max_catch_up_days));
        let catch_up = self.state.daily.plan_catch_up(&self.state.globals, target)?;

        let report = CatchUpReport {
            first_day: catch_up.first_day(),
            end_day: catch_up.end_day(),
            remaining_days: before_day.saturating_sub(catch_up.end_day()),
        };
        catch_up.apply_totals(&mut self.state.globals);
        self.state.daily.commit_catch_up(catch_up);

        if report.days_processed() > 0 {
            debug!(
                "daily data updated: days {}..{}, {} remaining",
                report.first_day, report.end_day, report.remaining_days
            );
        }
        Ok(report)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn locate(
        &self,
        owner: &Pubkey,
        stake_index: usize,
        stake_id: u64,
    ) -> Result<Stake, StakingError> {
        let stakes = self.state.stakes_of(owner);
        if stakes.is_empty() {
            return Err(StakingError::EmptyStakeList);
        }
        let stake = stakes
            .get(stake_index)
            .ok_or(StakingError::InvalidStakeIndex {
                index: stake_index,
                count: stakes.len(),
            })?;
        if stake.stake_id != stake_id {
            warn!(
                "stake id {stake_id} requested at index {stake_index} of {owner}, found {}",
                stake.stake_id
            );
            return Err(StakingError::StakeIdMismatch {
                requested: stake_id,
                found: stake.stake_id,
            });
        }
        Ok(*stake)
    }

    /// Plans processing every day before `today`, within the catch-up budget.
    fn plan_full_catch_up(&self, today: u64) -> Result<CatchUp, StakingError> {
        let pending = today.saturating_sub(self.state.daily.processed_days());
        let budget = self.config.max_catch_up_days;
        if pending > budget {
            return Err(StakingError::CatchUpBacklog { pending, budget });
        }
        self.state.daily.plan_catch_up(&self.state.globals, today)
    }

    fn plan_settlement(
        &self,
        today: u64,
        owner: &Pubkey,
        stake_index: usize,
        stake_id: u64,
        mode: SettleMode,
    ) -> Result<Settlement, StakingError> {
        let stake = self.locate(owner, stake_index, stake_id)?;
        let served_days = stake.served_days(today);

        // --- Validate ---
        match mode {
            SettleMode::GoodAccounting => match stake.phase(today) {
                StakePhase::Closed => {
                    return Err(StakingError::AlreadyUnlocked {
                        unlocked_day: stake.unlocked_day,
                    });
                }
                StakePhase::Pending | StakePhase::Active => {
                    return Err(StakingError::NotFullyServed {
                        served_days,
                        staked_days: stake.staked_days,
                    });
                }
                StakePhase::Matured => {}
            },
            SettleMode::End => {
                if stake.is_open() && served_days < HARD_LOCK_DAYS {
                    return Err(StakingError::HardLockActive {
                        served_days,
                        hard_lock_days: HARD_LOCK_DAYS,
                    });
                }
            }
        }

        let catch_up = self.plan_full_catch_up(today)?;
        let mut globals = self.state.globals;
        catch_up.apply_totals(&mut globals);
        let view = catch_up.view(&self.state.daily);

        // A good-accounted stake is paid what it was assessed on its
        // unlocked day, with no further effect on the ledger.
        if !stake.is_open() {
            let assessment = assess(&stake, stake.unlocked_day, &view)?;
            return Ok(Settlement {
                outcome: StakeSettlement {
                    stake_id,
                    owner: *owner,
                    settlement_day: stake.unlocked_day,
                    payout: assessment.payout,
                    penalty: assessment.penalty,
                    capped_penalty: assessment.capped_penalty,
                    stake_return: assessment.stake_return,
                    redistributed: 0,
                },
                catch_up,
                stake,
                index: stake_index,
                globals,
                release: None,
            });
        }

        let assessment = assess(&stake, today, &view)?;
        let disposition =
            PenaltyDisposition::split(assessment.capped_penalty, &self.config.routing)?;
        let maturity_day = stake.maturity_day();
        let unclaimable = if today > maturity_day {
            view.accrued(stake.stake_shares, maturity_day, today)?
        } else {
            0
        };
        let redistributed = checked_add(disposition.redistributed, unclaimable)?;
        let day_payout_total =
            checked_add(self.state.daily.day_payout_total(today), redistributed)?;

        // --- Release shares and principal ---
        let pending = if catch_up.leaves_pending(stake.locked_day) {
            globals.next_stake_shares_total =
                checked_sub(globals.next_stake_shares_total, stake.stake_shares)?;
            let remaining = checked_sub(
                self.state.daily.pending_shares(stake.locked_day),
                stake.stake_shares,
            )?;
            Some((stake.locked_day, remaining))
        } else {
            globals.stake_shares_total = checked_sub(globals.stake_shares_total, stake.stake_shares)?;
            None
        };
        globals.locked_stake_total = checked_sub(globals.locked_stake_total, stake.staked_amount)?;
        globals.stake_penalty_total =
            checked_add(globals.stake_penalty_total, assessment.capped_penalty)?;

        if served_days >= stake.staked_days && assessment.capped_penalty == 0 {
            let controller = ShareRateController::new(globals.share_rate);
            if let Some(raised) =
                controller.observe(assessment.stake_return, stake.staked_days, stake.stake_shares)?
            {
                globals.share_rate = raised;
            }
        }

        Ok(Settlement {
            outcome: StakeSettlement {
                stake_id,
                owner: *owner,
                settlement_day: today,
                payout: assessment.payout,
                penalty: assessment.penalty,
                capped_penalty: assessment.capped_penalty,
                stake_return: assessment.stake_return,
                redistributed,
            },
            catch_up,
            stake,
            index: stake_index,
            globals,
            release: Some(Release {
                disposition,
                pending,
                day_payout_total,
            }),
        })
    }

    fn penalty_transfers(&self, disposition: &PenaltyDisposition) -> [(Pubkey, u128); 2] {
        [
            (self.config.penalty_recipient, disposition.recipient),
            (self.config.penalty_sink, disposition.burn),
        ]
    }

    /// Moves tokens out of custody once the custody balance is known to
    /// cover all of them.  Either every transfer lands or none does.
    fn pay_out(&mut self, transfers: &[(Pubkey, u128)]) -> Result<(), StakingError> {
        let needed = transfers
            .iter()
            .try_fold(0u128, |total, (_, amount)| checked_add(total, *amount))?;
        let available = self.custodian.balance_of(&self.config.custody_account);
        if available < needed {
            return Err(CustodyError::InsufficientFunds { needed, available }.into());
        }
        let transfers: Vec<(Pubkey, u128)> = transfers
            .iter()
            .filter(|(_, amount)| *amount > 0)
            .copied()
            .collect();
        self.custodian.transfer_out_all(&transfers)?;
        Ok(())
    }

    fn commit_settlement(&mut self, settlement: Settlement, owner: &Pubkey) {
        let Settlement {
            catch_up,
            stake,
            index,
            outcome,
            globals,
            release,
        } = settlement;
        self.state.daily.commit_catch_up(catch_up);
        self.state.globals = globals;
        if let Some(release) = release {
            if let Some((day, remaining)) = release.pending {
                self.state.daily.set_pending_shares(day, remaining);
            }
            self.state
                .daily
                .set_day_payout_total(outcome.settlement_day, release.day_payout_total);
            debug!(
                "stake {} at index {index} of {owner} released {} shares, {} redistributed",
                stake.stake_id, stake.stake_shares, outcome.redistributed
            );
        }
    }
}
