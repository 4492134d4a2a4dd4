//! # ShareStake Staking Ledger
//!
//! A **shares-based staking ledger**.  Holders lock tokens for a chosen
//! number of days and receive shares; a separately funded reward pool is
//! paid out per day to the shares that are active on that day.
//!
//! * Longer and larger stakes earn **bonus shares**.
//! * The **share rate** (principal per share) only rises, raised by stakes
//!   that close at full maturity, so later stakers never buy cheaper shares
//!   than the ledger has proven it can pay.
//! * Closing **early** forfeits part of the payout (after a hard lock in
//!   which closing is refused); closing **late** forfeits a growing part of
//!   the whole return after a grace period.  Half of every penalty is
//!   redistributed to the remaining stakers.
//! * Per-day rewards are fixed **lazily**: any operation that needs them
//!   catches the ledger up to the current day first.
//!
//! ## Quick start
//!
//! ```rust
//! use {
//!     sharestake_staking_ledger::{
//!         constants::ONE_TOKEN, InMemoryCustodian, ManualClock, StakingConfig, StakingLedger,
//!     },
//!     solana_pubkey::Pubkey,
//! };
//!
//! let custody = Pubkey::new_from_array([1; 32]);
//! let alice = Pubkey::new_from_array([2; 32]);
//! let clock = ManualClock::new(0);
//! let mut custodian = InMemoryCustodian::new(custody);
//! custodian.credit(&alice, 1_000 * ONE_TOKEN).unwrap();
//!
//! let config = StakingConfig {
//!     custody_account: custody,
//!     ..StakingConfig::default()
//! };
//! let mut ledger = StakingLedger::new(config, custodian, clock.clone()).unwrap();
//!
//! // 10 tokens per day for days 1..=30, then a 30-day stake locked from day 1.
//! ledger.fund_rewards(&alice, 10 * ONE_TOKEN, 30, 0).unwrap();
//! let receipt = ledger.stake_start(&alice, 100 * ONE_TOKEN, 30).unwrap();
//!
//! clock.advance_days(31);
//! let settlement = ledger
//!     .stake_end(&alice, receipt.stake_index, receipt.stake_id)
//!     .unwrap();
//! assert_eq!(settlement.capped_penalty, 0);
//! assert!(settlement.stake_return > 100 * ONE_TOKEN);
//! ```
//!
//! See [`processor`] for the operations, [`penalty`] for the penalty curve
//! and [`daily`] for reward accrual.

#![cfg_attr(test, allow(clippy::arithmetic_side_effects))]

pub mod clock;
pub mod config;
pub mod constants;
pub mod custodian;
pub mod daily;
pub mod error;
pub mod instruction;
pub mod math;
pub mod penalty;
pub mod processor;
pub mod receipt;
pub mod share_rate;
pub mod shared;
pub mod state;


// Re-exports for convenience.
pub use {
    clock::{Clock, ManualClock, SystemClock},
    config::{ConfigError, PenaltyRouting, StakingConfig},
    custodian::{CustodyError, InMemoryCustodian, TokenCustodian},
    error::{ErrorCode, ErrorKind, StakingError},
    instruction::{process_instruction, InstructionOutcome, StakingInstruction},
    processor::StakingLedger,
    receipt::{CatchUpReport, FundingReceipt, StakeSettlement, StakeStartReceipt},
    shared::SharedStakingLedger,
    state::{DailyDatum, GlobalState, LedgerState, Stake, StakePhase},
};
