//! Wire form of the ledger's write operations.
//!
//! Instructions are serialised with `bincode` (fixed-width integers) and
//! decoded with a size limit before dispatch.

use {
    crate::{
        clock::Clock,
        custodian::TokenCustodian,
        error::StakingError,
        processor::StakingLedger,
        receipt::{CatchUpReport, FundingReceipt, StakeSettlement, StakeStartReceipt},
    },
    bincode::Options,
    log::*,
    serde::{de::DeserializeOwned, Deserialize, Serialize},
    solana_pubkey::Pubkey,
};

/// Largest instruction accepted by [`process_instruction`].
pub const MAX_INSTRUCTION_DATA_LEN: u64 = 1_232;

/// Write operations.  The caller is supplied alongside the data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StakingInstruction {
    /// Lock `amount` of the caller's tokens for `days`.
    StakeStart { amount: u128, days: u64 },

    /// Close the caller's stake `stake_id` found at `stake_index`.
    StakeEnd { stake_index: u64, stake_id: u64 },

    /// Settle `owner`'s matured stake without paying it out.
    StakeGoodAccounting {
        owner: Pubkey,
        stake_index: u64,
        stake_id: u64,
    },

    /// Fund `amount_per_day` for `days_count` days from the caller's tokens.
    FundRewards {
        amount_per_day: u128,
        days_count: u64,
        shift_in_days: u64,
    },

    /// Process day records before `before_day`.
    DailyDataUpdate { before_day: u64 },
}

impl StakingInstruction {
    pub fn serialize(&self) -> Result<Vec<u8>, StakingError> {
        bincode::serialize(self).map_err(|_| StakingError::InvalidInstructionData)
    }
}

/// Result of a dispatched instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstructionOutcome {
    StakeStarted(StakeStartReceipt),
    StakeEnded(StakeSettlement),
    GoodAccounted(StakeSettlement),
    Funded(FundingReceipt),
    DailyDataUpdated(CatchUpReport),
}

/// Deserializes `data`, refusing anything that would read past `limit` bytes.
pub fn limited_deserialize<T: DeserializeOwned>(data: &[u8], limit: u64) -> Result<T, StakingError> {
    bincode::options()
        .with_limit(limit)
        .with_fixint_encoding()
        .allow_trailing_bytes()
        .deserialize(data)
        .map_err(|_| StakingError::InvalidInstructionData)
}

fn stake_index(raw: u64) -> Result<usize, StakingError> {
    usize::try_from(raw).map_err(|_| StakingError::InvalidInstructionData)
}

/// Decodes `data` and runs it against `ledger` on behalf of `caller`.
pub fn process_instruction<C: TokenCustodian, K: Clock>(
    ledger: &mut StakingLedger<C, K>,
    caller: &Pubkey,
    data: &[u8],
) -> Result<InstructionOutcome, StakingError> {
    let instruction: StakingInstruction = limited_deserialize(data, MAX_INSTRUCTION_DATA_LEN)?;

    trace!("staking process_instruction from {caller}: {instruction:?}");

    match instruction {
        StakingInstruction::StakeStart { amount, days } => ledger
            .stake_start(caller, amount, days)
            .map(InstructionOutcome::StakeStarted),
        StakingInstruction::StakeEnd {
            stake_index: index,
            stake_id,
        } => ledger
            .stake_end(caller, stake_index(index)?, stake_id)
            .map(InstructionOutcome::StakeEnded),
        StakingInstruction::StakeGoodAccounting {
            owner,
            stake_index: index,
            stake_id,
        } => ledger
            .stake_good_accounting(caller, &owner, stake_index(index)?, stake_id)
            .map(InstructionOutcome::GoodAccounted),
        StakingInstruction::FundRewards {
            amount_per_day,
            days_count,
            shift_in_days,
        } => ledger
            .fund_rewards(caller, amount_per_day, days_count, shift_in_days)
            .map(InstructionOutcome::Funded),
        StakingInstruction::DailyDataUpdate { before_day } => ledger
            .daily_data_update(before_day)
            .map(InstructionOutcome::DailyDataUpdated),
    }
}
