//! Errors for the staking ledger.
//!
//! Every failure is all-or-nothing: an operation that returns an error has
//! left the ledger and the custodian untouched, and may be resubmitted.

use {
    crate::custodian::CustodyError,
    num_derive::{FromPrimitive, ToPrimitive},
    thiserror::Error,
};

/// Broad classification of a [`StakingError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed caller input.
    Validation,
    /// Well-formed input rejected by staking policy at this point in time.
    Policy,
    /// The token custodian refused a transfer.
    Custody,
    /// A fixed-point computation overflowed.
    Arithmetic,
    /// An instruction could not be decoded.
    Codec,
}

/// Stable numeric error codes, suitable for wire responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive)]
pub enum ErrorCode {
    BelowMinimum = 0,
    DurationTooShort,
    DurationTooLong,
    InvalidStakeIndex,
    StakeIdMismatch,
    ZeroFunding,
    InvalidDayRange,
    HardLockActive,
    AlreadyUnlocked,
    NotFullyServed,
    EmptyStakeList,
    FutureDay,
    RangeTooLarge,
    CatchUpBacklog,
    NotLaunched,
    Custody,
    ArithmeticOverflow,
    InvalidInstructionData,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StakingError {
    #[error("stake amount {amount} is below the minimum {minimum} at the current share rate")]
    BelowMinimum { amount: u128, minimum: u128 },

    #[error("stake duration of {days} days is below the minimum of {min} days")]
    DurationTooShort { days: u64, min: u64 },

    #[error("stake duration of {days} days is above the maximum of {max} days")]
    DurationTooLong { days: u64, max: u64 },

    #[error("stake index {index} is invalid: owner has {count} stakes")]
    InvalidStakeIndex { index: usize, count: usize },

    #[error("stake id {requested} does not match stake {found} at this index")]
    StakeIdMismatch { requested: u64, found: u64 },

    #[error("funding must cover at least one day with a non-zero amount")]
    ZeroFunding,

    #[error("invalid day range [{from}, {to})")]
    InvalidDayRange { from: u64, to: u64 },

    #[error("stake is in its hard lock period: {served_days} of {hard_lock_days} days served")]
    HardLockActive { served_days: u64, hard_lock_days: u64 },

    #[error("stake was already unlocked on day {unlocked_day}")]
    AlreadyUnlocked { unlocked_day: u64 },

    #[error("stake not fully served: {served_days} of {staked_days} days")]
    NotFullyServed { served_days: u64, staked_days: u64 },

    #[error("owner has no stakes")]
    EmptyStakeList,

    #[error("day {day} is in the future: current day is {current_day}")]
    FutureDay { day: u64, current_day: u64 },

    #[error("range of {requested} days exceeds the maximum of {max} days")]
    RangeTooLarge { requested: u64, max: u64 },

    #[error("{pending} unprocessed days exceed the catch-up budget of {budget}; run a daily data update first")]
    CatchUpBacklog { pending: u64, budget: u64 },

    #[error("staking has not launched yet: launch at {launch_timestamp}, now {now}")]
    NotLaunched { launch_timestamp: i64, now: i64 },

    #[error("custody transfer failed: {0}")]
    Custody(#[from] CustodyError),

    #[error("arithmetic overflow in ledger accounting")]
    ArithmeticOverflow,

    #[error("instruction data is invalid")]
    InvalidInstructionData,
}

impl StakingError {
    /// Classifies this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::BelowMinimum { .. }
            | Self::DurationTooShort { .. }
            | Self::DurationTooLong { .. }
            | Self::InvalidStakeIndex { .. }
            | Self::StakeIdMismatch { .. }
            | Self::ZeroFunding
            | Self::InvalidDayRange { .. } => ErrorKind::Validation,
            Self::HardLockActive { .. }
            | Self::AlreadyUnlocked { .. }
            | Self::NotFullyServed { .. }
            | Self::EmptyStakeList
            | Self::FutureDay { .. }
            | Self::RangeTooLarge { .. }
            | Self::CatchUpBacklog { .. }
            | Self::NotLaunched { .. } => ErrorKind::Policy,
            Self::Custody(_) => ErrorKind::Custody,
            Self::ArithmeticOverflow => ErrorKind::Arithmetic,
            Self::InvalidInstructionData => ErrorKind::Codec,
        }
    }

    /// Stable numeric code of this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::BelowMinimum { .. } => ErrorCode::BelowMinimum,
            Self::DurationTooShort { .. } => ErrorCode::DurationTooShort,
            Self::DurationTooLong { .. } => ErrorCode::DurationTooLong,
            Self::InvalidStakeIndex { .. } => ErrorCode::InvalidStakeIndex,
            Self::StakeIdMismatch { .. } => ErrorCode::StakeIdMismatch,
            Self::ZeroFunding => ErrorCode::ZeroFunding,
            Self::InvalidDayRange { .. } => ErrorCode::InvalidDayRange,
            Self::HardLockActive { .. } => ErrorCode::HardLockActive,
            Self::AlreadyUnlocked { .. } => ErrorCode::AlreadyUnlocked,
            Self::NotFullyServed { .. } => ErrorCode::NotFullyServed,
            Self::EmptyStakeList => ErrorCode::EmptyStakeList,
            Self::FutureDay { .. } => ErrorCode::FutureDay,
            Self::RangeTooLarge { .. } => ErrorCode::RangeTooLarge,
            Self::CatchUpBacklog { .. } => ErrorCode::CatchUpBacklog,
            Self::NotLaunched { .. } => ErrorCode::NotLaunched,
            Self::Custody(_) => ErrorCode::Custody,
            Self::ArithmeticOverflow => ErrorCode::ArithmeticOverflow,
            Self::InvalidInstructionData => ErrorCode::InvalidInstructionData,
        }
    }
}
