use {
    crate::constants::{
        BPS_DENOMINATOR, DEFAULT_MAX_CATCH_UP_DAYS, PENALTY_RECIPIENT_BPS, PENALTY_SINK_SHARE_BPS,
    },
    borsh::{BorshDeserialize, BorshSerialize},
    serde::{Deserialize, Serialize},
    solana_clock::UnixTimestamp,
    solana_pubkey::Pubkey,
};

/// How a capped penalty leaves the reward pool.
///
/// ```text
/// sink         = penalty * sink_share_bps / 10_000
/// redistributed = penalty - sink            (added to today's payout)
/// recipient    = sink * recipient_bps / 10_000
/// burn         = sink - recipient
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct PenaltyRouting {
    /// Part of the capped penalty routed out of the pool, in basis points.
    pub sink_share_bps: u16,

    /// Part of the sink amount paid to the penalty recipient, in basis points.
    pub recipient_bps: u16,
}

impl Default for PenaltyRouting {
    fn default() -> Self {
        Self {
            sink_share_bps: PENALTY_SINK_SHARE_BPS,
            recipient_bps: PENALTY_RECIPIENT_BPS,
        }
    }
}

/// Construction-time configuration of a [`crate::StakingLedger`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct StakingConfig {
    /// Account at the custodian that holds every staked and funded token.
    pub custody_account: Pubkey,

    /// Unix time of day 0.
    pub launch_timestamp: UnixTimestamp,

    /// Receives the recipient share of routed penalties.
    pub penalty_recipient: Pubkey,

    /// Receives the remainder of routed penalties (burn address).
    pub penalty_sink: Pubkey,

    pub routing: PenaltyRouting,

    /// Most unprocessed days a single operation will close.
    pub max_catch_up_days: u64,
}

impl Default for StakingConfig {
    fn default() -> Self {
        Self {
            custody_account: Pubkey::default(),
            launch_timestamp: 0,
            penalty_recipient: Pubkey::default(),
            penalty_sink: Pubkey::default(),
            routing: PenaltyRouting::default(),
            max_catch_up_days: DEFAULT_MAX_CATCH_UP_DAYS,
        }
    }
}

impl StakingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.launch_timestamp < 0 {
            return Err(ConfigError::NegativeLaunchTimestamp(self.launch_timestamp));
        }
        let max_bps = u16::try_from(BPS_DENOMINATOR).unwrap_or(u16::MAX);
        if self.routing.sink_share_bps > max_bps {
            return Err(ConfigError::InvalidSinkShare(self.routing.sink_share_bps));
        }
        if self.routing.recipient_bps > max_bps {
            return Err(ConfigError::InvalidRecipientShare(self.routing.recipient_bps));
        }
        if self.max_catch_up_days == 0 {
            return Err(ConfigError::ZeroCatchUpBudget);
        }
        Ok(())
    }
}

/// Errors in staking configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("launch_timestamp must be >= 0, got {0}")]
    NegativeLaunchTimestamp(i64),
    #[error("routing.sink_share_bps must be <= 10000, got {0}")]
    InvalidSinkShare(u16),
    #[error("routing.recipient_bps must be <= 10000, got {0}")]
    InvalidRecipientShare(u16),
    #[error("max_catch_up_days must be > 0")]
    ZeroCatchUpBudget,
}
