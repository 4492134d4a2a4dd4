//! Wall-clock sampling.
//!
//! Each ledger operation samples the clock exactly once and derives the
//! current day from the launch timestamp.

use {
    crate::{constants::SECONDS_PER_DAY, error::StakingError},
    solana_clock::UnixTimestamp,
    std::{
        sync::{
            atomic::{AtomicI64, Ordering},
            Arc,
        },
        time::{SystemTime, UNIX_EPOCH},
    },
};

pub trait Clock {
    /// Current unix time in seconds.
    fn unix_timestamp(&self) -> UnixTimestamp;
}

/// The host's system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_timestamp(&self) -> UnixTimestamp {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX))
            .unwrap_or_default()
    }
}

/// A clock that only moves when told to.  Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(now: UnixTimestamp) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(now)),
        }
    }

    pub fn set(&self, now: UnixTimestamp) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance_secs(&self, secs: i64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }

    pub fn advance_days(&self, days: u64) {
        let secs = i64::try_from(days)
            .unwrap_or(i64::MAX)
            .saturating_mul(SECONDS_PER_DAY);
        self.advance_secs(secs);
    }
}

impl Clock for ManualClock {
    fn unix_timestamp(&self) -> UnixTimestamp {
        self.now.load(Ordering::SeqCst)
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn unix_timestamp(&self) -> UnixTimestamp {
        (**self).unix_timestamp()
    }
}

/// Whole days elapsed since `launch_timestamp`.
pub fn day_since_launch(
    launch_timestamp: UnixTimestamp,
    now: UnixTimestamp,
) -> Result<u64, StakingError> {
    if now < launch_timestamp {
        return Err(StakingError::NotLaunched {
            launch_timestamp,
            now,
        });
    }
    let elapsed = now
        .checked_sub(launch_timestamp)
        .ok_or(StakingError::ArithmeticOverflow)?;
    let days = elapsed
        .checked_div(SECONDS_PER_DAY)
        .ok_or(StakingError::ArithmeticOverflow)?;
    u64::try_from(days).map_err(|_| StakingError::ArithmeticOverflow)
}
