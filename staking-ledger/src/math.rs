//! Fixed-point helpers.  All divisions floor.

use {
    crate::{constants::BPS_DENOMINATOR, error::StakingError},
    num_bigint::BigUint,
    num_traits::ToPrimitive,
};

/// Computes `a * b / c`, widening the product when it does not fit `u128`.
pub fn mul_div(a: u128, b: u128, c: u128) -> Result<u128, StakingError> {
    if c == 0 {
        return Err(StakingError::ArithmeticOverflow);
    }
    if let Some(product) = a.checked_mul(b) {
        return product
            .checked_div(c)
            .ok_or(StakingError::ArithmeticOverflow);
    }
    let wide = BigUint::from(a) * BigUint::from(b) / BigUint::from(c);
    wide.to_u128().ok_or(StakingError::ArithmeticOverflow)
}

/// Takes `bps` basis points of `amount`.
pub fn apply_bps(amount: u128, bps: u16) -> Result<u128, StakingError> {
    mul_div(amount, u128::from(bps), BPS_DENOMINATOR)
}

pub fn checked_add(a: u128, b: u128) -> Result<u128, StakingError> {
    a.checked_add(b).ok_or(StakingError::ArithmeticOverflow)
}

pub fn checked_sub(a: u128, b: u128) -> Result<u128, StakingError> {
    a.checked_sub(b).ok_or(StakingError::ArithmeticOverflow)
}

pub fn checked_add_days(day: u64, days: u64) -> Result<u64, StakingError> {
    day.checked_add(days).ok_or(StakingError::ArithmeticOverflow)
}
