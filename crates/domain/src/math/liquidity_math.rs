//! Conversions between token amounts and liquidity for a price range.
//!
//! Liquidity of a range `[a, b]` with current price `p`:
//! - `p <= a`: only token0 is held, `L = x * sqrt(a) * sqrt(b) / (sqrt(b) - sqrt(a))`
//! - `p >= b`: only token1 is held, `L = y / (sqrt(b) - sqrt(a))`
//! - otherwise both are held and the smaller of the two candidates wins.

use crate::error::{DomainError, DomainResult};
use crate::math::full_math::{mul_div, q96, to_u128};
use crate::math::sqrt_price_math::{get_amount0_delta, get_amount1_delta};
use primitive_types::U256;

fn sorted(a: U256, b: U256) -> (U256, U256) {
    if a > b { (b, a) } else { (a, b) }
}

/// Liquidity supplied by `amount0` of token0 across the range.
pub fn liquidity_for_amount0(sqrt_a: U256, sqrt_b: U256, amount0: U256) -> DomainResult<u128> {
    let (lower, upper) = sorted(sqrt_a, sqrt_b);
    if lower == upper {
        return Err(DomainError::DivisionByZero);
    }
    let intermediate = mul_div(lower, upper, q96())?;
    to_u128(mul_div(amount0, intermediate, upper - lower)?)
}

/// Liquidity supplied by `amount1` of token1 across the range.
pub fn liquidity_for_amount1(sqrt_a: U256, sqrt_b: U256, amount1: U256) -> DomainResult<u128> {
    let (lower, upper) = sorted(sqrt_a, sqrt_b);
    if lower == upper {
        return Err(DomainError::DivisionByZero);
    }
    to_u128(mul_div(amount1, q96(), upper - lower)?)
}

/// Maximum liquidity that `amount0`/`amount1` can back at the current price.
pub fn liquidity_for_amounts(
    sqrt_current: U256,
    sqrt_a: U256,
    sqrt_b: U256,
    amount0: U256,
    amount1: U256,
) -> DomainResult<u128> {
    let (lower, upper) = sorted(sqrt_a, sqrt_b);

    if sqrt_current <= lower {
        liquidity_for_amount0(lower, upper, amount0)
    } else if sqrt_current < upper {
        let l0 = liquidity_for_amount0(sqrt_current, upper, amount0)?;
        let l1 = liquidity_for_amount1(lower, sqrt_current, amount1)?;
        Ok(l0.min(l1))
    } else {
        liquidity_for_amount1(lower, upper, amount1)
    }
}

/// Token amounts represented by `liquidity` at the current price, rounded down.
pub fn amounts_for_liquidity(
    liquidity: u128,
    sqrt_current: U256,
    sqrt_a: U256,
    sqrt_b: U256,
) -> DomainResult<(U256, U256)> {
    let (lower, upper) = sorted(sqrt_a, sqrt_b);

    if sqrt_current <= lower {
        Ok((get_amount0_delta(lower, upper, liquidity, false)?, U256::zero()))
    } else if sqrt_current < upper {
        Ok((
            get_amount0_delta(sqrt_current, upper, liquidity, false)?,
            get_amount1_delta(lower, sqrt_current, liquidity, false)?,
        ))
    } else {
        Ok((U256::zero(), get_amount1_delta(lower, upper, liquidity, false)?))
    }
}

/// Applies a signed liquidity delta.
pub fn add_delta(liquidity: u128, delta: i128) -> DomainResult<u128> {
    if delta < 0 {
        liquidity
            .checked_sub(delta.unsigned_abs())
            .ok_or(DomainError::LiquidityUnderflow)
    } else {
        liquidity
            .checked_add(delta.unsigned_abs())
            .ok_or(DomainError::Overflow)
    }
}
