//! Token deltas between two sqrt prices and price movement for an input amount.

use crate::error::{DomainError, DomainResult};
use crate::math::full_math::{div_rounding_up, mul_div, mul_div_rounding_up, q96};
use primitive_types::U256;

fn sorted(a: U256, b: U256) -> (U256, U256) {
    if a > b { (b, a) } else { (a, b) }
}

/// Amount of token0 between two sqrt prices for `liquidity`.
/// delta_x = L * (sqrt(P_b) - sqrt(P_a)) / (sqrt(P_a) * sqrt(P_b))
pub fn get_amount0_delta(
    sqrt_price_a: U256,
    sqrt_price_b: U256,
    liquidity: u128,
    round_up: bool,
) -> DomainResult<U256> {
    let (lower, upper) = sorted(sqrt_price_a, sqrt_price_b);
    if lower.is_zero() {
        return Err(DomainError::DivisionByZero);
    }

    let numerator1 = U256::from(liquidity) << 96;
    let numerator2 = upper - lower;

    if round_up {
        div_rounding_up(mul_div_rounding_up(numerator1, numerator2, upper)?, lower)
    } else {
        Ok(mul_div(numerator1, numerator2, upper)? / lower)
    }
}

/// Amount of token1 between two sqrt prices for `liquidity`.
/// delta_y = L * (sqrt(P_b) - sqrt(P_a))
pub fn get_amount1_delta(
    sqrt_price_a: U256,
    sqrt_price_b: U256,
    liquidity: u128,
    round_up: bool,
) -> DomainResult<U256> {
    let (lower, upper) = sorted(sqrt_price_a, sqrt_price_b);
    let liquidity = U256::from(liquidity);
    if round_up {
        mul_div_rounding_up(liquidity, upper - lower, q96())
    } else {
        mul_div(liquidity, upper - lower, q96())
    }
}

/// Price after adding `amount` of token0, rounded up.
fn next_sqrt_price_from_amount0_rounding_up(
    sqrt_price: U256,
    liquidity: u128,
    amount: U256,
) -> DomainResult<U256> {
    if amount.is_zero() {
        return Ok(sqrt_price);
    }
    let numerator1 = U256::from(liquidity) << 96;

    if let Some(product) = amount.checked_mul(sqrt_price) {
        if let Some(denominator) = numerator1.checked_add(product) {
            return mul_div_rounding_up(numerator1, sqrt_price, denominator);
        }
    }
    let denominator = (numerator1 / sqrt_price)
        .checked_add(amount)
        .ok_or(DomainError::Overflow)?;
    div_rounding_up(numerator1, denominator)
}

/// Price after adding `amount` of token1, rounded down.
fn next_sqrt_price_from_amount1_rounding_down(
    sqrt_price: U256,
    liquidity: u128,
    amount: U256,
) -> DomainResult<U256> {
    if liquidity == 0 {
        return Err(DomainError::DivisionByZero);
    }
    let liquidity = U256::from(liquidity);
    let quotient = if amount < (U256::one() << 160) {
        (amount << 96) / liquidity
    } else {
        mul_div(amount, q96(), liquidity)?
    };
    sqrt_price.checked_add(quotient).ok_or(DomainError::Overflow)
}

/// Sqrt price reached after swapping `amount_in` into a range of constant
/// `liquidity`. Token0 in moves the price down, token1 in moves it up.
pub fn get_next_sqrt_price_from_input(
    sqrt_price: U256,
    liquidity: u128,
    amount_in: U256,
    zero_for_one: bool,
) -> DomainResult<U256> {
    if sqrt_price.is_zero() || liquidity == 0 {
        return Err(DomainError::DivisionByZero);
    }
    if zero_for_one {
        next_sqrt_price_from_amount0_rounding_up(sqrt_price, liquidity, amount_in)
    } else {
        next_sqrt_price_from_amount1_rounding_down(sqrt_price, liquidity, amount_in)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_deltas() {
        // Liquidity 1000, price 1 -> 4 (sqrt 1 -> 2)
        // delta_y = 1000 * (2 - 1) = 1000
        // delta_x = 1000 * (1/1 - 1/2) = 500
        let a = q96();
        let b = q96() * 2;

        assert_eq!(get_amount1_delta(a, b, 1000, false).unwrap(), U256::from(1000u64));
        assert_eq!(get_amount0_delta(a, b, 1000, false).unwrap(), U256::from(500u64));
        // order of the bounds does not matter
        assert_eq!(get_amount0_delta(b, a, 1000, true).unwrap(), U256::from(500u64));
    }

    #[test]
    fn test_rounding_direction() {
        let a = q96();
        let b = q96() * 3;
        let down = get_amount0_delta(a, b, 1000, false).unwrap();
        let up = get_amount0_delta(a, b, 1000, true).unwrap();
        assert_eq!(down, U256::from(666u64));
        assert_eq!(up, U256::from(667u64));
    }

    #[test]
    fn test_next_price_moves_in_swap_direction() {
        let price = q96();
        let amount = U256::from(1_000u64);
        let down = get_next_sqrt_price_from_input(price, 1_000_000, amount, true).unwrap();
        let up = get_next_sqrt_price_from_input(price, 1_000_000, amount, false).unwrap();
        assert!(down < price);
        assert!(up > price);
        assert_eq!(
            get_next_sqrt_price_from_input(price, 1_000_000, U256::zero(), true).unwrap(),
            price
        );
    }

    #[test]
    fn test_zero_liquidity_rejected() {
        assert!(get_next_sqrt_price_from_input(q96(), 0, U256::one(), false).is_err());
    }
}
