//! A single exact-input swap step inside one range of constant liquidity.

use crate::error::DomainResult;
use crate::math::full_math::{mul_div, mul_div_rounding_up};
use crate::math::sqrt_price_math::{
    get_amount0_delta, get_amount1_delta, get_next_sqrt_price_from_input,
};
use primitive_types::U256;

/// One million pips make 100%.
pub const FEE_DENOMINATOR: u32 = 1_000_000;

/// Outcome of a swap step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapStep {
    /// Price after the step.
    pub sqrt_price_next: U256,
    /// Input consumed, excluding the fee.
    pub amount_in: U256,
    /// Output produced.
    pub amount_out: U256,
    /// Fee charged on the input.
    pub fee_amount: U256,
}

/// Computes how far `amount_remaining` of input moves the price toward
/// `sqrt_price_target`, and the amounts swapped on the way.
///
/// The direction is inferred from the target: a target at or below the
/// current price swaps token0 for token1.
pub fn compute_swap_step(
    sqrt_price_current: U256,
    sqrt_price_target: U256,
    liquidity: u128,
    amount_remaining: U256,
    fee_pips: u32,
) -> DomainResult<SwapStep> {
    let zero_for_one = sqrt_price_current >= sqrt_price_target;
    let fee = U256::from(fee_pips);
    let fee_complement = U256::from(FEE_DENOMINATOR - fee_pips);
    let denominator = U256::from(FEE_DENOMINATOR);

    let amount_remaining_less_fee = mul_div(amount_remaining, fee_complement, denominator)?;
    let amount_to_target = if zero_for_one {
        get_amount0_delta(sqrt_price_target, sqrt_price_current, liquidity, true)?
    } else {
        get_amount1_delta(sqrt_price_current, sqrt_price_target, liquidity, true)?
    };

    let sqrt_price_next = if amount_remaining_less_fee >= amount_to_target {
        sqrt_price_target
    } else {
        get_next_sqrt_price_from_input(
            sqrt_price_current,
            liquidity,
            amount_remaining_less_fee,
            zero_for_one,
        )?
    };
    let reached_target = sqrt_price_next == sqrt_price_target;

    let (amount_in, amount_out) = if zero_for_one {
        let amount_in = if reached_target {
            amount_to_target
        } else {
            get_amount0_delta(sqrt_price_next, sqrt_price_current, liquidity, true)?
        };
        let amount_out = get_amount1_delta(sqrt_price_next, sqrt_price_current, liquidity, false)?;
        (amount_in, amount_out)
    } else {
        let amount_in = if reached_target {
            amount_to_target
        } else {
            get_amount1_delta(sqrt_price_current, sqrt_price_next, liquidity, true)?
        };
        let amount_out = get_amount0_delta(sqrt_price_current, sqrt_price_next, liquidity, false)?;
        (amount_in, amount_out)
    };

    // the remainder is taken as fee when the target was not reached
    let fee_amount = if reached_target {
        mul_div_rounding_up(amount_in, fee, fee_complement)?
    } else {
        amount_remaining - amount_in
    };

    Ok(SwapStep {
        sqrt_price_next,
        amount_in,
        amount_out,
        fee_amount,
    })
}
