use crate::error::{LedgerError, LedgerResult};
use crate::memory::tick::TickMap;
use crate::{Address, PoolSlot};
use primitive_types::U256;
use std::collections::BTreeMap;
use tracing::trace;
use unisim_domain::math::full_math::{mul_div, q128};
use unisim_domain::math::liquidity_math::add_delta;
use unisim_domain::math::sqrt_price_math::{get_amount0_delta, get_amount1_delta};
use unisim_domain::math::swap_math::compute_swap_step;
use unisim_domain::math::tick_math::{
    MAX_SQRT_RATIO, MAX_TICK, MIN_SQRT_RATIO, MIN_TICK, get_sqrt_ratio_at_tick,
    get_tick_at_sqrt_ratio,
};

/// Liquidity owned by one address over one tick range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RangePosition {
    pub liquidity: u128,
    pub fee_growth_inside0_last_x128: U256,
    pub fee_growth_inside1_last_x128: U256,
    pub tokens_owed0: U256,
    pub tokens_owed1: U256,
}

/// Result of an exact-input swap against the pool state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SwapResult {
    /// Input consumed, fees included.
    pub amount_in: U256,
    pub amount_out: U256,
}

/// Price, tick and liquidity state of a single pool.
#[derive(Debug, Clone)]
pub(crate) struct CorePool {
    pub address: Address,
    pub token0: Address,
    pub token1: Address,
    pub fee: u32,
    pub tick_spacing: i32,
    pub sqrt_price_x96: U256,
    pub tick: i32,
    pub liquidity: u128,
    pub fee_growth_global0_x128: U256,
    pub fee_growth_global1_x128: U256,
    ticks: TickMap,
    positions: BTreeMap<(Address, i32, i32), RangePosition>,
}

impl CorePool {
    pub fn new(
        address: Address,
        token0: Address,
        token1: Address,
        fee: u32,
        tick_spacing: i32,
        sqrt_price_x96: U256,
    ) -> LedgerResult<Self> {
        let tick = get_tick_at_sqrt_ratio(sqrt_price_x96)?;
        Ok(Self {
            address,
            token0,
            token1,
            fee,
            tick_spacing,
            sqrt_price_x96,
            tick,
            liquidity: 0,
            fee_growth_global0_x128: U256::zero(),
            fee_growth_global1_x128: U256::zero(),
            ticks: TickMap::default(),
            positions: BTreeMap::new(),
        })
    }

    pub fn slot(&self) -> PoolSlot {
        PoolSlot {
            sqrt_price_x96: self.sqrt_price_x96,
            tick: self.tick,
            liquidity: self.liquidity,
        }
    }

    pub fn position(&self, owner: Address, tick_lower: i32, tick_upper: i32) -> Option<&RangePosition> {
        self.positions.get(&(owner, tick_lower, tick_upper))
    }

    pub fn check_ticks(&self, tick_lower: i32, tick_upper: i32) -> LedgerResult<()> {
        let spaced = |t: i32| t.rem_euclid(self.tick_spacing) == 0;
        if tick_lower >= tick_upper
            || tick_lower < MIN_TICK
            || tick_upper > MAX_TICK
            || !spaced(tick_lower)
            || !spaced(tick_upper)
        {
            return Err(LedgerError::InvalidTickRange {
                lower: tick_lower,
                upper: tick_upper,
                spacing: self.tick_spacing,
            });
        }
        Ok(())
    }

    /// Adds (`delta > 0`) or removes liquidity and returns the token amounts
    /// the change is worth. Additions round up, removals round down.
    /// Removed amounts are credited to the position's owed balances.
    pub fn modify_position(
        &mut self,
        owner: Address,
        tick_lower: i32,
        tick_upper: i32,
        delta: i128,
    ) -> LedgerResult<(U256, U256)> {
        self.check_ticks(tick_lower, tick_upper)?;
        self.update_position(owner, tick_lower, tick_upper, delta)?;

        let round_up = delta > 0;
        let magnitude = delta.unsigned_abs();
        let sqrt_lower = get_sqrt_ratio_at_tick(tick_lower)?;
        let sqrt_upper = get_sqrt_ratio_at_tick(tick_upper)?;

        let (amount0, amount1) = if self.tick < tick_lower {
            (
                get_amount0_delta(sqrt_lower, sqrt_upper, magnitude, round_up)?,
                U256::zero(),
            )
        } else if self.tick < tick_upper {
            self.liquidity = add_delta(self.liquidity, delta)?;
            (
                get_amount0_delta(self.sqrt_price_x96, sqrt_upper, magnitude, round_up)?,
                get_amount1_delta(sqrt_lower, self.sqrt_price_x96, magnitude, round_up)?,
            )
        } else {
            (
                U256::zero(),
                get_amount1_delta(sqrt_lower, sqrt_upper, magnitude, round_up)?,
            )
        };

        if delta < 0 {
            let position = self
                .positions
                .entry((owner, tick_lower, tick_upper))
                .or_default();
            position.tokens_owed0 = position.tokens_owed0.overflowing_add(amount0).0;
            position.tokens_owed1 = position.tokens_owed1.overflowing_add(amount1).0;
        }
        Ok((amount0, amount1))
    }

    /// Accrues fees into the position without changing its liquidity.
    pub fn poke(&mut self, owner: Address, tick_lower: i32, tick_upper: i32) -> LedgerResult<()> {
        self.update_position(owner, tick_lower, tick_upper, 0)
    }

    /// Takes up to the requested owed amounts off the position and returns
    /// what was taken.
    pub fn collect(
        &mut self,
        owner: Address,
        tick_lower: i32,
        tick_upper: i32,
        amount0_requested: U256,
        amount1_requested: U256,
    ) -> (U256, U256) {
        match self.positions.get_mut(&(owner, tick_lower, tick_upper)) {
            Some(position) => {
                let amount0 = amount0_requested.min(position.tokens_owed0);
                let amount1 = amount1_requested.min(position.tokens_owed1);
                position.tokens_owed0 -= amount0;
                position.tokens_owed1 -= amount1;
                (amount0, amount1)
            }
            None => (U256::zero(), U256::zero()),
        }
    }

    fn update_position(
        &mut self,
        owner: Address,
        tick_lower: i32,
        tick_upper: i32,
        delta: i128,
    ) -> LedgerResult<()> {
        let fg0 = self.fee_growth_global0_x128;
        let fg1 = self.fee_growth_global1_x128;

        if delta != 0 {
            self.ticks
                .update(tick_lower, self.tick, delta, fg0, fg1, false)?;
            self.ticks
                .update(tick_upper, self.tick, delta, fg0, fg1, true)?;
        }
        let (inside0, inside1) =
            self.ticks
                .fee_growth_inside(tick_lower, tick_upper, self.tick, fg0, fg1);

        let position = self
            .positions
            .entry((owner, tick_lower, tick_upper))
            .or_default();
        if delta == 0 && position.liquidity == 0 {
            return Err(LedgerError::ZeroLiquidity);
        }

        let earned0 = mul_div(
            inside0.overflowing_sub(position.fee_growth_inside0_last_x128).0,
            U256::from(position.liquidity),
            q128(),
        )?;
        let earned1 = mul_div(
            inside1.overflowing_sub(position.fee_growth_inside1_last_x128).0,
            U256::from(position.liquidity),
            q128(),
        )?;

        position.liquidity = add_delta(position.liquidity, delta)?;
        position.fee_growth_inside0_last_x128 = inside0;
        position.fee_growth_inside1_last_x128 = inside1;
        position.tokens_owed0 = position.tokens_owed0.overflowing_add(earned0).0;
        position.tokens_owed1 = position.tokens_owed1.overflowing_add(earned1).0;
        Ok(())
    }

    /// Exact-input swap across as many initialized ticks as needed, until the
    /// input is used up or the extreme price limit is hit. A pool already
    /// sitting at the limit swaps nothing.
    pub fn swap(&mut self, zero_for_one: bool, amount_specified: U256) -> LedgerResult<SwapResult> {
        if amount_specified.is_zero() {
            return Err(LedgerError::ZeroAmount);
        }
        let sqrt_price_limit = if zero_for_one {
            MIN_SQRT_RATIO + U256::one()
        } else {
            MAX_SQRT_RATIO - U256::one()
        };

        let mut remaining = amount_specified;
        let mut amount_out = U256::zero();
        let mut sqrt_price = self.sqrt_price_x96;
        let mut tick = self.tick;
        let mut liquidity = self.liquidity;
        let mut fee_growth_global = if zero_for_one {
            self.fee_growth_global0_x128
        } else {
            self.fee_growth_global1_x128
        };

        while !remaining.is_zero() && sqrt_price != sqrt_price_limit {
            let sqrt_price_start = sqrt_price;
            let (tick_next, initialized) =
                self.ticks
                    .next_initialized_tick_within_one_word(tick, self.tick_spacing, zero_for_one);
            let sqrt_price_next = get_sqrt_ratio_at_tick(tick_next)?;

            let target = if zero_for_one {
                sqrt_price_next.max(sqrt_price_limit)
            } else {
                sqrt_price_next.min(sqrt_price_limit)
            };
            let step = compute_swap_step(sqrt_price, target, liquidity, remaining, self.fee)?;

            sqrt_price = step.sqrt_price_next;
            remaining -= step.amount_in + step.fee_amount;
            amount_out += step.amount_out;

            if liquidity > 0 {
                let growth = mul_div(step.fee_amount, q128(), U256::from(liquidity))?;
                fee_growth_global = fee_growth_global.overflowing_add(growth).0;
            }

            if sqrt_price == sqrt_price_next {
                if initialized {
                    let (fg0, fg1) = if zero_for_one {
                        (fee_growth_global, self.fee_growth_global1_x128)
                    } else {
                        (self.fee_growth_global0_x128, fee_growth_global)
                    };
                    let net = self.ticks.cross(tick_next, fg0, fg1);
                    let net = if zero_for_one { -net } else { net };
                    liquidity = add_delta(liquidity, net)?;
                    trace!(tick = tick_next, liquidity, "crossed tick");
                }
                tick = if zero_for_one { tick_next - 1 } else { tick_next };
            } else if sqrt_price != sqrt_price_start {
                tick = get_tick_at_sqrt_ratio(sqrt_price)?;
            }
        }

        self.sqrt_price_x96 = sqrt_price;
        self.tick = tick;
        self.liquidity = liquidity;
        if zero_for_one {
            self.fee_growth_global0_x128 = fee_growth_global;
        } else {
            self.fee_growth_global1_x128 = fee_growth_global;
        }

        Ok(SwapResult {
            amount_in: amount_specified - remaining,
            amount_out,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unisim_domain::math::full_math::q96;

    fn pool() -> CorePool {
        CorePool::new(
            Address::from_low_u64_be(1),
            Address::from_low_u64_be(2),
            Address::from_low_u64_be(3),
            500,
            10,
            q96(),
        )
        .unwrap()
    }

    #[test]
    fn test_mint_in_range_activates_liquidity() {
        let mut pool = pool();
        let owner = Address::from_low_u64_be(9);
        let (a0, a1) = pool.modify_position(owner, -200, 200, 1_000_000).unwrap();
        assert!(!a0.is_zero() && !a1.is_zero());
        assert_eq!(pool.liquidity, 1_000_000);

        // out of range on the upper side only needs token0
        let (a0, a1) = pool.modify_position(owner, 100, 300, 1_000_000).unwrap();
        assert!(!a0.is_zero());
        assert!(a1.is_zero());
        assert_eq!(pool.liquidity, 1_000_000);
    }

    #[test]
    fn test_burn_rounds_down_and_credits_owed() {
        let mut pool = pool();
        let owner = Address::from_low_u64_be(9);
        let (in0, in1) = pool.modify_position(owner, -200, 200, 1_000_001).unwrap();
        let (out0, out1) = pool.modify_position(owner, -200, 200, -1_000_001).unwrap();
        assert!(out0 <= in0 && out1 <= in1);
        let position = pool.position(owner, -200, 200).unwrap();
        assert_eq!(position.liquidity, 0);
        assert_eq!(position.tokens_owed0, out0);
        assert_eq!(pool.liquidity, 0);
    }

    #[test]
    fn test_invalid_ticks() {
        let mut pool = pool();
        let owner = Address::from_low_u64_be(9);
        assert!(matches!(
            pool.modify_position(owner, 200, -200, 1),
            Err(LedgerError::InvalidTickRange { .. })
        ));
        assert!(pool.modify_position(owner, -205, 200, 1).is_err());
    }

    #[test]
    fn test_swap_accrues_fees_to_range() {
        let mut pool = pool();
        let owner = Address::from_low_u64_be(9);
        let liquidity = 10u128.pow(22);
        pool.modify_position(owner, -200, 200, liquidity as i128).unwrap();

        let amount = U256::exp10(18);
        let result = pool.swap(true, amount).unwrap();
        assert_eq!(result.amount_in, amount);
        assert!(result.amount_out < amount);
        assert!(pool.tick < 0);
        assert!(!pool.fee_growth_global0_x128.is_zero());

        pool.poke(owner, -200, 200).unwrap();
        let owed = pool.position(owner, -200, 200).unwrap().tokens_owed0;
        // 0.05% of the input, less rounding
        let expected = amount * U256::from(500u64) / U256::from(1_000_000u64);
        assert!(owed <= expected && owed + U256::from(2u64) >= expected);
    }

    #[test]
    fn test_swap_without_liquidity_runs_to_limit() {
        let mut pool = pool();
        let result = pool.swap(false, U256::exp10(18)).unwrap();
        assert!(result.amount_in.is_zero());
        assert!(result.amount_out.is_zero());
        assert_eq!(pool.sqrt_price_x96, MAX_SQRT_RATIO - U256::one());
        let again = pool.swap(false, U256::one()).unwrap();
        assert!(again.amount_in.is_zero());
    }
}
