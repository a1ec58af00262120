use crate::error::LedgerResult;
use primitive_types::U256;
use std::collections::BTreeMap;
use unisim_domain::math::liquidity_math::add_delta;
use unisim_domain::math::tick_math::{MAX_TICK, MIN_TICK};

/// Ticks searched per lookup, matching one word of an on-chain tick bitmap.
const WORD_BITS: i32 = 256;

/// Per-tick state. A tick is initialized while `liquidity_gross > 0`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct TickInfo {
    pub liquidity_gross: u128,
    pub liquidity_net: i128,
    pub fee_growth_outside0_x128: U256,
    pub fee_growth_outside1_x128: U256,
}

/// Initialized ticks of one pool, keyed by tick index.
#[derive(Debug, Clone, Default)]
pub(crate) struct TickMap {
    ticks: BTreeMap<i32, TickInfo>,
}

impl TickMap {
    /// Applies a liquidity change at a range boundary.
    ///
    /// Fee growth below a freshly initialized tick is assumed to have
    /// happened below it. Returns whether the tick flipped between
    /// initialized and uninitialized.
    pub fn update(
        &mut self,
        tick: i32,
        tick_current: i32,
        liquidity_delta: i128,
        fee_growth_global0_x128: U256,
        fee_growth_global1_x128: U256,
        upper: bool,
    ) -> LedgerResult<bool> {
        let info = self.ticks.entry(tick).or_default();
        let gross_before = info.liquidity_gross;
        let gross_after = add_delta(gross_before, liquidity_delta)?;

        if gross_before == 0 && tick <= tick_current {
            info.fee_growth_outside0_x128 = fee_growth_global0_x128;
            info.fee_growth_outside1_x128 = fee_growth_global1_x128;
        }
        info.liquidity_gross = gross_after;
        info.liquidity_net = if upper {
            info.liquidity_net - liquidity_delta
        } else {
            info.liquidity_net + liquidity_delta
        };

        let flipped = (gross_after == 0) != (gross_before == 0);
        if gross_after == 0 {
            self.ticks.remove(&tick);
        }
        Ok(flipped)
    }

    /// Flips fee growth outside when the price crosses `tick` and returns
    /// the net liquidity to apply in the upward direction.
    pub fn cross(
        &mut self,
        tick: i32,
        fee_growth_global0_x128: U256,
        fee_growth_global1_x128: U256,
    ) -> i128 {
        match self.ticks.get_mut(&tick) {
            Some(info) => {
                info.fee_growth_outside0_x128 =
                    fee_growth_global0_x128.overflowing_sub(info.fee_growth_outside0_x128).0;
                info.fee_growth_outside1_x128 =
                    fee_growth_global1_x128.overflowing_sub(info.fee_growth_outside1_x128).0;
                info.liquidity_net
            }
            None => 0,
        }
    }

    /// Fee growth per unit of liquidity accumulated inside `[lower, upper)`.
    pub fn fee_growth_inside(
        &self,
        tick_lower: i32,
        tick_upper: i32,
        tick_current: i32,
        fee_growth_global0_x128: U256,
        fee_growth_global1_x128: U256,
    ) -> (U256, U256) {
        let default = TickInfo::default();
        let lower = self.ticks.get(&tick_lower).unwrap_or(&default);
        let upper = self.ticks.get(&tick_upper).unwrap_or(&default);

        let (below0, below1) = if tick_current >= tick_lower {
            (lower.fee_growth_outside0_x128, lower.fee_growth_outside1_x128)
        } else {
            (
                fee_growth_global0_x128.overflowing_sub(lower.fee_growth_outside0_x128).0,
                fee_growth_global1_x128.overflowing_sub(lower.fee_growth_outside1_x128).0,
            )
        };
        let (above0, above1) = if tick_current < tick_upper {
            (upper.fee_growth_outside0_x128, upper.fee_growth_outside1_x128)
        } else {
            (
                fee_growth_global0_x128.overflowing_sub(upper.fee_growth_outside0_x128).0,
                fee_growth_global1_x128.overflowing_sub(upper.fee_growth_outside1_x128).0,
            )
        };

        (
            fee_growth_global0_x128
                .overflowing_sub(below0)
                .0
                .overflowing_sub(above0)
                .0,
            fee_growth_global1_x128
                .overflowing_sub(below1)
                .0
                .overflowing_sub(above1)
                .0,
        )
    }

    /// Next initialized tick within the 256-tick word of `tick` (in units of
    /// the spacing). Searches at or below `tick` when `lte`, strictly above
    /// otherwise. When nothing is initialized the word boundary is returned
    /// with `false`, so a swap advances at most one word per step.
    pub fn next_initialized_tick_within_one_word(
        &self,
        tick: i32,
        tick_spacing: i32,
        lte: bool,
    ) -> (i32, bool) {
        let compressed = tick.div_euclid(tick_spacing);

        let (next, initialized) = if lte {
            let word_start = compressed - compressed.rem_euclid(WORD_BITS);
            match self
                .ticks
                .range(word_start * tick_spacing..=compressed * tick_spacing)
                .next_back()
            {
                Some((&found, _)) => (found, true),
                None => (word_start * tick_spacing, false),
            }
        } else {
            let start = compressed + 1;
            let word_end = start - start.rem_euclid(WORD_BITS) + WORD_BITS - 1;
            match self
                .ticks
                .range(start * tick_spacing..=word_end * tick_spacing)
                .next()
            {
                Some((&found, _)) => (found, true),
                None => (word_end * tick_spacing, false),
            }
        };

        (next.clamp(MIN_TICK, MAX_TICK), initialized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map_with(ticks: &[(i32, i128)]) -> TickMap {
        let mut map = TickMap::default();
        for &(tick, delta) in ticks {
            map.update(tick, 0, delta, U256::zero(), U256::zero(), false)
                .unwrap();
        }
        map
    }

    #[test]
    fn test_update_flips_and_clears() {
        let mut map = TickMap::default();
        assert!(map.update(-200, 0, 100, U256::zero(), U256::zero(), false).unwrap());
        assert!(!map.update(-200, 0, 50, U256::zero(), U256::zero(), false).unwrap());
        assert_eq!(map.ticks[&-200].liquidity_net, 150);
        assert!(map.update(-200, 0, -150, U256::zero(), U256::zero(), false).unwrap());
        assert!(!map.ticks.contains_key(&-200));
    }

    #[test]
    fn test_upper_boundary_subtracts_net() {
        let mut map = TickMap::default();
        map.update(200, 0, 100, U256::zero(), U256::zero(), true)
            .unwrap();
        assert_eq!(map.ticks[&200].liquidity_net, -100);
        assert_eq!(map.ticks[&200].liquidity_gross, 100);
    }

    #[test]
    fn test_next_initialized_tick_search() {
        let map = map_with(&[(-200, 1), (200, 1)]);

        // -200 compresses to -20, one word below compressed tick 0
        assert_eq!(map.next_initialized_tick_within_one_word(0, 10, true), (0, false));
        assert_eq!(map.next_initialized_tick_within_one_word(-10, 10, true), (-200, true));
        assert_eq!(map.next_initialized_tick_within_one_word(0, 10, false), (200, true));
        // an exact hit counts when searching down, never when searching up
        assert_eq!(map.next_initialized_tick_within_one_word(200, 10, true), (200, true));
        assert_eq!(map.next_initialized_tick_within_one_word(200, 10, false), (2550, false));
        assert_eq!(map.next_initialized_tick_within_one_word(-201, 10, true), (-2560, false));
    }

    #[test]
    fn test_search_is_clamped_to_tick_domain() {
        let map = TickMap::default();
        let (tick, initialized) = map.next_initialized_tick_within_one_word(MAX_TICK - 1, 1, false);
        assert_eq!(tick, MAX_TICK);
        assert!(!initialized);
    }
}
