use crate::error::DomainResult;
use crate::math::tick_math::price_to_tick_with_spacing;
use crate::value_objects::price::Price;
use serde::{Deserialize, Serialize};

/// A band of agent-facing prices (token0 quoted in token1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub lower_price: Price,
    pub upper_price: Price,
}

impl PriceRange {
    /// Builds a range, ordering the bounds.
    #[must_use]
    pub fn new(a: Price, b: Price) -> Self {
        if a <= b {
            Self {
                lower_price: a,
                upper_price: b,
            }
        } else {
            Self {
                lower_price: b,
                upper_price: a,
            }
        }
    }

    pub fn contains(&self, price: Price) -> bool {
        price.value >= self.lower_price.value && price.value <= self.upper_price.value
    }

    /// Position boundaries in pool tick space.
    ///
    /// Pool ticks measure token1 per token0, the inverse of the agent quote,
    /// so each bound is inverted before it is converted and rounded down to
    /// the spacing. The returned pair is ordered.
    pub fn to_ticks(&self, tick_spacing: i32) -> DomainResult<(i32, i32)> {
        let a = price_to_tick_with_spacing(1.0 / self.lower_price.to_f64()?, tick_spacing)?;
        let b = price_to_tick_with_spacing(1.0 / self.upper_price.to_f64()?, tick_spacing)?;
        Ok((a.min(b), a.max(b)))
    }
}
