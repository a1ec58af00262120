//! Re-exports for downstream crates.

pub use crate::error::{DomainError, DomainResult};
pub use crate::fees::{FeeTier, fee_for_spacing, spacing_for_fee};
pub use crate::math::full_math::{mul_div, mul_div_rounding_up, q96, q128};
pub use crate::math::liquidity_math::{add_delta, amounts_for_liquidity, liquidity_for_amounts};
pub use crate::math::tick_math::{
    MAX_SQRT_RATIO, MAX_TICK, MIN_SQRT_RATIO, MIN_TICK, get_sqrt_ratio_at_tick,
    get_tick_at_sqrt_ratio, price_to_sqrt_price_x96, price_to_tick, round_tick_to_spacing,
    sqrt_price_x96_to_inverse_price, sqrt_price_x96_to_price, tick_to_sqrt_price_x96,
};
pub use crate::position::{Position, PositionId};
pub use crate::token::Token;
pub use crate::value_objects::{Amount, Price, PriceRange, TOKEN_DECIMALS};
pub use primitive_types::U256;
