//! Conversions between prices, ticks and Q64.96 square-root prices.
//!
//! A tick `t` addresses the price `1.0001^t` of token0 in units of token1.
//! Pools store `sqrt(price) * 2^96` as an integer. Tick and sqrt-price
//! conversions are exact integer arithmetic; anything that produces or
//! consumes a human price goes through `f64`.

use crate::error::{DomainError, DomainResult};
use primitive_types::U256;

/// Base of the logarithmic tick grid.
pub const TICK_BASE: f64 = 1.0001;

// 2^96
const Q96: f64 = 79_228_162_514_264_337_593_543_950_336.0;

/// Lowest usable tick.
pub const MIN_TICK: i32 = -887_272;
/// Highest usable tick.
pub const MAX_TICK: i32 = 887_272;

/// `get_sqrt_ratio_at_tick(MIN_TICK)`.
pub const MIN_SQRT_RATIO: U256 = U256([4_295_128_739, 0, 0, 0]);
/// `get_sqrt_ratio_at_tick(MAX_TICK)`.
pub const MAX_SQRT_RATIO: U256 = U256([
    0x5d95_1d52_6398_8d26,
    0xefd1_fc6a_5064_8849,
    0xfffd_8963,
    0,
]);

// sqrt(1.0001^-(2^i)) in Q128.128, for i = 1..=19.
const RATIO_FACTORS: [(u32, u128); 19] = [
    (0x2, 0xfff9_7272_373d_4132_59a4_6990_580e_213a),
    (0x4, 0xfff2_e50f_5f65_6932_ef12_357c_f3c7_fdcc),
    (0x8, 0xffe5_caca_7e10_e4e6_1c36_24ea_a094_1cd0),
    (0x10, 0xffcb_9843_d60f_6159_c9db_5883_5c92_6644),
    (0x20, 0xff97_3b41_fa98_c081_472e_6896_dfb2_54c0),
    (0x40, 0xff2e_a164_66c9_6a38_43ec_78b3_26b5_2861),
    (0x80, 0xfe5d_ee04_6a99_a2a8_11c4_61f1_969c_3053),
    (0x100, 0xfcbe_86c7_900a_88ae_dcff_c83b_479a_a3a4),
    (0x200, 0xf987_a725_3ac4_1317_6f2b_074c_f781_5e54),
    (0x400, 0xf339_2b08_22b7_0005_940c_7a39_8e4b_70f3),
    (0x800, 0xe715_9475_a2c2_9b74_43b2_9c7f_a6e8_89d9),
    (0x1000, 0xd097_f3bd_fd20_22b8_845a_d8f7_92aa_5825),
    (0x2000, 0xa9f7_4646_2d87_0fdf_8a65_dc1f_90e0_61e5),
    (0x4000, 0x70d8_69a1_56d2_a1b8_90bb_3df6_2baf_32f7),
    (0x8000, 0x31be_135f_97d0_8fd9_8123_1505_542f_cfa6),
    (0x10000, 0x09aa_508b_5b7a_84e1_c677_de54_f3e9_9bc9),
    (0x20000, 0x005d_6af8_dedb_8119_6699_c329_225e_e604),
    (0x40000, 0x0000_2216_e584_f5fa_1ea9_2604_1bed_fe98),
    (0x80000, 0x0000_0000_048a_1703_91f7_dc42_444e_8fa2),
];

/// Checks a tick lies in `[MIN_TICK, MAX_TICK]`.
#[must_use]
pub fn is_tick_in_range(tick: i32) -> bool {
    (MIN_TICK..=MAX_TICK).contains(&tick)
}

/// Returns `sqrt(1.0001^tick) * 2^96`, rounded up, as computed on-chain.
pub fn get_sqrt_ratio_at_tick(tick: i32) -> DomainResult<U256> {
    if !is_tick_in_range(tick) {
        return Err(DomainError::TickOutOfRange(tick));
    }
    let abs_tick = tick.unsigned_abs();

    let mut ratio = if abs_tick & 0x1 != 0 {
        U256::from(0xfffc_b933_bd6f_ad37_aa2d_162d_1a59_4001_u128)
    } else {
        U256::one() << 128
    };
    for (mask, factor) in RATIO_FACTORS {
        if abs_tick & mask != 0 {
            ratio = (ratio * U256::from(factor)) >> 128;
        }
    }
    if tick > 0 {
        ratio = U256::MAX / ratio;
    }

    // Q128.128 -> Q64.96, rounding up so that the inverse lookup is exact.
    let shifted = ratio >> 32;
    if (ratio & U256::from(u32::MAX)).is_zero() {
        Ok(shifted)
    } else {
        Ok(shifted + U256::one())
    }
}

/// Returns the greatest tick whose sqrt ratio is `<= sqrt_price_x96`.
pub fn get_tick_at_sqrt_ratio(sqrt_price_x96: U256) -> DomainResult<i32> {
    if sqrt_price_x96 < MIN_SQRT_RATIO || sqrt_price_x96 >= MAX_SQRT_RATIO {
        return Err(DomainError::SqrtPriceOutOfRange(sqrt_price_x96.to_string()));
    }
    let (mut lo, mut hi) = (MIN_TICK, MAX_TICK);
    while lo < hi {
        let mid = lo + (hi - lo + 1) / 2;
        if get_sqrt_ratio_at_tick(mid)? <= sqrt_price_x96 {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    Ok(lo)
}

/// `floor(sqrt(price) * 2^96)` where `price` is token1 per token0.
///
/// The square root is taken in `f64` and the product converted exactly,
/// so the result matches pools initialised from floating-point prices.
pub fn price_to_sqrt_price_x96(price: f64) -> DomainResult<U256> {
    if !price.is_finite() || price <= 0.0 {
        return Err(DomainError::InvalidPrice(price.to_string()));
    }
    f64_to_u256(price.sqrt() * 2f64.powi(96))
}

/// `(sqrt_price_x96 / 2^96)^2`: the price of token0 in units of token1.
///
/// Computed in `f64`, which spans every price between `MIN_SQRT_RATIO`
/// and `MAX_SQRT_RATIO` (about `2.9e-39` to `3.4e38`).
pub fn sqrt_price_x96_to_price(sqrt_price_x96: U256) -> DomainResult<f64> {
    if sqrt_price_x96.is_zero() {
        return Err(DomainError::InvalidPrice("0".to_string()));
    }
    let ratio = u256_to_f64(sqrt_price_x96) / Q96;
    Ok(ratio * ratio)
}

/// `(2^96 / sqrt_price_x96)^2`: the price of token1 in units of token0.
pub fn sqrt_price_x96_to_inverse_price(sqrt_price_x96: U256) -> DomainResult<f64> {
    if sqrt_price_x96.is_zero() {
        return Err(DomainError::DivisionByZero);
    }
    let ratio = Q96 / u256_to_f64(sqrt_price_x96);
    Ok(ratio * ratio)
}

/// `floor(log_1.0001(price))`.
pub fn price_to_tick(price: f64) -> DomainResult<i32> {
    if !price.is_finite() || price <= 0.0 {
        return Err(DomainError::InvalidPrice(price.to_string()));
    }
    let tick = (price.ln() / TICK_BASE.ln()).floor();
    if tick < f64::from(MIN_TICK) || tick > f64::from(MAX_TICK) {
        return Err(DomainError::TickOutOfRange(tick as i32));
    }
    Ok(tick as i32)
}

/// Q64.96 sqrt price at a tick boundary.
///
/// This is the on-chain ratio, which rounds up: it can sit a few ulps above
/// `floor(1.0001^(tick/2) * 2^96)`. Pools and tick lookups agree on it.
pub fn tick_to_sqrt_price_x96(tick: i32) -> DomainResult<U256> {
    get_sqrt_ratio_at_tick(tick)
}

/// Returns the price corresponding to a given tick.
/// P = 1.0001 ^ tick
pub fn tick_to_price(tick: i32) -> DomainResult<f64> {
    if !is_tick_in_range(tick) {
        return Err(DomainError::TickOutOfRange(tick));
    }
    Ok(TICK_BASE.powi(tick))
}

/// `floor(tick / spacing) * spacing`. `spacing` must be positive.
#[must_use]
pub fn round_tick_to_spacing(tick: i32, spacing: i32) -> i32 {
    tick.div_euclid(spacing) * spacing
}

/// Converts a price to a tick usable as a position boundary.
pub fn price_to_tick_with_spacing(price: f64, spacing: i32) -> DomainResult<i32> {
    Ok(round_tick_to_spacing(price_to_tick(price)?, spacing))
}

// Truncating conversion of a non-negative float to an integer.
fn f64_to_u256(value: f64) -> DomainResult<U256> {
    if !value.is_finite() || value < 0.0 {
        return Err(DomainError::InvalidPrice(value.to_string()));
    }
    if value < 1.0 {
        return Ok(U256::zero());
    }
    let bits = value.to_bits();
    let exponent = ((bits >> 52) & 0x7ff) as i32 - 1075;
    let mantissa = (bits & ((1u64 << 52) - 1)) | (1u64 << 52);
    if exponent >= 0 {
        if exponent > 203 {
            return Err(DomainError::Overflow);
        }
        Ok(U256::from(mantissa) << exponent as usize)
    } else {
        Ok(U256::from(mantissa >> (-exponent) as u32))
    }
}

// Nearest f64 to the top 64 significant bits of `value`.
fn u256_to_f64(value: U256) -> f64 {
    let bits = value.bits();
    if bits <= 64 {
        return value.low_u64() as f64;
    }
    let shift = bits - 64;
    (value >> shift).low_u64() as f64 * 2f64.powi(shift as i32)
}
