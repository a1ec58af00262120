//! 512-bit intermediate multiplication and division.

use crate::error::{DomainError, DomainResult};
use primitive_types::{U256, U512};

/// 2^96, the Q64.96 resolution.
pub fn q96() -> U256 {
    U256::one() << 96
}

/// 2^128, the resolution of fee growth accumulators.
pub fn q128() -> U256 {
    U256::one() << 128
}

/// Narrows a 512-bit value, failing if it does not fit in 256 bits.
pub fn narrow(value: U512) -> DomainResult<U256> {
    U256::try_from(value).map_err(|_| DomainError::Overflow)
}

/// Narrows to `u128`, failing if the value does not fit.
pub fn to_u128(value: U256) -> DomainResult<u128> {
    if value > U256::from(u128::MAX) {
        return Err(DomainError::Overflow);
    }
    Ok(value.as_u128())
}

/// `floor(a * b / denominator)` without intermediate overflow.
pub fn mul_div(a: U256, b: U256, denominator: U256) -> DomainResult<U256> {
    if denominator.is_zero() {
        return Err(DomainError::DivisionByZero);
    }
    narrow(a.full_mul(b) / U512::from(denominator))
}

/// `ceil(a * b / denominator)` without intermediate overflow.
pub fn mul_div_rounding_up(a: U256, b: U256, denominator: U256) -> DomainResult<U256> {
    if denominator.is_zero() {
        return Err(DomainError::DivisionByZero);
    }
    let product = a.full_mul(b);
    let denominator = U512::from(denominator);
    let result = narrow(product / denominator)?;
    if (product % denominator).is_zero() {
        Ok(result)
    } else {
        result.checked_add(U256::one()).ok_or(DomainError::Overflow)
    }
}

/// `ceil(a / b)`.
pub fn div_rounding_up(a: U256, b: U256) -> DomainResult<U256> {
    if b.is_zero() {
        return Err(DomainError::DivisionByZero);
    }
    let quotient = a / b;
    if (a % b).is_zero() {
        Ok(quotient)
    } else {
        Ok(quotient + U256::one())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul_div_exceeding_256_bit_product() {
        let a = U256::MAX;
        let b = U256::from(6u64);
        let d = U256::from(3u64);
        assert!(mul_div(a, b, d).is_err());
        assert_eq!(mul_div(a, d, b).unwrap(), U256::MAX / 2);
    }

    #[test]
    fn test_rounding_up() {
        let seven = U256::from(7u64);
        let two = U256::from(2u64);
        assert_eq!(mul_div(seven, U256::one(), two).unwrap(), U256::from(3u64));
        assert_eq!(
            mul_div_rounding_up(seven, U256::one(), two).unwrap(),
            U256::from(4u64)
        );
        assert_eq!(div_rounding_up(U256::from(8u64), two).unwrap(), U256::from(4u64));
        assert_eq!(div_rounding_up(seven, two).unwrap(), U256::from(4u64));
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(
            mul_div(U256::one(), U256::one(), U256::zero()),
            Err(DomainError::DivisionByZero)
        );
    }
}
