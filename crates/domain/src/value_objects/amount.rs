use crate::error::{DomainError, DomainResult};
use primitive_types::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Decimals used by every token the simulator deploys.
pub const TOKEN_DECIMALS: u8 = 18;

/// A raw on-ledger token quantity together with its decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Amount {
    pub raw: U256,
    pub decimals: u8,
}

impl Amount {
    #[must_use]
    pub fn new(raw: U256, decimals: u8) -> Self {
        Self { raw, decimals }
    }

    /// Raw quantity of an 18-decimal token.
    #[must_use]
    pub fn from_raw(raw: U256) -> Self {
        Self::new(raw, TOKEN_DECIMALS)
    }

    #[must_use]
    pub fn zero() -> Self {
        Self::from_raw(U256::zero())
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.raw.is_zero()
    }

    /// Converts a human amount, truncating digits beyond `decimals`.
    pub fn from_decimal(value: Decimal, decimals: u8) -> DomainResult<Self> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(DomainError::InvalidAmount(value.to_string()));
        }
        let mantissa = U256::from(value.mantissa().unsigned_abs());
        let scale = value.scale();
        let decimals_u32 = u32::from(decimals);

        let raw = if scale <= decimals_u32 {
            mantissa
                .checked_mul(U256::exp10((decimals_u32 - scale) as usize))
                .ok_or(DomainError::Overflow)?
        } else {
            mantissa / U256::exp10((scale - decimals_u32) as usize)
        };
        Ok(Self::new(raw, decimals))
    }

    /// Human amount for an 18-decimal token.
    pub fn from_tokens(value: Decimal) -> DomainResult<Self> {
        Self::from_decimal(value, TOKEN_DECIMALS)
    }

    /// Human representation. Digits are dropped from the right only when the
    /// raw value is too wide for a `Decimal` mantissa.
    pub fn to_decimal(&self) -> DomainResult<Decimal> {
        let mut raw = self.raw;
        let mut scale = u32::from(self.decimals);
        let max_mantissa = U256::from(u128::MAX >> 32);

        while raw > max_mantissa {
            if scale == 0 {
                return Err(DomainError::Overflow);
            }
            raw /= U256::from(10u8);
            scale -= 1;
        }
        let mantissa = i128::try_from(raw.low_u128()).map_err(|_| DomainError::Overflow)?;
        Decimal::try_from_i128_with_scale(mantissa, scale)
            .map_err(|e| DomainError::InvalidAmount(e.to_string()))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_decimal() {
            Ok(value) => write!(f, "{}", value.normalize()),
            Err(_) => write!(f, "{}e-{}", self.raw, self.decimals),
        }
    }
}
