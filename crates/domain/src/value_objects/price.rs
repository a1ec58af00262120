use crate::error::{DomainError, DomainResult};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A strictly positive exchange rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Price {
    pub value: Decimal,
}

impl Price {
    pub fn new(value: Decimal) -> DomainResult<Self> {
        if value <= Decimal::ZERO {
            return Err(DomainError::InvalidPrice(value.to_string()));
        }
        Ok(Self { value })
    }

    /// The same rate quoted the other way round.
    pub fn invert(&self) -> DomainResult<Self> {
        let value = Decimal::ONE
            .checked_div(self.value)
            .ok_or(DomainError::DivisionByZero)?;
        Self::new(value)
    }

    pub fn to_f64(&self) -> DomainResult<f64> {
        self.value
            .to_f64()
            .ok_or_else(|| DomainError::InvalidPrice(self.value.to_string()))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}
