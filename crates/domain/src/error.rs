//! Errors raised by the pure pool math.

use thiserror::Error;

/// Errors produced by the domain math and value objects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Fee is not one of the supported tiers, or a spacing has no tier.
    #[error("invalid fee tier: {0}")]
    InvalidFeeTier(String),

    /// Price must be strictly positive.
    #[error("price must be positive, got {0}")]
    InvalidPrice(String),

    /// Tick outside of `[MIN_TICK, MAX_TICK]`.
    #[error("tick {0} is out of range")]
    TickOutOfRange(i32),

    /// Sqrt price outside of `[MIN_SQRT_RATIO, MAX_SQRT_RATIO)`.
    #[error("sqrt price {0} is out of range")]
    SqrtPriceOutOfRange(String),

    /// Lower and upper bound collapse to the same value.
    #[error("empty price range: lower {lower} upper {upper}")]
    InvalidTickRange {
        /// Lower bound.
        lower: String,
        /// Upper bound.
        upper: String,
    },

    /// Denominator was zero.
    #[error("division by zero")]
    DivisionByZero,

    /// Result does not fit in the target integer width.
    #[error("arithmetic overflow")]
    Overflow,

    /// Liquidity would drop below zero.
    #[error("liquidity underflow")]
    LiquidityUnderflow,

    /// Amount cannot be represented (negative or too many digits).
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
}

/// Convenience alias used across the domain crate.
pub type DomainResult<T> = Result<T, DomainError>;
