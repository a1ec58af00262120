//! Errors raised while building or running a simulation.

use rust_decimal::Decimal;
use thiserror::Error;
use unisim_domain::error::DomainError;
use unisim_ledger::LedgerError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulationError {
    /// Fee is not one of the supported tiers.
    #[error("not a valid pool fee: {0}")]
    InvalidFeeTier(u32),
    /// The second token of a pair must be quoted at 1.
    #[error("token {symbol} should start at a price of 1, got {price}")]
    InvalidTokenOrdering { symbol: String, price: Decimal },
    /// Agent holds less than the operation needs.
    #[error("insufficient balance: needed {needed}, available {available}")]
    InsufficientBalance { needed: Decimal, available: Decimal },
    /// Liquidity fraction outside `(0, 1]`.
    #[error("fraction must be in (0, 1], got {0}")]
    InvalidFraction(Decimal),
    /// An exchange already lists a pool with this name.
    #[error("duplicate pool: '{0}' already exists")]
    DuplicatePool(String),
    /// No pool with this name is listed.
    #[error("no pool named '{0}'")]
    UnknownPool(String),
    /// Whale activation steps run past the end of the simulation.
    #[error("not enough steps for the whale: needs {required}, run has {configured}")]
    InsufficientSteps { required: u64, configured: u64 },
    /// Agent tuning that cannot drive a distribution.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// The ledger rejected an operation.
    #[error("ledger operation failed: {0}")]
    LedgerOperationFailed(#[from] LedgerError),
    /// Fixed-point math failure outside a ledger call.
    #[error(transparent)]
    Domain(#[from] DomainError),
}

pub type SimulationResult<T> = Result<T, SimulationError>;
