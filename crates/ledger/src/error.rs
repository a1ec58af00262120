//! Errors reported by a ledger implementation.

use crate::Address;
use primitive_types::U256;
use thiserror::Error;
use unisim_domain::error::DomainError;
use unisim_domain::position::PositionId;

/// Rejection raised by a ledger operation. Failed calls leave no state behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// No token was deployed at this address.
    #[error("unknown token {0:?}")]
    UnknownToken(Address),
    /// No pool exists for this pair and fee.
    #[error("no pool for {token0:?}/{token1:?} at fee {fee}")]
    UnknownPool {
        token0: Address,
        token1: Address,
        fee: u32,
    },
    /// No pool lives at this address.
    #[error("unknown pool {0:?}")]
    UnknownPoolAddress(Address),
    /// A pool for this pair and fee was already created.
    #[error("pool {0:?} already exists")]
    PoolExists(Address),
    /// Pool tokens were identical or not in address order.
    #[error("token pair must be two distinct tokens in address order")]
    UnsortedTokens,
    /// The position manager never issued this id.
    #[error("unknown position {0}")]
    UnknownPosition(PositionId),
    /// Caller is not the position's owner.
    #[error("{caller:?} does not own position {id}")]
    NotOwner { id: PositionId, caller: Address },
    /// Only the deployer may rename a token.
    #[error("{caller:?} did not deploy token {token:?}")]
    NotDeployer { token: Address, caller: Address },
    /// Transfer or burn larger than the holder's balance.
    #[error("insufficient balance of {token:?} for {owner:?}: needed {needed}, available {available}")]
    InsufficientBalance {
        token: Address,
        owner: Address,
        needed: U256,
        available: U256,
    },
    /// Spender pulled more than it was approved for.
    #[error("insufficient allowance of {token:?} from {owner:?} to {spender:?}: needed {needed}, available {available}")]
    InsufficientAllowance {
        token: Address,
        owner: Address,
        spender: Address,
        needed: U256,
        available: U256,
    },
    /// Bounds unordered, off the spacing grid or outside the tick domain.
    #[error("invalid tick range [{lower}, {upper}] for spacing {spacing}")]
    InvalidTickRange { lower: i32, upper: i32, spacing: i32 },
    /// Liquidity change of zero.
    #[error("liquidity delta must be non-zero")]
    ZeroLiquidity,
    /// Swap of zero tokens.
    #[error("amount must be non-zero")]
    ZeroAmount,
    /// Fixed-point math failure.
    #[error(transparent)]
    Math(#[from] DomainError),
}

pub type LedgerResult<T> = Result<T, LedgerError>;
