//! The value-moving substrate behind a simulated pool.
//!
//! [`Ledger`] is everything the simulation needs from an execution
//! environment: token balances, pool state, liquidity positions and swaps.
//! [`InMemoryLedger`] implements it in-process with the integer arithmetic of
//! a concentrated-liquidity deployment.

pub mod error;
pub mod memory;

pub use error::{LedgerError, LedgerResult};
pub use memory::InMemoryLedger;

use primitive_types::{H160, U256};
use serde::{Deserialize, Serialize};
use unisim_domain::position::PositionId;

/// 20-byte account, token and contract identity.
pub type Address = H160;

/// Live price state of a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSlot {
    /// Q64.96 square root of the token1-per-token0 price.
    pub sqrt_price_x96: U256,
    /// Tick containing the current price.
    pub tick: i32,
    /// Liquidity active at the current tick.
    pub liquidity: u128,
}

/// Parameters for opening a new liquidity position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenPosition {
    pub token0: Address,
    pub token1: Address,
    pub fee: u32,
    pub tick_lower: i32,
    pub tick_upper: i32,
    /// Upper bound on token0 pulled from the caller.
    pub amount0_desired: U256,
    /// Upper bound on token1 pulled from the caller.
    pub amount1_desired: U256,
    /// Owner of the new position.
    pub recipient: Address,
}

/// Result of opening a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintOutcome {
    pub id: PositionId,
    pub liquidity: u128,
    /// Raw token0 actually pulled.
    pub amount0: U256,
    /// Raw token1 actually pulled.
    pub amount1: U256,
}

/// Result of adding liquidity to an existing position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityChange {
    /// Liquidity added by this call.
    pub liquidity: u128,
    pub amount0: U256,
    pub amount1: U256,
}

/// Snapshot of a managed position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionState {
    pub owner: Address,
    pub token0: Address,
    pub token1: Address,
    pub fee: u32,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub liquidity: u128,
    /// Principal and fees released but not yet collected.
    pub tokens_owed0: U256,
    pub tokens_owed1: U256,
}

/// Exact-input swap through a single pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapRequest {
    pub token_in: Address,
    pub token_out: Address,
    pub fee: u32,
    pub recipient: Address,
    /// Raw input, pulled from the caller through the router.
    pub amount_in: U256,
}

/// Operations the simulation performs against its execution environment.
///
/// Every mutating call either applies completely or fails without changing
/// any state.
pub trait Ledger {
    /// Allocates a fresh account identity.
    fn create_account(&mut self) -> Address;

    /// Deploys a token with a zero supply and returns its address.
    fn deploy_token(&mut self, symbol: &str, caller: Address) -> LedgerResult<Address>;

    /// Changes a token's symbol. Only the deployer may do this.
    fn rename_token(&mut self, token: Address, symbol: &str, caller: Address) -> LedgerResult<()>;

    fn symbol(&self, token: Address) -> LedgerResult<String>;

    /// Creates `amount` raw units of `token` for `to`.
    fn mint(&mut self, token: Address, to: Address, amount: U256) -> LedgerResult<()>;

    /// Destroys `amount` raw units held by `from`.
    fn burn(&mut self, token: Address, from: Address, amount: U256) -> LedgerResult<()>;

    fn balance_of(&self, token: Address, owner: Address) -> LedgerResult<U256>;

    /// Sets the allowance `spender` may pull from `owner`.
    fn approve(
        &mut self,
        token: Address,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> LedgerResult<()>;

    fn allowance(&self, token: Address, owner: Address, spender: Address) -> LedgerResult<U256>;

    /// Spender that pulls tokens for position operations.
    fn position_manager(&self) -> Address;

    /// Spender that pulls tokens for swaps.
    fn router(&self) -> Address;

    /// Creates and initialises a pool. Tokens must be in address order.
    fn create_pool(
        &mut self,
        token0: Address,
        token1: Address,
        fee: u32,
        sqrt_price_x96: U256,
        caller: Address,
    ) -> LedgerResult<Address>;

    /// Current sqrt price, tick and active liquidity of a pool.
    fn pool_state(&self, pool: Address) -> LedgerResult<PoolSlot>;

    /// Mints a position owned by `caller`, pulling the used amounts.
    fn open_position(&mut self, params: OpenPosition, caller: Address) -> LedgerResult<MintOutcome>;

    /// Adds liquidity to a position. Fees earned so far become owed.
    fn increase_position(
        &mut self,
        id: PositionId,
        amount0_desired: U256,
        amount1_desired: U256,
        caller: Address,
    ) -> LedgerResult<LiquidityChange>;

    /// Removes liquidity; the released tokens become owed to the position.
    fn decrease_position(
        &mut self,
        id: PositionId,
        liquidity: u128,
        caller: Address,
    ) -> LedgerResult<(U256, U256)>;

    /// Transfers everything owed to the position to `recipient`.
    fn collect_owed(
        &mut self,
        id: PositionId,
        recipient: Address,
        caller: Address,
    ) -> LedgerResult<(U256, U256)>;

    /// Owner, range, liquidity and owed amounts of a position.
    fn position_state(&self, id: PositionId) -> LedgerResult<PositionState>;

    /// Swaps and returns the amount of `token_out` sent to the recipient.
    fn swap_exact_in(&mut self, request: SwapRequest, caller: Address) -> LedgerResult<U256>;
}
