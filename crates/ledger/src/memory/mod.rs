//! In-process ledger: token books, pools, a position manager and a router.

mod core_pool;
mod erc20;
mod position_manager;
mod tick;

use crate::error::{LedgerError, LedgerResult};
use crate::{
    Address, Ledger, LiquidityChange, MintOutcome, OpenPosition, PoolSlot, PositionState,
    SwapRequest,
};
use core_pool::CorePool;
use erc20::Erc20;
use position_manager::ManagedPosition;
use primitive_types::U256;
use std::collections::BTreeMap;
use tracing::{debug, info};
use unisim_domain::error::DomainError;
use unisim_domain::fees::spacing_for_fee;
use unisim_domain::math::liquidity_math::liquidity_for_amounts;
use unisim_domain::math::tick_math::get_sqrt_ratio_at_tick;
use unisim_domain::position::PositionId;

/// Seed of the address generator when none is given.
pub const DEFAULT_ADDRESS_SEED: u64 = 0x756e_6973_696d;

/// Ledger state held entirely in memory.
///
/// Addresses are drawn from a seeded splitmix64 stream, so two ledgers built
/// with the same seed and the same call sequence hand out the same
/// identities, and token order in a pair does not follow deploy order.
#[derive(Debug, Clone)]
pub struct InMemoryLedger {
    address_state: u64,
    tokens: BTreeMap<Address, Erc20>,
    pools: BTreeMap<Address, CorePool>,
    pool_keys: BTreeMap<(Address, Address, u32), Address>,
    positions: BTreeMap<PositionId, ManagedPosition>,
    next_position_id: PositionId,
    position_manager: Address,
    router: Address,
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::with_seed(DEFAULT_ADDRESS_SEED)
    }
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(seed: u64) -> Self {
        let mut ledger = Self {
            address_state: seed,
            tokens: BTreeMap::new(),
            pools: BTreeMap::new(),
            pool_keys: BTreeMap::new(),
            positions: BTreeMap::new(),
            next_position_id: 1,
            position_manager: Address::zero(),
            router: Address::zero(),
        };
        ledger.position_manager = ledger.next_address();
        ledger.router = ledger.next_address();
        ledger
    }

    /// Number of positions opened so far.
    pub fn position_count(&self) -> usize {
        self.positions.len()
    }

    fn next_address(&mut self) -> Address {
        let mut bytes = [0u8; 20];
        for chunk in bytes.chunks_mut(8) {
            self.address_state = self.address_state.wrapping_add(0x9e37_79b9_7f4a_7c15);
            let mut z = self.address_state;
            z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
            z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
            z ^= z >> 31;
            let len = chunk.len();
            chunk.copy_from_slice(&z.to_be_bytes()[..len]);
        }
        Address::from(bytes)
    }

    fn token(&self, token: Address) -> LedgerResult<&Erc20> {
        self.tokens
            .get(&token)
            .ok_or(LedgerError::UnknownToken(token))
    }

    fn token_mut(&mut self, token: Address) -> LedgerResult<&mut Erc20> {
        self.tokens
            .get_mut(&token)
            .ok_or(LedgerError::UnknownToken(token))
    }

    fn pool(&self, pool: Address) -> LedgerResult<&CorePool> {
        self.pools
            .get(&pool)
            .ok_or(LedgerError::UnknownPoolAddress(pool))
    }

    fn pool_for(&self, token0: Address, token1: Address, fee: u32) -> LedgerResult<&CorePool> {
        self.pool_keys
            .get(&(token0, token1, fee))
            .and_then(|address| self.pools.get(address))
            .ok_or(LedgerError::UnknownPool {
                token0,
                token1,
                fee,
            })
    }

    fn managed(&self, id: PositionId) -> LedgerResult<&ManagedPosition> {
        self.positions
            .get(&id)
            .ok_or(LedgerError::UnknownPosition(id))
    }

    /// Pulls `amount0`/`amount1` from `payer` into `pool` through `spender`.
    /// Both legs are checked before either moves.
    fn pull_pair(
        &mut self,
        pool: &CorePool,
        payer: Address,
        spender: Address,
        amount0: U256,
        amount1: U256,
    ) -> LedgerResult<()> {
        self.token(pool.token0)?
            .ensure_spendable(payer, spender, amount0)?;
        self.token(pool.token1)?
            .ensure_spendable(payer, spender, amount1)?;
        self.token_mut(pool.token0)?
            .transfer_from(spender, payer, pool.address, amount0)?;
        self.token_mut(pool.token1)?
            .transfer_from(spender, payer, pool.address, amount1)
    }

    /// Adds liquidity for amounts to a copy of `pool` and reports the
    /// liquidity and token amounts the change costs.
    fn add_liquidity(
        &self,
        mut pool: CorePool,
        tick_lower: i32,
        tick_upper: i32,
        amount0_desired: U256,
        amount1_desired: U256,
    ) -> LedgerResult<(CorePool, LiquidityChange)> {
        pool.check_ticks(tick_lower, tick_upper)?;
        let liquidity = liquidity_for_amounts(
            pool.sqrt_price_x96,
            get_sqrt_ratio_at_tick(tick_lower)?,
            get_sqrt_ratio_at_tick(tick_upper)?,
            amount0_desired,
            amount1_desired,
        )?;
        if liquidity == 0 {
            return Err(LedgerError::ZeroLiquidity);
        }
        let delta = i128::try_from(liquidity).map_err(|_| DomainError::Overflow)?;
        let (amount0, amount1) =
            pool.modify_position(self.position_manager, tick_lower, tick_upper, delta)?;
        Ok((
            pool,
            LiquidityChange {
                liquidity,
                amount0,
                amount1,
            },
        ))
    }
}

impl Ledger for InMemoryLedger {
    fn create_account(&mut self) -> Address {
        self.next_address()
    }

    fn deploy_token(&mut self, symbol: &str, caller: Address) -> LedgerResult<Address> {
        let address = self.next_address();
        self.tokens
            .insert(address, Erc20::new(address, symbol, caller));
        debug!(token = ?address, symbol, "deployed token");
        Ok(address)
    }

    fn rename_token(&mut self, token: Address, symbol: &str, caller: Address) -> LedgerResult<()> {
        let erc20 = self.token_mut(token)?;
        if erc20.deployer != caller {
            return Err(LedgerError::NotDeployer { token, caller });
        }
        debug!(token = ?token, from = %erc20.symbol, to = symbol, "renamed token");
        erc20.symbol = symbol.to_string();
        Ok(())
    }

    fn symbol(&self, token: Address) -> LedgerResult<String> {
        Ok(self.token(token)?.symbol.clone())
    }

    fn mint(&mut self, token: Address, to: Address, amount: U256) -> LedgerResult<()> {
        self.token_mut(token)?.mint(to, amount)
    }

    fn burn(&mut self, token: Address, from: Address, amount: U256) -> LedgerResult<()> {
        self.token_mut(token)?.burn(from, amount)
    }

    fn balance_of(&self, token: Address, owner: Address) -> LedgerResult<U256> {
        Ok(self.token(token)?.balance_of(owner))
    }

    fn approve(
        &mut self,
        token: Address,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> LedgerResult<()> {
        self.token_mut(token)?.approve(owner, spender, amount);
        Ok(())
    }

    fn allowance(&self, token: Address, owner: Address, spender: Address) -> LedgerResult<U256> {
        Ok(self.token(token)?.allowance(owner, spender))
    }

    fn position_manager(&self) -> Address {
        self.position_manager
    }

    fn router(&self) -> Address {
        self.router
    }

    fn create_pool(
        &mut self,
        token0: Address,
        token1: Address,
        fee: u32,
        sqrt_price_x96: U256,
        caller: Address,
    ) -> LedgerResult<Address> {
        self.token(token0)?;
        self.token(token1)?;
        if token0 >= token1 {
            return Err(LedgerError::UnsortedTokens);
        }
        let tick_spacing = spacing_for_fee(fee)?;
        if let Some(existing) = self.pool_keys.get(&(token0, token1, fee)) {
            return Err(LedgerError::PoolExists(*existing));
        }

        let address = self.next_address();
        let pool = CorePool::new(address, token0, token1, fee, tick_spacing, sqrt_price_x96)?;
        info!(
            pool = ?address,
            deployer = ?caller,
            fee,
            tick = pool.tick,
            "created pool"
        );
        self.pool_keys.insert((token0, token1, fee), address);
        self.pools.insert(address, pool);
        Ok(address)
    }

    fn pool_state(&self, pool: Address) -> LedgerResult<PoolSlot> {
        Ok(self.pool(pool)?.slot())
    }

    fn open_position(&mut self, params: OpenPosition, caller: Address) -> LedgerResult<MintOutcome> {
        let pool = self
            .pool_for(params.token0, params.token1, params.fee)?
            .clone();
        let (pool, change) = self.add_liquidity(
            pool,
            params.tick_lower,
            params.tick_upper,
            params.amount0_desired,
            params.amount1_desired,
        )?;
        self.pull_pair(&pool, caller, self.position_manager, change.amount0, change.amount1)?;

        let mut position = ManagedPosition {
            owner: params.recipient,
            pool: pool.address,
            tick_lower: params.tick_lower,
            tick_upper: params.tick_upper,
            liquidity: 0,
            fee_growth_inside0_last_x128: U256::zero(),
            fee_growth_inside1_last_x128: U256::zero(),
            tokens_owed0: U256::zero(),
            tokens_owed1: U256::zero(),
        };
        position.accrue_fees(&pool, self.position_manager)?;
        position.liquidity = change.liquidity;

        let id = self.next_position_id;
        self.next_position_id += 1;
        debug!(
            id,
            owner = ?params.recipient,
            tick_lower = params.tick_lower,
            tick_upper = params.tick_upper,
            liquidity = change.liquidity,
            "opened position"
        );
        self.positions.insert(id, position);
        self.pools.insert(pool.address, pool);

        Ok(MintOutcome {
            id,
            liquidity: change.liquidity,
            amount0: change.amount0,
            amount1: change.amount1,
        })
    }

    fn increase_position(
        &mut self,
        id: PositionId,
        amount0_desired: U256,
        amount1_desired: U256,
        caller: Address,
    ) -> LedgerResult<LiquidityChange> {
        let mut position = self.managed(id)?.clone();
        position.ensure_owner(id, caller)?;
        let pool = self.pool(position.pool)?.clone();

        let (pool, change) = self.add_liquidity(
            pool,
            position.tick_lower,
            position.tick_upper,
            amount0_desired,
            amount1_desired,
        )?;
        self.pull_pair(&pool, caller, self.position_manager, change.amount0, change.amount1)?;

        position.accrue_fees(&pool, self.position_manager)?;
        position.liquidity = position
            .liquidity
            .checked_add(change.liquidity)
            .ok_or(DomainError::Overflow)?;
        debug!(id, added = change.liquidity, total = position.liquidity, "increased position");

        self.positions.insert(id, position);
        self.pools.insert(pool.address, pool);
        Ok(change)
    }

    fn decrease_position(
        &mut self,
        id: PositionId,
        liquidity: u128,
        caller: Address,
    ) -> LedgerResult<(U256, U256)> {
        let mut position = self.managed(id)?.clone();
        position.ensure_owner(id, caller)?;
        if liquidity == 0 {
            return Err(LedgerError::ZeroLiquidity);
        }
        if liquidity > position.liquidity {
            return Err(DomainError::LiquidityUnderflow.into());
        }

        let mut pool = self.pool(position.pool)?.clone();
        let delta = i128::try_from(liquidity).map_err(|_| DomainError::Overflow)?;
        let (amount0, amount1) = pool.modify_position(
            self.position_manager,
            position.tick_lower,
            position.tick_upper,
            -delta,
        )?;

        position.accrue_fees(&pool, self.position_manager)?;
        position.tokens_owed0 = position.tokens_owed0.overflowing_add(amount0).0;
        position.tokens_owed1 = position.tokens_owed1.overflowing_add(amount1).0;
        position.liquidity -= liquidity;
        debug!(id, removed = liquidity, remaining = position.liquidity, "decreased position");

        self.positions.insert(id, position);
        self.pools.insert(pool.address, pool);
        Ok((amount0, amount1))
    }

    fn collect_owed(
        &mut self,
        id: PositionId,
        recipient: Address,
        caller: Address,
    ) -> LedgerResult<(U256, U256)> {
        let mut position = self.managed(id)?.clone();
        position.ensure_owner(id, caller)?;
        let mut pool = self.pool(position.pool)?.clone();

        if position.liquidity > 0 {
            pool.poke(self.position_manager, position.tick_lower, position.tick_upper)?;
            position.accrue_fees(&pool, self.position_manager)?;
        }
        let (amount0, amount1) = pool.collect(
            self.position_manager,
            position.tick_lower,
            position.tick_upper,
            position.tokens_owed0,
            position.tokens_owed1,
        );

        self.token(pool.token0)?.ensure_balance(pool.address, amount0)?;
        self.token(pool.token1)?.ensure_balance(pool.address, amount1)?;
        self.token_mut(pool.token0)?
            .transfer(pool.address, recipient, amount0)?;
        self.token_mut(pool.token1)?
            .transfer(pool.address, recipient, amount1)?;

        position.tokens_owed0 -= amount0;
        position.tokens_owed1 -= amount1;
        debug!(id, recipient = ?recipient, %amount0, %amount1, "collected");

        self.positions.insert(id, position);
        self.pools.insert(pool.address, pool);
        Ok((amount0, amount1))
    }

    fn position_state(&self, id: PositionId) -> LedgerResult<PositionState> {
        let position = self.managed(id)?;
        Ok(position.state(self.pool(position.pool)?))
    }

    fn swap_exact_in(&mut self, request: SwapRequest, caller: Address) -> LedgerResult<U256> {
        if request.token_in == request.token_out {
            return Err(LedgerError::UnsortedTokens);
        }
        let zero_for_one = request.token_in < request.token_out;
        let (token0, token1) = if zero_for_one {
            (request.token_in, request.token_out)
        } else {
            (request.token_out, request.token_in)
        };
        let mut pool = self.pool_for(token0, token1, request.fee)?.clone();
        let result = pool.swap(zero_for_one, request.amount_in)?;

        self.token(request.token_in)?
            .ensure_spendable(caller, self.router, result.amount_in)?;
        self.token(request.token_out)?
            .ensure_balance(pool.address, result.amount_out)?;
        let router = self.router;
        self.token_mut(request.token_in)?
            .transfer_from(router, caller, pool.address, result.amount_in)?;
        self.token_mut(request.token_out)?
            .transfer(pool.address, request.recipient, result.amount_out)?;

        debug!(
            pool = ?pool.address,
            zero_for_one,
            amount_in = %result.amount_in,
            amount_out = %result.amount_out,
            tick = pool.tick,
            "swapped"
        );
        self.pools.insert(pool.address, pool);
        Ok(result.amount_out)
    }
}
