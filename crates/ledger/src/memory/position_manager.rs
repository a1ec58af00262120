use crate::error::{LedgerError, LedgerResult};
use crate::memory::core_pool::CorePool;
use crate::{Address, PositionState};
use primitive_types::U256;
use unisim_domain::math::full_math::{mul_div, q128};
use unisim_domain::position::PositionId;

/// A position held by the position manager on behalf of `owner`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ManagedPosition {
    pub owner: Address,
    pub pool: Address,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub liquidity: u128,
    pub fee_growth_inside0_last_x128: U256,
    pub fee_growth_inside1_last_x128: U256,
    pub tokens_owed0: U256,
    pub tokens_owed1: U256,
}

impl ManagedPosition {
    pub fn ensure_owner(&self, id: PositionId, caller: Address) -> LedgerResult<()> {
        if self.owner != caller {
            return Err(LedgerError::NotOwner { id, caller });
        }
        Ok(())
    }

    /// Moves fees earned since the last update into the owed balances,
    /// reading the fee growth the pool recorded for the manager's range.
    pub fn accrue_fees(&mut self, pool: &CorePool, manager: Address) -> LedgerResult<()> {
        let Some(range) = pool.position(manager, self.tick_lower, self.tick_upper) else {
            return Ok(());
        };
        let inside0 = range.fee_growth_inside0_last_x128;
        let inside1 = range.fee_growth_inside1_last_x128;
        let liquidity = U256::from(self.liquidity);

        let earned0 = mul_div(
            inside0.overflowing_sub(self.fee_growth_inside0_last_x128).0,
            liquidity,
            q128(),
        )?;
        let earned1 = mul_div(
            inside1.overflowing_sub(self.fee_growth_inside1_last_x128).0,
            liquidity,
            q128(),
        )?;
        self.tokens_owed0 = self.tokens_owed0.overflowing_add(earned0).0;
        self.tokens_owed1 = self.tokens_owed1.overflowing_add(earned1).0;
        self.fee_growth_inside0_last_x128 = inside0;
        self.fee_growth_inside1_last_x128 = inside1;
        Ok(())
    }

    pub fn state(&self, pool: &CorePool) -> PositionState {
        PositionState {
            owner: self.owner,
            token0: pool.token0,
            token1: pool.token1,
            fee: pool.fee,
            tick_lower: self.tick_lower,
            tick_upper: self.tick_upper,
            liquidity: self.liquidity,
            tokens_owed0: self.tokens_owed0,
            tokens_owed1: self.tokens_owed1,
        }
    }
}
