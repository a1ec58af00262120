use crate::config::AgentParams;
use crate::error::{SimulationError, SimulationResult};
use crate::pool::Pool;
use rand::Rng;
use rand::seq::IndexedRandom;
use rand_distr::{Distribution, Uniform};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};
use unisim_domain::position::PositionId;
use unisim_ledger::{Address, Ledger};

/// Liquidity provider holding one position, which it randomly tops up or
/// partially withdraws.
#[derive(Debug, Clone)]
pub struct LiquidityProvider {
    position: PositionId,
    band: (Decimal, Decimal),
    top_up: Uniform<u32>,
    withdraw_pct: Uniform<u32>,
}

impl LiquidityProvider {
    /// Picks a price band and deposits `lp_deposit` of each token into it.
    /// The agent must already hold the deposit.
    pub fn open<R: Rng + ?Sized>(
        pool: &mut Pool,
        ledger: &mut impl Ledger,
        rng: &mut R,
        params: &AgentParams,
        address: Address,
    ) -> SimulationResult<Self> {
        let top_up = Uniform::new(params.lp_top_up.0, params.lp_top_up.1)
            .map_err(|e| SimulationError::InvalidConfig(format!("lp top-up: {e}")))?;
        let withdraw_pct = Uniform::new(params.lp_withdraw_pct.0, params.lp_withdraw_pct.1)
            .map_err(|e| SimulationError::InvalidConfig(format!("lp withdrawal: {e}")))?;
        if params.lp_withdraw_pct.1 > 101 {
            return Err(SimulationError::InvalidConfig(
                "lp withdrawal above 100%".to_string(),
            ));
        }
        let band = *params
            .lp_bands
            .choose(rng)
            .ok_or_else(|| SimulationError::InvalidConfig("no lp price bands".to_string()))?;

        let deposit = params.lp_deposit;
        let (amount0, amount1, position) =
            pool.mint_position(ledger, deposit, deposit, band.0, band.1, address)?;
        info!(
            lp = ?address,
            position,
            low = %band.0,
            high = %band.1,
            %amount0,
            %amount1,
            "liquidity provider opened position"
        );
        Ok(Self {
            position,
            band,
            top_up,
            withdraw_pct,
        })
    }

    #[must_use]
    pub fn position(&self) -> PositionId {
        self.position
    }

    #[must_use]
    pub fn band(&self) -> (Decimal, Decimal) {
        self.band
    }

    pub(super) fn act<R: Rng + ?Sized>(
        &self,
        pool: &mut Pool,
        ledger: &mut impl Ledger,
        rng: &mut R,
        address: Address,
    ) -> SimulationResult<()> {
        match rng.random_range(0..3u8) {
            0 => Ok(()),
            1 => self.add(pool, ledger, rng, address),
            _ => self.withdraw(pool, ledger, rng, address),
        }
    }

    fn add<R: Rng + ?Sized>(
        &self,
        pool: &mut Pool,
        ledger: &mut impl Ledger,
        rng: &mut R,
        address: Address,
    ) -> SimulationResult<()> {
        let amount = Decimal::from(self.top_up.sample(rng));
        let (bal0, bal1) = pool.pair_balance(ledger, address)?;
        if amount > bal0 || amount > bal1 {
            debug!(lp = ?address, %amount, "top-up skipped, balance too low");
            return Ok(());
        }
        let (added, _, _) = pool.increase_liquidity(ledger, self.position, amount, amount, address)?;
        debug!(lp = ?address, position = self.position, added, "topped up");
        Ok(())
    }

    fn withdraw<R: Rng + ?Sized>(
        &self,
        pool: &mut Pool,
        ledger: &mut impl Ledger,
        rng: &mut R,
        address: Address,
    ) -> SimulationResult<()> {
        let (_, _, _, liquidity) = pool.get_position(ledger, self.position)?;
        if liquidity == 0 {
            warn!(lp = ?address, position = self.position, "withdrawal skipped, position empty");
            return Ok(());
        }
        let fraction = Decimal::new(i64::from(self.withdraw_pct.sample(rng)), 2);
        pool.remove_liquidity(ledger, self.position, fraction, address)?;
        Ok(())
    }
}
