use crate::config::AgentParams;
use crate::error::{SimulationError, SimulationResult};
use crate::pool::Pool;
use rand::Rng;
use rand_distr::{Bernoulli, Distribution, Uniform};
use rust_decimal::Decimal;
use tracing::debug;
use unisim_ledger::{Address, Ledger};

/// Zero-intelligence trader: on a coin flip weighted by the trade
/// probability, swaps a uniformly drawn whole amount in a random direction.
#[derive(Debug, Clone)]
pub struct ZiTrader {
    trade: Bernoulli,
    size: Uniform<u32>,
    swaps: u64,
}

impl ZiTrader {
    pub fn new(params: &AgentParams) -> SimulationResult<Self> {
        let trade = Bernoulli::new(params.trade_probability)
            .map_err(|e| SimulationError::InvalidConfig(format!("trade probability: {e}")))?;
        let (low, high) = params.swap_size;
        let size = Uniform::new(low, high)
            .map_err(|e| SimulationError::InvalidConfig(format!("swap size: {e}")))?;
        Ok(Self {
            trade,
            size,
            swaps: 0,
        })
    }

    /// Swaps made so far.
    #[must_use]
    pub fn swaps(&self) -> u64 {
        self.swaps
    }

    pub(super) fn act<R: Rng + ?Sized>(
        &mut self,
        pool: &mut Pool,
        ledger: &mut impl Ledger,
        rng: &mut R,
        address: Address,
    ) -> SimulationResult<()> {
        if !self.trade.sample(rng) {
            return Ok(());
        }
        let buy_token0 = rng.random::<bool>();
        let amount = Decimal::from(self.size.sample(rng));

        let (amount_in, amount_out) = if buy_token0 {
            pool.swap_1_for_0(ledger, amount, address)?
        } else {
            pool.swap_0_for_1(ledger, amount, address)?
        };
        self.swaps += 1;
        debug!(trader = ?address, buy_token0, %amount_in, %amount_out, "zi trade");
        Ok(())
    }
}
