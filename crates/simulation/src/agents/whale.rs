use crate::config::AgentParams;
use crate::error::{SimulationError, SimulationResult};
use crate::pool::Pool;
use rust_decimal::Decimal;
use tracing::info;
use unisim_ledger::{Address, Ledger};

/// Sells a large fixed amount of token0 at a few predetermined steps.
#[derive(Debug, Clone)]
pub struct Whale {
    amount: Decimal,
    steps: Vec<u64>,
}

impl Whale {
    /// Fails when the run ends before the whale's last activation.
    pub fn new(params: &AgentParams, total_steps: u64) -> SimulationResult<Self> {
        let required = params.last_whale_step();
        if total_steps < required {
            return Err(SimulationError::InsufficientSteps {
                required,
                configured: total_steps,
            });
        }
        Ok(Self {
            amount: params.whale_swap,
            steps: params.whale_steps.clone(),
        })
    }

    /// Token0 needed to cover every activation.
    #[must_use]
    pub fn funding(&self) -> Decimal {
        self.amount * Decimal::from(self.steps.len())
    }

    pub(super) fn act(
        &self,
        pool: &mut Pool,
        ledger: &mut impl Ledger,
        step: u64,
        address: Address,
    ) -> SimulationResult<()> {
        if !self.steps.contains(&step) {
            return Ok(());
        }
        let (amount_in, amount_out) = pool.swap_0_for_1(ledger, self.amount, address)?;
        info!(
            whale = ?address,
            step,
            %amount_in,
            %amount_out,
            tick = pool.current_tick(),
            "whale sold"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::fixtures::stable_pool;

    #[test]
    fn test_requires_enough_steps() {
        let params = AgentParams::default();
        assert_eq!(
            Whale::new(&params, 52).unwrap_err(),
            SimulationError::InsufficientSteps {
                required: 53,
                configured: 52
            }
        );
        assert!(Whale::new(&params, 53).is_ok());
    }

    #[test]
    fn test_sells_only_on_activation_steps() {
        let (mut ledger, mut pool) = stable_pool();
        let whale = Whale::new(&AgentParams::default(), 60).unwrap();
        assert_eq!(whale.funding(), Decimal::from(4_000_000));
        let address = ledger.create_account();
        pool.mint_tokens(&mut ledger, whale.funding(), Decimal::ZERO, address)
            .unwrap();

        for step in 1..50 {
            whale.act(&mut pool, &mut ledger, step, address).unwrap();
        }
        assert_eq!(pool.current_tick(), 0);

        for step in 50..=53 {
            whale.act(&mut pool, &mut ledger, step, address).unwrap();
        }
        let (bal0, bal1) = pool.pair_balance(&ledger, address).unwrap();
        assert!(bal0 < whale.funding());
        assert!(bal1 > Decimal::ZERO);
        assert!(pool.current_tick() < -200);
        pool.collect_data(&ledger, 53).unwrap();
    }
}
