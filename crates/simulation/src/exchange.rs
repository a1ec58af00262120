//! A set of named pools sharing one ledger.

use crate::error::{SimulationError, SimulationResult};
use crate::pool::Pool;
use std::collections::BTreeMap;
use tracing::info;
use unisim_domain::token::Token;
use unisim_ledger::{Address, Ledger};

/// Pools keyed by name, kept in creation order.
#[derive(Debug, Clone, Default)]
pub struct Exchange {
    pools: Vec<Pool>,
    by_name: BTreeMap<String, usize>,
}

impl Exchange {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deploys a pool for `token_a`/`token_b` and registers it. Fails before
    /// touching the ledger when a pool with the same name exists.
    pub fn add_pool(
        &mut self,
        ledger: &mut impl Ledger,
        token_a: &Token,
        token_b: &Token,
        fee: u32,
        deployer: Address,
    ) -> SimulationResult<&mut Pool> {
        let name = Pool::name_for(token_a, token_b, fee);
        if self.by_name.contains_key(&name) {
            return Err(SimulationError::DuplicatePool(name));
        }
        let pool = Pool::new(ledger, token_a, token_b, fee, deployer)?;
        self.insert(pool)
    }

    /// Registers an already deployed pool.
    pub fn insert(&mut self, pool: Pool) -> SimulationResult<&mut Pool> {
        if self.by_name.contains_key(pool.name()) {
            return Err(SimulationError::DuplicatePool(pool.name().to_string()));
        }
        let index = self.pools.len();
        info!(pool = pool.name(), index, "pool listed");
        self.by_name.insert(pool.name().to_string(), index);
        self.pools.push(pool);
        Ok(&mut self.pools[index])
    }

    /// Pool names in creation order.
    #[must_use]
    pub fn list(&self) -> Vec<&str> {
        self.pools.iter().map(Pool::name).collect()
    }

    #[must_use]
    pub fn total_number_pools(&self) -> usize {
        self.pools.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pools.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    /// Looks a pool up by name; `UnknownPool` when absent.
    pub fn get(&self, name: &str) -> SimulationResult<&Pool> {
        self.by_name
            .get(name)
            .map(|&i| &self.pools[i])
            .ok_or_else(|| SimulationError::UnknownPool(name.to_string()))
    }

    pub fn get_mut(&mut self, name: &str) -> SimulationResult<&mut Pool> {
        match self.by_name.get(name) {
            Some(&i) => Ok(&mut self.pools[i]),
            None => Err(SimulationError::UnknownPool(name.to_string())),
        }
    }

    /// Pools in creation order.
    pub fn pools(&self) -> impl Iterator<Item = &Pool> {
        self.pools.iter()
    }

    /// Samples every pool for `step`.
    pub fn collect_data(&mut self, ledger: &impl Ledger, step: u64) -> SimulationResult<()> {
        for pool in &mut self.pools {
            pool.collect_data(ledger, step)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use unisim_ledger::InMemoryLedger;

    #[test]
    fn test_add_and_list_pools() {
        let mut ledger = InMemoryLedger::new();
        let deployer = ledger.create_account();
        let mut exchange = Exchange::new();
        let dia = Token::new("DIA", dec!(1));
        let usdc = Token::new("USDC", dec!(1));
        let weth = Token::new("WETH", dec!(1));

        exchange.add_pool(&mut ledger, &dia, &usdc, 500, deployer).unwrap();
        exchange.add_pool(&mut ledger, &usdc, &weth, 3000, deployer).unwrap();

        assert_eq!(exchange.list(), vec!["DIA_USDC_500", "USDC_WETH_3000"]);
        assert_eq!(exchange.total_number_pools(), 2);
        assert_eq!(exchange.get("USDC_WETH_3000").unwrap().tick_spacing(), 60);
        assert_eq!(
            exchange.get("WETH_DIA_500").unwrap_err(),
            SimulationError::UnknownPool("WETH_DIA_500".to_string())
        );
    }

    #[test]
    fn test_duplicate_pool_rejected() {
        let mut ledger = InMemoryLedger::new();
        let deployer = ledger.create_account();
        let mut exchange = Exchange::new();
        let dia = Token::new("DIA", dec!(1));
        let usdc = Token::new("USDC", dec!(1));

        exchange.add_pool(&mut ledger, &dia, &usdc, 500, deployer).unwrap();
        let snapshot = ledger.clone();
        let err = exchange
            .add_pool(&mut ledger, &dia, &usdc, 500, deployer)
            .unwrap_err();
        assert_eq!(err, SimulationError::DuplicatePool("DIA_USDC_500".to_string()));
        assert_eq!(exchange.len(), 1);
        // no tokens were deployed for the rejected pool
        assert_eq!(ledger.position_count(), snapshot.position_count());
        assert_eq!(ledger.create_account(), snapshot.clone().create_account());
    }

    #[test]
    fn test_collect_data_samples_every_pool() {
        let mut ledger = InMemoryLedger::new();
        let deployer = ledger.create_account();
        let mut exchange = Exchange::new();
        let usdc = Token::new("USDC", dec!(1));
        for symbol in ["DIA", "DAI"] {
            exchange
                .add_pool(&mut ledger, &Token::new(symbol, dec!(1)), &usdc, 500, deployer)
                .unwrap();
        }
        exchange.collect_data(&ledger, 1).unwrap();
        exchange.collect_data(&ledger, 2).unwrap();
        for pool in exchange.pools() {
            assert_eq!(pool.records().len(), 2);
            assert_eq!(pool.records()[1].step, 2);
        }
    }
}
