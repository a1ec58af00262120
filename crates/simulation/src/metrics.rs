//! Per-step observations of a pool.

use primitive_types::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use unisim_domain::error::DomainResult;
use unisim_domain::value_objects::Amount;

/// What a pool looked like at the end of one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: u64,
    pub tick: i32,
    /// Price of token0 in units of token1.
    pub price0: f64,
    /// Price of token1 in units of token0.
    pub price1: f64,
    /// Token0 swapped during the step, in or out.
    pub volume0: Decimal,
    pub volume1: Decimal,
    pub reserve0: Decimal,
    pub reserve1: Decimal,
}

/// Accumulates swap volume within a step and appends one record per step.
#[derive(Debug, Clone)]
pub struct MetricsCollector {
    symbol0: String,
    symbol1: String,
    current_volume0: U256,
    current_volume1: U256,
    records: Vec<StepRecord>,
}

impl MetricsCollector {
    /// Empty collector for a pool trading `symbol0`/`symbol1`.
    pub fn new(symbol0: impl Into<String>, symbol1: impl Into<String>) -> Self {
        Self {
            symbol0: symbol0.into(),
            symbol1: symbol1.into(),
            current_volume0: U256::zero(),
            current_volume1: U256::zero(),
            records: Vec::new(),
        }
    }

    #[must_use]
    pub fn symbols(&self) -> (&str, &str) {
        (&self.symbol0, &self.symbol1)
    }

    /// Adds raw swap amounts to the running step volume.
    pub fn add_volume(&mut self, amount0: U256, amount1: U256) {
        self.current_volume0 = self.current_volume0.saturating_add(amount0);
        self.current_volume1 = self.current_volume1.saturating_add(amount1);
    }

    /// Running volume of the step in progress, raw.
    #[must_use]
    pub fn pending_volume(&self) -> (U256, U256) {
        (self.current_volume0, self.current_volume1)
    }

    /// Closes the step: appends a record and clears the running volume.
    pub fn record(
        &mut self,
        step: u64,
        tick: i32,
        prices: (f64, f64),
        reserves: (Decimal, Decimal),
    ) -> DomainResult<&StepRecord> {
        let volume0 = Amount::from_raw(self.current_volume0).to_decimal()?;
        let volume1 = Amount::from_raw(self.current_volume1).to_decimal()?;
        self.current_volume0 = U256::zero();
        self.current_volume1 = U256::zero();

        let index = self.records.len();
        self.records.push(StepRecord {
            step,
            tick,
            price0: prices.0,
            price1: prices.1,
            volume0,
            volume1,
            reserve0: reserves.0,
            reserve1: reserves.1,
        });
        Ok(&self.records[index])
    }

    #[must_use]
    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    #[must_use]
    pub fn last(&self) -> Option<&StepRecord> {
        self.records.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_record_drains_step_volume() {
        let mut metrics = MetricsCollector::new("DIA", "USDC");
        let ether = U256::exp10(18);
        metrics.add_volume(ether * 5, U256::zero());
        metrics.add_volume(U256::zero(), ether * 3);

        let record = metrics
            .record(1, -10, (1.0, 1.0), (dec!(900), dec!(905)))
            .unwrap()
            .clone();
        assert_eq!(record.volume0, dec!(5));
        assert_eq!(record.volume1, dec!(3));
        assert_eq!(metrics.pending_volume(), (U256::zero(), U256::zero()));

        let next = metrics
            .record(2, -10, (1.0, 1.0), (dec!(900), dec!(905)))
            .unwrap();
        assert!(next.volume0.is_zero());
        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics.symbols(), ("DIA", "USDC"));
    }

    #[test]
    fn test_step_record_serializes() {
        let record = StepRecord {
            step: 3,
            tick: 12,
            price0: 0.99,
            price1: 1.25,
            volume0: dec!(0),
            volume1: dec!(7),
            reserve0: dec!(100),
            reserve1: dec!(200),
        };
        let json = serde_json::to_string(&record).unwrap();
        let back: StepRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
