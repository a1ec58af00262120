//! Simulation configuration.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Seed used when none is configured.
pub const DEFAULT_SEED: u64 = 1234;

/// Tuning constants shared by every agent of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentParams {
    /// Tokens of each side minted to a trader or LP at creation.
    pub initial_funding: Decimal,
    /// Chance that a zero-intelligence trader swaps on a given step.
    pub trade_probability: f64,
    /// Half-open range of whole-token swap sizes.
    pub swap_size: (u32, u32),
    /// Tokens of each side deposited into an LP's first position.
    pub lp_deposit: Decimal,
    /// Price bands an LP picks its position from.
    pub lp_bands: Vec<(Decimal, Decimal)>,
    /// Half-open range of whole-token top-up sizes.
    pub lp_top_up: (u32, u32),
    /// Half-open range of withdrawn percentages.
    pub lp_withdraw_pct: (u32, u32),
    /// Token0 sold by a whale at each activation step.
    pub whale_swap: Decimal,
    /// Steps, counted from 1, on which whales sell.
    pub whale_steps: Vec<u64>,
}

impl Default for AgentParams {
    fn default() -> Self {
        Self {
            initial_funding: dec!(10000),
            trade_probability: 0.8,
            swap_size: (5, 100),
            lp_deposit: dec!(1000),
            lp_bands: vec![
                (dec!(0.98), dec!(1.0)),
                (dec!(0.985), dec!(1.01)),
                (dec!(0.99), dec!(1.03)),
            ],
            lp_top_up: (500, 1000),
            lp_withdraw_pct: (5, 20),
            whale_swap: dec!(1000000),
            whale_steps: vec![50, 51, 52, 53],
        }
    }
}

impl AgentParams {
    /// Last step at which a whale trades.
    #[must_use]
    pub fn last_whale_step(&self) -> u64 {
        self.whale_steps.iter().copied().max().unwrap_or(0)
    }
}

/// Size and shape of a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of zero-intelligence traders.
    pub agents: usize,
    /// Steps to run.
    pub steps: u64,
    /// Seed of the run's single random source.
    pub seed: u64,
    /// Number of whales.
    pub whales: usize,
    /// Inert `burn-it` placeholders.
    pub burn_it: usize,
    /// Inert `fomo` placeholders.
    pub fomo: usize,
    /// Fee of the simulated pool, in pips.
    pub fee: u32,
    /// LPs created per trader, rounded half to even.
    pub lp_ratio: Decimal,
    pub params: AgentParams,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::new(100, 50)
    }
}

impl SimulationConfig {
    /// Creates a configuration with default seed, fee and agent tuning.
    #[must_use]
    pub fn new(agents: usize, steps: u64) -> Self {
        Self {
            agents,
            steps,
            seed: DEFAULT_SEED,
            whales: 0,
            burn_it: 0,
            fomo: 0,
            fee: 500,
            lp_ratio: dec!(0.1),
            params: AgentParams::default(),
        }
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_whales(mut self, whales: usize) -> Self {
        self.whales = whales;
        self
    }

    /// Adds agents that never act.
    #[must_use]
    pub fn with_inert(mut self, burn_it: usize, fomo: usize) -> Self {
        self.burn_it = burn_it;
        self.fomo = fomo;
        self
    }

    #[must_use]
    pub fn with_fee(mut self, fee: u32) -> Self {
        self.fee = fee;
        self
    }

    #[must_use]
    pub fn with_lp_ratio(mut self, ratio: Decimal) -> Self {
        self.lp_ratio = ratio;
        self
    }

    #[must_use]
    pub fn with_params(mut self, params: AgentParams) -> Self {
        self.params = params;
        self
    }

    /// Number of liquidity providers for this run.
    #[must_use]
    pub fn liquidity_providers(&self) -> usize {
        (Decimal::from(self.agents) * self.lp_ratio)
            .round()
            .to_usize()
            .unwrap_or(0)
    }
}
