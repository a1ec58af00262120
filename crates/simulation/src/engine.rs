//! Step-based simulation driver.
//!
//! The engine owns the ledger, the exchange, every agent and a single seeded
//! random source. Randomness is consumed in a fixed order: LP band choices
//! while the scenario is built, then per step a shuffle of the agents
//! followed by each agent's own draws in shuffled order.

use crate::agents::{Agent, AgentKind, Behaviour, LiquidityProvider, Whale, ZiTrader};
use crate::config::SimulationConfig;
use crate::error::SimulationResult;
use crate::exchange::Exchange;
use crate::metrics::StepRecord;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};
use unisim_domain::token::Token;
use unisim_ledger::Ledger;

/// Observations of one pool, in step order.
#[derive(Debug, Clone, Serialize)]
pub struct PoolReport<'a> {
    /// Pool name.
    pub pool: &'a str,
    /// One record per completed step.
    pub records: &'a [StepRecord],
}

/// Drives agents against an exchange, one step at a time.
pub struct SimulationEngine<L: Ledger> {
    config: SimulationConfig,
    ledger: L,
    exchange: Exchange,
    agents: Vec<Agent>,
    rng: StdRng,
    step: u64,
}

impl<L: Ledger> SimulationEngine<L> {
    /// Creates an engine with no pools and no agents.
    pub fn new(ledger: L, config: SimulationConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            config,
            ledger,
            exchange: Exchange::new(),
            agents: Vec::new(),
            rng,
            step: 0,
        }
    }

    /// Builds the stablecoin scenario: one `DIA/USDC` pool at par, liquidity
    /// providers first, then zero-intelligence traders, whales and the inert
    /// placeholders.
    pub fn stablecoin(ledger: L, config: SimulationConfig) -> SimulationResult<Self> {
        let mut engine = Self::new(ledger, config);
        let whale = if engine.config.whales > 0 {
            Some(Whale::new(&engine.config.params, engine.config.steps)?)
        } else {
            None
        };

        let deployer = engine.ledger.create_account();
        let name = engine
            .exchange
            .add_pool(
                &mut engine.ledger,
                &Token::new("DIA", Decimal::ONE),
                &Token::new("USDC", Decimal::ONE),
                engine.config.fee,
                deployer,
            )?
            .name()
            .to_string();

        let funding = engine.config.params.initial_funding;
        for _ in 0..engine.config.liquidity_providers() {
            let address = engine.ledger.create_account();
            let pool = engine.exchange.get_mut(&name)?;
            pool.mint_tokens(&mut engine.ledger, funding, funding, address)?;
            let lp = LiquidityProvider::open(
                pool,
                &mut engine.ledger,
                &mut engine.rng,
                &engine.config.params,
                address,
            )?;
            engine
                .agents
                .push(Agent::new(address, name.as_str(), Behaviour::LiquidityProvider(lp)));
        }

        for _ in 0..engine.config.agents {
            let address = engine.ledger.create_account();
            engine
                .exchange
                .get(&name)?
                .mint_tokens(&mut engine.ledger, funding, funding, address)?;
            let trader = ZiTrader::new(&engine.config.params)?;
            engine
                .agents
                .push(Agent::new(address, name.as_str(), Behaviour::ZiTrader(trader)));
        }

        if let Some(whale) = whale {
            for _ in 0..engine.config.whales {
                let address = engine.ledger.create_account();
                engine.exchange.get(&name)?.mint_tokens(
                    &mut engine.ledger,
                    whale.funding(),
                    Decimal::ZERO,
                    address,
                )?;
                engine
                    .agents
                    .push(Agent::new(address, name.as_str(), Behaviour::Whale(whale.clone())));
            }
        }

        for behaviour in std::iter::repeat_n(Behaviour::BurnIt, engine.config.burn_it)
            .chain(std::iter::repeat_n(Behaviour::Fomo, engine.config.fomo))
        {
            let address = engine.ledger.create_account();
            engine.agents.push(Agent::new(address, name.as_str(), behaviour));
        }

        info!(
            pool = %name,
            agents = engine.agents.len(),
            seed = engine.config.seed,
            "stablecoin scenario ready"
        );
        Ok(engine)
    }

    /// Adds an agent after construction; it acts from the next step on.
    pub fn add_agent(&mut self, agent: Agent) {
        self.agents.push(agent);
    }

    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    #[must_use]
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    #[must_use]
    pub fn exchange(&self) -> &Exchange {
        &self.exchange
    }

    /// Exchange and ledger together, for setting up pools by hand.
    pub fn markets_mut(&mut self) -> (&mut Exchange, &mut L) {
        (&mut self.exchange, &mut self.ledger)
    }

    #[must_use]
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Number of agents of each kind.
    #[must_use]
    pub fn agent_counts(&self) -> BTreeMap<AgentKind, usize> {
        let mut counts = BTreeMap::new();
        for agent in &self.agents {
            *counts.entry(agent.kind()).or_insert(0) += 1;
        }
        counts
    }

    /// Last completed step; 0 before the first.
    #[must_use]
    pub fn current_step(&self) -> u64 {
        self.step
    }

    /// Runs one step: every agent acts once in shuffled order, then each
    /// pool is sampled.
    pub fn step(&mut self) -> SimulationResult<()> {
        let step = self.step + 1;
        self.agents.shuffle(&mut self.rng);
        for agent in &mut self.agents {
            let pool = self.exchange.get_mut(agent.pool())?;
            agent.act(pool, &mut self.ledger, &mut self.rng, step)?;
        }
        self.exchange.collect_data(&self.ledger, step)?;
        self.step = step;
        debug!(step, "step complete");
        Ok(())
    }

    /// Runs the remaining configured steps.
    pub fn run(&mut self) -> SimulationResult<()> {
        info!(
            steps = self.config.steps,
            agents = self.agents.len(),
            pools = self.exchange.len(),
            "simulation started"
        );
        while self.step < self.config.steps {
            self.step()?;
        }
        info!(steps = self.step, "simulation finished");
        Ok(())
    }

    /// Every pool's records, in pool creation order.
    #[must_use]
    pub fn results(&self) -> Vec<PoolReport<'_>> {
        self.exchange
            .pools()
            .map(|pool| PoolReport {
                pool: pool.name(),
                records: pool.records(),
            })
            .collect()
    }
}
