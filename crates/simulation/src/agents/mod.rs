//! Agents acting on a pool once per step.
//!
//! Every agent owns an address on the ledger and trades against a single
//! named pool. Behaviour is a closed set of variants; the engine drives each
//! agent through [`Agent::act`] with the run's shared random source.

mod liquidity_provider;
mod whale;
mod zi_trader;

pub use liquidity_provider::LiquidityProvider;
pub use whale::Whale;
pub use zi_trader::ZiTrader;

use crate::error::SimulationResult;
use crate::pool::Pool;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use unisim_ledger::{Address, Ledger};

/// Agent variant, without its state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgentKind {
    ZiTrader,
    LiquidityProvider,
    Whale,
    BurnIt,
    Fomo,
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AgentKind::ZiTrader => "zi-trader",
            AgentKind::LiquidityProvider => "liquidity-provider",
            AgentKind::Whale => "whale",
            AgentKind::BurnIt => "burn-it",
            AgentKind::Fomo => "fomo",
        };
        f.write_str(name)
    }
}

/// What an agent does each step, with the state it carries between steps.
#[derive(Debug, Clone)]
pub enum Behaviour {
    ZiTrader(ZiTrader),
    LiquidityProvider(LiquidityProvider),
    Whale(Whale),
    /// Placeholder that never acts.
    BurnIt,
    /// Placeholder that never acts.
    Fomo,
}

/// A funded account that trades against one pool.
#[derive(Debug, Clone)]
pub struct Agent {
    address: Address,
    pool: String,
    behaviour: Behaviour,
}

impl Agent {
    /// Binds `behaviour` to an account trading on the pool named `pool`.
    pub fn new(address: Address, pool: impl Into<String>, behaviour: Behaviour) -> Self {
        Self {
            address,
            pool: pool.into(),
            behaviour,
        }
    }

    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }

    /// Name of the pool this agent trades on.
    #[must_use]
    pub fn pool(&self) -> &str {
        &self.pool
    }

    #[must_use]
    pub fn behaviour(&self) -> &Behaviour {
        &self.behaviour
    }

    #[must_use]
    pub fn kind(&self) -> AgentKind {
        match self.behaviour {
            Behaviour::ZiTrader(_) => AgentKind::ZiTrader,
            Behaviour::LiquidityProvider(_) => AgentKind::LiquidityProvider,
            Behaviour::Whale(_) => AgentKind::Whale,
            Behaviour::BurnIt => AgentKind::BurnIt,
            Behaviour::Fomo => AgentKind::Fomo,
        }
    }

    /// Takes this agent's turn for `step`.
    pub fn act<R: Rng + ?Sized>(
        &mut self,
        pool: &mut Pool,
        ledger: &mut impl Ledger,
        rng: &mut R,
        step: u64,
    ) -> SimulationResult<()> {
        match &mut self.behaviour {
            Behaviour::ZiTrader(trader) => trader.act(pool, ledger, rng, self.address),
            Behaviour::LiquidityProvider(lp) => lp.act(pool, ledger, rng, self.address),
            Behaviour::Whale(whale) => whale.act(pool, ledger, step, self.address),
            Behaviour::BurnIt | Behaviour::Fomo => Ok(()),
        }
    }
}
