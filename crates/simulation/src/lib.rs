//! Agent-based simulation of concentrated-liquidity pools.
//!
//! A [`Pool`](pool::Pool) wraps one pool deployed on a
//! [`Ledger`](unisim_ledger::Ledger) and speaks in human token units; the
//! [`Exchange`](exchange::Exchange) groups pools by name and the
//! [`SimulationEngine`](engine::SimulationEngine) steps a population of
//! agents against them, sampling a [`StepRecord`](metrics::StepRecord) per
//! pool per step.
//!
//! ```no_run
//! use unisim_ledger::InMemoryLedger;
//! use unisim_simulation::prelude::*;
//!
//! let config = SimulationConfig::new(100, 50).with_seed(DEFAULT_SEED);
//! let mut engine = SimulationEngine::stablecoin(InMemoryLedger::new(), config)?;
//! engine.run()?;
//! for report in engine.results() {
//!     println!("{}: {} steps", report.pool, report.records.len());
//! }
//! # Ok::<(), SimulationError>(())
//! ```

pub mod agents;
pub mod config;
pub mod engine;
pub mod error;
pub mod exchange;
pub mod metrics;
pub mod pool;
pub mod prelude;
pub mod registry;
