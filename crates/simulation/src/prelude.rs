//! Prelude module for convenient imports.
//!
//! ```rust
//! use unisim_simulation::prelude::*;
//! ```

// Agents
pub use crate::agents::{Agent, AgentKind, Behaviour, LiquidityProvider, Whale, ZiTrader};

// Configuration
pub use crate::config::{AgentParams, DEFAULT_SEED, SimulationConfig};

// Engine
pub use crate::engine::{PoolReport, SimulationEngine};

// Errors
pub use crate::error::{SimulationError, SimulationResult};

// Pools
pub use crate::exchange::Exchange;
pub use crate::metrics::{MetricsCollector, StepRecord};
pub use crate::pool::Pool;
pub use crate::registry::PositionRegistry;
