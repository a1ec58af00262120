//! Pool mathematics and value types for the unisim AMM simulator.
//!
//! Prices are carried as Q64.96 sqrt prices, liquidity as `u128` and raw
//! token quantities as `U256`, mirroring an on-chain concentrated-liquidity
//! deployment.

pub mod error;
pub mod fees;
pub mod math;
pub mod position;
pub mod prelude;
pub mod token;
pub mod value_objects;
