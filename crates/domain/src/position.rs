use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Identifier handed out by the position manager (starts at 1).
pub type PositionId = u64;

/// A liquidity commitment over a tick range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub id: PositionId,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub liquidity: u128,
    /// Raw token0 owed to the owner, waiting to be collected.
    pub owed0: U256,
    /// Raw token1 owed to the owner, waiting to be collected.
    pub owed1: U256,
}

impl Position {
    #[must_use]
    pub fn new(id: PositionId, tick_lower: i32, tick_upper: i32, liquidity: u128) -> Self {
        Self {
            id,
            tick_lower,
            tick_upper,
            liquidity,
            owed0: U256::zero(),
            owed1: U256::zero(),
        }
    }

    /// Whether the pool tick is inside `[tick_lower, tick_upper)`.
    #[must_use]
    pub fn is_active_at(&self, tick: i32) -> bool {
        tick >= self.tick_lower && tick < self.tick_upper
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_active_range() {
        let p = Position::new(1, -200, 200, 1_000);
        assert!(p.is_active_at(0));
        assert!(p.is_active_at(-200));
        assert!(!p.is_active_at(200));
        assert!(!p.is_active_at(-201));
        assert!(p.owed0.is_zero());
    }
}
