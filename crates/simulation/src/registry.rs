//! Positions opened through a pool, keyed by position id.

use primitive_types::U256;
use std::collections::BTreeMap;
use unisim_domain::position::{Position, PositionId};

/// Local mirror of the positions a pool has minted.
///
/// Entries are never removed; a fully withdrawn position stays with zero
/// liquidity.
#[derive(Debug, Clone, Default)]
pub struct PositionRegistry {
    positions: BTreeMap<PositionId, Position>,
}

impl PositionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the mirror of `position.id`.
    pub fn insert(&mut self, position: Position) {
        self.positions.insert(position.id, position);
    }

    #[must_use]
    pub fn get(&self, id: PositionId) -> Option<&Position> {
        self.positions.get(&id)
    }

    /// Overwrites the mirrored liquidity and owed amounts of a known
    /// position. Returns `false` when `id` is not in the registry.
    pub fn update(&mut self, id: PositionId, liquidity: u128, owed: (U256, U256)) -> bool {
        match self.positions.get_mut(&id) {
            Some(position) => {
                position.liquidity = liquidity;
                (position.owed0, position.owed1) = owed;
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Position> {
        self.positions.values()
    }

    /// Sum of liquidity over every position, active or not.
    #[must_use]
    pub fn total_liquidity(&self) -> u128 {
        self.positions
            .values()
            .fold(0u128, |acc, p| acc.saturating_add(p.liquidity))
    }

    /// Sum of liquidity over positions whose range contains `tick`.
    #[must_use]
    pub fn active_liquidity(&self, tick: i32) -> u128 {
        self.positions
            .values()
            .filter(|p| p.is_active_at(tick))
            .fold(0u128, |acc, p| acc.saturating_add(p.liquidity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_tracks_liquidity() {
        let mut registry = PositionRegistry::new();
        registry.insert(Position::new(1, -200, 200, 1_000));
        registry.insert(Position::new(2, 100, 300, 500));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.total_liquidity(), 1_500);
        assert_eq!(registry.active_liquidity(0), 1_000);
        assert_eq!(registry.active_liquidity(150), 1_500);

        let owed = (U256::from(7), U256::from(3));
        assert!(registry.update(1, 0, owed));
        assert!(!registry.update(9, 10, owed));
        let first = registry.get(1).unwrap();
        assert_eq!(first.liquidity, 0);
        assert_eq!((first.owed0, first.owed1), owed);
        assert_eq!(registry.len(), 2);
    }
}
