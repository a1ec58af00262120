use crate::error::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported pool fee tiers, in hundredths of a basis point (pips).
///
/// Each tier is bound to exactly one tick spacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FeeTier {
    /// 0.01%, spacing 1.
    Lowest,
    /// 0.05%, spacing 10.
    Low,
    /// 0.3%, spacing 60.
    Medium,
    /// 1%, spacing 200.
    High,
}

impl FeeTier {
    /// All tiers in ascending fee order.
    pub const ALL: [FeeTier; 4] = [
        FeeTier::Lowest,
        FeeTier::Low,
        FeeTier::Medium,
        FeeTier::High,
    ];

    /// Fee in pips (1e-6).
    #[must_use]
    pub const fn pips(self) -> u32 {
        match self {
            FeeTier::Lowest => 100,
            FeeTier::Low => 500,
            FeeTier::Medium => 3000,
            FeeTier::High => 10_000,
        }
    }

    /// Tick spacing enforced for positions in a pool of this tier.
    #[must_use]
    pub const fn tick_spacing(self) -> i32 {
        match self {
            FeeTier::Lowest => 1,
            FeeTier::Low => 10,
            FeeTier::Medium => 60,
            FeeTier::High => 200,
        }
    }

    /// Looks up a tier by its fee in pips.
    pub fn from_pips(fee: u32) -> DomainResult<Self> {
        Self::ALL
            .into_iter()
            .find(|tier| tier.pips() == fee)
            .ok_or_else(|| DomainError::InvalidFeeTier(format!("fee {fee}")))
    }

    /// Looks up a tier by its tick spacing.
    pub fn from_tick_spacing(spacing: i32) -> DomainResult<Self> {
        Self::ALL
            .into_iter()
            .find(|tier| tier.tick_spacing() == spacing)
            .ok_or_else(|| DomainError::InvalidFeeTier(format!("tick spacing {spacing}")))
    }
}

impl TryFrom<u32> for FeeTier {
    type Error = DomainError;

    fn try_from(fee: u32) -> Result<Self, Self::Error> {
        Self::from_pips(fee)
    }
}

impl fmt::Display for FeeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pips())
    }
}

/// Returns the tick spacing for a fee in pips.
pub fn spacing_for_fee(fee: u32) -> DomainResult<i32> {
    FeeTier::from_pips(fee).map(FeeTier::tick_spacing)
}

/// Returns the fee in pips for a tick spacing.
pub fn fee_for_spacing(spacing: i32) -> DomainResult<u32> {
    FeeTier::from_tick_spacing(spacing).map(FeeTier::pips)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fee_and_spacing_lookup() {
        assert_eq!(spacing_for_fee(10_000).unwrap(), 200);
        assert_eq!(spacing_for_fee(500).unwrap(), 10);
        assert_eq!(fee_for_spacing(200).unwrap(), 10_000);
        assert_eq!(fee_for_spacing(10).unwrap(), 500);
    }

    #[test]
    fn test_unknown_fee_and_spacing_rejected() {
        assert!(matches!(
            spacing_for_fee(333),
            Err(DomainError::InvalidFeeTier(_))
        ));
        assert!(matches!(
            fee_for_spacing(15),
            Err(DomainError::InvalidFeeTier(_))
        ));
    }

    #[test]
    fn test_bijection() {
        for tier in FeeTier::ALL {
            let spacing = tier.tick_spacing();
            assert_eq!(spacing_for_fee(fee_for_spacing(spacing).unwrap()).unwrap(), spacing);
            assert_eq!(FeeTier::try_from(tier.pips()).unwrap(), tier);
        }
    }
}
