//! Membership Tier Entity

use chrono::{DateTime, Utc};
use kernel::amount::Amount;
use kernel::id::{CreatorId, MembershipId};
use thiserror::Error;

/// Lowest and highest allowed tier
pub const MIN_TIER: i16 = 1;
pub const MAX_TIER: i16 = 4;

/// Tier validation error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Membership tier must be between {MIN_TIER} and {MAX_TIER}")]
pub struct InvalidTier;

/// A creator's paid membership tier
#[derive(Debug, Clone)]
pub struct Membership {
    pub id: MembershipId,
    pub creator_id: CreatorId,
    pub name: String,
    /// 1 (lowest) to 4 (highest); ordering drives the downgrade check
    pub tier: i16,
    /// Monthly price
    pub amount: Amount,
    pub benefits: String,
    /// Soft delete; deleted tiers stay referenced by old enrollments
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

impl Membership {
    pub fn new(
        creator_id: CreatorId,
        name: String,
        tier: i16,
        amount: Amount,
        benefits: String,
    ) -> Result<Self, InvalidTier> {
        if !(MIN_TIER..=MAX_TIER).contains(&tier) {
            return Err(InvalidTier);
        }

        Ok(Self {
            id: MembershipId::new(),
            creator_id,
            name,
            tier,
            amount,
            benefits,
            is_deleted: false,
            created_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_bounds() {
        let creator = CreatorId::new();
        let amount = Amount::from_units(10).unwrap();

        for tier in MIN_TIER..=MAX_TIER {
            assert!(
                Membership::new(creator, "Tier".into(), tier, amount, "".into()).is_ok()
            );
        }
        assert!(Membership::new(creator, "Tier".into(), 0, amount, "".into()).is_err());
        assert!(Membership::new(creator, "Tier".into(), 5, amount, "".into()).is_err());
    }
}
