//! Referral-count milestone tiers
//!
//! A tier bonus is paid when the referrer's settled-referral count reaches
//! the tier threshold and the tier is not already in the awarded set.
//! Awarding is monotonic and irreversible.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{TIER1_BONUS, TIER1_TARGET, TIER2_BONUS, TIER2_TARGET};

use super::common::UserId;

/// Milestone tier, ordered ascending by threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MilestoneTier {
    Tier1,
    Tier2,
}

impl MilestoneTier {
    /// All tiers in ascending threshold order; evaluation walks this list
    pub const ALL: [MilestoneTier; 2] = [MilestoneTier::Tier1, MilestoneTier::Tier2];

    /// Settled referrals required to reach this tier
    pub fn target(&self) -> u64 {
        match self {
            Self::Tier1 => TIER1_TARGET,
            Self::Tier2 => TIER2_TARGET,
        }
    }

    /// Bonus paid on reaching this tier (currency units)
    pub fn bonus(&self) -> u64 {
        match self {
            Self::Tier1 => TIER1_BONUS,
            Self::Tier2 => TIER2_BONUS,
        }
    }
}

/// One awarded tier with its award date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MilestoneAward {
    pub tier: MilestoneTier,
    pub date: DateTime<Utc>,
}

/// Per-referrer record of which tiers have been paid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MilestoneRecord {
    pub user: UserId,
    pub awarded: Vec<MilestoneAward>,
}

impl MilestoneRecord {
    pub fn new(user: UserId) -> Self {
        Self {
            user,
            awarded: Vec::new(),
        }
    }

    pub fn is_awarded(&self, tier: MilestoneTier) -> bool {
        self.awarded.iter().any(|a| a.tier == tier)
    }

    /// Add a tier to the awarded set. Returns false (and changes nothing)
    /// if the tier was already awarded.
    pub fn award(&mut self, tier: MilestoneTier, awarded_at: DateTime<Utc>) -> bool {
        if self.is_awarded(tier) {
            return false;
        }
        self.awarded.push(MilestoneAward {
            tier,
            date: awarded_at,
        });
        true
    }
}

/// Progress toward a single tier, as exposed to callers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierProgress {
    /// Settled referrals counted so far
    pub users: u64,
    pub target_users: u64,
    pub bonus: u64,
    pub achieved: bool,
}

impl TierProgress {
    pub fn for_tier(tier: MilestoneTier, settled: u64) -> Self {
        Self {
            users: settled,
            target_users: tier.target(),
            bonus: tier.bonus(),
            achieved: settled >= tier.target(),
        }
    }
}

/// Per-tier progress for a referrer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MilestoneProgress {
    pub tier1: TierProgress,
    pub tier2: TierProgress,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_constants() {
        assert_eq!(MilestoneTier::Tier1.target(), 10);
        assert_eq!(MilestoneTier::Tier1.bonus(), 750);
        assert_eq!(MilestoneTier::Tier2.target(), 25);
        assert_eq!(MilestoneTier::Tier2.bonus(), 1500);
    }

    #[test]
    fn test_award_is_idempotent() {
        let mut record = MilestoneRecord::new("u1".to_string());
        assert!(record.award(MilestoneTier::Tier1, Utc::now()));
        assert!(!record.award(MilestoneTier::Tier1, Utc::now()));
        assert_eq!(record.awarded.len(), 1);
        assert!(record.is_awarded(MilestoneTier::Tier1));
        assert!(!record.is_awarded(MilestoneTier::Tier2));
    }

    #[test]
    fn test_tier_progress() {
        let progress = TierProgress::for_tier(MilestoneTier::Tier1, 1);
        assert_eq!(progress.users, 1);
        assert_eq!(progress.target_users, 10);
        assert!(!progress.achieved);

        let done = TierProgress::for_tier(MilestoneTier::Tier2, 25);
        assert!(done.achieved);
    }
}
