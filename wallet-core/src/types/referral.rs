//! Referral edges and the engine-owned account profile slice

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::REFERRAL_BONUS;

use super::common::{generate_record_id, PlanId, ReferralId, UserId};

/// Edge between a referrer and a referred user. Created at registration
/// time by the external signup flow; settled here on the referred user's
/// first plan purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Referral {
    pub id: ReferralId,
    pub referrer: UserId,
    /// 1:1 with the referred user
    pub referred: UserId,
    pub date: DateTime<Utc>,
    /// Set exactly once, by the referred user's first purchase
    pub bonus_paid: bool,
    /// Stamped at creation so later policy changes do not reprice old rows
    pub bonus_amount: u64,
    /// The plan purchase that settled the bonus
    pub first_plan: Option<PlanId>,
}

impl Referral {
    pub fn new(referrer: UserId, referred: UserId, created_at: DateTime<Utc>) -> Self {
        Self {
            id: generate_record_id(),
            referrer,
            referred,
            date: created_at,
            bonus_paid: false,
            bonus_amount: REFERRAL_BONUS,
            first_plan: None,
        }
    }

    /// Mark the bonus settled against the given plan. Returns false (and
    /// changes nothing) if the bonus was already paid.
    pub fn settle(&mut self, first_plan: PlanId) -> bool {
        if self.bonus_paid {
            return false;
        }
        self.bonus_paid = true;
        self.first_plan = Some(first_plan);
        true
    }
}

/// The slice of the external user record this engine owns: the referral
/// code it hands out and the inbound `referred_by` edge it reads. All other
/// user attributes stay with the auth collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountProfile {
    pub user: UserId,
    /// Generated lazily on first purchase, collision-checked
    pub referral_code: Option<String>,
    /// Set at registration by the external signup flow; never written here
    pub referred_by: Option<UserId>,
}

impl AccountProfile {
    pub fn new(user: UserId) -> Self {
        Self {
            user,
            referral_code: None,
            referred_by: None,
        }
    }
}
