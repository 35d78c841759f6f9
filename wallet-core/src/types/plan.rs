//! Investment plan positions
//!
//! One record per purchase. Mutated only by the accrual scheduler (daily
//! advance) and administrative override; never by the owner directly.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::PlanTier;

use super::common::{generate_record_id, PlanId, UserId};

/// Plan lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanStatus {
    /// Accruing daily returns
    Active,
    /// Countdown reached zero; no further accrual
    Completed,
    /// Administratively stopped
    Cancelled,
}

/// An active or finished investment position
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub id: PlanId,
    pub user: UserId,
    /// Catalog tier this was purchased from
    pub tier_id: u32,
    pub name: String,
    /// Amount invested (the tier price at purchase time)
    pub amount: u64,
    /// Credited into the owner's wallet once per calendar day
    pub daily_return: u64,
    /// Total duration in days
    pub days: u32,
    /// Counts down to zero; monotonically decreasing
    pub days_remaining: u32,
    pub purchase_date: DateTime<Utc>,
    /// Date of the most recent accrual; the once-per-day idempotency marker
    pub last_earning_date: Option<DateTime<Utc>>,
    pub status: PlanStatus,
}

impl Plan {
    /// Create an Active plan from a catalog tier
    pub fn new(user: UserId, tier: &PlanTier, purchased_at: DateTime<Utc>) -> Self {
        Self {
            id: generate_record_id(),
            user,
            tier_id: tier.id,
            name: tier.name.clone(),
            amount: tier.price,
            daily_return: tier.daily_return,
            days: tier.days,
            days_remaining: tier.days,
            purchase_date: purchased_at,
            last_earning_date: None,
            status: PlanStatus::Active,
        }
    }

    /// Whether this plan has already accrued on the given calendar day
    pub fn accrued_on(&self, day: NaiveDate) -> bool {
        self.last_earning_date
            .map(|d| d.date_naive() == day)
            .unwrap_or(false)
    }

    /// Record one day's accrual: stamp the idempotency marker, advance the
    /// countdown and complete the plan when it reaches zero.
    pub fn advance_one_day(&mut self, accrued_at: DateTime<Utc>) {
        self.last_earning_date = Some(accrued_at);
        self.days_remaining = self.days_remaining.saturating_sub(1);
        if self.days_remaining == 0 {
            self.status = PlanStatus::Completed;
        }
    }
}
