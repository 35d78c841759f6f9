//! Plan purchase
//!
//! The plan record is the primary commitment: once it is persisted the
//! purchase has succeeded, and everything after it (referral code, bonus
//! settlement, milestone evaluation) is a best-effort cascade whose
//! failures are logged but never surfaced to the purchaser. The cascade's
//! persisted flags make a later re-trigger safe.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use wallet_core::{LedgerError, LedgerResult, Plan};

use crate::storage::LedgerStore;

use super::{referral, LedgerOps};

/// Result of a successful purchase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOutcome {
    pub plan: Plan,
    /// The purchaser's referral code; None only if code generation failed
    /// (the purchase itself is unaffected)
    pub referral_code: Option<String>,
}

/// Process an externally-paid plan purchase
pub async fn execute<S: LedgerStore>(
    ops: &LedgerOps<S>,
    user_id: &str,
    tier_id: u32,
) -> LedgerResult<PurchaseOutcome> {
    let tier = ops
        .catalog()
        .resolve(tier_id)
        .ok_or(LedgerError::InvalidPlan(tier_id))?
        .clone();

    let plan = {
        let _guard = ops.locks().acquire(user_id).await;
        let plan = Plan::new(user_id.to_string(), &tier, ops.clock().now());
        ops.store().save_plan(&plan).await?;
        plan
    };

    ops.metrics().plan_purchased();
    info!(
        user_id,
        plan_id = %plan.id,
        tier = tier_id,
        amount = plan.amount,
        "plan purchased"
    );

    // Everything below is best-effort: the purchase is already committed.
    let referral_code = match referral::ensure_referral_code(ops, user_id).await {
        Ok(code) => Some(code),
        Err(e) => {
            warn!(user_id, error = %e, "referral code generation failed");
            None
        }
    };

    let referred_by = match ops.store().get_profile(user_id).await {
        Ok(profile) => profile.and_then(|p| p.referred_by),
        Err(e) => {
            warn!(user_id, error = %e, "profile lookup failed; skipping referral settlement");
            None
        }
    };

    if let Some(referrer) = referred_by {
        if let Err(e) = referral::settle_first_purchase_bonus(ops, user_id, &plan.id).await {
            warn!(user_id, referrer = %referrer, error = %e, "referral bonus settlement failed");
        }
        if let Err(e) = referral::evaluate_milestones(ops, &referrer).await {
            warn!(referrer = %referrer, error = %e, "milestone evaluation failed");
        }
    }

    Ok(PurchaseOutcome {
        plan,
        referral_code,
    })
}
