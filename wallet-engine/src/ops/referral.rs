//! Referral settlement, milestone evaluation and referral views
//!
//! The two money-moving flows here are deliberately idempotent: the
//! `bonus_paid` flag and the tier-awarded set are persisted checkpoints, so
//! an interrupted cascade can be re-triggered without double-paying.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use wallet_core::constants::{REFERRAL_CODE_ALPHABET, REFERRAL_CODE_LENGTH};
use wallet_core::types::common::{generate_entropy, UserId};
use wallet_core::{
    AccountProfile, LedgerError, LedgerResult, MilestoneProgress, MilestoneRecord, MilestoneTier,
    TierProgress, Transaction,
};

use crate::storage::LedgerStore;

use super::{wallet, LedgerOps};

/// One referred user in the referrer's summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferredUser {
    pub user: UserId,
    pub joined: chrono::DateTime<chrono::Utc>,
    pub plans_count: u64,
    /// Bonus actually credited for this referral (0 until settled)
    pub bonus_earned: u64,
}

/// Referral code plus the list of referred users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferralSummary {
    pub code: String,
    pub referred: Vec<ReferredUser>,
}

/// Ensure the user has a referral code, generating one (collision-checked,
/// bounded retries) if absent. Returns the code.
pub async fn ensure_referral_code<S: LedgerStore>(
    ops: &LedgerOps<S>,
    user_id: &str,
) -> LedgerResult<String> {
    let _guard = ops.locks().acquire(user_id).await;

    let mut profile = ops
        .store()
        .get_profile(user_id)
        .await?
        .unwrap_or_else(|| AccountProfile::new(user_id.to_string()));

    if let Some(code) = &profile.referral_code {
        return Ok(code.clone());
    }

    let attempts = ops.config().referral_code_attempts;
    for _ in 0..attempts {
        let candidate = generate_code();
        if ops.store().find_user_by_code(&candidate).await?.is_none() {
            profile.referral_code = Some(candidate.clone());
            ops.store().save_profile(&profile).await?;
            debug!(user_id, code = %candidate, "referral code assigned");
            return Ok(candidate);
        }
    }

    Err(LedgerError::ReferralCodeExhausted { attempts })
}

fn generate_code() -> String {
    generate_entropy()
        .iter()
        .take(REFERRAL_CODE_LENGTH)
        .map(|b| REFERRAL_CODE_ALPHABET[*b as usize % REFERRAL_CODE_ALPHABET.len()] as char)
        .collect()
}

/// Settle the one-time referral bonus triggered by a referred user's first
/// plan purchase. Returns true if a bonus was paid by this call.
///
/// The `bonus_paid` flag is flipped and persisted before the referrer is
/// credited; a re-run after either step can never pay twice.
pub async fn settle_first_purchase_bonus<S: LedgerStore>(
    ops: &LedgerOps<S>,
    referred_user: &str,
    plan_id: &str,
) -> LedgerResult<bool> {
    // Flip the settlement flag under the referred user's lock
    let guard = ops.locks().acquire(referred_user).await;

    let referral = ops.store().get_referral_by_referred(referred_user).await?;
    let mut referral = match referral {
        Some(r) => r,
        None => {
            debug!(referred_user, "no referral edge; nothing to settle");
            return Ok(false);
        }
    };

    if !referral.settle(plan_id.to_string()) {
        debug!(referred_user, "referral bonus already paid");
        return Ok(false);
    }
    ops.store().save_referral(&referral).await?;
    drop(guard);

    // Credit the referrer under their own lock (never held together with
    // the referred user's)
    let _guard = ops.locks().acquire(&referral.referrer).await;
    let mut referrer_wallet = wallet::load_or_create(ops, &referral.referrer).await?;
    referrer_wallet.append(Transaction::referral_bonus(
        referral.bonus_amount,
        ops.clock().now(),
    ));
    ops.store().save_wallet(&referrer_wallet).await?;

    ops.metrics().referral_bonus_paid();
    info!(
        referrer = %referral.referrer,
        referred = referred_user,
        amount = referral.bonus_amount,
        "referral bonus settled"
    );

    Ok(true)
}

/// Re-evaluate the referrer's milestone record and pay any tier whose
/// threshold is met and not yet awarded. Tiers are walked in ascending
/// threshold order and checked independently, so evaluation is safe to run
/// on every purchase.
pub async fn evaluate_milestones<S: LedgerStore>(
    ops: &LedgerOps<S>,
    referrer: &str,
) -> LedgerResult<()> {
    let settled = ops
        .store()
        .list_referrals_by_referrer(referrer)
        .await?
        .iter()
        .filter(|r| r.bonus_paid)
        .count() as u64;

    let _guard = ops.locks().acquire(referrer).await;

    let mut record = ops
        .store()
        .get_milestones(referrer)
        .await?
        .unwrap_or_else(|| MilestoneRecord::new(referrer.to_string()));

    let now = ops.clock().now();
    let mut wallet = wallet::load_or_create(ops, referrer).await?;
    let mut awarded_any = false;

    for tier in MilestoneTier::ALL {
        if settled >= tier.target() && record.award(tier, now) {
            wallet.append(Transaction::milestone_bonus(tier.bonus(), now));
            awarded_any = true;
            ops.metrics().milestone_bonus_paid();
            info!(
                referrer,
                tier = ?tier,
                bonus = tier.bonus(),
                settled,
                "milestone tier awarded"
            );
        }
    }

    if awarded_any {
        // Awarded set first: a crash between the two saves loses a credit
        // but can never duplicate one on re-evaluation
        ops.store().save_milestones(&record).await?;
        ops.store().save_wallet(&wallet).await?;
    }

    Ok(())
}

/// Referral code and referred-user list for a referrer
pub async fn referrals<S: LedgerStore>(
    ops: &LedgerOps<S>,
    user_id: &str,
) -> LedgerResult<ReferralSummary> {
    let code = ops
        .store()
        .get_profile(user_id)
        .await?
        .and_then(|p| p.referral_code)
        .unwrap_or_default();

    let edges = ops.store().list_referrals_by_referrer(user_id).await?;

    let mut referred = Vec::with_capacity(edges.len());
    for edge in edges {
        let plans_count = ops.store().list_plans_by_user(&edge.referred).await?.len() as u64;
        referred.push(ReferredUser {
            user: edge.referred,
            joined: edge.date,
            plans_count,
            bonus_earned: if edge.bonus_paid { edge.bonus_amount } else { 0 },
        });
    }

    Ok(ReferralSummary { code, referred })
}

/// Per-tier milestone progress for a referrer
pub async fn milestones<S: LedgerStore>(
    ops: &LedgerOps<S>,
    user_id: &str,
) -> LedgerResult<MilestoneProgress> {
    let settled = ops
        .store()
        .list_referrals_by_referrer(user_id)
        .await?
        .iter()
        .filter(|r| r.bonus_paid)
        .count() as u64;

    Ok(MilestoneProgress {
        tier1: TierProgress::for_tier(MilestoneTier::Tier1, settled),
        tier2: TierProgress::for_tier(MilestoneTier::Tier2, settled),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_ops;
    use wallet_core::constants::{REFERRAL_BONUS, TIER1_BONUS};
    use wallet_core::Referral;

    #[tokio::test]
    async fn test_referral_code_is_stable_once_assigned() {
        let ops = test_ops();

        let code = ensure_referral_code(&ops, "u1").await.unwrap();
        assert_eq!(code.len(), REFERRAL_CODE_LENGTH);
        assert!(code
            .bytes()
            .all(|b| REFERRAL_CODE_ALPHABET.contains(&b)));

        let again = ensure_referral_code(&ops, "u1").await.unwrap();
        assert_eq!(code, again);
    }

    #[tokio::test]
    async fn test_code_generation_exhaustion() {
        use crate::clock::SystemClock;
        use crate::config::EngineConfig;
        use crate::ops::LedgerOps;
        use crate::storage::MemoryStore;
        use std::sync::Arc;

        let ops = LedgerOps::new(
            Arc::new(MemoryStore::new()),
            wallet_core::PlanCatalog::default(),
            EngineConfig {
                referral_code_attempts: 0,
                ..EngineConfig::default()
            },
            Arc::new(SystemClock),
        );

        assert!(matches!(
            ensure_referral_code(&ops, "u1").await,
            Err(LedgerError::ReferralCodeExhausted { attempts: 0 })
        ));
    }

    #[tokio::test]
    async fn test_settle_pays_referrer_once() {
        let ops = test_ops();
        let referral = Referral::new("a".to_string(), "b".to_string(), ops.clock().now());
        ops.store().save_referral(&referral).await.unwrap();

        assert!(settle_first_purchase_bonus(&ops, "b", "p1").await.unwrap());
        let wallet = ops.store().get_wallet("a").await.unwrap().unwrap();
        assert_eq!(wallet.balance, REFERRAL_BONUS);

        // Second settlement attempt is a no-op
        assert!(!settle_first_purchase_bonus(&ops, "b", "p2").await.unwrap());
        let wallet = ops.store().get_wallet("a").await.unwrap().unwrap();
        assert_eq!(wallet.balance, REFERRAL_BONUS);
    }

    #[tokio::test]
    async fn test_settle_without_edge_is_noop() {
        let ops = test_ops();
        assert!(!settle_first_purchase_bonus(&ops, "nobody", "p1").await.unwrap());
    }

    #[tokio::test]
    async fn test_milestone_awarded_exactly_once() {
        let ops = test_ops();

        for i in 0..10 {
            let mut referral =
                Referral::new("a".to_string(), format!("r{}", i), ops.clock().now());
            referral.settle(format!("p{}", i));
            ops.store().save_referral(&referral).await.unwrap();
        }

        evaluate_milestones(&ops, "a").await.unwrap();
        let wallet = ops.store().get_wallet("a").await.unwrap().unwrap();
        assert_eq!(wallet.balance, TIER1_BONUS);

        // Re-evaluation after the fact pays nothing more
        evaluate_milestones(&ops, "a").await.unwrap();
        evaluate_milestones(&ops, "a").await.unwrap();
        let wallet = ops.store().get_wallet("a").await.unwrap().unwrap();
        assert_eq!(wallet.balance, TIER1_BONUS);
        assert_eq!(ops.metrics().snapshot().milestone_bonuses_paid, 1);
    }

    #[tokio::test]
    async fn test_single_evaluation_can_cross_both_tiers() {
        let ops = test_ops();

        for i in 0..25 {
            let mut referral =
                Referral::new("a".to_string(), format!("r{}", i), ops.clock().now());
            referral.settle(format!("p{}", i));
            ops.store().save_referral(&referral).await.unwrap();
        }

        evaluate_milestones(&ops, "a").await.unwrap();
        let wallet = ops.store().get_wallet("a").await.unwrap().unwrap();
        assert_eq!(
            wallet.balance,
            MilestoneTier::Tier1.bonus() + MilestoneTier::Tier2.bonus()
        );
    }

    #[tokio::test]
    async fn test_milestone_progress_counts_settled_only() {
        let ops = test_ops();

        let mut settled = Referral::new("a".to_string(), "b".to_string(), ops.clock().now());
        settled.settle("p1".to_string());
        ops.store().save_referral(&settled).await.unwrap();

        let unsettled = Referral::new("a".to_string(), "c".to_string(), ops.clock().now());
        ops.store().save_referral(&unsettled).await.unwrap();

        let progress = milestones(&ops, "a").await.unwrap();
        assert_eq!(progress.tier1.users, 1);
        assert_eq!(progress.tier1.target_users, 10);
        assert!(!progress.tier1.achieved);
        assert_eq!(progress.tier2.bonus, 1500);
    }

    #[tokio::test]
    async fn test_referrals_view() {
        let ops = test_ops();

        let mut settled = Referral::new("a".to_string(), "b".to_string(), ops.clock().now());
        settled.settle("p1".to_string());
        ops.store().save_referral(&settled).await.unwrap();

        let summary = referrals(&ops, "a").await.unwrap();
        assert_eq!(summary.referred.len(), 1);
        assert_eq!(summary.referred[0].user, "b");
        assert_eq!(summary.referred[0].bonus_earned, REFERRAL_BONUS);
        // No code generated yet
        assert!(summary.code.is_empty());
    }
}
