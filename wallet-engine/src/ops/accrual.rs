//! Daily accrual pass
//!
//! Walks every Active plan and credits its daily return into the owner's
//! wallet, at most once per UTC calendar day per plan. Each plan is an
//! independent unit of work: a failure is logged, counted and skipped, and
//! the plan is retried on the next pass because its `last_earning_date`
//! guard did not advance.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use chrono::NaiveDate;
use wallet_core::{LedgerResult, Plan, PlanStatus, Transaction};

use crate::storage::LedgerStore;

use super::{wallet, LedgerOps};

/// Outcome counters for one accrual pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccrualReport {
    /// Plans credited this pass
    pub credited: u64,
    /// Plans skipped by the once-per-day guard (or no longer Active)
    pub skipped: u64,
    /// Plans whose countdown reached zero this pass
    pub completed: u64,
    /// Plans whose update failed and will be retried next pass
    pub failed: u64,
}

/// Run one accrual pass over all Active plans
pub async fn execute<S: LedgerStore>(ops: &LedgerOps<S>) -> LedgerResult<AccrualReport> {
    let today = ops.clock().today();
    let plans = ops.store().list_active_plans().await?;

    let mut report = AccrualReport::default();

    for plan in plans {
        match accrue_plan(ops, &plan, today).await {
            Ok(PlanOutcome::Skipped) => report.skipped += 1,
            Ok(PlanOutcome::Credited { finished }) => {
                report.credited += 1;
                if finished {
                    report.completed += 1;
                }
            }
            Err(e) => {
                warn!(
                    plan_id = %plan.id,
                    user_id = %plan.user,
                    error = %e,
                    "plan accrual failed; will retry on next pass"
                );
                ops.metrics().accrual_failure();
                report.failed += 1;
            }
        }
    }

    info!(
        credited = report.credited,
        skipped = report.skipped,
        completed = report.completed,
        failed = report.failed,
        "accrual pass finished"
    );

    Ok(report)
}

enum PlanOutcome {
    Skipped,
    Credited { finished: bool },
}

async fn accrue_plan<S: LedgerStore>(
    ops: &LedgerOps<S>,
    snapshot: &Plan,
    today: NaiveDate,
) -> LedgerResult<PlanOutcome> {
    let _guard = ops.locks().acquire(&snapshot.user).await;

    // Re-read under the lock; the enumeration snapshot may be stale and
    // administrative overrides can change a plan between passes
    let plan = ops.store().get_plan(&snapshot.id).await?;
    let mut plan: Plan = match plan {
        Some(p) => p,
        None => return Ok(PlanOutcome::Skipped),
    };

    if plan.status != PlanStatus::Active || plan.user != snapshot.user {
        return Ok(PlanOutcome::Skipped);
    }
    if plan.accrued_on(today) {
        debug!(plan_id = %plan.id, "already accrued today");
        return Ok(PlanOutcome::Skipped);
    }

    let now = ops.clock().now();

    let mut owner_wallet = wallet::load_or_create(ops, &plan.user).await?;
    owner_wallet.append(Transaction::earning(
        plan.daily_return,
        plan.id.clone(),
        now,
    ));
    ops.store().save_wallet(&owner_wallet).await?;

    plan.advance_one_day(now);
    ops.store().save_plan(&plan).await?;

    ops.metrics().earning_credited();
    debug!(
        plan_id = %plan.id,
        user_id = %plan.user,
        amount = plan.daily_return,
        days_remaining = plan.days_remaining,
        "daily return credited"
    );

    Ok(PlanOutcome::Credited {
        finished: plan.status == PlanStatus::Completed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::purchase;
    use crate::test_support::test_ops_with_clock;

    #[tokio::test]
    async fn test_accrual_credits_each_active_plan_once() {
        let (ops, _clock) = test_ops_with_clock();
        purchase::execute(&ops, "u1", 1).await.unwrap(); // 20/day
        purchase::execute(&ops, "u2", 2).await.unwrap(); // 35/day

        let report = execute(&ops).await.unwrap();
        assert_eq!(report.credited, 2);
        assert_eq!(report.failed, 0);

        let w1 = ops.store().get_wallet("u1").await.unwrap().unwrap();
        let w2 = ops.store().get_wallet("u2").await.unwrap().unwrap();
        assert_eq!(w1.balance, 20);
        assert_eq!(w2.balance, 35);
    }

    #[tokio::test]
    async fn test_second_run_same_day_credits_nothing() {
        let (ops, _clock) = test_ops_with_clock();
        purchase::execute(&ops, "u1", 1).await.unwrap();

        let first = execute(&ops).await.unwrap();
        assert_eq!(first.credited, 1);

        let second = execute(&ops).await.unwrap();
        assert_eq!(second.credited, 0);
        assert_eq!(second.skipped, 1);

        let wallet = ops.store().get_wallet("u1").await.unwrap().unwrap();
        assert_eq!(wallet.balance, 20);
        assert_eq!(wallet.transactions.len(), 1);
    }

    #[tokio::test]
    async fn test_next_day_accrues_again() {
        let (ops, clock) = test_ops_with_clock();
        purchase::execute(&ops, "u1", 1).await.unwrap();

        execute(&ops).await.unwrap();
        clock.advance_days(1);
        let report = execute(&ops).await.unwrap();
        assert_eq!(report.credited, 1);

        let wallet = ops.store().get_wallet("u1").await.unwrap().unwrap();
        assert_eq!(wallet.balance, 40);
    }

    #[tokio::test]
    async fn test_final_day_completes_plan() {
        let (ops, _clock) = test_ops_with_clock();
        let outcome = purchase::execute(&ops, "u1", 1).await.unwrap();

        let mut plan = ops.store().get_plan(&outcome.plan.id).await.unwrap().unwrap();
        plan.days_remaining = 1;
        ops.store().save_plan(&plan).await.unwrap();

        let report = execute(&ops).await.unwrap();
        assert_eq!(report.credited, 1);
        assert_eq!(report.completed, 1);

        let plan = ops.store().get_plan(&outcome.plan.id).await.unwrap().unwrap();
        assert_eq!(plan.days_remaining, 0);
        assert_eq!(plan.status, PlanStatus::Completed);

        let wallet = ops.store().get_wallet("u1").await.unwrap().unwrap();
        assert_eq!(wallet.balance, 20);
    }

    #[tokio::test]
    async fn test_completed_plan_stops_accruing() {
        let (ops, clock) = test_ops_with_clock();
        let outcome = purchase::execute(&ops, "u1", 1).await.unwrap();

        let mut plan = ops.store().get_plan(&outcome.plan.id).await.unwrap().unwrap();
        plan.days_remaining = 1;
        ops.store().save_plan(&plan).await.unwrap();

        execute(&ops).await.unwrap();
        clock.advance_days(1);
        let report = execute(&ops).await.unwrap();
        assert_eq!(report.credited, 0);

        let wallet = ops.store().get_wallet("u1").await.unwrap().unwrap();
        assert_eq!(wallet.balance, 20);
    }

    #[tokio::test]
    async fn test_externally_cancelled_plan_is_skipped() {
        let (ops, _clock) = test_ops_with_clock();
        let outcome = purchase::execute(&ops, "u1", 1).await.unwrap();

        let mut plan = ops.store().get_plan(&outcome.plan.id).await.unwrap().unwrap();
        plan.status = PlanStatus::Cancelled;
        ops.store().save_plan(&plan).await.unwrap();

        let report = execute(&ops).await.unwrap();
        assert_eq!(report.credited, 0);
        assert!(ops.store().get_wallet("u1").await.unwrap().is_none());
    }
}
