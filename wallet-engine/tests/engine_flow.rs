//! End-to-end flows through the engine facade
//!
//! Registration-time state (referral edges, `referred_by`) is written
//! through the store, the way the external signup collaborator would.

use std::sync::Arc;

use chrono::{TimeZone, Utc};

use wallet_engine::{
    AccountProfile, EngineConfig, LedgerEngine, LedgerError, LedgerStore, ManualClock,
    MemoryStore, PlanCatalog, Referral, SledStore, TxKind, WithdrawalStatus,
};

fn engine_with_clock() -> (LedgerEngine<MemoryStore>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 3, 5, 9, 0, 0).unwrap(),
    ));
    let engine = LedgerEngine::with_parts(
        MemoryStore::new(),
        PlanCatalog::default(),
        EngineConfig::default(),
        clock.clone(),
    );
    (engine, clock)
}

async fn register_referred(engine: &LedgerEngine<MemoryStore>, referrer: &str, referred: &str) {
    let edge = Referral::new(referrer.to_string(), referred.to_string(), Utc::now());
    engine.store().save_referral(&edge).await.unwrap();

    let mut profile = AccountProfile::new(referred.to_string());
    profile.referred_by = Some(referrer.to_string());
    engine.store().save_profile(&profile).await.unwrap();
}

#[tokio::test]
async fn referred_first_purchase_pays_bonus_and_advances_milestone() {
    let (engine, _clock) = engine_with_clock();
    register_referred(&engine, "alice", "bob").await;

    let outcome = engine.purchase("bob", 1).await.unwrap();
    assert_eq!(outcome.plan.days_remaining, 30);
    assert_eq!(outcome.plan.daily_return, 20);
    assert_eq!(outcome.plan.amount, 299);
    assert!(outcome.referral_code.is_some());

    // Referrer got the fixed bonus as a Completed Referral transaction
    let alice = engine.wallet("alice").await.unwrap();
    assert_eq!(alice.balance, 200);
    assert_eq!(alice.withdrawable, 200);
    assert_eq!(alice.transactions.len(), 1);
    assert_eq!(alice.transactions[0].kind, TxKind::Referral);

    // Milestone tier 1 progress is 1/10
    let progress = engine.milestones("alice").await.unwrap();
    assert_eq!(progress.tier1.users, 1);
    assert_eq!(progress.tier1.target_users, 10);
    assert!(!progress.tier1.achieved);

    // Referral view reflects the settled bonus
    let referrals = engine.referrals("alice").await.unwrap();
    assert_eq!(referrals.referred.len(), 1);
    assert_eq!(referrals.referred[0].bonus_earned, 200);
    assert_eq!(referrals.referred[0].plans_count, 1);
}

#[tokio::test]
async fn second_purchase_by_referred_user_pays_nothing_more() {
    let (engine, _clock) = engine_with_clock();
    register_referred(&engine, "alice", "bob").await;

    engine.purchase("bob", 1).await.unwrap();
    engine.purchase("bob", 4).await.unwrap();

    let alice = engine.wallet("alice").await.unwrap();
    assert_eq!(alice.balance, 200);
    assert_eq!(engine.metrics().referral_bonuses_paid, 1);
}

#[tokio::test]
async fn tenth_settled_referral_pays_tier1_exactly_once() {
    let (engine, _clock) = engine_with_clock();

    for i in 0..10 {
        let user = format!("ref{}", i);
        register_referred(&engine, "alice", &user).await;
        engine.purchase(&user, 1).await.unwrap();
    }

    // 10 referral bonuses + one tier-1 milestone bonus
    let alice = engine.wallet("alice").await.unwrap();
    assert_eq!(alice.balance, 10 * 200 + 750);
    assert_eq!(engine.metrics().milestone_bonuses_paid, 1);

    let progress = engine.milestones("alice").await.unwrap();
    assert!(progress.tier1.achieved);
    assert!(!progress.tier2.achieved);

    // Another purchase re-runs the evaluation without re-paying the tier
    engine.purchase("ref0", 2).await.unwrap();
    let alice = engine.wallet("alice").await.unwrap();
    assert_eq!(alice.balance, 10 * 200 + 750);
}

#[tokio::test]
async fn accrual_runs_once_per_day_and_completes_plans() {
    let (engine, clock) = engine_with_clock();
    engine.purchase("carol", 1).await.unwrap(); // 20/day for 30 days

    // Two passes on the same day credit once
    engine.run_accrual().await.unwrap();
    engine.run_accrual().await.unwrap();
    assert_eq!(engine.wallet("carol").await.unwrap().balance, 20);

    // Drive the plan to completion day by day
    for _ in 0..29 {
        clock.advance_days(1);
        engine.run_accrual().await.unwrap();
    }
    let carol = engine.wallet("carol").await.unwrap();
    assert_eq!(carol.balance, 30 * 20);
    assert_eq!(carol.total_earnings, 600);

    // Day 31: nothing left to accrue
    clock.advance_days(1);
    let report = engine.run_accrual().await.unwrap();
    assert_eq!(report.credited, 0);
    assert_eq!(engine.wallet("carol").await.unwrap().balance, 600);

    let stats = engine.stats().await.unwrap();
    assert_eq!(stats.active_plans, 0);
}

#[tokio::test]
async fn withdrawal_reject_roundtrip_preserves_balance() {
    let (engine, clock) = engine_with_clock();

    // Earn 150 via accrual: tier 1 twice over two days would be 40; use a
    // funded wallet instead by accruing enough days
    engine.purchase("dave", 1).await.unwrap();
    for _ in 0..8 {
        engine.run_accrual().await.unwrap();
        clock.advance_days(1);
    }
    // 8 days * 20 = 160 withdrawable
    let before = engine.wallet("dave").await.unwrap();
    assert_eq!(before.withdrawable, 160);

    let withdrawal = engine
        .request_withdrawal("dave", 150, None, None)
        .await
        .unwrap();
    assert_eq!(withdrawal.status, WithdrawalStatus::Pending);

    let mid = engine.wallet("dave").await.unwrap();
    assert_eq!(mid.withdrawable, 10);
    assert_eq!(mid.balance, 160);

    let rejected = engine.reject_withdrawal(&withdrawal.id).await.unwrap();
    assert_eq!(rejected.status, WithdrawalStatus::Rejected);

    let after = engine.wallet("dave").await.unwrap();
    assert_eq!(after.withdrawable, 160);
    assert_eq!(after.balance, 160);
}

#[tokio::test]
async fn withdrawal_approval_finalizes_the_debit() {
    let (engine, clock) = engine_with_clock();
    engine.purchase("erin", 5).await.unwrap(); // 200/day
    engine.run_accrual().await.unwrap();

    let withdrawal = engine
        .request_withdrawal("erin", 200, Some("bank".to_string()), None)
        .await
        .unwrap();
    clock.advance_days(1);

    let approved = engine.approve_withdrawal(&withdrawal.id).await.unwrap();
    assert_eq!(approved.status, WithdrawalStatus::Completed);
    assert!(approved.processed_date.is_some());

    let erin = engine.wallet("erin").await.unwrap();
    assert_eq!(erin.balance, 0);
    assert_eq!(erin.withdrawable, 0);
    // Lifetime earnings are monotonic; the payout does not reduce them
    assert_eq!(erin.total_earnings, 200);

    assert!(matches!(
        engine.approve_withdrawal(&withdrawal.id).await,
        Err(LedgerError::AlreadyProcessed(_))
    ));

    let stats = engine.stats().await.unwrap();
    assert_eq!(stats.total_paid_out, 200);
    assert_eq!(stats.pending_withdrawals, 0);
}

#[tokio::test]
async fn engine_over_sled_survives_the_same_flows() {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 3, 5, 9, 0, 0).unwrap(),
    ));
    let engine = LedgerEngine::with_parts(
        SledStore::open(dir.path()).unwrap(),
        PlanCatalog::default(),
        EngineConfig::default(),
        clock.clone(),
    );

    engine.purchase("frank", 2).await.unwrap(); // 35/day
    engine.run_accrual().await.unwrap();
    clock.advance_days(1);
    engine.run_accrual().await.unwrap();

    let frank = engine.wallet("frank").await.unwrap();
    assert_eq!(frank.balance, 70);

    // 70 is under the 100 minimum
    let withdrawal = engine.request_withdrawal("frank", 70, None, None).await;
    assert!(matches!(withdrawal, Err(LedgerError::BelowMinimum { .. })));

    clock.advance_days(1);
    engine.run_accrual().await.unwrap();
    let withdrawal = engine
        .request_withdrawal("frank", 105, None, None)
        .await
        .unwrap();
    engine.approve_withdrawal(&withdrawal.id).await.unwrap();

    let frank = engine.wallet("frank").await.unwrap();
    assert_eq!(frank.balance, 0);
}
