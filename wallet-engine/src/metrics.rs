//! Engine metrics
//!
//! Cumulative counters for the money-moving operations. Cheap enough to
//! record unconditionally; read via [`EngineMetrics::snapshot`].

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics collector for the ledger engine
#[derive(Debug, Default)]
pub struct EngineMetrics {
    plans_purchased: AtomicU64,
    earnings_credited: AtomicU64,
    referral_bonuses_paid: AtomicU64,
    milestone_bonuses_paid: AtomicU64,
    withdrawals_requested: AtomicU64,
    withdrawals_approved: AtomicU64,
    withdrawals_rejected: AtomicU64,
    accrual_failures: AtomicU64,
}

/// Point-in-time view of the counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub plans_purchased: u64,
    pub earnings_credited: u64,
    pub referral_bonuses_paid: u64,
    pub milestone_bonuses_paid: u64,
    pub withdrawals_requested: u64,
    pub withdrawals_approved: u64,
    pub withdrawals_rejected: u64,
    pub accrual_failures: u64,
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plan_purchased(&self) {
        self.plans_purchased.fetch_add(1, Ordering::Relaxed);
    }

    pub fn earning_credited(&self) {
        self.earnings_credited.fetch_add(1, Ordering::Relaxed);
    }

    pub fn referral_bonus_paid(&self) {
        self.referral_bonuses_paid.fetch_add(1, Ordering::Relaxed);
    }

    pub fn milestone_bonus_paid(&self) {
        self.milestone_bonuses_paid.fetch_add(1, Ordering::Relaxed);
    }

    pub fn withdrawal_requested(&self) {
        self.withdrawals_requested.fetch_add(1, Ordering::Relaxed);
    }

    pub fn withdrawal_approved(&self) {
        self.withdrawals_approved.fetch_add(1, Ordering::Relaxed);
    }

    pub fn withdrawal_rejected(&self) {
        self.withdrawals_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn accrual_failure(&self) {
        self.accrual_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            plans_purchased: self.plans_purchased.load(Ordering::Relaxed),
            earnings_credited: self.earnings_credited.load(Ordering::Relaxed),
            referral_bonuses_paid: self.referral_bonuses_paid.load(Ordering::Relaxed),
            milestone_bonuses_paid: self.milestone_bonuses_paid.load(Ordering::Relaxed),
            withdrawals_requested: self.withdrawals_requested.load(Ordering::Relaxed),
            withdrawals_approved: self.withdrawals_approved.load(Ordering::Relaxed),
            withdrawals_rejected: self.withdrawals_rejected.load(Ordering::Relaxed),
            accrual_failures: self.accrual_failures.load(Ordering::Relaxed),
        }
    }
}
