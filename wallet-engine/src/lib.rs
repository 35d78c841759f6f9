//! Wallet Ledger Engine
//!
//! Service layer for the wallet ledger and earnings-accrual engine. It
//! tracks per-user balances derived from an append-only transaction log,
//! credits daily investment returns, settles cascading referral bonuses and
//! tier milestones, and manages the two-phase withdrawal lifecycle.
//!
//! # Architecture
//!
//! - **Storage**: the [`LedgerStore`] trait with [`MemoryStore`] and
//!   [`SledStore`] implementations
//! - **Operations**: purchase, withdrawal request/approve/reject, wallet
//!   read, referral settlement and the daily accrual pass
//! - **Scheduler**: a background task that runs accrual on an interval; a
//!   per-plan date guard makes re-runs and overlaps safe
//! - **Clock**: injectable time source so accrual days can be driven
//!   deterministically in tests
//!
//! # Usage
//!
//! ```rust,no_run
//! use wallet_engine::{EngineConfig, LedgerEngine, MemoryStore};
//!
//! async fn example() {
//!     let engine = LedgerEngine::new(MemoryStore::new(), EngineConfig::default());
//!
//!     // Purchase a plan for an authenticated user
//!     let outcome = engine.purchase("user-1", 1).await.unwrap();
//!     println!("plan {} created", outcome.plan.id);
//!
//!     // Credit daily returns (normally done by the background scheduler)
//!     engine.run_accrual().await.unwrap();
//!
//!     let wallet = engine.wallet("user-1").await.unwrap();
//!     println!("withdrawable: {}", wallet.withdrawable);
//! }
//! ```
//!
//! External collaborators (auth, registration, admin) interact through the
//! store: registration writes the `Referral` edge and the profile's
//! `referred_by` field; administrative overrides rewrite Plan or Withdrawal
//! records directly. Every operation re-reads the records it acts on, so
//! externally-mutated state is picked up on the next call.

pub mod clock;
pub mod config;
pub mod locks;
pub mod metrics;
pub mod ops;
pub mod scheduler;
pub mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::EngineConfig;
pub use metrics::{EngineMetrics, MetricsSnapshot};
pub use ops::accrual::AccrualReport;
pub use ops::purchase::PurchaseOutcome;
pub use ops::referral::{ReferralSummary, ReferredUser};
pub use ops::wallet::WalletView;
pub use scheduler::AccrualScheduler;
pub use storage::{LedgerStore, MemoryStore, SledStore, StorageConfig, StoreStats};

// Re-export the domain layer so callers need only this crate
pub use wallet_core::{
    AccountProfile, LedgerError, LedgerResult, MilestoneProgress, MilestoneRecord, MilestoneTier,
    Plan, PlanCatalog, PlanStatus, PlanTier, Referral, TierProgress, Transaction, TxKind,
    TxStatus, Wallet, Withdrawal, WithdrawalStatus,
};

use std::sync::Arc;

use ops::LedgerOps;

/// Ledger engine facade
///
/// Owns the operation context and the background accrual scheduler, and
/// exposes the full caller-facing surface.
pub struct LedgerEngine<S: LedgerStore + 'static> {
    ops: Arc<LedgerOps<S>>,
    scheduler: AccrualScheduler<S>,
}

impl<S: LedgerStore + 'static> LedgerEngine<S> {
    /// Create an engine with the default catalog and system clock
    pub fn new(store: S, config: EngineConfig) -> Self {
        Self::with_parts(store, PlanCatalog::default(), config, Arc::new(SystemClock))
    }

    /// Create an engine with explicit catalog and clock
    pub fn with_parts(
        store: S,
        catalog: PlanCatalog,
        config: EngineConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let interval_secs = config.accrual_interval_secs;
        let ops = Arc::new(LedgerOps::new(Arc::new(store), catalog, config, clock));
        let scheduler = AccrualScheduler::new(ops.clone(), interval_secs);
        Self { ops, scheduler }
    }

    // ==================== Wallet ====================

    /// Get a user's wallet, creating a zeroed one on first access. The
    /// derived balances are recomputed and persisted on every call.
    pub async fn wallet(&self, user_id: &str) -> LedgerResult<WalletView> {
        ops::wallet::fetch(&self.ops, user_id).await
    }

    // ==================== Purchases ====================

    /// Process an externally-paid plan purchase for a user
    pub async fn purchase(&self, user_id: &str, tier_id: u32) -> LedgerResult<PurchaseOutcome> {
        ops::purchase::execute(&self.ops, user_id, tier_id).await
    }

    // ==================== Withdrawals ====================

    /// Request a withdrawal against the user's withdrawable balance
    pub async fn request_withdrawal(
        &self,
        user_id: &str,
        amount: u64,
        payment_method: Option<String>,
        payment_details: Option<String>,
    ) -> LedgerResult<Withdrawal> {
        ops::withdraw::request(&self.ops, user_id, amount, payment_method, payment_details).await
    }

    /// Approve a pending withdrawal (administrative)
    pub async fn approve_withdrawal(&self, withdrawal_id: &str) -> LedgerResult<Withdrawal> {
        ops::withdraw::approve(&self.ops, withdrawal_id).await
    }

    /// Reject a pending withdrawal and release the reservation
    /// (administrative)
    pub async fn reject_withdrawal(&self, withdrawal_id: &str) -> LedgerResult<Withdrawal> {
        ops::withdraw::reject(&self.ops, withdrawal_id).await
    }

    // ==================== Referrals ====================

    /// Referral code and referred-user list for a user
    pub async fn referrals(&self, user_id: &str) -> LedgerResult<ReferralSummary> {
        ops::referral::referrals(&self.ops, user_id).await
    }

    /// Per-tier milestone progress for a user
    pub async fn milestones(&self, user_id: &str) -> LedgerResult<MilestoneProgress> {
        ops::referral::milestones(&self.ops, user_id).await
    }

    // ==================== Accrual ====================

    /// Run one accrual pass now (the same unit the scheduler runs)
    pub async fn run_accrual(&self) -> LedgerResult<AccrualReport> {
        ops::accrual::execute(&self.ops).await
    }

    /// Start the background accrual scheduler
    pub fn start_accrual_scheduler(&self) {
        self.scheduler.start();
    }

    /// Stop the background accrual scheduler
    pub fn stop_accrual_scheduler(&self) {
        self.scheduler.stop();
    }

    /// Whether the background scheduler is running
    pub fn scheduler_running(&self) -> bool {
        self.scheduler.is_running()
    }

    // ==================== Introspection ====================

    /// Aggregate counters over the stored records
    pub async fn stats(&self) -> LedgerResult<StoreStats> {
        self.ops.store().stats().await
    }

    /// Point-in-time engine metrics
    pub fn metrics(&self) -> MetricsSnapshot {
        self.ops.metrics().snapshot()
    }

    /// Direct store access, for external collaborators (registration,
    /// administrative overrides) and tests
    pub fn store(&self) -> &Arc<S> {
        self.ops.store()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Shared fixtures for the operation tests

    use std::sync::Arc;

    use chrono::TimeZone;
    use chrono::Utc;

    use wallet_core::PlanCatalog;

    use crate::clock::ManualClock;
    use crate::config::EngineConfig;
    use crate::ops::LedgerOps;
    use crate::storage::MemoryStore;

    /// Ops context over a fresh in-memory store and a manual clock
    pub(crate) fn test_ops() -> LedgerOps<MemoryStore> {
        test_ops_with_clock().0
    }

    pub(crate) fn test_ops_with_clock() -> (LedgerOps<MemoryStore>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap(),
        ));
        let ops = LedgerOps::new(
            Arc::new(MemoryStore::new()),
            PlanCatalog::default(),
            EngineConfig::default(),
            clock.clone(),
        );
        (ops, clock)
    }
}
