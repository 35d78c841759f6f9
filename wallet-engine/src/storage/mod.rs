//! Persistence layer
//!
//! The [`LedgerStore`] trait is the only seam between the operation modules
//! and durable state. Two implementations ship: [`MemoryStore`] for tests
//! and development, [`SledStore`] for embedded persistence. Every method is
//! a single-entity read or write; cross-entity consistency is the job of
//! the operation modules and their per-user locks.

pub mod memory;
pub mod sled;

use async_trait::async_trait;

use wallet_core::types::common::UserId;
use wallet_core::{
    AccountProfile, LedgerResult, MilestoneRecord, Plan, Referral, Wallet, Withdrawal,
};

/// Ledger persistence interface
#[async_trait]
pub trait LedgerStore: Send + Sync {
    // ==================== Wallets ====================

    /// Get a user's wallet, if one exists
    async fn get_wallet(&self, user: &str) -> LedgerResult<Option<Wallet>>;

    /// Insert or replace a wallet (keyed by owning user)
    async fn save_wallet(&self, wallet: &Wallet) -> LedgerResult<()>;

    // ==================== Account profiles ====================

    /// Get the engine-owned profile slice for a user
    async fn get_profile(&self, user: &str) -> LedgerResult<Option<AccountProfile>>;

    /// Insert or replace a profile
    async fn save_profile(&self, profile: &AccountProfile) -> LedgerResult<()>;

    /// Resolve a referral code to its owner (collision checking)
    async fn find_user_by_code(&self, code: &str) -> LedgerResult<Option<UserId>>;

    // ==================== Plans ====================

    /// Get a plan by id
    async fn get_plan(&self, plan_id: &str) -> LedgerResult<Option<Plan>>;

    /// Insert or replace a plan
    async fn save_plan(&self, plan: &Plan) -> LedgerResult<()>;

    /// All plans owned by a user
    async fn list_plans_by_user(&self, user: &str) -> LedgerResult<Vec<Plan>>;

    /// All plans with status Active (the accrual scheduler's work list)
    async fn list_active_plans(&self) -> LedgerResult<Vec<Plan>>;

    // ==================== Referrals ====================

    /// The referral edge pointing at a referred user (1:1)
    async fn get_referral_by_referred(&self, referred: &str) -> LedgerResult<Option<Referral>>;

    /// Insert or replace a referral edge
    async fn save_referral(&self, referral: &Referral) -> LedgerResult<()>;

    /// All referral edges created by a referrer
    async fn list_referrals_by_referrer(&self, referrer: &str) -> LedgerResult<Vec<Referral>>;

    // ==================== Milestones ====================

    /// Get a referrer's milestone record
    async fn get_milestones(&self, user: &str) -> LedgerResult<Option<MilestoneRecord>>;

    /// Insert or replace a milestone record
    async fn save_milestones(&self, record: &MilestoneRecord) -> LedgerResult<()>;

    // ==================== Withdrawals ====================

    /// Get a withdrawal request by id
    async fn get_withdrawal(&self, withdrawal_id: &str) -> LedgerResult<Option<Withdrawal>>;

    /// Insert or replace a withdrawal request
    async fn save_withdrawal(&self, withdrawal: &Withdrawal) -> LedgerResult<()>;

    /// All withdrawal requests still Pending
    async fn list_pending_withdrawals(&self) -> LedgerResult<Vec<Withdrawal>>;

    // ==================== Aggregates ====================

    /// Summary counters over the stored records
    async fn stats(&self) -> LedgerResult<StoreStats>;
}

/// Aggregate counters over the store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Wallets created so far
    pub wallets: u64,
    /// Plans currently accruing
    pub active_plans: u64,
    /// Sum of daily returns across active plans
    pub daily_profit: u64,
    /// Withdrawal requests awaiting resolution
    pub pending_withdrawals: u64,
    /// Sum of completed withdrawal amounts
    pub total_paid_out: u64,
    /// Referral edges whose bonus has been settled
    pub settled_referrals: u64,
}

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Data directory for the sled database
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "./wallet_data".to_string(),
        }
    }
}

impl StorageConfig {
    /// Create a development configuration
    pub fn development() -> Self {
        Self {
            data_dir: "./wallet_dev_data".to_string(),
        }
    }
}

pub use self::sled::SledStore;
pub use memory::MemoryStore;
