//! In-memory store
//!
//! Thread-safe map-backed implementation, used by tests and development.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use wallet_core::types::common::{ReferralId, UserId};
use wallet_core::{
    AccountProfile, LedgerResult, MilestoneRecord, Plan, PlanStatus, Referral, Wallet, Withdrawal,
    WithdrawalStatus,
};

use super::{LedgerStore, StoreStats};

/// Map-per-record in-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    wallets: RwLock<HashMap<UserId, Wallet>>,
    profiles: RwLock<HashMap<UserId, AccountProfile>>,
    plans: RwLock<HashMap<String, Plan>>,
    referrals: RwLock<HashMap<ReferralId, Referral>>,
    milestones: RwLock<HashMap<UserId, MilestoneRecord>>,
    withdrawals: RwLock<HashMap<String, Withdrawal>>,
    // Indexes
    code_to_user: RwLock<HashMap<String, UserId>>,
    referred_to_referral: RwLock<HashMap<UserId, ReferralId>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all stored records
    pub async fn clear(&self) {
        self.wallets.write().await.clear();
        self.profiles.write().await.clear();
        self.plans.write().await.clear();
        self.referrals.write().await.clear();
        self.milestones.write().await.clear();
        self.withdrawals.write().await.clear();
        self.code_to_user.write().await.clear();
        self.referred_to_referral.write().await.clear();
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    // ==================== Wallets ====================

    async fn get_wallet(&self, user: &str) -> LedgerResult<Option<Wallet>> {
        let wallets = self.wallets.read().await;
        Ok(wallets.get(user).cloned())
    }

    async fn save_wallet(&self, wallet: &Wallet) -> LedgerResult<()> {
        let mut wallets = self.wallets.write().await;
        wallets.insert(wallet.user.clone(), wallet.clone());
        Ok(())
    }

    // ==================== Account profiles ====================

    async fn get_profile(&self, user: &str) -> LedgerResult<Option<AccountProfile>> {
        let profiles = self.profiles.read().await;
        Ok(profiles.get(user).cloned())
    }

    async fn save_profile(&self, profile: &AccountProfile) -> LedgerResult<()> {
        let mut profiles = self.profiles.write().await;
        profiles.insert(profile.user.clone(), profile.clone());

        if let Some(code) = &profile.referral_code {
            let mut code_to_user = self.code_to_user.write().await;
            code_to_user.insert(code.clone(), profile.user.clone());
        }

        Ok(())
    }

    async fn find_user_by_code(&self, code: &str) -> LedgerResult<Option<UserId>> {
        let code_to_user = self.code_to_user.read().await;
        Ok(code_to_user.get(code).cloned())
    }

    // ==================== Plans ====================

    async fn get_plan(&self, plan_id: &str) -> LedgerResult<Option<Plan>> {
        let plans = self.plans.read().await;
        Ok(plans.get(plan_id).cloned())
    }

    async fn save_plan(&self, plan: &Plan) -> LedgerResult<()> {
        let mut plans = self.plans.write().await;
        plans.insert(plan.id.clone(), plan.clone());
        Ok(())
    }

    async fn list_plans_by_user(&self, user: &str) -> LedgerResult<Vec<Plan>> {
        let plans = self.plans.read().await;
        Ok(plans.values().filter(|p| p.user == user).cloned().collect())
    }

    async fn list_active_plans(&self) -> LedgerResult<Vec<Plan>> {
        let plans = self.plans.read().await;
        Ok(plans
            .values()
            .filter(|p| p.status == PlanStatus::Active)
            .cloned()
            .collect())
    }

    // ==================== Referrals ====================

    async fn get_referral_by_referred(&self, referred: &str) -> LedgerResult<Option<Referral>> {
        let referred_to_referral = self.referred_to_referral.read().await;
        if let Some(referral_id) = referred_to_referral.get(referred) {
            let referrals = self.referrals.read().await;
            return Ok(referrals.get(referral_id).cloned());
        }
        Ok(None)
    }

    async fn save_referral(&self, referral: &Referral) -> LedgerResult<()> {
        let mut referrals = self.referrals.write().await;
        referrals.insert(referral.id.clone(), referral.clone());

        let mut referred_to_referral = self.referred_to_referral.write().await;
        referred_to_referral.insert(referral.referred.clone(), referral.id.clone());

        Ok(())
    }

    async fn list_referrals_by_referrer(&self, referrer: &str) -> LedgerResult<Vec<Referral>> {
        let referrals = self.referrals.read().await;
        Ok(referrals
            .values()
            .filter(|r| r.referrer == referrer)
            .cloned()
            .collect())
    }

    // ==================== Milestones ====================

    async fn get_milestones(&self, user: &str) -> LedgerResult<Option<MilestoneRecord>> {
        let milestones = self.milestones.read().await;
        Ok(milestones.get(user).cloned())
    }

    async fn save_milestones(&self, record: &MilestoneRecord) -> LedgerResult<()> {
        let mut milestones = self.milestones.write().await;
        milestones.insert(record.user.clone(), record.clone());
        Ok(())
    }

    // ==================== Withdrawals ====================

    async fn get_withdrawal(&self, withdrawal_id: &str) -> LedgerResult<Option<Withdrawal>> {
        let withdrawals = self.withdrawals.read().await;
        Ok(withdrawals.get(withdrawal_id).cloned())
    }

    async fn save_withdrawal(&self, withdrawal: &Withdrawal) -> LedgerResult<()> {
        let mut withdrawals = self.withdrawals.write().await;
        withdrawals.insert(withdrawal.id.clone(), withdrawal.clone());
        Ok(())
    }

    async fn list_pending_withdrawals(&self) -> LedgerResult<Vec<Withdrawal>> {
        let withdrawals = self.withdrawals.read().await;
        Ok(withdrawals
            .values()
            .filter(|w| w.status == WithdrawalStatus::Pending)
            .cloned()
            .collect())
    }

    // ==================== Aggregates ====================

    async fn stats(&self) -> LedgerResult<StoreStats> {
        let wallets = self.wallets.read().await;
        let plans = self.plans.read().await;
        let referrals = self.referrals.read().await;
        let withdrawals = self.withdrawals.read().await;

        let active: Vec<_> = plans
            .values()
            .filter(|p| p.status == PlanStatus::Active)
            .collect();

        Ok(StoreStats {
            wallets: wallets.len() as u64,
            active_plans: active.len() as u64,
            daily_profit: active.iter().map(|p| p.daily_return).sum(),
            pending_withdrawals: withdrawals
                .values()
                .filter(|w| w.status == WithdrawalStatus::Pending)
                .count() as u64,
            total_paid_out: withdrawals
                .values()
                .filter(|w| w.status == WithdrawalStatus::Completed)
                .map(|w| w.amount)
                .sum(),
            settled_referrals: referrals.values().filter(|r| r.bonus_paid).count() as u64,
        })
    }
}
