//! Sled-backed persistent store
//!
//! One tree per record type plus two lookup index trees. Values are
//! serde_json; keys are the record's natural key bytes.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;

use wallet_core::types::common::UserId;
use wallet_core::{
    AccountProfile, LedgerError, LedgerResult, MilestoneRecord, Plan, PlanStatus, Referral,
    Wallet, Withdrawal, WithdrawalStatus,
};

use super::{LedgerStore, StorageConfig, StoreStats};

const WALLETS_TREE: &str = "wallets";
const PROFILES_TREE: &str = "profiles";
const PLANS_TREE: &str = "plans";
const REFERRALS_TREE: &str = "referrals";
const MILESTONES_TREE: &str = "milestones";
const WITHDRAWALS_TREE: &str = "withdrawals";
const CODE_INDEX_TREE: &str = "code_to_user";
const REFERRED_INDEX_TREE: &str = "referred_to_referral";

/// Embedded persistent store
#[derive(Debug, Clone)]
pub struct SledStore {
    db: sled::Db,
    wallets: sled::Tree,
    profiles: sled::Tree,
    plans: sled::Tree,
    referrals: sled::Tree,
    milestones: sled::Tree,
    withdrawals: sled::Tree,
    code_to_user: sled::Tree,
    referred_to_referral: sled::Tree,
}

impl SledStore {
    /// Open using a storage configuration
    pub fn new(config: &StorageConfig) -> LedgerResult<Self> {
        Self::open(&config.data_dir)
    }

    /// Open or create the database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> LedgerResult<Self> {
        let db = sled::open(path)
            .map_err(|e| LedgerError::Storage(format!("Failed to open sled db: {}", e)))?;

        let open_tree = |name: &str| {
            db.open_tree(name)
                .map_err(|e| LedgerError::Storage(format!("Failed to open {} tree: {}", name, e)))
        };

        let wallets = open_tree(WALLETS_TREE)?;
        let profiles = open_tree(PROFILES_TREE)?;
        let plans = open_tree(PLANS_TREE)?;
        let referrals = open_tree(REFERRALS_TREE)?;
        let milestones = open_tree(MILESTONES_TREE)?;
        let withdrawals = open_tree(WITHDRAWALS_TREE)?;
        let code_to_user = open_tree(CODE_INDEX_TREE)?;
        let referred_to_referral = open_tree(REFERRED_INDEX_TREE)?;

        Ok(Self {
            db,
            wallets,
            profiles,
            plans,
            referrals,
            milestones,
            withdrawals,
            code_to_user,
            referred_to_referral,
        })
    }

    /// Flush all pending writes to disk
    pub fn flush(&self) -> LedgerResult<()> {
        self.db
            .flush()
            .map_err(|e| LedgerError::Storage(format!("Failed to flush db: {}", e)))?;
        Ok(())
    }

    fn serialize<T: Serialize>(value: &T) -> LedgerResult<Vec<u8>> {
        serde_json::to_vec(value).map_err(|e| LedgerError::Serialization(e.to_string()))
    }

    fn deserialize<T: DeserializeOwned>(bytes: &[u8]) -> LedgerResult<T> {
        serde_json::from_slice(bytes).map_err(|e| LedgerError::Serialization(e.to_string()))
    }

    fn put<T: Serialize>(tree: &sled::Tree, key: &str, value: &T) -> LedgerResult<()> {
        let bytes = Self::serialize(value)?;
        tree.insert(key.as_bytes(), bytes)
            .map_err(|e| LedgerError::Storage(format!("Failed to write record: {}", e)))?;
        Ok(())
    }

    fn get<T: DeserializeOwned>(tree: &sled::Tree, key: &str) -> LedgerResult<Option<T>> {
        match tree
            .get(key.as_bytes())
            .map_err(|e| LedgerError::Storage(format!("Failed to read record: {}", e)))?
        {
            Some(bytes) => Ok(Some(Self::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    fn scan<T: DeserializeOwned>(tree: &sled::Tree) -> LedgerResult<Vec<T>> {
        let mut records = Vec::new();
        for entry in tree.iter() {
            let (_, bytes) =
                entry.map_err(|e| LedgerError::Storage(format!("Failed to scan tree: {}", e)))?;
            records.push(Self::deserialize(&bytes)?);
        }
        Ok(records)
    }
}

#[async_trait]
impl LedgerStore for SledStore {
    // ==================== Wallets ====================

    async fn get_wallet(&self, user: &str) -> LedgerResult<Option<Wallet>> {
        Self::get(&self.wallets, user)
    }

    async fn save_wallet(&self, wallet: &Wallet) -> LedgerResult<()> {
        Self::put(&self.wallets, &wallet.user, wallet)
    }

    // ==================== Account profiles ====================

    async fn get_profile(&self, user: &str) -> LedgerResult<Option<AccountProfile>> {
        Self::get(&self.profiles, user)
    }

    async fn save_profile(&self, profile: &AccountProfile) -> LedgerResult<()> {
        Self::put(&self.profiles, &profile.user, profile)?;

        if let Some(code) = &profile.referral_code {
            self.code_to_user
                .insert(code.as_bytes(), profile.user.as_bytes())
                .map_err(|e| LedgerError::Storage(format!("Failed to index code: {}", e)))?;
        }

        Ok(())
    }

    async fn find_user_by_code(&self, code: &str) -> LedgerResult<Option<UserId>> {
        match self
            .code_to_user
            .get(code.as_bytes())
            .map_err(|e| LedgerError::Storage(format!("Failed to read code index: {}", e)))?
        {
            Some(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            None => Ok(None),
        }
    }

    // ==================== Plans ====================

    async fn get_plan(&self, plan_id: &str) -> LedgerResult<Option<Plan>> {
        Self::get(&self.plans, plan_id)
    }

    async fn save_plan(&self, plan: &Plan) -> LedgerResult<()> {
        Self::put(&self.plans, &plan.id, plan)
    }

    async fn list_plans_by_user(&self, user: &str) -> LedgerResult<Vec<Plan>> {
        let all: Vec<Plan> = Self::scan(&self.plans)?;
        Ok(all.into_iter().filter(|p| p.user == user).collect())
    }

    async fn list_active_plans(&self) -> LedgerResult<Vec<Plan>> {
        let all: Vec<Plan> = Self::scan(&self.plans)?;
        Ok(all
            .into_iter()
            .filter(|p| p.status == PlanStatus::Active)
            .collect())
    }

    // ==================== Referrals ====================

    async fn get_referral_by_referred(&self, referred: &str) -> LedgerResult<Option<Referral>> {
        let referral_id = match self
            .referred_to_referral
            .get(referred.as_bytes())
            .map_err(|e| LedgerError::Storage(format!("Failed to read referral index: {}", e)))?
        {
            Some(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            None => return Ok(None),
        };
        Self::get(&self.referrals, &referral_id)
    }

    async fn save_referral(&self, referral: &Referral) -> LedgerResult<()> {
        Self::put(&self.referrals, &referral.id, referral)?;
        self.referred_to_referral
            .insert(referral.referred.as_bytes(), referral.id.as_bytes())
            .map_err(|e| LedgerError::Storage(format!("Failed to index referral: {}", e)))?;
        Ok(())
    }

    async fn list_referrals_by_referrer(&self, referrer: &str) -> LedgerResult<Vec<Referral>> {
        let all: Vec<Referral> = Self::scan(&self.referrals)?;
        Ok(all.into_iter().filter(|r| r.referrer == referrer).collect())
    }

    // ==================== Milestones ====================

    async fn get_milestones(&self, user: &str) -> LedgerResult<Option<MilestoneRecord>> {
        Self::get(&self.milestones, user)
    }

    async fn save_milestones(&self, record: &MilestoneRecord) -> LedgerResult<()> {
        Self::put(&self.milestones, &record.user, record)
    }

    // ==================== Withdrawals ====================

    async fn get_withdrawal(&self, withdrawal_id: &str) -> LedgerResult<Option<Withdrawal>> {
        Self::get(&self.withdrawals, withdrawal_id)
    }

    async fn save_withdrawal(&self, withdrawal: &Withdrawal) -> LedgerResult<()> {
        Self::put(&self.withdrawals, &withdrawal.id, withdrawal)
    }

    async fn list_pending_withdrawals(&self) -> LedgerResult<Vec<Withdrawal>> {
        let all: Vec<Withdrawal> = Self::scan(&self.withdrawals)?;
        Ok(all
            .into_iter()
            .filter(|w| w.status == WithdrawalStatus::Pending)
            .collect())
    }

    // ==================== Aggregates ====================

    async fn stats(&self) -> LedgerResult<StoreStats> {
        let plans: Vec<Plan> = Self::scan(&self.plans)?;
        let referrals: Vec<Referral> = Self::scan(&self.referrals)?;
        let withdrawals: Vec<Withdrawal> = Self::scan(&self.withdrawals)?;

        let active: Vec<_> = plans
            .iter()
            .filter(|p| p.status == PlanStatus::Active)
            .collect();

        Ok(StoreStats {
            wallets: self.wallets.len() as u64,
            active_plans: active.len() as u64,
            daily_profit: active.iter().map(|p| p.daily_return).sum(),
            pending_withdrawals: withdrawals
                .iter()
                .filter(|w| w.status == WithdrawalStatus::Pending)
                .count() as u64,
            total_paid_out: withdrawals
                .iter()
                .filter(|w| w.status == WithdrawalStatus::Completed)
                .map(|w| w.amount)
                .sum(),
            settled_referrals: referrals.iter().filter(|r| r.bonus_paid).count() as u64,
        })
    }
}
