//! Wallet Ledger Core
//!
//! Domain layer for the wallet ledger and earnings-accrual engine:
//!
//! - **Record types**: `Wallet` with its embedded `Transaction` log, `Plan`,
//!   `Referral`, `MilestoneRecord`, `Withdrawal`, and the engine-owned
//!   `AccountProfile` slice of the external user record.
//! - **Balance derivation**: [`Wallet::recompute`] is the authoritative
//!   definition of `total_earnings` / `balance` / `withdrawable`; the stored
//!   fields are a cache of it and are overwritten on every wallet read.
//! - **Plan catalog**: the static investment tier table consumed by the
//!   purchase processor.
//! - **Policy constants**: referral bonus, milestone thresholds, withdrawal
//!   minimum, referral-code shape.
//! - **Error taxonomy**: [`LedgerError`] / [`LedgerResult`].
//!
//! This crate is pure data and rules; persistence, scheduling and the
//! operation flows live in `wallet-engine`.

pub mod catalog;
pub mod constants;
pub mod error;
pub mod types;

pub use catalog::{PlanCatalog, PlanTier};
pub use error::{LedgerError, LedgerResult};
pub use types::{
    AccountProfile, MilestoneAward, MilestoneProgress, MilestoneRecord, MilestoneTier, Plan,
    PlanStatus, Referral, TierProgress, Transaction, TxKind, TxStatus, Wallet, Withdrawal,
    WithdrawalStatus,
};
pub use types::common::{generate_record_id, PlanId, ReferralId, TransactionId, UserId, WithdrawalId};
