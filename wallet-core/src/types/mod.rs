//! Domain record types
//!
//! The persisted record types, the embedded transaction log and the view
//! structs derived from them.

pub mod common;
pub mod milestone;
pub mod plan;
pub mod referral;
pub mod wallet;
pub mod withdrawal;

pub use milestone::{MilestoneAward, MilestoneProgress, MilestoneRecord, MilestoneTier, TierProgress};
pub use plan::{Plan, PlanStatus};
pub use referral::{AccountProfile, Referral};
pub use wallet::{Transaction, TxKind, TxStatus, Wallet};
pub use withdrawal::{Withdrawal, WithdrawalStatus};
