//! Wallet record and the authoritative balance derivation
//!
//! One wallet per user, created lazily on first access. The embedded
//! transaction log is the source of truth; `total_earnings`, `balance` and
//! `withdrawable` are a denormalized cache that [`Wallet::recompute`]
//! overwrites on every read so stored drift self-heals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::{generate_record_id, PlanId, TransactionId, UserId, WithdrawalId};

/// Transaction kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxKind {
    /// Daily return credited by the accrual scheduler
    Earning,
    /// Debit for a payout request
    Withdrawal,
    /// Administrative credit returning funds
    Refund,
    /// First-purchase bonus credited to a referrer
    Referral,
    /// Referral-count tier bonus
    ReferralMilestone,
}

/// Transaction status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxStatus {
    /// Reserved but not finalized (withdrawal requests only)
    Pending,
    /// Reflected in the derived balances
    Completed,
    /// Terminal; ignored by derivation
    Rejected,
}

/// One entry in a wallet's transaction log. Immutable once `Completed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub kind: TxKind,
    /// Positive amount in currency units
    pub amount: u64,
    pub date: DateTime<Utc>,
    pub status: TxStatus,
    /// Originating plan, for Earning entries
    pub plan_id: Option<PlanId>,
    /// Linked withdrawal record, for Withdrawal entries
    pub withdrawal_id: Option<WithdrawalId>,
}

impl Transaction {
    /// Completed earning credited from a plan's daily return
    pub fn earning(amount: u64, plan_id: PlanId, date: DateTime<Utc>) -> Self {
        Self {
            id: generate_record_id(),
            kind: TxKind::Earning,
            amount,
            date,
            status: TxStatus::Completed,
            plan_id: Some(plan_id),
            withdrawal_id: None,
        }
    }

    /// Completed referral bonus credit
    pub fn referral_bonus(amount: u64, date: DateTime<Utc>) -> Self {
        Self {
            id: generate_record_id(),
            kind: TxKind::Referral,
            amount,
            date,
            status: TxStatus::Completed,
            plan_id: None,
            withdrawal_id: None,
        }
    }

    /// Completed milestone tier bonus credit
    pub fn milestone_bonus(amount: u64, date: DateTime<Utc>) -> Self {
        Self {
            id: generate_record_id(),
            kind: TxKind::ReferralMilestone,
            amount,
            date,
            status: TxStatus::Completed,
            plan_id: None,
            withdrawal_id: None,
        }
    }

    /// Pending debit reserving funds for a withdrawal request
    pub fn pending_withdrawal(amount: u64, withdrawal_id: WithdrawalId, date: DateTime<Utc>) -> Self {
        Self {
            id: generate_record_id(),
            kind: TxKind::Withdrawal,
            amount,
            date,
            status: TxStatus::Pending,
            plan_id: None,
            withdrawal_id: Some(withdrawal_id),
        }
    }
}

/// Per-user ledger record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    /// Owning user; unique per wallet
    pub user: UserId,
    /// Lifetime sum of completed credits
    pub total_earnings: u64,
    /// Current net position
    pub balance: u64,
    /// Portion eligible for payout (pending requests already reserved out)
    pub withdrawable: u64,
    /// Append-only transaction log, oldest first
    pub transactions: Vec<Transaction>,
}

impl Wallet {
    /// Create a zeroed wallet for a user
    pub fn new(user: UserId) -> Self {
        Self {
            user,
            total_earnings: 0,
            balance: 0,
            withdrawable: 0,
            transactions: Vec::new(),
        }
    }

    /// Recompute the derived balances from the transaction log.
    ///
    /// This is the authoritative definition of the wallet's numeric state:
    /// - Completed Earning/Referral/ReferralMilestone entries add to
    ///   `total_earnings`, `balance` and `withdrawable`
    /// - Completed Withdrawal entries subtract from `balance` and
    ///   `withdrawable`
    /// - Completed Refund entries add to `balance` and `withdrawable`
    /// - Pending Withdrawal entries subtract from `withdrawable` only
    ///   (reserved at request time; `balance` is untouched until approval)
    /// - Rejected entries are ignored
    ///
    /// Subtraction saturates at zero, so `withdrawable` can never go
    /// negative even when externally-mutated records leave the log skewed.
    pub fn recompute(&mut self) {
        let mut total_earnings: u64 = 0;
        let mut balance: u64 = 0;
        let mut withdrawable: u64 = 0;

        for tx in &self.transactions {
            match tx.status {
                TxStatus::Completed => match tx.kind {
                    TxKind::Earning | TxKind::Referral | TxKind::ReferralMilestone => {
                        total_earnings = total_earnings.saturating_add(tx.amount);
                        balance = balance.saturating_add(tx.amount);
                        withdrawable = withdrawable.saturating_add(tx.amount);
                    }
                    TxKind::Withdrawal => {
                        balance = balance.saturating_sub(tx.amount);
                        withdrawable = withdrawable.saturating_sub(tx.amount);
                    }
                    TxKind::Refund => {
                        balance = balance.saturating_add(tx.amount);
                        withdrawable = withdrawable.saturating_add(tx.amount);
                    }
                },
                TxStatus::Pending => {
                    if tx.kind == TxKind::Withdrawal {
                        withdrawable = withdrawable.saturating_sub(tx.amount);
                    }
                }
                TxStatus::Rejected => {}
            }
        }

        self.total_earnings = total_earnings;
        self.balance = balance;
        self.withdrawable = withdrawable;
    }

    /// Append an entry and refresh the derived balances
    pub fn append(&mut self, tx: Transaction) {
        self.transactions.push(tx);
        self.recompute();
    }

    /// Find the log entry linked to a withdrawal record
    pub fn transaction_for_withdrawal_mut(&mut self, withdrawal_id: &str) -> Option<&mut Transaction> {
        self.transactions
            .iter_mut()
            .find(|t| t.withdrawal_id.as_deref() == Some(withdrawal_id))
    }
}
