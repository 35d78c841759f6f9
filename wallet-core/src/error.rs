//! Error types for the wallet ledger
//!
//! One taxonomy shared by the domain and engine layers. Validation errors
//! surface to the caller with no partial side effects; `Storage` and
//! `Serialization` wrap infrastructure failures.

use thiserror::Error;

/// Ledger operation errors
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Unknown plan tier id
    #[error("Invalid plan tier: {0}")]
    InvalidPlan(u32),

    /// Withdrawal exceeds the withdrawable balance
    #[error("Insufficient withdrawable balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: u64, available: u64 },

    /// Non-positive or otherwise unusable amount
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Amount under the policy minimum for a withdrawal request
    #[error("Amount below minimum withdrawal of {minimum}")]
    BelowMinimum { minimum: u64 },

    /// Withdrawal already resolved; Pending is the only actionable state
    #[error("Withdrawal already processed: {0}")]
    AlreadyProcessed(String),

    /// Missing ledger/plan/withdrawal/referral record
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Referral code generation retries exceeded
    #[error("Unable to generate unique referral code after {attempts} attempts")]
    ReferralCodeExhausted { attempts: u32 },

    /// Underlying storage failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Record (de)serialization failure
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
