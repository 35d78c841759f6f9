//! Withdrawal requests
//!
//! Two-phase lifecycle: `Pending` at request time, then exactly one of
//! `Completed` (approve) or `Rejected` (reject). Both resolutions are
//! terminal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_PAYMENT_METHOD;
use crate::error::{LedgerError, LedgerResult};

use super::common::{generate_record_id, UserId, WithdrawalId};

/// Withdrawal lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WithdrawalStatus {
    Pending,
    Completed,
    Rejected,
}

/// A payout request against a wallet's withdrawable balance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Withdrawal {
    pub id: WithdrawalId,
    pub user: UserId,
    pub amount: u64,
    pub request_date: DateTime<Utc>,
    /// Stamped when the request is approved or rejected
    pub processed_date: Option<DateTime<Utc>>,
    pub status: WithdrawalStatus,
    pub payment_method: String,
    pub payment_details: Option<String>,
}

impl Withdrawal {
    /// Create a Pending request
    pub fn new(
        user: UserId,
        amount: u64,
        requested_at: DateTime<Utc>,
        payment_method: Option<String>,
        payment_details: Option<String>,
    ) -> Self {
        Self {
            id: generate_record_id(),
            user,
            amount,
            request_date: requested_at,
            processed_date: None,
            status: WithdrawalStatus::Pending,
            payment_method: payment_method.unwrap_or_else(|| DEFAULT_PAYMENT_METHOD.to_string()),
            payment_details,
        }
    }

    /// Finalize the payout. Only valid from `Pending`.
    pub fn approve(&mut self, processed_at: DateTime<Utc>) -> LedgerResult<()> {
        if self.status != WithdrawalStatus::Pending {
            return Err(LedgerError::AlreadyProcessed(self.id.clone()));
        }
        self.status = WithdrawalStatus::Completed;
        self.processed_date = Some(processed_at);
        Ok(())
    }

    /// Decline the payout and release the reservation. Only valid from
    /// `Pending`.
    pub fn reject(&mut self, processed_at: DateTime<Utc>) -> LedgerResult<()> {
        if self.status != WithdrawalStatus::Pending {
            return Err(LedgerError::AlreadyProcessed(self.id.clone()));
        }
        self.status = WithdrawalStatus::Rejected;
        self.processed_date = Some(processed_at);
        Ok(())
    }
}
