//! Withdrawal lifecycle
//!
//! `request` reserves the amount out of `withdrawable` immediately and
//! leaves `balance` untouched; `approve` finalizes the debit against
//! `balance`; `reject` releases the reservation. All three re-read state
//! before acting and resolve the wallet through the derivation rule rather
//! than ad hoc field arithmetic.

use tracing::{info, warn};

use wallet_core::{LedgerError, LedgerResult, Transaction, TxStatus, Withdrawal};

use crate::storage::LedgerStore;

use super::{wallet, LedgerOps};

/// Request a withdrawal against the user's withdrawable balance
pub async fn request<S: LedgerStore>(
    ops: &LedgerOps<S>,
    user_id: &str,
    amount: u64,
    payment_method: Option<String>,
    payment_details: Option<String>,
) -> LedgerResult<Withdrawal> {
    if amount == 0 {
        return Err(LedgerError::InvalidAmount(
            "withdrawal amount must be positive".to_string(),
        ));
    }
    if amount < ops.config().min_withdrawal {
        return Err(LedgerError::BelowMinimum {
            minimum: ops.config().min_withdrawal,
        });
    }

    let _guard = ops.locks().acquire(user_id).await;

    let mut wallet = wallet::load_or_create(ops, user_id).await?;
    wallet.recompute();

    if amount > wallet.withdrawable {
        return Err(LedgerError::InsufficientBalance {
            requested: amount,
            available: wallet.withdrawable,
        });
    }

    let withdrawal = Withdrawal::new(
        user_id.to_string(),
        amount,
        ops.clock().now(),
        payment_method,
        payment_details,
    );
    ops.store().save_withdrawal(&withdrawal).await?;

    // Reserve the funds: the Pending entry pulls `amount` out of
    // `withdrawable` through the derivation rule; `balance` is untouched
    wallet.append(Transaction::pending_withdrawal(
        amount,
        withdrawal.id.clone(),
        withdrawal.request_date,
    ));
    ops.store().save_wallet(&wallet).await?;

    ops.metrics().withdrawal_requested();
    info!(
        user_id,
        withdrawal_id = %withdrawal.id,
        amount,
        "withdrawal requested"
    );

    Ok(withdrawal)
}

/// Approve a pending withdrawal, finalizing the debit
pub async fn approve<S: LedgerStore>(
    ops: &LedgerOps<S>,
    withdrawal_id: &str,
) -> LedgerResult<Withdrawal> {
    resolve(ops, withdrawal_id, Resolution::Approve).await
}

/// Reject a pending withdrawal, returning the reserved amount
pub async fn reject<S: LedgerStore>(
    ops: &LedgerOps<S>,
    withdrawal_id: &str,
) -> LedgerResult<Withdrawal> {
    resolve(ops, withdrawal_id, Resolution::Reject).await
}

#[derive(Clone, Copy)]
enum Resolution {
    Approve,
    Reject,
}

async fn resolve<S: LedgerStore>(
    ops: &LedgerOps<S>,
    withdrawal_id: &str,
    resolution: Resolution,
) -> LedgerResult<Withdrawal> {
    // First read only locates the owner so the right lock can be taken
    let owner = ops
        .store()
        .get_withdrawal(withdrawal_id)
        .await?
        .ok_or_else(|| LedgerError::NotFound(format!("withdrawal {}", withdrawal_id)))?
        .user;

    let _guard = ops.locks().acquire(&owner).await;

    // Re-read under the lock; admin overrides may have resolved it already
    let mut withdrawal = ops
        .store()
        .get_withdrawal(withdrawal_id)
        .await?
        .ok_or_else(|| LedgerError::NotFound(format!("withdrawal {}", withdrawal_id)))?;

    let now = ops.clock().now();
    let tx_status = match resolution {
        Resolution::Approve => {
            withdrawal.approve(now)?;
            TxStatus::Completed
        }
        Resolution::Reject => {
            withdrawal.reject(now)?;
            TxStatus::Rejected
        }
    };
    ops.store().save_withdrawal(&withdrawal).await?;

    let mut wallet = wallet::load_or_create(ops, &withdrawal.user).await?;
    match wallet.transaction_for_withdrawal_mut(&withdrawal.id) {
        Some(tx) => tx.status = tx_status,
        None => {
            // Linked entry missing (skewed external state); append one so
            // the derivation still reflects the resolved withdrawal
            warn!(
                withdrawal_id = %withdrawal.id,
                "no ledger entry linked to withdrawal; appending"
            );
            let mut tx =
                Transaction::pending_withdrawal(withdrawal.amount, withdrawal.id.clone(), now);
            tx.status = tx_status;
            wallet.transactions.push(tx);
        }
    }
    wallet.recompute();
    ops.store().save_wallet(&wallet).await?;

    match resolution {
        Resolution::Approve => {
            ops.metrics().withdrawal_approved();
            info!(
                user_id = %withdrawal.user,
                withdrawal_id = %withdrawal.id,
                amount = withdrawal.amount,
                "withdrawal approved"
            );
        }
        Resolution::Reject => {
            ops.metrics().withdrawal_rejected();
            info!(
                user_id = %withdrawal.user,
                withdrawal_id = %withdrawal.id,
                amount = withdrawal.amount,
                "withdrawal rejected"
            );
        }
    }

    Ok(withdrawal)
}
