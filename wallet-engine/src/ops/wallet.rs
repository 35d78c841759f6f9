//! Wallet read path
//!
//! Wallets are created lazily on first access. Every read recomputes the
//! derived balances from the transaction log and persists the result, so
//! any drift in the stored denormalized fields heals on the next fetch.

use serde::{Deserialize, Serialize};

use wallet_core::{LedgerResult, Transaction, Wallet};

use crate::storage::LedgerStore;

use super::LedgerOps;

/// Wallet state as exposed to callers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletView {
    pub total_earnings: u64,
    pub balance: u64,
    pub withdrawable: u64,
    pub transactions: Vec<Transaction>,
}

impl From<Wallet> for WalletView {
    fn from(wallet: Wallet) -> Self {
        Self {
            total_earnings: wallet.total_earnings,
            balance: wallet.balance,
            withdrawable: wallet.withdrawable,
            transactions: wallet.transactions,
        }
    }
}

/// Fetch a user's wallet, creating a zeroed one if absent
pub async fn fetch<S: LedgerStore>(ops: &LedgerOps<S>, user_id: &str) -> LedgerResult<WalletView> {
    let _guard = ops.locks().acquire(user_id).await;

    let mut wallet = load_or_create(ops, user_id).await?;
    wallet.recompute();
    ops.store().save_wallet(&wallet).await?;

    Ok(WalletView::from(wallet))
}

/// Load a wallet or start a zeroed one. Caller must hold the user's lock
/// if it intends to mutate and persist the result.
pub(crate) async fn load_or_create<S: LedgerStore>(
    ops: &LedgerOps<S>,
    user_id: &str,
) -> LedgerResult<Wallet> {
    Ok(ops
        .store()
        .get_wallet(user_id)
        .await?
        .unwrap_or_else(|| Wallet::new(user_id.to_string())))
}
