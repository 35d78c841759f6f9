//! Ledger operations
//!
//! Each submodule implements one operation flow against the shared
//! [`LedgerOps`] context: wallet read, plan purchase (with the referral
//! bonus cascade), withdrawal lifecycle and the daily accrual pass. The
//! context owns the store, catalog, policy config, clock, per-user locks
//! and metrics; operations borrow it and stay free of global state.

pub mod accrual;
pub mod purchase;
pub mod referral;
pub mod wallet;
pub mod withdraw;

use std::sync::Arc;

use wallet_core::PlanCatalog;

use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::locks::UserLocks;
use crate::metrics::EngineMetrics;
use crate::storage::LedgerStore;

/// Shared context for all operation flows
pub struct LedgerOps<S: LedgerStore> {
    store: Arc<S>,
    catalog: PlanCatalog,
    config: EngineConfig,
    clock: Arc<dyn Clock>,
    locks: UserLocks,
    metrics: Arc<EngineMetrics>,
}

impl<S: LedgerStore> LedgerOps<S> {
    pub fn new(
        store: Arc<S>,
        catalog: PlanCatalog,
        config: EngineConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            catalog,
            config,
            clock,
            locks: UserLocks::new(),
            metrics: Arc::new(EngineMetrics::new()),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn catalog(&self) -> &PlanCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn locks(&self) -> &UserLocks {
        &self.locks
    }

    pub fn metrics(&self) -> &Arc<EngineMetrics> {
        &self.metrics
    }
}
