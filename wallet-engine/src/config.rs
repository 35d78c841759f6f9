//! Engine configuration
//!
//! Policy knobs for the operation modules and the background scheduler.
//! Supports loading from environment variables with the WALLET_ prefix.

use serde::{Deserialize, Serialize};
use std::env;

use wallet_core::constants::{MIN_WITHDRAWAL, REFERRAL_CODE_MAX_ATTEMPTS};

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Minimum withdrawal amount (currency units)
    #[serde(default = "default_min_withdrawal")]
    pub min_withdrawal: u64,
    /// Collision-checked referral code generation attempts
    #[serde(default = "default_code_attempts")]
    pub referral_code_attempts: u32,
    /// Background accrual tick interval in seconds. Any frequency is safe;
    /// the per-plan date guard supplies the once-per-day semantics.
    #[serde(default = "default_accrual_interval")]
    pub accrual_interval_secs: u64,
}

fn default_min_withdrawal() -> u64 {
    MIN_WITHDRAWAL
}

fn default_code_attempts() -> u32 {
    REFERRAL_CODE_MAX_ATTEMPTS
}

fn default_accrual_interval() -> u64 {
    3600
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_withdrawal: default_min_withdrawal(),
            referral_code_attempts: default_code_attempts(),
            accrual_interval_secs: default_accrual_interval(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - WALLET_MIN_WITHDRAWAL: minimum withdrawal amount
    /// - WALLET_CODE_ATTEMPTS: referral code generation attempts
    /// - WALLET_ACCRUAL_INTERVAL_SECS: scheduler tick interval
    pub fn from_env() -> Self {
        Self {
            min_withdrawal: env::var("WALLET_MIN_WITHDRAWAL")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_min_withdrawal),
            referral_code_attempts: env::var("WALLET_CODE_ATTEMPTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_code_attempts),
            accrual_interval_secs: env::var("WALLET_ACCRUAL_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_accrual_interval),
        }
    }

    /// Create a development configuration (fast scheduler ticks)
    pub fn development() -> Self {
        Self {
            accrual_interval_secs: 5,
            ..Self::default()
        }
    }
}
