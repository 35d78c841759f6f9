//! Policy Constants
//!
//! Centralized policy values for the ledger engine. All fixed bonus amounts,
//! thresholds and limits live here so the operation modules never carry
//! magic numbers.

// ============================================================================
// Referral bonuses
// ============================================================================

/// One-time bonus credited to the referrer on the referred user's first
/// plan purchase (currency units). Stamped into each `Referral` row at
/// creation so later policy changes do not retroactively reprice old rows.
pub const REFERRAL_BONUS: u64 = 200;

// ============================================================================
// Milestone tiers
// ============================================================================

/// Settled referrals required for the first milestone tier
pub const TIER1_TARGET: u64 = 10;

/// Bonus paid when the first milestone tier is reached (currency units)
pub const TIER1_BONUS: u64 = 750;

/// Settled referrals required for the second milestone tier
pub const TIER2_TARGET: u64 = 25;

/// Bonus paid when the second milestone tier is reached (currency units)
pub const TIER2_BONUS: u64 = 1500;

// ============================================================================
// Referral codes
// ============================================================================

/// Characters a referral code is drawn from
pub const REFERRAL_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Referral code length in characters
pub const REFERRAL_CODE_LENGTH: usize = 8;

/// Maximum collision-checked generation attempts before giving up
pub const REFERRAL_CODE_MAX_ATTEMPTS: u32 = 10;

// ============================================================================
// Withdrawals
// ============================================================================

/// Minimum withdrawal amount (currency units). Enforced at the request
/// boundary as policy, not as a ledger invariant.
pub const MIN_WITHDRAWAL: u64 = 100;

/// Payment method recorded when the requester does not name one
pub const DEFAULT_PAYMENT_METHOD: &str = "UPI";
