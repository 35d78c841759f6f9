//! Shared identifier types and id generation

use sha2::{Digest as Sha2Digest, Sha256};

/// Opaque externally-supplied user identifier (issued by the auth collaborator)
pub type UserId = String;

/// Plan record identifier
pub type PlanId = String;

/// Withdrawal record identifier
pub type WithdrawalId = String;

/// Referral edge identifier
pub type ReferralId = String;

/// Embedded transaction entry identifier
pub type TransactionId = String;

/// Generate a unique record id
///
/// Hex-encoded SHA-256 over wall-clock nanoseconds, process id and thread
/// id. Collision-free in practice without pulling in an RNG.
pub fn generate_record_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let mut hasher = Sha256::new();

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    hasher.update(timestamp.to_le_bytes());

    hasher.update(std::process::id().to_le_bytes());

    let thread_id = format!("{:?}", std::thread::current().id());
    hasher.update(thread_id.as_bytes());

    hex::encode(hasher.finalize())
}

/// Raw entropy for referral-code generation; same sources as
/// [`generate_record_id`] but returned as bytes so the caller can map them
/// onto a restricted alphabet.
pub fn generate_entropy() -> [u8; 32] {
    use std::time::{SystemTime, UNIX_EPOCH};

    let mut hasher = Sha256::new();

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    hasher.update(timestamp.to_le_bytes());
    hasher.update(std::process::id().to_le_bytes());

    let thread_id = format!("{:?}", std::thread::current().id());
    hasher.update(thread_id.as_bytes());

    let result = hasher.finalize();
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&result);
    bytes
}
