//! Static investment plan catalog
//!
//! Read-only source of truth for purchase tier resolution. The catalog is
//! injectable so deployments can reprice without touching the engine; the
//! default matches the production tier table.

use serde::{Deserialize, Serialize};

/// One purchasable tier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanTier {
    pub id: u32,
    pub name: String,
    /// Purchase price in currency units
    pub price: u64,
    /// Credited per calendar day while the plan is Active
    pub daily_return: u64,
    /// Plan duration in days
    pub days: u32,
}

/// The fixed tier table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanCatalog {
    tiers: Vec<PlanTier>,
}

impl PlanCatalog {
    /// Build a catalog from an explicit tier list
    pub fn new(tiers: Vec<PlanTier>) -> Self {
        Self { tiers }
    }

    /// Look up a tier by id
    pub fn resolve(&self, tier_id: u32) -> Option<&PlanTier> {
        self.tiers.iter().find(|t| t.id == tier_id)
    }

    /// All tiers, in listing order
    pub fn tiers(&self) -> &[PlanTier] {
        &self.tiers
    }
}

impl Default for PlanCatalog {
    fn default() -> Self {
        let tier = |id, name: &str, price, daily_return, days| PlanTier {
            id,
            name: name.to_string(),
            price,
            daily_return,
            days,
        };
        Self {
            tiers: vec![
                tier(1, "Starter", 299, 20, 30),
                tier(2, "Basic", 499, 35, 30),
                tier(3, "Standard", 999, 60, 30),
                tier(4, "Premium", 1999, 120, 30),
                tier(5, "Gold", 3499, 200, 30),
                tier(6, "Platinum", 4999, 300, 30),
                tier(7, "Diamond", 9999, 500, 30),
            ],
        }
    }
}
