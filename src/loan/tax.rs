//! Transaction tax (IOF-style) on financed amounts

use serde::{Deserialize, Serialize};

/// Daily accrual rate applied per day of the loan
pub const DAILY_TAX_RATE: f64 = 0.000082;

/// Flat rate applied once on the principal
pub const FLAT_TAX_RATE: f64 = 0.0038;

/// Days accrue at 30 per period up to this cap
pub const MAX_TAX_DAYS: u32 = 365;

/// Breakdown of the transaction tax for a loan
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxResult {
    pub days: u32,
    pub daily_component: f64,
    pub flat_component: f64,
    pub total: f64,
}

/// Tax owed on `principal` financed over `num_periods` monthly periods
pub fn calculate_transaction_tax(principal: f64, num_periods: u32) -> TaxResult {
    let days = num_periods.saturating_mul(30).min(MAX_TAX_DAYS);
    let daily_component = principal * DAILY_TAX_RATE * days as f64;
    let flat_component = principal * FLAT_TAX_RATE;

    TaxResult {
        days,
        daily_component,
        flat_component,
        total: daily_component + flat_component,
    }
}
