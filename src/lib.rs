//! Financing Calculator - amortization, transaction tax, CET and auto insurance engine
//!
//! This library provides:
//! - Price (fixed installment) and SAC (constant amortization) schedules
//! - Transaction tax on financed amounts
//! - Effective rate (CET) solving by Newton-Raphson
//! - Rule-based auto insurance premiums
//! - Scenario helpers (system comparison, payoff, affordability, down payment, refinancing)
//! - A JSON request/response contract for the HTTP surface

pub mod error;
pub mod loan;
pub mod insurance;
pub mod assumptions;
pub mod scenario;
pub mod service;

// Re-export commonly used types
pub use error::{CalcError, CalcResult};
pub use loan::{
    simulate_full_financing, solve_effective_rate, AmortizationSchedule, AmortizationSystem, FinancingResult,
    LoanParameters,
};
pub use insurance::{quote_premium, InsuranceQuote, PremiumResult};
pub use assumptions::Assumptions;
