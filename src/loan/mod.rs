//! Amortization engine, transaction tax and effective rate solver

mod params;
mod schedule;
mod engine;
mod tax;
pub mod effective_rate;

pub use params::{LoanParameters, AmortizationSystem};
pub use schedule::{AmortizationRow, AmortizationSchedule, ScheduleSummary};
pub use engine::{
    calculate_installment, generate_fixed_installment_schedule, generate_constant_amortization_schedule,
    total_paid, total_interest, outstanding_balance, simulate_full_financing, simulate, FinancingResult,
};
pub use tax::{calculate_transaction_tax, TaxResult};
pub use effective_rate::{solve_effective_rate, effective_rate_for_financing, EffectiveRateResult};
