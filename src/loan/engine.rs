//! Amortization engine: installment formula, Price and SAC schedules, full financing simulation

use log::debug;
use serde::{Deserialize, Serialize};

use super::params::{validate_terms, AmortizationSystem, LoanParameters};
use super::schedule::{AmortizationRow, AmortizationSchedule};
use super::tax::calculate_transaction_tax;
use crate::error::{CalcError, CalcResult};

/// Fixed installment of an annuity (Price table)
///
/// `P * r(1+r)^n / ((1+r)^n - 1)`, or `P / n` when the rate is zero.
pub fn calculate_installment(principal: f64, periodic_rate: f64, num_periods: u32) -> CalcResult<f64> {
    validate_terms(principal, periodic_rate, num_periods)?;

    if periodic_rate == 0.0 {
        return Ok(principal / num_periods as f64);
    }

    let growth = (1.0 + periodic_rate).powf(num_periods as f64);
    let installment = principal * (periodic_rate * growth) / (growth - 1.0);

    if !installment.is_finite() {
        return Err(CalcError::DegenerateInput(format!(
            "installment overflow for rate {} over {} periods",
            periodic_rate, num_periods
        )));
    }

    Ok(installment)
}

/// Price schedule: constant installment, interest shrinking every period
pub fn generate_fixed_installment_schedule(
    principal: f64,
    periodic_rate: f64,
    num_periods: u32,
) -> CalcResult<AmortizationSchedule> {
    let installment = calculate_installment(principal, periodic_rate, num_periods)?;

    let mut schedule = AmortizationSchedule::with_capacity(num_periods);
    schedule.add_row(AmortizationRow::opening(principal));

    let mut balance = principal;
    for period in 1..=num_periods {
        let interest = balance * periodic_rate;
        let principal_portion = installment - interest;
        balance = (balance - principal_portion).max(0.0);

        schedule.add_row(AmortizationRow {
            period,
            payment: installment,
            principal: principal_portion,
            interest,
            balance,
        });
    }

    debug!(
        "Price schedule: P={:.2} r={} n={} installment={:.2}",
        principal, periodic_rate, num_periods, installment
    );

    Ok(schedule)
}

/// SAC schedule: constant principal portion, payments decreasing every period
pub fn generate_constant_amortization_schedule(
    principal: f64,
    periodic_rate: f64,
    num_periods: u32,
) -> CalcResult<AmortizationSchedule> {
    validate_terms(principal, periodic_rate, num_periods)?;

    let amortization = principal / num_periods as f64;

    let mut schedule = AmortizationSchedule::with_capacity(num_periods);
    schedule.add_row(AmortizationRow::opening(principal));

    let mut balance = principal;
    for period in 1..=num_periods {
        let interest = balance * periodic_rate;
        let payment = amortization + interest;
        balance = (balance - amortization).max(0.0);

        schedule.add_row(AmortizationRow {
            period,
            payment,
            principal: amortization,
            interest,
            balance,
        });
    }

    debug!(
        "SAC schedule: P={:.2} r={} n={} amortization={:.2}",
        principal, periodic_rate, num_periods, amortization
    );

    Ok(schedule)
}

/// Total paid under a fixed installment
pub fn total_paid(installment: f64, num_periods: u32) -> f64 {
    installment * num_periods as f64
}

pub fn total_interest(total_paid: f64, principal: f64) -> f64 {
    total_paid - principal
}

/// Balance still owed on a Price loan after `elapsed` payments
///
/// `P * ((1+r)^n - (1+r)^p) / ((1+r)^n - 1)`
pub fn outstanding_balance(principal: f64, periodic_rate: f64, num_periods: u32, elapsed: u32) -> CalcResult<f64> {
    validate_terms(principal, periodic_rate, num_periods)?;
    if elapsed > num_periods {
        return Err(CalcError::invalid(
            "elapsedPeriods",
            format!("{} exceeds the loan term of {} periods", elapsed, num_periods),
        ));
    }

    if periodic_rate == 0.0 {
        return Ok(principal * (num_periods - elapsed) as f64 / num_periods as f64);
    }

    let growth_n = (1.0 + periodic_rate).powf(num_periods as f64);
    let growth_p = (1.0 + periodic_rate).powf(elapsed as f64);
    let balance = principal * (growth_n - growth_p) / (growth_n - 1.0);

    Ok(balance.max(0.0))
}

/// Outcome of a complete financing simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancingResult {
    pub system: AmortizationSystem,

    /// Fixed installment, or the first (largest) payment under SAC
    pub installment: f64,

    pub total_paid: f64,
    pub total_interest: f64,

    /// Principal actually financed, tax included when requested
    pub financed_principal: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_amount: Option<f64>,

    pub schedule: AmortizationSchedule,
}

/// Single entry point used by every financing calculator
pub fn simulate_full_financing(
    principal: f64,
    periodic_rate: f64,
    num_periods: u32,
    include_tax: bool,
    system: AmortizationSystem,
) -> CalcResult<FinancingResult> {
    validate_terms(principal, periodic_rate, num_periods)?;

    let tax_amount = if include_tax {
        Some(calculate_transaction_tax(principal, num_periods).total)
    } else {
        None
    };
    let financed_principal = principal + tax_amount.unwrap_or(0.0);

    let (installment, schedule, paid) = match system {
        AmortizationSystem::FixedInstallment => {
            let installment = calculate_installment(financed_principal, periodic_rate, num_periods)?;
            let schedule = generate_fixed_installment_schedule(financed_principal, periodic_rate, num_periods)?;
            (installment, schedule, total_paid(installment, num_periods))
        }
        AmortizationSystem::ConstantAmortization => {
            let schedule = generate_constant_amortization_schedule(financed_principal, periodic_rate, num_periods)?;
            let paid = schedule.total_paid();
            (schedule.first_payment(), schedule, paid)
        }
    };

    Ok(FinancingResult {
        system,
        installment,
        total_paid: paid,
        total_interest: total_interest(paid, financed_principal),
        financed_principal,
        tax_amount,
        schedule,
    })
}

/// Convenience wrapper over [`simulate_full_financing`]
pub fn simulate(params: &LoanParameters) -> CalcResult<FinancingResult> {
    simulate_full_financing(
        params.principal,
        params.periodic_rate,
        params.num_periods,
        params.include_tax,
        params.system,
    )
}
