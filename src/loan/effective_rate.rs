//! Effective rate (CET) solver
//!
//! Finds the periodic rate at which a level installment stream is worth exactly
//! the amount the borrower actually received. Because financed fees and tax are
//! excluded from that amount, the effective rate sits above the contractual one.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::engine::FinancingResult;
use super::params::AmortizationSystem;
use crate::error::{CalcError, CalcResult};

/// Starting point of the Newton-Raphson search (2% per period)
pub const INITIAL_GUESS: f64 = 0.02;

/// Present value tolerance, in currency units
pub const TOLERANCE: f64 = 0.0001;

pub const MAX_ITERATIONS: u32 = 100;

/// Iterates that fall to or below zero are pushed back to this floor
pub const RATE_FLOOR: f64 = 0.001;

/// Outcome of the effective rate search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveRateResult {
    /// Periodic rate in percent
    pub rate_percent: f64,

    /// Periodic rate compounded over 12 periods, in percent
    pub annual_rate_percent: f64,

    pub iterations: u32,

    /// Present value minus net disbursed at the returned rate
    pub residual: f64,

    pub converged: bool,
}

impl EffectiveRateResult {
    /// Turn a non-converged search into an error
    pub fn into_converged(self) -> CalcResult<Self> {
        if self.converged {
            Ok(self)
        } else {
            Err(CalcError::ComputationDidNotConverge {
                iterations: self.iterations,
                residual: self.residual,
            })
        }
    }
}

/// Present value of `num_periods` installments and its derivative with respect to the rate
fn present_value_and_derivative(installment: f64, num_periods: u32, rate: f64) -> (f64, f64) {
    let mut pv = 0.0;
    let mut dpv = 0.0;

    for k in 1..=num_periods {
        let discount = (1.0 + rate).powf(k as f64);
        pv += installment / discount;
        dpv -= (k as f64) * installment / (discount * (1.0 + rate));
    }

    (pv, dpv)
}

/// Present value of a level installment stream at a periodic rate
pub fn present_value(installment: f64, num_periods: u32, rate: f64) -> f64 {
    present_value_and_derivative(installment, num_periods, rate).0
}

/// Solve `sum(installment / (1+x)^k, k=1..n) = net_disbursed` for `x`
///
/// The search never fails silently: when the iteration budget runs out the
/// result comes back with `converged == false` and the last residual.
pub fn solve_effective_rate(net_disbursed: f64, installment: f64, num_periods: u32) -> CalcResult<EffectiveRateResult> {
    if !net_disbursed.is_finite() || net_disbursed <= 0.0 {
        return Err(CalcError::invalid("netDisbursed", format!("must be positive, got {}", net_disbursed)));
    }
    if !installment.is_finite() || installment <= 0.0 {
        return Err(CalcError::invalid("installment", format!("must be positive, got {}", installment)));
    }
    if num_periods < 1 {
        return Err(CalcError::invalid("numPeriods", "must be at least 1"));
    }

    let mut rate = INITIAL_GUESS;
    let mut iterations = 0;
    let (mut pv, mut dpv) = present_value_and_derivative(installment, num_periods, rate);

    while (pv - net_disbursed).abs() >= TOLERANCE && iterations < MAX_ITERATIONS {
        rate -= (pv - net_disbursed) / dpv;
        if rate <= 0.0 {
            rate = RATE_FLOOR;
        }
        iterations += 1;
        (pv, dpv) = present_value_and_derivative(installment, num_periods, rate);
    }

    let residual = pv - net_disbursed;
    let converged = residual.abs() < TOLERANCE;

    if converged {
        debug!("Effective rate converged to {:.6}% after {} iterations", rate * 100.0, iterations);
    } else {
        warn!(
            "Effective rate did not converge after {} iterations (rate {:.6}%, residual {:.6})",
            iterations,
            rate * 100.0,
            residual
        );
    }

    Ok(EffectiveRateResult {
        rate_percent: rate * 100.0,
        annual_rate_percent: ((1.0 + rate).powi(12) - 1.0) * 100.0,
        iterations,
        residual,
        converged,
    })
}

/// Effective rate of a Price financing given what the borrower received
pub fn effective_rate_for_financing(net_disbursed: f64, financing: &FinancingResult) -> CalcResult<EffectiveRateResult> {
    if financing.system != AmortizationSystem::FixedInstallment {
        return Err(CalcError::invalid(
            "system",
            "effective rate requires a level installment (fixed-installment system)",
        ));
    }
    solve_effective_rate(net_disbursed, financing.installment, financing.schedule.num_periods())
}
