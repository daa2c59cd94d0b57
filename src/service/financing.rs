//! Financing, comparison and effective-rate endpoints

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::assumptions::{Assumptions, CalculatorKind, VehicleCategory};
use crate::error::CalcResult;
use crate::loan::{
    simulate_full_financing, solve_effective_rate, AmortizationSchedule, AmortizationSystem, EffectiveRateResult,
    FinancingResult,
};
use crate::scenario::compare_systems;

/// Body of `POST /financing` and `POST /compare`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancingRequest {
    pub principal: f64,

    /// Contract rate per period, in percent (1.8 = 1.8% a month)
    pub periodic_rate_percent: f64,

    pub num_periods: u32,

    #[serde(default)]
    pub include_tax: bool,

    #[serde(default)]
    pub system: AmortizationSystem,

    /// Bounds table to validate against; inferred from `category` when absent
    #[serde(default)]
    pub calculator: Option<CalculatorKind>,

    /// Vehicle category whose rate offset is added to the contract rate
    #[serde(default)]
    pub category: Option<VehicleCategory>,
}

impl FinancingRequest {
    pub fn calculator(&self) -> CalculatorKind {
        self.calculator
            .or_else(|| self.category.map(|c| c.calculator()))
            .unwrap_or_default()
    }

    /// Check bounds and resolve the rate the engine will actually use, in percent
    pub fn resolve_rate_percent(&self, assumptions: &Assumptions) -> CalcResult<f64> {
        let calculator = self.calculator();
        if let Err(e) = assumptions
            .bounds
            .get(calculator)
            .check(self.principal, self.periodic_rate_percent, self.num_periods)
        {
            warn!("Rejected {} request: {}", calculator.as_str(), e);
            return Err(e);
        }

        Ok(match self.category {
            Some(category) => assumptions
                .rate_adjustments
                .adjusted_rate_percent(category, self.periodic_rate_percent),
            None => self.periodic_rate_percent,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancingResponse {
    pub system: AmortizationSystem,
    pub installment: f64,
    pub total_paid: f64,
    pub total_interest: f64,
    pub schedule: AmortizationSchedule,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_amount: Option<f64>,

    /// Contract rate after the category offset, in percent
    pub applied_rate_percent: f64,

    /// CET of a tax-financed Price loan, in percent per period
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_rate_percent: Option<f64>,
}

impl FinancingResponse {
    fn from_result(result: FinancingResult, principal: f64, applied_rate_percent: f64) -> Self {
        let effective_rate_percent = effective_rate_of(&result, principal);

        FinancingResponse {
            system: result.system,
            installment: result.installment,
            total_paid: result.total_paid,
            total_interest: result.total_interest,
            schedule: result.schedule,
            tax_amount: result.tax_amount,
            applied_rate_percent,
            effective_rate_percent,
        }
    }
}

/// CET is only reported when financed tax separates it from the contract rate
fn effective_rate_of(result: &FinancingResult, net_disbursed: f64) -> Option<f64> {
    if result.tax_amount.is_none() || result.system != AmortizationSystem::FixedInstallment {
        return None;
    }

    match solve_effective_rate(net_disbursed, result.installment, result.schedule.num_periods()) {
        Ok(cet) if cet.converged => Some(cet.rate_percent),
        Ok(cet) => {
            warn!("Omitting effective rate: residual {:.6} after {} iterations", cet.residual, cet.iterations);
            None
        }
        Err(e) => {
            warn!("Omitting effective rate: {}", e);
            None
        }
    }
}

pub fn handle_financing(request: &FinancingRequest, assumptions: &Assumptions) -> CalcResult<FinancingResponse> {
    let rate_percent = request.resolve_rate_percent(assumptions)?;

    let result = simulate_full_financing(
        request.principal,
        rate_percent / 100.0,
        request.num_periods,
        request.include_tax,
        request.system,
    )?;

    info!(
        "Financing {} over {} periods at {:.4}% ({}): installment {:.2}",
        request.principal,
        request.num_periods,
        rate_percent,
        request.system.as_str(),
        result.installment
    );

    Ok(FinancingResponse::from_result(result, request.principal, rate_percent))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResponse {
    pub fixed: FinancingResponse,
    pub constant: FinancingResponse,
    pub interest_saved: f64,
    pub first_payment_gap: f64,
}

/// Same request under both systems; the `system` field is ignored
pub fn handle_comparison(request: &FinancingRequest, assumptions: &Assumptions) -> CalcResult<ComparisonResponse> {
    let rate_percent = request.resolve_rate_percent(assumptions)?;
    let comparison = compare_systems(request.principal, rate_percent / 100.0, request.num_periods, request.include_tax)?;

    info!(
        "Compared systems for {} over {} periods: SAC saves {:.2}",
        request.principal, request.num_periods, comparison.interest_saved
    );

    Ok(ComparisonResponse {
        interest_saved: comparison.interest_saved,
        first_payment_gap: comparison.first_payment_gap,
        fixed: FinancingResponse::from_result(comparison.fixed, request.principal, rate_percent),
        constant: FinancingResponse::from_result(comparison.constant, request.principal, rate_percent),
    })
}

/// Body of `POST /effective-rate`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveRateRequest {
    /// Amount the borrower actually received
    pub net_disbursed: f64,
    pub installment: f64,
    pub num_periods: u32,
}

/// Solve for the CET; a search that runs out of iterations is an error here
pub fn handle_effective_rate(request: &EffectiveRateRequest) -> CalcResult<EffectiveRateResult> {
    let result = solve_effective_rate(request.net_disbursed, request.installment, request.num_periods)?.into_converged()?;
    info!("Effective rate {:.6}% after {} iterations", result.rate_percent, result.iterations);
    Ok(result)
}
