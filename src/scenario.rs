//! Scenario helpers composed over the amortization engine
//!
//! Each helper calls the engine repeatedly with varied inputs and aggregates
//! the results: Price vs SAC comparison, early payoff, payment capacity,
//! down-payment grids and refinancing.

use std::cmp::Ordering;

use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{CalcError, CalcResult};
use crate::loan::{
    calculate_installment, outstanding_balance, simulate_full_financing, solve_effective_rate,
    AmortizationSystem, EffectiveRateResult, FinancingResult,
};

/// Default cap on the installment as a share of monthly income
pub const DEFAULT_MAX_INCOME_SHARE: f64 = 0.30;

/// Price precision of the affordability bisection
const BISECTION_TOLERANCE: f64 = 0.01;
const BISECTION_MAX_ITERATIONS: u32 = 200;

/// Same loan under both amortization systems
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemComparison {
    pub fixed: FinancingResult,
    pub constant: FinancingResult,
    /// Interest avoided by choosing SAC
    pub interest_saved: f64,
    /// How much larger the first SAC payment is
    pub first_payment_gap: f64,
}

pub fn compare_systems(
    principal: f64,
    periodic_rate: f64,
    num_periods: u32,
    include_tax: bool,
) -> CalcResult<SystemComparison> {
    let fixed = simulate_full_financing(principal, periodic_rate, num_periods, include_tax, AmortizationSystem::FixedInstallment)?;
    let constant = simulate_full_financing(principal, periodic_rate, num_periods, include_tax, AmortizationSystem::ConstantAmortization)?;

    Ok(SystemComparison {
        interest_saved: fixed.total_interest - constant.total_interest,
        first_payment_gap: constant.installment - fixed.installment,
        fixed,
        constant,
    })
}

/// Cost of settling a Price loan early
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoffAnalysis {
    pub installment: f64,
    pub elapsed_periods: u32,
    pub remaining_periods: u32,
    /// Amount that settles the loan today
    pub outstanding_balance: f64,
    /// Remaining installments at face value
    pub nominal_remaining: f64,
    /// Interest avoided by settling instead of paying out the term
    pub savings: f64,
}

pub fn payoff_analysis(principal: f64, periodic_rate: f64, num_periods: u32, elapsed: u32) -> CalcResult<PayoffAnalysis> {
    let installment = calculate_installment(principal, periodic_rate, num_periods)?;
    let balance = outstanding_balance(principal, periodic_rate, num_periods, elapsed)?;
    let remaining_periods = num_periods - elapsed;
    let nominal_remaining = installment * remaining_periods as f64;

    Ok(PayoffAnalysis {
        installment,
        elapsed_periods: elapsed,
        remaining_periods,
        outstanding_balance: balance,
        nominal_remaining,
        savings: nominal_remaining - balance,
    })
}

/// Largest principal whose Price installment stays within `installment_cap`
///
/// Inverse of the annuity formula: `cap * ((1+r)^n - 1) / (r(1+r)^n)`.
pub fn max_affordable_principal(installment_cap: f64, periodic_rate: f64, num_periods: u32) -> CalcResult<f64> {
    if !installment_cap.is_finite() || installment_cap <= 0.0 {
        return Err(CalcError::invalid("installmentCap", format!("must be positive, got {}", installment_cap)));
    }
    if num_periods < 1 {
        return Err(CalcError::invalid("numPeriods", "must be at least 1"));
    }
    if !periodic_rate.is_finite() || periodic_rate < 0.0 {
        return Err(CalcError::DegenerateInput(format!(
            "periodic rate must be a non-negative number, got {}",
            periodic_rate
        )));
    }

    if periodic_rate == 0.0 {
        return Ok(installment_cap * num_periods as f64);
    }

    let growth = (1.0 + periodic_rate).powf(num_periods as f64);
    Ok(installment_cap * (growth - 1.0) / (periodic_rate * growth))
}

/// Payment-capacity inputs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffordabilityInput {
    pub monthly_income: f64,
    /// Installment cap as a share of income (0.30 = 30%)
    #[serde(default = "default_income_share")]
    pub max_income_share: f64,
    #[serde(default)]
    pub down_payment: f64,
    pub periodic_rate: f64,
    pub num_periods: u32,
    #[serde(default)]
    pub include_tax: bool,
    #[serde(default)]
    pub system: AmortizationSystem,
}

fn default_income_share() -> f64 {
    DEFAULT_MAX_INCOME_SHARE
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffordabilityResult {
    pub max_vehicle_price: f64,
    pub financed_principal: f64,
    pub installment: f64,
    pub installment_cap: f64,
    pub income_share: f64,
    pub iterations: u32,
}

/// Most expensive vehicle whose installment fits the income cap
///
/// The installment grows monotonically with the price, so a plain bisection
/// over the price converges. The closed-form Price principal (no tax) bounds
/// the search from above.
pub fn max_affordable_vehicle_price(input: &AffordabilityInput) -> CalcResult<AffordabilityResult> {
    if !input.monthly_income.is_finite() || input.monthly_income <= 0.0 {
        return Err(CalcError::invalid("monthlyIncome", format!("must be positive, got {}", input.monthly_income)));
    }
    if !(input.max_income_share > 0.0 && input.max_income_share <= 1.0) {
        return Err(CalcError::invalid("maxIncomeShare", format!("must be in (0, 1], got {}", input.max_income_share)));
    }
    if !input.down_payment.is_finite() || input.down_payment < 0.0 {
        return Err(CalcError::invalid("downPayment", format!("must not be negative, got {}", input.down_payment)));
    }

    let installment_cap = input.monthly_income * input.max_income_share;
    let principal_ceiling = max_affordable_principal(installment_cap, input.periodic_rate, input.num_periods)?;

    let installment_for = |price: f64| -> CalcResult<f64> {
        let financed = price - input.down_payment;
        if financed <= 0.0 {
            return Ok(0.0);
        }
        simulate_full_financing(financed, input.periodic_rate, input.num_periods, input.include_tax, input.system)
            .map(|r| r.installment)
    };

    let mut low = input.down_payment;
    let mut high = input.down_payment + principal_ceiling;
    let mut iterations = 0;

    while high - low > BISECTION_TOLERANCE && iterations < BISECTION_MAX_ITERATIONS {
        let mid = (low + high) / 2.0;
        if installment_for(mid)? <= installment_cap {
            low = mid;
        } else {
            high = mid;
        }
        iterations += 1;
    }

    let installment = installment_for(low)?;
    debug!(
        "Affordability: cap={:.2} max price={:.2} after {} iterations",
        installment_cap, low, iterations
    );

    Ok(AffordabilityResult {
        max_vehicle_price: low,
        financed_principal: low - input.down_payment,
        installment,
        installment_cap,
        income_share: installment / input.monthly_income,
        iterations,
    })
}

/// One combination of down payment and term
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownPaymentScenario {
    pub down_payment_share: f64,
    pub down_payment: f64,
    pub num_periods: u32,
    pub financed_principal: f64,
    pub installment: f64,
    pub total_interest: f64,
    /// Down payment plus every installment
    pub total_cost: f64,
    /// Installment as a share of monthly income
    pub income_share: f64,
}

/// Evaluate every (down payment share, term) pair, sorted by share of income
pub fn down_payment_scenarios(
    vehicle_price: f64,
    monthly_income: f64,
    periodic_rate: f64,
    terms: &[u32],
    down_payment_shares: &[f64],
    include_tax: bool,
) -> CalcResult<Vec<DownPaymentScenario>> {
    if !vehicle_price.is_finite() || vehicle_price <= 0.0 {
        return Err(CalcError::invalid("vehiclePrice", format!("must be positive, got {}", vehicle_price)));
    }
    if !monthly_income.is_finite() || monthly_income <= 0.0 {
        return Err(CalcError::invalid("monthlyIncome", format!("must be positive, got {}", monthly_income)));
    }
    if let Some(share) = down_payment_shares.iter().find(|s| !(**s >= 0.0 && **s < 1.0)) {
        return Err(CalcError::invalid("downPaymentShares", format!("{} must be in [0, 1)", share)));
    }

    let combinations: Vec<(f64, u32)> = down_payment_shares
        .iter()
        .flat_map(|&share| terms.iter().map(move |&term| (share, term)))
        .collect();

    let mut scenarios = combinations
        .par_iter()
        .map(|&(share, term)| -> CalcResult<DownPaymentScenario> {
            let down_payment = vehicle_price * share;
            let financed = vehicle_price - down_payment;
            let result = simulate_full_financing(financed, periodic_rate, term, include_tax, AmortizationSystem::FixedInstallment)?;

            Ok(DownPaymentScenario {
                down_payment_share: share,
                down_payment,
                num_periods: term,
                financed_principal: result.financed_principal,
                installment: result.installment,
                total_interest: result.total_interest,
                total_cost: down_payment + result.total_paid,
                income_share: result.installment / monthly_income,
            })
        })
        .collect::<CalcResult<Vec<_>>>()?;

    scenarios.sort_by(|a, b| a.income_share.partial_cmp(&b.income_share).unwrap_or(Ordering::Equal));
    Ok(scenarios)
}

/// Scenario with the lowest installment relative to income
pub fn best_down_payment_scenario(scenarios: &[DownPaymentScenario]) -> Option<DownPaymentScenario> {
    scenarios
        .iter()
        .min_by(|a, b| a.income_share.partial_cmp(&b.income_share).unwrap_or(Ordering::Equal))
        .copied()
}

/// Existing loan and the offer it would be refinanced into
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefinanceInput {
    pub original_principal: f64,
    pub original_rate: f64,
    pub original_periods: u32,
    pub elapsed_periods: u32,
    pub new_rate: f64,
    pub new_periods: u32,
    /// Fees of the new contract, financed with the balance
    #[serde(default)]
    pub fees: f64,
    #[serde(default)]
    pub include_tax: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefinanceComparison {
    pub outstanding_balance: f64,
    pub current_installment: f64,
    /// What the current loan still costs if kept
    pub current_remaining_cost: f64,
    pub new_installment: f64,
    pub new_total_cost: f64,
    /// Positive when refinancing costs less overall
    pub savings: f64,
    pub installment_change: f64,
    /// Effective rate of the new contract on the balance it actually settles
    pub new_effective_rate: EffectiveRateResult,
    pub worthwhile: bool,
    pub new_financing: FinancingResult,
}

pub fn compare_refinancing(input: &RefinanceInput) -> CalcResult<RefinanceComparison> {
    if input.elapsed_periods >= input.original_periods {
        return Err(CalcError::invalid(
            "elapsedPeriods",
            format!("loan of {} periods is already paid off", input.original_periods),
        ));
    }
    if !input.fees.is_finite() || input.fees < 0.0 {
        return Err(CalcError::invalid("fees", format!("must not be negative, got {}", input.fees)));
    }

    let payoff = payoff_analysis(
        input.original_principal,
        input.original_rate,
        input.original_periods,
        input.elapsed_periods,
    )?;

    let new_financing = simulate_full_financing(
        payoff.outstanding_balance + input.fees,
        input.new_rate,
        input.new_periods,
        input.include_tax,
        AmortizationSystem::FixedInstallment,
    )?;
    let new_effective_rate = solve_effective_rate(payoff.outstanding_balance, new_financing.installment, input.new_periods)?;

    let savings = payoff.nominal_remaining - new_financing.total_paid;

    Ok(RefinanceComparison {
        outstanding_balance: payoff.outstanding_balance,
        current_installment: payoff.installment,
        current_remaining_cost: payoff.nominal_remaining,
        new_installment: new_financing.installment,
        new_total_cost: new_financing.total_paid,
        savings,
        installment_change: new_financing.installment - payoff.installment,
        new_effective_rate,
        worthwhile: savings > 0.0,
        new_financing,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_compare_systems() {
        let comparison = compare_systems(100_000.0, 0.01, 60, false).unwrap();
        assert!(comparison.interest_saved > 0.0);
        assert!(comparison.first_payment_gap > 0.0);
        assert_eq!(comparison.fixed.system, AmortizationSystem::FixedInstallment);
        assert_eq!(comparison.constant.system, AmortizationSystem::ConstantAmortization);
    }

    #[test]
    fn test_payoff_reference_example() {
        let analysis = payoff_analysis(40_000.0, 0.018, 48, 24).unwrap();

        assert_eq!(analysis.remaining_periods, 24);
        assert_abs_diff_eq!(analysis.outstanding_balance, 24_217.35, epsilon = 0.01);
        assert_abs_diff_eq!(analysis.nominal_remaining, 1251.5728 * 24.0, epsilon = 0.01);
        assert_abs_diff_eq!(analysis.savings, 5_820.40, epsilon = 0.01);
    }

    #[test]
    fn test_max_affordable_principal_inverts_installment() {
        let principal = max_affordable_principal(1_000.0, 0.015, 36).unwrap();
        let installment = calculate_installment(principal, 0.015, 36).unwrap();
        assert_abs_diff_eq!(installment, 1_000.0, epsilon = 1e-9);

        assert_eq!(max_affordable_principal(500.0, 0.0, 10).unwrap(), 5_000.0);
        assert!(max_affordable_principal(0.0, 0.01, 10).is_err());
    }

    fn affordability(include_tax: bool) -> AffordabilityInput {
        AffordabilityInput {
            monthly_income: 10_000.0,
            max_income_share: 0.30,
            down_payment: 20_000.0,
            periodic_rate: 0.018,
            num_periods: 48,
            include_tax,
            system: AmortizationSystem::FixedInstallment,
        }
    }

    #[test]
    fn test_bisection_matches_closed_form() {
        let result = max_affordable_vehicle_price(&affordability(false)).unwrap();
        let closed_form = max_affordable_principal(3_000.0, 0.018, 48).unwrap();

        assert_abs_diff_eq!(result.financed_principal, closed_form, epsilon = 0.05);
        assert!(result.installment <= result.installment_cap);
        assert!(result.income_share <= 0.30);
        assert!(result.iterations < BISECTION_MAX_ITERATIONS);
    }

    #[test]
    fn test_financed_tax_lowers_affordable_price() {
        let without_tax = max_affordable_vehicle_price(&affordability(false)).unwrap();
        let with_tax = max_affordable_vehicle_price(&affordability(true)).unwrap();

        assert!(with_tax.max_vehicle_price < without_tax.max_vehicle_price);
        assert!(with_tax.installment <= with_tax.installment_cap);
        assert!(with_tax.installment > with_tax.installment_cap - 1.0);
    }

    #[test]
    fn test_affordability_rejects_bad_share() {
        let mut input = affordability(false);
        input.max_income_share = 1.5;
        assert!(max_affordable_vehicle_price(&input).is_err());
    }

    #[test]
    fn test_down_payment_grid() {
        let scenarios = down_payment_scenarios(80_000.0, 12_000.0, 0.015, &[24, 48, 60], &[0.0, 0.2, 0.4], false).unwrap();

        assert_eq!(scenarios.len(), 9);
        for pair in scenarios.windows(2) {
            assert!(pair[0].income_share <= pair[1].income_share);
        }

        let best = best_down_payment_scenario(&scenarios).unwrap();
        assert_eq!(best.down_payment_share, 0.4);
        assert_eq!(best.num_periods, 60);
        assert_eq!(best, scenarios[0]);
    }

    #[test]
    fn test_down_payment_share_validation() {
        assert!(down_payment_scenarios(80_000.0, 12_000.0, 0.015, &[24], &[1.0], false).is_err());
        assert!(best_down_payment_scenario(&[]).is_none());
    }

    #[test]
    fn test_refinancing_at_lower_rate_saves() {
        let input = RefinanceInput {
            original_principal: 60_000.0,
            original_rate: 0.025,
            original_periods: 60,
            elapsed_periods: 12,
            new_rate: 0.015,
            new_periods: 48,
            fees: 500.0,
            include_tax: false,
        };
        let comparison = compare_refinancing(&input).unwrap();

        assert!(comparison.worthwhile);
        assert!(comparison.savings > 0.0);
        assert!(comparison.installment_change < 0.0);
        assert!(comparison.new_effective_rate.converged);
        // Financed fees push the effective rate above the contract rate
        assert!(comparison.new_effective_rate.rate_percent > 1.5);
    }

    #[test]
    fn test_refinancing_paid_off_loan_rejected() {
        let input = RefinanceInput {
            original_principal: 60_000.0,
            original_rate: 0.025,
            original_periods: 60,
            elapsed_periods: 60,
            new_rate: 0.015,
            new_periods: 48,
            fees: 0.0,
            include_tax: false,
        };
        assert!(compare_refinancing(&input).is_err());
    }
}
