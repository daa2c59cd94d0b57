//! Rule-based auto insurance premium
//!
//! The premium is the vehicle value times a 5% base rate, scaled by a chain of
//! risk multipliers. Optional coverages add a share of that base premium and the
//! deductible tier scales the total.

use log::debug;
use serde::{Deserialize, Serialize};

use super::factors::{
    driver_age_factor, license_tenure_factor, vehicle_age_factor, RegionTable, BASE_RATE,
    GLASS_SURCHARGE, REPLACEMENT_CAR_SURCHARGE,
};
use super::quote::InsuranceQuote;
use crate::error::CalcResult;

/// Fixed insured amounts shown for liability coverages
pub const THIRD_PARTY_PROPERTY_LIMIT: f64 = 100_000.0;
pub const THIRD_PARTY_BODILY_LIMIT: f64 = 100_000.0;
pub const PERSONAL_ACCIDENT_LIMIT: f64 = 10_000.0;
pub const REPLACEMENT_CAR_LIMIT: f64 = 3_000.0;

/// Glass coverage insures this share of the vehicle value
pub const GLASS_VALUE_SHARE: f64 = 0.05;

/// Named multipliers applied to the base premium
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskFactors {
    pub vehicle_age: f64,
    pub vehicle_type: f64,
    pub driver_age: f64,
    pub driver_sex: f64,
    pub license_tenure: f64,
    pub usage: f64,
    pub region: f64,
    pub security: f64,
}

impl RiskFactors {
    /// Combined multiplier, applied in the same order as the premium formula
    pub fn combined(&self) -> f64 {
        self.vehicle_age
            * self.vehicle_type
            * self.driver_age
            * self.driver_sex
            * self.license_tenure
            * self.usage
            * self.region
            * self.security
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Coverage {
    Comprehensive,
    ThirdPartyProperty,
    ThirdPartyBodily,
    PersonalAccident,
    ReplacementCar,
    Glass,
}

/// Insured amount of one coverage, for display
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageLine {
    pub coverage: Coverage,
    pub insured_amount: f64,
}

/// Priced quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PremiumResult {
    pub annual_premium: f64,
    pub monthly_premium: f64,

    /// Premium before optional coverages and deductible adjustment
    pub base_premium: f64,
    pub replacement_car_surcharge: f64,
    pub glass_surcharge: f64,

    pub deductible_factor: f64,
    /// Amount the insured pays per claim
    pub deductible_value: f64,

    pub coverages: Vec<CoverageLine>,
    pub factors: RiskFactors,
}

/// Price a quote against the default region table
pub fn quote_premium(quote: &InsuranceQuote) -> CalcResult<PremiumResult> {
    quote_premium_with(quote, &RegionTable::default())
}

/// Price a quote against a configured region table
pub fn quote_premium_with(quote: &InsuranceQuote, regions: &RegionTable) -> CalcResult<PremiumResult> {
    quote.validate()?;

    let factors = RiskFactors {
        vehicle_age: vehicle_age_factor(quote.vehicle_age()),
        vehicle_type: quote.vehicle_type.risk_factor(),
        driver_age: driver_age_factor(quote.driver_age),
        driver_sex: quote.driver_sex.risk_factor(),
        license_tenure: license_tenure_factor(quote.license_years),
        usage: quote.usage.risk_factor(),
        region: regions.factor_for(&quote.postal_code),
        security: quote.security.discount_factor(),
    };

    let base_premium = quote.vehicle_value
        * BASE_RATE
        * factors.vehicle_age
        * factors.vehicle_type
        * factors.driver_age
        * factors.driver_sex
        * factors.license_tenure
        * factors.usage
        * factors.region
        * factors.security;

    let replacement_car_surcharge = if quote.coverages.replacement_car {
        base_premium * REPLACEMENT_CAR_SURCHARGE
    } else {
        0.0
    };
    let glass_surcharge = if quote.coverages.glass {
        base_premium * GLASS_SURCHARGE
    } else {
        0.0
    };

    let deductible_factor = quote.deductible.premium_factor();
    let annual_premium = (base_premium + replacement_car_surcharge + glass_surcharge) * deductible_factor;

    debug!(
        "Premium quote: value={:.2} base={:.2} annual={:.2} combined factor={:.4}",
        quote.vehicle_value,
        base_premium,
        annual_premium,
        factors.combined()
    );

    Ok(PremiumResult {
        annual_premium,
        monthly_premium: annual_premium / 12.0,
        base_premium,
        replacement_car_surcharge,
        glass_surcharge,
        deductible_factor,
        deductible_value: quote.vehicle_value * quote.deductible.value_share(),
        coverages: coverage_lines(quote),
        factors,
    })
}

fn coverage_lines(quote: &InsuranceQuote) -> Vec<CoverageLine> {
    let selection = &quote.coverages;
    let mut lines = Vec::new();
    let mut push = |coverage, insured_amount| lines.push(CoverageLine { coverage, insured_amount });

    if selection.comprehensive {
        push(Coverage::Comprehensive, quote.vehicle_value);
    }
    if selection.third_party {
        push(Coverage::ThirdPartyProperty, THIRD_PARTY_PROPERTY_LIMIT);
        push(Coverage::ThirdPartyBodily, THIRD_PARTY_BODILY_LIMIT);
    }
    if selection.personal_accident {
        push(Coverage::PersonalAccident, PERSONAL_ACCIDENT_LIMIT);
    }
    if selection.replacement_car {
        push(Coverage::ReplacementCar, REPLACEMENT_CAR_LIMIT);
    }
    if selection.glass {
        push(Coverage::Glass, quote.vehicle_value * GLASS_VALUE_SHARE);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insurance::quote::{
        CoverageSelection, DeductibleTier, DriverSex, SecurityEquipment, UsageCategory, VehicleType,
    };
    use approx::assert_relative_eq;

    fn reference_quote() -> InsuranceQuote {
        InsuranceQuote {
            vehicle_value: 50_000.0,
            vehicle_year: 2020,
            vehicle_type: VehicleType::Hatchback,
            driver_age: 30,
            driver_sex: DriverSex::Male,
            license_years: 10,
            usage: UsageCategory::Personal,
            // 10000-10999 falls outside every bracket
            postal_code: "10500-000".to_string(),
            security: SecurityEquipment::default(),
            coverages: CoverageSelection::default(),
            deductible: DeductibleTier::Medium,
            reference_year: 2025,
        }
    }

    #[test]
    fn test_reference_quote() {
        let result = quote_premium(&reference_quote()).unwrap();

        let expected = 50_000.0 * 0.05 * (1.0 - 5.0 * 0.02) * 1.0 * 1.0 * 1.1 * 1.0 * 1.0 * 0.9 * 1.0;
        assert_eq!(result.base_premium, expected);
        assert_relative_eq!(result.base_premium, 2227.5, epsilon = 1e-9);
        assert_eq!(result.annual_premium, result.base_premium);
        assert_relative_eq!(result.monthly_premium, 2227.5 / 12.0, epsilon = 1e-9);
        assert_relative_eq!(result.deductible_value, 500.0, epsilon = 1e-9);

        assert_eq!(result.factors.region, 0.9);
        assert_eq!(result.factors.driver_sex, 1.1);
        assert_eq!(result.factors.security, 1.0);
    }

    #[test]
    fn test_surcharges_do_not_compound() {
        let mut quote = reference_quote();
        quote.postal_code = "01310-100".to_string();
        quote.coverages.replacement_car = true;
        quote.coverages.glass = true;
        quote.deductible = DeductibleTier::Low;

        let result = quote_premium(&quote).unwrap();
        assert_relative_eq!(result.base_premium, 3465.0, epsilon = 1e-9);
        assert_relative_eq!(result.replacement_car_surcharge, 3465.0 * 0.15, epsilon = 1e-9);
        assert_relative_eq!(result.glass_surcharge, 346.5, epsilon = 1e-9);
        assert_relative_eq!(result.annual_premium, 3465.0 * 1.25 * 1.2, epsilon = 1e-9);
        assert_relative_eq!(result.deductible_value, 250.0, epsilon = 1e-9);
    }

    #[test]
    fn test_high_deductible_discount() {
        let mut quote = reference_quote();
        quote.deductible = DeductibleTier::High;

        let result = quote_premium(&quote).unwrap();
        assert_relative_eq!(result.annual_premium, 2227.5 * 0.85, epsilon = 1e-9);
        assert_relative_eq!(result.deductible_value, 1_000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_riskier_profile_costs_more() {
        let base = quote_premium(&reference_quote()).unwrap();

        let mut young = reference_quote();
        young.driver_age = 21;
        young.license_years = 1;
        young.usage = UsageCategory::Rideshare;
        young.vehicle_type = VehicleType::Sports;
        let risky = quote_premium(&young).unwrap();

        assert!(risky.annual_premium > base.annual_premium * 5.0);
    }

    #[test]
    fn test_security_lowers_premium() {
        let mut quote = reference_quote();
        quote.security = SecurityEquipment { garage: true, alarm: true, tracker: true };

        let result = quote_premium(&quote).unwrap();
        assert_relative_eq!(result.annual_premium, 2227.5 * 0.84, epsilon = 1e-9);
    }

    #[test]
    fn test_coverage_breakdown() {
        let mut quote = reference_quote();
        quote.coverages.glass = true;
        let result = quote_premium(&quote).unwrap();

        let glass = result
            .coverages
            .iter()
            .find(|c| c.coverage == Coverage::Glass)
            .expect("glass coverage listed");
        assert_relative_eq!(glass.insured_amount, 2_500.0, epsilon = 1e-9);
        assert_eq!(result.coverages[0].coverage, Coverage::Comprehensive);
        assert_eq!(result.coverages[0].insured_amount, 50_000.0);
        assert_eq!(result.coverages.len(), 5);
    }

    #[test]
    fn test_invalid_value_rejected() {
        let mut quote = reference_quote();
        quote.vehicle_value = 0.0;
        assert!(quote_premium(&quote).is_err());
    }

    #[test]
    fn test_quote_is_idempotent() {
        let quote = reference_quote();
        assert_eq!(quote_premium(&quote).unwrap(), quote_premium(&quote).unwrap());
    }
}
