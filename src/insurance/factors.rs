//! Risk factor tables for the premium model

use serde::{Deserialize, Serialize};

use super::quote::{DeductibleTier, DriverSex, SecurityEquipment, UsageCategory, VehicleType};

/// Annual base rate as a share of the vehicle value
pub const BASE_RATE: f64 = 0.05;

/// Factor applied when the postal code falls outside every bracket
pub const DEFAULT_REGION_FACTOR: f64 = 0.9;

pub const GARAGE_DISCOUNT: f64 = 0.05;
pub const ALARM_DISCOUNT: f64 = 0.03;
pub const TRACKER_DISCOUNT: f64 = 0.08;

pub const REPLACEMENT_CAR_SURCHARGE: f64 = 0.15;
pub const GLASS_SURCHARGE: f64 = 0.10;

/// Older vehicles are cheaper to insure, down to a floor of 0.8
pub fn vehicle_age_factor(age_years: u32) -> f64 {
    (1.0 - age_years as f64 * 0.02).max(0.8)
}

impl VehicleType {
    pub fn risk_factor(&self) -> f64 {
        match self {
            VehicleType::Hatchback => 1.0,
            VehicleType::Sedan => 1.1,
            VehicleType::Suv => 1.3,
            VehicleType::Pickup => 1.2,
            VehicleType::Sports => 1.8,
            VehicleType::Luxury => 2.0,
        }
    }
}

pub fn driver_age_factor(age: u32) -> f64 {
    match age {
        0..=24 => 1.5,
        25..=29 => 1.2,
        61.. => 1.1,
        _ => 1.0,
    }
}

impl DriverSex {
    pub fn risk_factor(&self) -> f64 {
        match self {
            DriverSex::Male => 1.1,
            DriverSex::Female => 0.95,
        }
    }
}

pub fn license_tenure_factor(years: u32) -> f64 {
    match years {
        0..=1 => 1.4,
        2..=4 => 1.2,
        21.. => 0.9,
        _ => 1.0,
    }
}

impl UsageCategory {
    pub fn risk_factor(&self) -> f64 {
        match self {
            UsageCategory::Personal => 1.0,
            UsageCategory::Work => 1.2,
            UsageCategory::Rideshare => 1.8,
            UsageCategory::Commercial => 1.5,
        }
    }
}

impl SecurityEquipment {
    /// `1 - sum(discounts)`; discounts add, they do not compound
    pub fn discount_factor(&self) -> f64 {
        let mut discount = 0.0;
        if self.garage {
            discount += GARAGE_DISCOUNT;
        }
        if self.alarm {
            discount += ALARM_DISCOUNT;
        }
        if self.tracker {
            discount += TRACKER_DISCOUNT;
        }
        1.0 - discount
    }
}

impl DeductibleTier {
    /// Multiplier on the final premium
    pub fn premium_factor(&self) -> f64 {
        match self {
            DeductibleTier::Low => 1.2,
            DeductibleTier::Medium => 1.0,
            DeductibleTier::High => 0.85,
        }
    }

    /// Deductible owed per claim as a share of the vehicle value
    pub fn value_share(&self) -> f64 {
        match self {
            DeductibleTier::Low => 0.005,
            DeductibleTier::Medium => 0.01,
            DeductibleTier::High => 0.02,
        }
    }
}

/// Inclusive range of 5-digit postal prefixes sharing a risk multiplier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionBracket {
    pub start: u32,
    pub end: u32,
    pub factor: f64,
    #[serde(default)]
    pub label: String,
}

/// Postal-code bracket table
#[derive(Debug, Clone, PartialEq)]
pub struct RegionTable {
    brackets: Vec<RegionBracket>,
}

impl RegionTable {
    pub fn from_brackets(brackets: Vec<RegionBracket>) -> Self {
        Self { brackets }
    }

    /// Default brackets by metropolitan area
    pub fn default_brackets() -> Self {
        let bracket = |start, end, factor, label: &str| RegionBracket {
            start,
            end,
            factor,
            label: label.to_string(),
        };

        Self::from_brackets(vec![
            bracket(1_000, 9_999, 1.4, "Sao Paulo metro"),
            bracket(11_000, 19_999, 1.2, "Sao Paulo interior"),
            bracket(20_000, 28_999, 1.35, "Rio de Janeiro"),
            bracket(30_000, 39_999, 1.1, "Minas Gerais"),
            bracket(40_000, 48_999, 1.15, "Bahia"),
            bracket(50_000, 56_999, 1.15, "Pernambuco"),
            bracket(60_000, 63_999, 1.1, "Ceara"),
            bracket(70_000, 73_699, 1.2, "Distrito Federal"),
            bracket(80_000, 87_999, 1.05, "Parana"),
            bracket(88_000, 89_999, 1.0, "Santa Catarina"),
            bracket(90_000, 99_999, 1.1, "Rio Grande do Sul"),
        ])
    }

    pub fn brackets(&self) -> &[RegionBracket] {
        &self.brackets
    }

    /// Multiplier for a postal code; unknown or short codes get the default
    pub fn factor_for(&self, postal_code: &str) -> f64 {
        self.bracket_for(postal_code)
            .map(|b| b.factor)
            .unwrap_or(DEFAULT_REGION_FACTOR)
    }

    pub fn bracket_for(&self, postal_code: &str) -> Option<&RegionBracket> {
        let prefix = postal_prefix(postal_code)?;
        self.brackets
            .iter()
            .find(|b| prefix >= b.start && prefix <= b.end)
    }
}

impl Default for RegionTable {
    fn default() -> Self {
        Self::default_brackets()
    }
}

/// First five digits of a postal code as a number
fn postal_prefix(postal_code: &str) -> Option<u32> {
    let digits: String = postal_code
        .chars()
        .filter(|c| c.is_ascii_digit())
        .take(5)
        .collect();
    if digits.len() < 5 {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vehicle_age_factor_floor() {
        assert_eq!(vehicle_age_factor(0), 1.0);
        assert!((vehicle_age_factor(5) - 0.9).abs() < 1e-12);
        assert!((vehicle_age_factor(10) - 0.8).abs() < 1e-12);
        assert_eq!(vehicle_age_factor(25), 0.8);
    }

    #[test]
    fn test_driver_age_bands() {
        assert_eq!(driver_age_factor(18), 1.5);
        assert_eq!(driver_age_factor(24), 1.5);
        assert_eq!(driver_age_factor(25), 1.2);
        assert_eq!(driver_age_factor(29), 1.2);
        assert_eq!(driver_age_factor(30), 1.0);
        assert_eq!(driver_age_factor(60), 1.0);
        assert_eq!(driver_age_factor(61), 1.1);
    }

    #[test]
    fn test_license_tenure_bands() {
        assert_eq!(license_tenure_factor(0), 1.4);
        assert_eq!(license_tenure_factor(1), 1.4);
        assert_eq!(license_tenure_factor(2), 1.2);
        assert_eq!(license_tenure_factor(4), 1.2);
        assert_eq!(license_tenure_factor(5), 1.0);
        assert_eq!(license_tenure_factor(20), 1.0);
        assert_eq!(license_tenure_factor(21), 0.9);
    }

    #[test]
    fn test_security_discounts_stack_additively() {
        let none = SecurityEquipment::default();
        assert_eq!(none.discount_factor(), 1.0);

        let all = SecurityEquipment { garage: true, alarm: true, tracker: true };
        assert!((all.discount_factor() - 0.84).abs() < 1e-12);

        let tracker = SecurityEquipment { tracker: true, ..Default::default() };
        assert!((tracker.discount_factor() - 0.92).abs() < 1e-12);
    }

    #[test]
    fn test_region_lookup() {
        let table = RegionTable::default();
        assert_eq!(table.factor_for("01310-100"), 1.4);
        assert_eq!(table.factor_for("22041001"), 1.35);
        assert_eq!(table.factor_for("88015-600"), 1.0);
        // 10000-10999 is not mapped
        assert_eq!(table.factor_for("10500-000"), DEFAULT_REGION_FACTOR);
        assert_eq!(table.factor_for("123"), DEFAULT_REGION_FACTOR);
        assert_eq!(table.factor_for(""), DEFAULT_REGION_FACTOR);
    }

    #[test]
    fn test_region_factors_within_range() {
        for bracket in RegionTable::default().brackets() {
            assert!(bracket.factor >= 0.9 && bracket.factor <= 1.4, "{} out of range", bracket.label);
            assert!(bracket.start <= bracket.end);
        }
    }

    #[test]
    fn test_vehicle_type_table() {
        let table = [
            (VehicleType::Hatchback, 1.0),
            (VehicleType::Sedan, 1.1),
            (VehicleType::Suv, 1.3),
            (VehicleType::Pickup, 1.2),
            (VehicleType::Sports, 1.8),
            (VehicleType::Luxury, 2.0),
        ];
        for (vehicle_type, expected) in table {
            assert_eq!(vehicle_type.risk_factor(), expected, "{:?}", vehicle_type);
        }
    }

    #[test]
    fn test_usage_table() {
        let table = [
            (UsageCategory::Personal, 1.0),
            (UsageCategory::Work, 1.2),
            (UsageCategory::Rideshare, 1.8),
            (UsageCategory::Commercial, 1.5),
        ];
        for (usage, expected) in table {
            assert_eq!(usage.risk_factor(), expected, "{:?}", usage);
        }
    }

    #[test]
    fn test_driver_sex_table() {
        assert_eq!(DriverSex::Male.risk_factor(), 1.1);
        assert_eq!(DriverSex::Female.risk_factor(), 0.95);
    }

    #[test]
    fn test_deductible_table() {
        let table = [
            (DeductibleTier::Low, 1.2, 0.005),
            (DeductibleTier::Medium, 1.0, 0.01),
            (DeductibleTier::High, 0.85, 0.02),
        ];
        for (tier, factor, share) in table {
            assert_eq!(tier.premium_factor(), factor, "{:?}", tier);
            assert_eq!(tier.value_share(), share, "{:?}", tier);
        }
    }
}
