//! Vehicle category rate adjustments
//!
//! Truck and motorcycle calculators shift the base periodic rate by a fixed
//! number of percentage points before calling the shared engine.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::bounds::CalculatorKind;
use crate::error::CalcError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VehicleCategory {
    Car,
    /// Up to 160cc
    MotorcycleSmall,
    /// 161cc to 500cc
    MotorcycleMedium,
    /// Above 500cc
    MotorcycleLarge,
    LightTruck,
    MediumTruck,
    HeavyTruck,
}

impl VehicleCategory {
    pub const ALL: [VehicleCategory; 7] = [
        VehicleCategory::Car,
        VehicleCategory::MotorcycleSmall,
        VehicleCategory::MotorcycleMedium,
        VehicleCategory::MotorcycleLarge,
        VehicleCategory::LightTruck,
        VehicleCategory::MediumTruck,
        VehicleCategory::HeavyTruck,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleCategory::Car => "car",
            VehicleCategory::MotorcycleSmall => "motorcycle-small",
            VehicleCategory::MotorcycleMedium => "motorcycle-medium",
            VehicleCategory::MotorcycleLarge => "motorcycle-large",
            VehicleCategory::LightTruck => "light-truck",
            VehicleCategory::MediumTruck => "medium-truck",
            VehicleCategory::HeavyTruck => "heavy-truck",
        }
    }

    /// Motorcycle tier from engine displacement in cc
    pub fn motorcycle_for_displacement(cc: u32) -> Self {
        match cc {
            0..=160 => VehicleCategory::MotorcycleSmall,
            161..=500 => VehicleCategory::MotorcycleMedium,
            _ => VehicleCategory::MotorcycleLarge,
        }
    }

    /// Calculator whose bounds apply to this category
    pub fn calculator(&self) -> CalculatorKind {
        match self {
            VehicleCategory::Car => CalculatorKind::Vehicle,
            VehicleCategory::MotorcycleSmall
            | VehicleCategory::MotorcycleMedium
            | VehicleCategory::MotorcycleLarge => CalculatorKind::Motorcycle,
            VehicleCategory::LightTruck | VehicleCategory::MediumTruck | VehicleCategory::HeavyTruck => {
                CalculatorKind::Truck
            }
        }
    }
}

impl std::str::FromStr for VehicleCategory {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VehicleCategory::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| CalcError::invalid("category", format!("unknown vehicle category: {}", s)))
    }
}

/// Category -> additive rate offset, in percentage points
#[derive(Debug, Clone)]
pub struct RateAdjustments {
    deltas: HashMap<VehicleCategory, f64>,
}

impl RateAdjustments {
    pub fn default_table() -> Self {
        let deltas = HashMap::from([
            (VehicleCategory::Car, 0.0),
            (VehicleCategory::MotorcycleSmall, 0.30),
            (VehicleCategory::MotorcycleMedium, 0.20),
            (VehicleCategory::MotorcycleLarge, 0.10),
            (VehicleCategory::LightTruck, 0.10),
            (VehicleCategory::MediumTruck, 0.20),
            (VehicleCategory::HeavyTruck, 0.35),
        ]);
        Self { deltas }
    }

    pub fn from_deltas(deltas: HashMap<VehicleCategory, f64>) -> Self {
        Self { deltas }
    }

    /// Offset for a category; unlisted categories are not adjusted
    pub fn delta_percent(&self, category: VehicleCategory) -> f64 {
        self.deltas.get(&category).copied().unwrap_or(0.0)
    }

    pub fn adjusted_rate_percent(&self, category: VehicleCategory, base_rate_percent: f64) -> f64 {
        base_rate_percent + self.delta_percent(category)
    }
}

impl Default for RateAdjustments {
    fn default() -> Self {
        Self::default_table()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_displacement_tiers() {
        assert_eq!(VehicleCategory::motorcycle_for_displacement(125), VehicleCategory::MotorcycleSmall);
        assert_eq!(VehicleCategory::motorcycle_for_displacement(160), VehicleCategory::MotorcycleSmall);
        assert_eq!(VehicleCategory::motorcycle_for_displacement(300), VehicleCategory::MotorcycleMedium);
        assert_eq!(VehicleCategory::motorcycle_for_displacement(1000), VehicleCategory::MotorcycleLarge);
    }

    #[test]
    fn test_adjusted_rates() {
        let adjustments = RateAdjustments::default();
        assert_eq!(adjustments.adjusted_rate_percent(VehicleCategory::Car, 1.5), 1.5);
        assert!((adjustments.adjusted_rate_percent(VehicleCategory::HeavyTruck, 1.5) - 1.85).abs() < 1e-12);
        assert!((adjustments.adjusted_rate_percent(VehicleCategory::MotorcycleSmall, 2.0) - 2.3).abs() < 1e-12);
    }

    #[test]
    fn test_default_offsets() {
        let adjustments = RateAdjustments::default_table();
        let table = [
            (VehicleCategory::Car, 0.0),
            (VehicleCategory::MotorcycleSmall, 0.30),
            (VehicleCategory::MotorcycleMedium, 0.20),
            (VehicleCategory::MotorcycleLarge, 0.10),
            (VehicleCategory::LightTruck, 0.10),
            (VehicleCategory::MediumTruck, 0.20),
            (VehicleCategory::HeavyTruck, 0.35),
        ];
        for (category, expected) in table {
            assert_eq!(adjustments.delta_percent(category), expected, "{}", category.as_str());
        }
    }

    #[test]
    fn test_unlisted_category_is_unadjusted() {
        let adjustments = RateAdjustments::from_deltas(HashMap::new());
        assert_eq!(adjustments.delta_percent(VehicleCategory::HeavyTruck), 0.0);
    }

    #[test]
    fn test_category_names_round_trip() {
        for category in VehicleCategory::ALL {
            assert_eq!(category.as_str().parse::<VehicleCategory>().unwrap(), category);
            assert_eq!(serde_json::to_string(&category).unwrap(), format!("\"{}\"", category.as_str()));
        }
        assert_eq!(VehicleCategory::MediumTruck.calculator(), CalculatorKind::Truck);
    }
}
