//! Auto insurance quote inputs

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::error::{CalcError, CalcResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleType {
    Hatchback,
    Sedan,
    Suv,
    Pickup,
    Sports,
    Luxury,
}

/// Sex of the main driver, used only as a claims-statistics multiplier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverSex {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageCategory {
    #[default]
    Personal,
    Work,
    Rideshare,
    Commercial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeductibleTier {
    Low,
    #[default]
    Medium,
    High,
}

/// Anti-theft equipment; each item stacks a discount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityEquipment {
    pub garage: bool,
    pub alarm: bool,
    pub tracker: bool,
}

/// Earliest model year accepted in a quote
pub const MIN_VEHICLE_YEAR: i32 = 1900;

fn default_true() -> bool {
    true
}

/// Current calendar year, used when a request leaves the reference year out
pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

/// Coverages requested by the customer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageSelection {
    #[serde(default = "default_true")]
    pub comprehensive: bool,
    #[serde(default = "default_true")]
    pub third_party: bool,
    #[serde(default = "default_true")]
    pub personal_accident: bool,
    /// Rental car while the insured vehicle is repaired (+15%)
    #[serde(default)]
    pub replacement_car: bool,
    /// Windshield and window coverage (+10%)
    #[serde(default)]
    pub glass: bool,
}

impl Default for CoverageSelection {
    fn default() -> Self {
        Self {
            comprehensive: true,
            third_party: true,
            personal_accident: true,
            replacement_car: false,
            glass: false,
        }
    }
}

/// Everything needed to price an auto policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsuranceQuote {
    /// Market value of the vehicle
    pub vehicle_value: f64,
    pub vehicle_year: i32,
    pub vehicle_type: VehicleType,

    pub driver_age: u32,
    pub driver_sex: DriverSex,
    /// Years since the driver's license was issued
    pub license_years: u32,

    #[serde(default)]
    pub usage: UsageCategory,

    /// Postal code of the overnight address (digits, optional hyphen)
    pub postal_code: String,

    #[serde(default)]
    pub security: SecurityEquipment,

    #[serde(default)]
    pub coverages: CoverageSelection,

    #[serde(default)]
    pub deductible: DeductibleTier,

    /// Year the vehicle age is measured against
    #[serde(default = "current_year")]
    pub reference_year: i32,
}

impl InsuranceQuote {
    pub fn vehicle_age(&self) -> u32 {
        (i64::from(self.reference_year) - i64::from(self.vehicle_year)).clamp(0, i64::from(u32::MAX)) as u32
    }

    /// Postal code with separators removed
    pub fn postal_digits(&self) -> String {
        self.postal_code.chars().filter(|c| c.is_ascii_digit()).collect()
    }

    pub fn validate(&self) -> CalcResult<()> {
        if !self.vehicle_value.is_finite() || self.vehicle_value <= 0.0 {
            return Err(CalcError::invalid(
                "vehicleValue",
                format!("must be positive, got {}", self.vehicle_value),
            ));
        }
        if self.vehicle_year < MIN_VEHICLE_YEAR {
            return Err(CalcError::invalid(
                "vehicleYear",
                format!("{} is before {}", self.vehicle_year, MIN_VEHICLE_YEAR),
            ));
        }
        if self.vehicle_year > self.reference_year {
            return Err(CalcError::invalid(
                "vehicleYear",
                format!("{} is after the reference year {}", self.vehicle_year, self.reference_year),
            ));
        }
        Ok(())
    }
}
