//! Auto insurance premium calculator

mod quote;
mod factors;
mod premium;

pub use quote::{
    InsuranceQuote, current_year, MIN_VEHICLE_YEAR, VehicleType, DriverSex, UsageCategory, DeductibleTier, SecurityEquipment, CoverageSelection,
};
pub use factors::{
    RegionTable, RegionBracket, vehicle_age_factor, driver_age_factor, license_tenure_factor,
    BASE_RATE, DEFAULT_REGION_FACTOR,
};
pub use premium::{quote_premium, quote_premium_with, PremiumResult, RiskFactors, Coverage, CoverageLine};
