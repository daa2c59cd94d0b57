//! Calculator configuration: input bounds, category rate offsets and region brackets

mod bounds;
mod categories;
pub mod loader;

pub use bounds::{CalculatorBounds, CalculatorKind, InputBounds};
pub use categories::{RateAdjustments, VehicleCategory};

use std::path::Path;

use crate::error::CalcResult;
use crate::insurance::RegionTable;

/// Container for all configurable business tables
#[derive(Debug, Clone)]
pub struct Assumptions {
    pub bounds: CalculatorBounds,
    pub rate_adjustments: RateAdjustments,
    pub regions: RegionTable,
}

impl Assumptions {
    /// Built-in tables
    pub fn default_pricing() -> Self {
        Self {
            bounds: CalculatorBounds::default_table(),
            rate_adjustments: RateAdjustments::default_table(),
            regions: RegionTable::default_brackets(),
        }
    }

    /// Load assumptions from CSV files in the default location (data/assumptions/)
    pub fn from_csv() -> CalcResult<Self> {
        Self::from_csv_path(Path::new(loader::DEFAULT_ASSUMPTIONS_PATH))
    }

    /// Load assumptions from CSV files in a specific directory
    ///
    /// Each table falls back to its built-in version when its file is absent.
    pub fn from_csv_path(path: &Path) -> CalcResult<Self> {
        let defaults = Self::default_pricing();

        Ok(Self {
            bounds: loader::load_calculator_bounds(path)?.unwrap_or(defaults.bounds),
            rate_adjustments: loader::load_category_adjustments(path)?.unwrap_or(defaults.rate_adjustments),
            regions: loader::load_region_brackets(path)?.unwrap_or(defaults.regions),
        })
    }
}

impl Default for Assumptions {
    fn default() -> Self {
        Self::default_pricing()
    }
}
