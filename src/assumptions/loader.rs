//! CSV-based assumption loader
//!
//! Loads calculator configuration from CSV files in data/assumptions/.
//! A missing file leaves the built-in table in place.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use log::{debug, info};

use super::bounds::{CalculatorBounds, CalculatorKind, InputBounds};
use super::categories::{RateAdjustments, VehicleCategory};
use crate::error::{CalcError, CalcResult};
use crate::insurance::{RegionBracket, RegionTable};

/// Default path to assumptions directory
pub const DEFAULT_ASSUMPTIONS_PATH: &str = "data/assumptions";

pub const BOUNDS_FILE: &str = "calculator_bounds.csv";
pub const ADJUSTMENTS_FILE: &str = "category_adjustments.csv";
pub const REGIONS_FILE: &str = "region_brackets.csv";

/// Raw row of calculator_bounds.csv
#[derive(Debug, serde::Deserialize)]
struct BoundsRow {
    calculator: String,
    min_principal: f64,
    max_principal: f64,
    min_rate_percent: f64,
    max_rate_percent: f64,
    min_periods: u32,
    max_periods: u32,
}

/// Raw row of category_adjustments.csv
#[derive(Debug, serde::Deserialize)]
struct AdjustmentRow {
    category: String,
    rate_delta_percent: f64,
}

fn open_optional(path: &Path, file_name: &str) -> CalcResult<Option<File>> {
    let full = path.join(file_name);
    if !full.exists() {
        debug!("{} not found, keeping built-in table", full.display());
        return Ok(None);
    }
    info!("Loading assumptions from {}", full.display());
    Ok(Some(File::open(full)?))
}

/// Load calculator bounds; rows override the built-in entries they name
pub fn load_calculator_bounds(path: &Path) -> CalcResult<Option<CalculatorBounds>> {
    let Some(file) = open_optional(path, BOUNDS_FILE)? else {
        return Ok(None);
    };
    let mut reader = csv::Reader::from_reader(file);
    let mut table = CalculatorBounds::default_table();

    for result in reader.deserialize() {
        let row: BoundsRow = result?;
        let kind: CalculatorKind = row.calculator.parse().map_err(|e: CalcError| CalcError::Config(e.to_string()))?;
        if row.min_principal > row.max_principal
            || row.min_rate_percent > row.max_rate_percent
            || row.min_periods > row.max_periods
        {
            return Err(CalcError::Config(format!("inverted bounds for calculator {}", row.calculator)));
        }
        table.set(
            kind,
            InputBounds::new(
                (row.min_principal, row.max_principal),
                (row.min_rate_percent, row.max_rate_percent),
                (row.min_periods, row.max_periods),
            ),
        );
    }

    Ok(Some(table))
}

/// Load category rate offsets; the file replaces the built-in table
pub fn load_category_adjustments(path: &Path) -> CalcResult<Option<RateAdjustments>> {
    let Some(file) = open_optional(path, ADJUSTMENTS_FILE)? else {
        return Ok(None);
    };
    let mut reader = csv::Reader::from_reader(file);
    let mut deltas = HashMap::new();

    for result in reader.deserialize() {
        let row: AdjustmentRow = result?;
        let category: VehicleCategory = row.category.parse().map_err(|e: CalcError| CalcError::Config(e.to_string()))?;
        deltas.insert(category, row.rate_delta_percent);
    }

    Ok(Some(RateAdjustments::from_deltas(deltas)))
}

/// Load postal-code brackets; the file replaces the built-in table
pub fn load_region_brackets(path: &Path) -> CalcResult<Option<RegionTable>> {
    let Some(file) = open_optional(path, REGIONS_FILE)? else {
        return Ok(None);
    };
    load_region_brackets_from_reader(file).map(Some)
}

/// Load postal-code brackets from any reader
pub fn load_region_brackets_from_reader<R: std::io::Read>(reader: R) -> CalcResult<RegionTable> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut brackets = Vec::new();

    for result in csv_reader.deserialize() {
        let bracket: RegionBracket = result?;
        if bracket.start > bracket.end {
            return Err(CalcError::Config(format!(
                "region bracket {}-{} is inverted",
                bracket.start, bracket.end
            )));
        }
        brackets.push(bracket);
    }

    Ok(RegionTable::from_brackets(brackets))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn shipped_assumptions() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_ASSUMPTIONS_PATH)
    }

    #[test]
    fn test_shipped_files_match_defaults() {
        let path = shipped_assumptions();

        let bounds = load_calculator_bounds(&path).unwrap().expect("bounds file present");
        let defaults = CalculatorBounds::default_table();
        for kind in CalculatorKind::ALL {
            assert_eq!(bounds.get(kind), defaults.get(kind), "bounds differ for {}", kind.as_str());
        }

        let adjustments = load_category_adjustments(&path).unwrap().expect("adjustments file present");
        let default_adjustments = RateAdjustments::default_table();
        for category in VehicleCategory::ALL {
            assert_eq!(adjustments.delta_percent(category), default_adjustments.delta_percent(category));
        }

        let regions = load_region_brackets(&path).unwrap().expect("regions file present");
        assert_eq!(regions, RegionTable::default_brackets());
    }

    #[test]
    fn test_missing_directory_keeps_defaults() {
        let path = Path::new("does/not/exist");
        assert!(load_calculator_bounds(path).unwrap().is_none());
        assert!(load_category_adjustments(path).unwrap().is_none());
        assert!(load_region_brackets(path).unwrap().is_none());
    }

    #[test]
    fn test_region_brackets_from_reader() {
        let data = "start,end,factor,label\n1000,1999,1.3,Downtown\n2000,2999,1.0,\n";
        let table = load_region_brackets_from_reader(data.as_bytes()).unwrap();
        assert_eq!(table.brackets().len(), 2);
        assert_eq!(table.factor_for("01500-000"), 1.3);
        assert_eq!(table.factor_for("02500-000"), 1.0);
    }

    #[test]
    fn test_inverted_bracket_rejected() {
        let data = "start,end,factor,label\n2999,2000,1.0,Broken\n";
        assert!(matches!(load_region_brackets_from_reader(data.as_bytes()), Err(CalcError::Config(_))));
    }
}
