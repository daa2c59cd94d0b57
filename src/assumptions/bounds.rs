//! Input bounds per calculator, enforced before the engine runs

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{CalcError, CalcResult};

/// Calculator the request was submitted from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CalculatorKind {
    #[default]
    Vehicle,
    Truck,
    Motorcycle,
    RealEstate,
    PersonalLoan,
    Refinancing,
}

impl CalculatorKind {
    pub const ALL: [CalculatorKind; 6] = [
        CalculatorKind::Vehicle,
        CalculatorKind::Truck,
        CalculatorKind::Motorcycle,
        CalculatorKind::RealEstate,
        CalculatorKind::PersonalLoan,
        CalculatorKind::Refinancing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CalculatorKind::Vehicle => "vehicle",
            CalculatorKind::Truck => "truck",
            CalculatorKind::Motorcycle => "motorcycle",
            CalculatorKind::RealEstate => "real-estate",
            CalculatorKind::PersonalLoan => "personal-loan",
            CalculatorKind::Refinancing => "refinancing",
        }
    }
}

impl std::str::FromStr for CalculatorKind {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CalculatorKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| CalcError::invalid("calculator", format!("unknown calculator: {}", s)))
    }
}

/// Accepted ranges for one calculator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputBounds {
    pub min_principal: f64,
    pub max_principal: f64,
    /// Periodic rate bounds, in percent
    pub min_rate_percent: f64,
    pub max_rate_percent: f64,
    pub min_periods: u32,
    pub max_periods: u32,
}

impl InputBounds {
    pub const fn new(
        principal: (f64, f64),
        rate_percent: (f64, f64),
        periods: (u32, u32),
    ) -> Self {
        Self {
            min_principal: principal.0,
            max_principal: principal.1,
            min_rate_percent: rate_percent.0,
            max_rate_percent: rate_percent.1,
            min_periods: periods.0,
            max_periods: periods.1,
        }
    }

    /// Reject anything outside the configured ranges (inclusive)
    pub fn check(&self, principal: f64, rate_percent: f64, num_periods: u32) -> CalcResult<()> {
        if !principal.is_finite() || principal < self.min_principal || principal > self.max_principal {
            return Err(CalcError::invalid(
                "principal",
                format!("{} outside [{}, {}]", principal, self.min_principal, self.max_principal),
            ));
        }
        if !rate_percent.is_finite() || rate_percent < self.min_rate_percent || rate_percent > self.max_rate_percent {
            return Err(CalcError::invalid(
                "periodicRatePercent",
                format!("{} outside [{}, {}]", rate_percent, self.min_rate_percent, self.max_rate_percent),
            ));
        }
        if num_periods < self.min_periods || num_periods > self.max_periods {
            return Err(CalcError::invalid(
                "numPeriods",
                format!("{} outside [{}, {}]", num_periods, self.min_periods, self.max_periods),
            ));
        }
        Ok(())
    }
}

/// Bounds table keyed by calculator
#[derive(Debug, Clone)]
pub struct CalculatorBounds {
    bounds: HashMap<CalculatorKind, InputBounds>,
}

impl CalculatorBounds {
    pub fn default_table() -> Self {
        let mut bounds = HashMap::new();
        bounds.insert(CalculatorKind::Vehicle, InputBounds::new((5_000.0, 10_000_000.0), (0.1, 5.0), (6, 120)));
        bounds.insert(CalculatorKind::Truck, InputBounds::new((20_000.0, 10_000_000.0), (0.1, 5.0), (6, 120)));
        bounds.insert(CalculatorKind::Motorcycle, InputBounds::new((2_000.0, 500_000.0), (0.1, 6.0), (6, 72)));
        bounds.insert(CalculatorKind::RealEstate, InputBounds::new((30_000.0, 50_000_000.0), (0.1, 2.0), (12, 420)));
        bounds.insert(CalculatorKind::PersonalLoan, InputBounds::new((500.0, 500_000.0), (0.1, 20.0), (1, 120)));
        bounds.insert(CalculatorKind::Refinancing, InputBounds::new((5_000.0, 50_000_000.0), (0.1, 5.0), (6, 420)));
        Self { bounds }
    }

    pub fn get(&self, kind: CalculatorKind) -> InputBounds {
        self.bounds
            .get(&kind)
            .copied()
            .unwrap_or_else(|| Self::default_table().bounds[&kind])
    }

    pub fn set(&mut self, kind: CalculatorKind, bounds: InputBounds) {
        self.bounds.insert(kind, bounds);
    }
}

impl Default for CalculatorBounds {
    fn default() -> Self {
        Self::default_table()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vehicle_bounds() {
        let bounds = CalculatorBounds::default().get(CalculatorKind::Vehicle);
        assert!(bounds.check(40_000.0, 1.8, 48).is_ok());
        assert!(bounds.check(5_000.0, 0.1, 6).is_ok());
        assert!(bounds.check(10_000_000.0, 5.0, 120).is_ok());

        assert!(bounds.check(4_999.0, 1.8, 48).is_err());
        assert!(bounds.check(40_000.0, 5.1, 48).is_err());
        assert!(bounds.check(40_000.0, 1.8, 121).is_err());
        assert!(bounds.check(f64::NAN, 1.8, 48).is_err());
    }

    #[test]
    fn test_bounds_vary_per_calculator() {
        let table = CalculatorBounds::default();
        assert!(table.get(CalculatorKind::RealEstate).check(300_000.0, 0.9, 360).is_ok());
        assert!(table.get(CalculatorKind::Vehicle).check(300_000.0, 0.9, 360).is_err());
    }

    #[test]
    fn test_kind_names_round_trip() {
        for kind in CalculatorKind::ALL {
            assert_eq!(kind.as_str().parse::<CalculatorKind>().unwrap(), kind);
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }
}
