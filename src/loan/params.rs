//! Loan parameter records

use serde::{Deserialize, Serialize};

use crate::error::{CalcError, CalcResult};

/// Amortization system used to build the schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AmortizationSystem {
    /// Price table: constant installment, decreasing interest
    #[default]
    FixedInstallment,
    /// SAC: constant principal portion, decreasing installment
    ConstantAmortization,
}

impl AmortizationSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            AmortizationSystem::FixedInstallment => "fixed-installment",
            AmortizationSystem::ConstantAmortization => "constant-amortization",
        }
    }
}

impl std::str::FromStr for AmortizationSystem {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fixed-installment" | "price" => Ok(AmortizationSystem::FixedInstallment),
            "constant-amortization" | "sac" => Ok(AmortizationSystem::ConstantAmortization),
            other => Err(CalcError::invalid("system", format!("unknown amortization system: {}", other))),
        }
    }
}

/// Inputs of a single financing simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanParameters {
    /// Amount financed before any tax
    pub principal: f64,

    /// Nominal periodic rate as a fraction (0.018 = 1.8% per period)
    pub periodic_rate: f64,

    /// Number of installments
    pub num_periods: u32,

    #[serde(default)]
    pub system: AmortizationSystem,

    /// Whether the transaction tax is financed together with the principal
    #[serde(default)]
    pub include_tax: bool,
}

impl LoanParameters {
    pub fn new(principal: f64, periodic_rate: f64, num_periods: u32) -> Self {
        Self {
            principal,
            periodic_rate,
            num_periods,
            system: AmortizationSystem::FixedInstallment,
            include_tax: false,
        }
    }

    pub fn with_system(mut self, system: AmortizationSystem) -> Self {
        self.system = system;
        self
    }

    pub fn with_tax(mut self, include_tax: bool) -> Self {
        self.include_tax = include_tax;
        self
    }

    /// Build parameters from a rate expressed in percent per period
    pub fn from_percent(principal: f64, rate_percent: f64, num_periods: u32) -> Self {
        Self::new(principal, rate_percent / 100.0, num_periods)
    }

    /// Check the invariants every engine entry point relies on
    pub fn validate(&self) -> CalcResult<()> {
        validate_terms(self.principal, self.periodic_rate, self.num_periods)
    }
}

/// Shared guard for (principal, rate, periods) triples
pub(crate) fn validate_terms(principal: f64, periodic_rate: f64, num_periods: u32) -> CalcResult<()> {
    if !principal.is_finite() || principal <= 0.0 {
        return Err(CalcError::invalid("principal", format!("must be positive, got {}", principal)));
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
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_parsing() {
        assert_eq!("price".parse::<AmortizationSystem>().unwrap(), AmortizationSystem::FixedInstallment);
        assert_eq!("SAC".parse::<AmortizationSystem>().unwrap(), AmortizationSystem::ConstantAmortization);
        assert!("german".parse::<AmortizationSystem>().is_err());
    }

    #[test]
    fn test_system_serde_names() {
        let json = serde_json::to_string(&AmortizationSystem::ConstantAmortization).unwrap();
        assert_eq!(json, "\"constant-amortization\"");

        let params: LoanParameters = serde_json::from_str(
            r#"{"principal": 1000.0, "periodicRate": 0.01, "numPeriods": 12}"#,
        )
        .unwrap();
        assert_eq!(params.system, AmortizationSystem::FixedInstallment);
        assert!(!params.include_tax);

        let json = serde_json::to_value(params.with_tax(true)).unwrap();
        assert_eq!(json["includeTax"], true);
        assert_eq!(json["numPeriods"], 12);
        assert!(json.get("periodic_rate").is_none());
    }

    #[test]
    fn test_validate() {
        assert!(LoanParameters::new(1000.0, 0.01, 12).validate().is_ok());
        assert!(LoanParameters::new(1000.0, 0.0, 12).validate().is_ok());
        assert!(matches!(
            LoanParameters::new(0.0, 0.01, 12).validate(),
            Err(CalcError::InvalidParameter { .. })
        ));
        assert!(matches!(
            LoanParameters::new(1000.0, 0.01, 0).validate(),
            Err(CalcError::InvalidParameter { .. })
        ));
        assert!(matches!(
            LoanParameters::new(1000.0, -0.01, 12).validate(),
            Err(CalcError::DegenerateInput(_))
        ));
    }

    #[test]
    fn test_from_percent() {
        let params = LoanParameters::from_percent(40_000.0, 1.8, 48);
        assert!((params.periodic_rate - 0.018).abs() < 1e-15);
    }
}
