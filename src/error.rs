//! Error taxonomy shared by the engine, the scenario helpers and the service layer

use thiserror::Error;

/// Errors raised by calculations and input validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    /// Out-of-bounds or malformed input, caught before the engine runs
    #[error("Invalid parameter: {field} ({reason})")]
    InvalidParameter { field: String, reason: String },

    /// Input that would make a formula divide by zero or misbehave
    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    /// Newton-Raphson exhausted its iteration budget
    #[error("Computation did not converge after {iterations} iterations (residual: {residual:.6})")]
    ComputationDidNotConverge { iterations: u32, residual: f64 },

    /// Assumption tables could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CalcError {
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        CalcError::InvalidParameter {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Stable machine-readable kind used in error payloads
    pub fn kind(&self) -> &'static str {
        match self {
            CalcError::InvalidParameter { .. } => "InvalidParameter",
            CalcError::DegenerateInput(_) => "DegenerateInput",
            CalcError::ComputationDidNotConverge { .. } => "ComputationDidNotConverge",
            CalcError::Config(_) => "Config",
        }
    }
}

impl From<csv::Error> for CalcError {
    fn from(e: csv::Error) -> Self {
        CalcError::Config(e.to_string())
    }
}

impl From<std::io::Error> for CalcError {
    fn from(e: std::io::Error) -> Self {
        CalcError::Config(e.to_string())
    }
}

/// Malformed request bodies
impl From<serde_json::Error> for CalcError {
    fn from(e: serde_json::Error) -> Self {
        CalcError::invalid("body", e.to_string())
    }
}

pub type CalcResult<T> = Result<T, CalcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_and_message() {
        let err = CalcError::invalid("principal", "must be positive");
        assert_eq!(err.kind(), "InvalidParameter");
        assert_eq!(err.to_string(), "Invalid parameter: principal (must be positive)");

        let err = CalcError::ComputationDidNotConverge { iterations: 100, residual: 0.5 };
        assert_eq!(err.kind(), "ComputationDidNotConverge");
        assert!(err.to_string().contains("100 iterations"));
    }
}
