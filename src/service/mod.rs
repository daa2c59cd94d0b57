//! JSON request/response contract shared by the HTTP handler and the CLI
//!
//! Every route takes a JSON body and returns either the serialized result or an
//! [`ErrorPayload`] with the status code its error kind maps to.

mod financing;
mod insurance;

pub use financing::{
    handle_comparison, handle_effective_rate, handle_financing, ComparisonResponse, EffectiveRateRequest,
    FinancingRequest, FinancingResponse,
};
pub use insurance::{handle_insurance, POSTAL_CODE_DIGITS};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::assumptions::Assumptions;
use crate::error::{CalcError, CalcResult};
use crate::insurance::InsuranceQuote;

/// Routes served over HTTP
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Financing,
    Compare,
    Insurance,
    EffectiveRate,
}

impl Route {
    pub fn from_path(path: &str) -> Option<Self> {
        match path.trim_end_matches('/') {
            "/financing" => Some(Route::Financing),
            "/compare" => Some(Route::Compare),
            "/insurance" => Some(Route::Insurance),
            "/effective-rate" => Some(Route::EffectiveRate),
            _ => None,
        }
    }
}

/// Body returned with every non-2xx response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub error: String,
    pub message: String,
}

impl From<&CalcError> for ErrorPayload {
    fn from(e: &CalcError) -> Self {
        ErrorPayload {
            error: e.kind().to_string(),
            message: e.to_string(),
        }
    }
}

pub fn status_code(e: &CalcError) -> u16 {
    match e {
        CalcError::InvalidParameter { .. } | CalcError::DegenerateInput(_) => 400,
        CalcError::ComputationDidNotConverge { .. } => 422,
        CalcError::Config(_) => 500,
    }
}

/// Status code and JSON body ready to put on the wire
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceResponse {
    pub status: u16,
    pub body: String,
}

impl ServiceResponse {
    pub fn ok<T: Serialize>(value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => ServiceResponse { status: 200, body },
            Err(e) => Self::error(&CalcError::Config(format!("failed to serialize response: {}", e))),
        }
    }

    pub fn error(e: &CalcError) -> Self {
        let payload = ErrorPayload::from(e);
        ServiceResponse {
            status: status_code(e),
            body: serde_json::to_string(&payload)
                .unwrap_or_else(|_| format!(r#"{{"error":"{}","message":"unserializable"}}"#, payload.error)),
        }
    }

    pub fn not_found(path: &str) -> Self {
        let payload = ErrorPayload {
            error: "NotFound".to_string(),
            message: format!("no route for {}", path),
        };
        ServiceResponse {
            status: 404,
            body: serde_json::to_string(&payload).unwrap_or_default(),
        }
    }
}

fn run_route(route: Route, body: &str, assumptions: &Assumptions) -> CalcResult<ServiceResponse> {
    Ok(match route {
        Route::Financing => {
            let request: FinancingRequest = serde_json::from_str(body)?;
            ServiceResponse::ok(&handle_financing(&request, assumptions)?)
        }
        Route::Compare => {
            let request: FinancingRequest = serde_json::from_str(body)?;
            ServiceResponse::ok(&handle_comparison(&request, assumptions)?)
        }
        Route::Insurance => {
            let quote: InsuranceQuote = serde_json::from_str(body)?;
            ServiceResponse::ok(&handle_insurance(&quote, assumptions)?)
        }
        Route::EffectiveRate => {
            let request: EffectiveRateRequest = serde_json::from_str(body)?;
            ServiceResponse::ok(&handle_effective_rate(&request)?)
        }
    })
}

/// Route a JSON body to its handler and render the outcome
pub fn dispatch(path: &str, body: &str, assumptions: &Assumptions) -> ServiceResponse {
    let Some(route) = Route::from_path(path) else {
        warn!("No route for {}", path);
        return ServiceResponse::not_found(path);
    };

    run_route(route, body, assumptions).unwrap_or_else(|e| ServiceResponse::error(&e))
}
