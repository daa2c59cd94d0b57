//! AWS Lambda handler for the financing and insurance calculators
//!
//! Routes `POST /financing`, `POST /compare`, `POST /insurance` and
//! `POST /effective-rate` to the service layer and answers CORS preflight.
//!
//! Supports Lambda Function URLs for direct HTTP access.

use std::path::Path;
use std::sync::Arc;

use financing_calculator::assumptions::Assumptions;
use financing_calculator::service::{dispatch, ServiceResponse};
use lambda_http::{run, service_fn, Body, Error, Request, Response};
use log::{info, warn};

/// Directory of assumption CSVs; built-in tables are used when unset
const ASSUMPTIONS_PATH_VAR: &str = "CALC_ASSUMPTIONS_PATH";

fn cors_response(status: u16, body: Body) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "POST, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type")
        .body(body)?)
}

/// Lambda handler function
async fn handler(event: Request, assumptions: Arc<Assumptions>) -> Result<Response<Body>, Error> {
    let start = std::time::Instant::now();

    // Handle CORS preflight
    if event.method().as_str() == "OPTIONS" {
        return cors_response(200, Body::Empty);
    }

    let path = event.uri().path().to_string();
    if event.method().as_str() != "POST" {
        warn!("Rejected {} {}", event.method(), path);
        return cors_response(
            405,
            Body::Text(r#"{"error":"MethodNotAllowed","message":"use POST"}"#.to_string()),
        );
    }

    let body_str = match event.body() {
        Body::Text(s) => s.clone(),
        Body::Binary(b) => String::from_utf8_lossy(b).to_string(),
        Body::Empty => "{}".to_string(),
    };

    let ServiceResponse { status, body } = dispatch(&path, &body_str, &assumptions);
    info!("POST {} -> {} in {}ms", path, status, start.elapsed().as_millis());

    cors_response(status, Body::Text(body))
}

fn load_assumptions() -> Result<Assumptions, Error> {
    match std::env::var(ASSUMPTIONS_PATH_VAR) {
        Ok(dir) => {
            info!("Loading assumptions from {}", dir);
            Ok(Assumptions::from_csv_path(Path::new(&dir))?)
        }
        Err(_) => Ok(Assumptions::default_pricing()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();

    let assumptions = Arc::new(load_assumptions()?);
    run(service_fn(move |event: Request| {
        let assumptions = Arc::clone(&assumptions);
        async move { handler(event, assumptions).await }
    }))
    .await
}
