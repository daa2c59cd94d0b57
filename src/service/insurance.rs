//! Insurance quote endpoint

use log::{info, warn};

use crate::assumptions::Assumptions;
use crate::error::{CalcError, CalcResult};
use crate::insurance::{quote_premium_with, InsuranceQuote, PremiumResult};

/// Postal codes are accepted as `NNNNN-NNN` or `NNNNNNNN`
pub const POSTAL_CODE_DIGITS: usize = 8;

fn check_postal_code(postal_code: &str) -> CalcResult<()> {
    let stripped: String = postal_code.chars().filter(|c| *c != '-').collect();
    if stripped.len() != POSTAL_CODE_DIGITS || !stripped.chars().all(|c| c.is_ascii_digit()) {
        return Err(CalcError::invalid(
            "postalCode",
            format!("expected {} digits, got {:?}", POSTAL_CODE_DIGITS, postal_code),
        ));
    }
    Ok(())
}

pub fn handle_insurance(quote: &InsuranceQuote, assumptions: &Assumptions) -> CalcResult<PremiumResult> {
    if let Err(e) = check_postal_code(&quote.postal_code) {
        warn!("Rejected insurance quote: {}", e);
        return Err(e);
    }

    let result = quote_premium_with(quote, &assumptions.regions)?;
    info!(
        "Quoted {:?} worth {:.2}: annual premium {:.2}",
        quote.vehicle_type, quote.vehicle_value, result.annual_premium
    );
    Ok(result)
}
