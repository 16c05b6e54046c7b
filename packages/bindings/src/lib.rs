use chrono::NaiveDate;
use napi::Result as NapiResult;
use napi_derive::napi;

use sba_loan_core::loan::presets::LoanPurpose;
use sba_loan_core::loan::validation::{validate_field, FieldError};
use sba_loan_core::loan::{estimate, estimate_as_of, LoanField, RawLoanRequest};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse_request(input_json: &str) -> NapiResult<RawLoanRequest> {
    serde_json::from_str(input_json).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Estimates
// ---------------------------------------------------------------------------

/// Validate the form fields and return the `{status, data|errors}` envelope.
#[napi]
pub fn estimate_loan(input_json: String) -> NapiResult<String> {
    let raw = parse_request(&input_json)?;
    let response = estimate(&raw).map_err(to_napi_error)?;
    serde_json::to_string(&response).map_err(to_napi_error)
}

/// As `estimateLoan`, with the estimate dated `as_of` (YYYY-MM-DD).
#[napi]
pub fn estimate_loan_as_of(input_json: String, as_of: String) -> NapiResult<String> {
    let raw = parse_request(&input_json)?;
    let date: NaiveDate = as_of.parse().map_err(to_napi_error)?;
    let response = estimate_as_of(&raw, date).map_err(to_napi_error)?;
    serde_json::to_string(&response).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Form helpers
// ---------------------------------------------------------------------------

/// Check one field as the user types. Returns the error message, or null
/// when the value is acceptable.
#[napi]
pub fn check_field(field: String, value: Option<String>) -> NapiResult<Option<String>> {
    let field = LoanField::from_key(&field)
        .ok_or_else(|| to_napi_error(format!("Unknown loan field: {field}")))?;
    Ok(validate_field(field, value.as_deref())
        .err()
        .map(|FieldError { message, .. }| message))
}

/// Default form values for a buyout (`buying = true`) or general loan.
#[napi]
pub fn form_defaults(buying: bool) -> NapiResult<String> {
    let purpose = if buying {
        LoanPurpose::Buyout
    } else {
        LoanPurpose::General
    };
    serde_json::to_string(&purpose.defaults()).map_err(to_napi_error)
}
