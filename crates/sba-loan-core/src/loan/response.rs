use chrono::{Local, NaiveDate};
use serde::Serialize;

use crate::SbaLoanResult;

use super::calculator::{calculate_loan_terms, LoanResult};
use super::validation::{validate, RawLoanRequest, ValidationErrors};

/// What a caller receives for one estimate: either the full result or every
/// field error, never both.
///
/// Serializes as `{"status":"success","data":{..}}` or
/// `{"status":"error","errors":{"amountSeekingError":"..",..}}`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum LoanResponse {
    Success { data: LoanResult },
    Error { errors: ValidationErrors },
}

impl LoanResponse {
    pub fn is_success(&self) -> bool {
        matches!(self, LoanResponse::Success { .. })
    }

    pub fn data(&self) -> Option<&LoanResult> {
        match self {
            LoanResponse::Success { data } => Some(data),
            LoanResponse::Error { .. } => None,
        }
    }

    pub fn errors(&self) -> Option<&ValidationErrors> {
        match self {
            LoanResponse::Error { errors } => Some(errors),
            LoanResponse::Success { .. } => None,
        }
    }
}

/// Validate the raw form values and, if every field passes, compute the
/// estimate as of `as_of`.
pub fn estimate_as_of(raw: &RawLoanRequest, as_of: NaiveDate) -> SbaLoanResult<LoanResponse> {
    let request = match validate(raw) {
        Ok(request) => request,
        Err(errors) => return Ok(LoanResponse::Error { errors }),
    };

    let output = calculate_loan_terms(&request, as_of)?;
    for warning in &output.warnings {
        tracing::warn!("{warning}");
    }
    tracing::debug!(
        payments = output.result.amortization_schedule.len(),
        elapsed_us = output.metadata.computation_time_us,
        "loan estimate computed"
    );

    Ok(LoanResponse::Success {
        data: output.result,
    })
}

/// [`estimate_as_of`] using today's local date.
pub fn estimate(raw: &RawLoanRequest) -> SbaLoanResult<LoanResponse> {
    estimate_as_of(raw, Local::now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::field::LoanField;

    fn raw() -> RawLoanRequest {
        RawLoanRequest {
            amount_seeking: Some("$250,000".into()),
            term_length: Some("10".into()),
            down_payment: Some("15".into()),
            sba_fees: Some("3".into()),
            annual_rate: Some("6.75".into()),
        }
    }

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn test_success_envelope() {
        let resp = estimate_as_of(&raw(), as_of()).unwrap();
        assert!(resp.is_success());

        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["data"]["loanAmount"], 212500.0);
        assert_eq!(json["data"]["oneTimeFee"], 7500.0);
        assert_eq!(json["data"]["payoffDate"], "2036-10-19");
        assert!(json.get("errors").is_none());

        let first = &json["data"]["amortizationSchedule"][0];
        assert_eq!(first["year"], 2026);
        assert_eq!(first["month"], 11);
        for key in ["beginningBalance", "interest", "principal", "endingBalance"] {
            assert!(first[key].is_number(), "{key} should be a number");
        }
    }

    #[test]
    fn test_error_envelope_has_no_data() {
        let mut bad = raw();
        bad.annual_rate = Some("6.74".into());
        bad.down_payment = Some("96".into());

        let resp = estimate_as_of(&bad, as_of()).unwrap();
        assert!(resp.data().is_none());
        assert_eq!(resp.errors().unwrap().len(), 2);

        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["status"], "error");
        assert!(json.get("data").is_none());
        assert_eq!(json["errors"]["annualRateError"], "Annual rate must be 6.75%");
        assert_eq!(json["errors"]["downPaymentError"], "The maximum down payment is 95%");
        assert!(json["errors"].get(LoanField::AmountSeeking.error_key()).is_none());
    }

    #[test]
    fn test_repeat_calls_are_identical() {
        let a = serde_json::to_string(&estimate_as_of(&raw(), as_of()).unwrap()).unwrap();
        let b = serde_json::to_string(&estimate_as_of(&raw(), as_of()).unwrap()).unwrap();
        assert_eq!(a, b);
    }
}
