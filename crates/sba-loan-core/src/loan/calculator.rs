use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::LoanError;
use crate::time_value::monthly_payment;
use crate::types::*;
use crate::SbaLoanResult;

use super::amortization::{build_schedule, first_payment_period, AmortizationRow};
use super::validation::LoanRequest;

/// Terms offered on the loan form.
pub const STANDARD_TERMS_YEARS: [Decimal; 3] = [dec!(5), dec!(10), dec!(15)];

/// Upper bound on schedule length.
pub const MAX_NUMBER_OF_PAYMENTS: u32 = 1200;

/// Repayment estimate for a validated request. Money is rounded to cents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanResult {
    #[serde(with = "rust_decimal::serde::float")]
    pub estimated_monthly_payment: Money,
    #[serde(with = "rust_decimal::serde::float")]
    pub one_time_fee: Money,
    #[serde(with = "rust_decimal::serde::float")]
    pub down_payment_amount: Money,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_repayment: Money,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_cost_of_loan: Money,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_interest_paid: Money,
    /// Principal after the down payment; this is the amount amortized.
    #[serde(with = "rust_decimal::serde::float")]
    pub loan_amount: Money,
    pub payoff_date: NaiveDate,
    pub amortization_schedule: Vec<AmortizationRow>,
}

/// Annual percentage (6.75) to periodic monthly rate (0.005625).
pub fn monthly_rate(annual_rate_percent: Decimal) -> Rate {
    annual_rate_percent / dec!(100) / dec!(12)
}

/// Whole number of monthly payments in a term of `years`.
pub fn number_of_payments(years: Decimal) -> SbaLoanResult<u32> {
    let months = years
        .checked_mul(dec!(12))
        .ok_or_else(|| LoanError::InvalidInput {
            field: "termLength".into(),
            reason: format!("A term of {years} years is out of range"),
        })?;
    if months <= Decimal::ZERO || !months.fract().is_zero() {
        return Err(LoanError::InvalidInput {
            field: "termLength".into(),
            reason: format!("A term of {years} years is not a whole, positive number of months"),
        });
    }
    match months.to_u32() {
        Some(n) if n <= MAX_NUMBER_OF_PAYMENTS => Ok(n),
        _ => Err(LoanError::InvalidInput {
            field: "termLength".into(),
            reason: format!("Term may not exceed {MAX_NUMBER_OF_PAYMENTS} monthly payments"),
        }),
    }
}

/// `as_of` moved forward by `months`. A day that does not exist in the target
/// month (29 February in a common year) rolls over to the 1st of the next month.
pub fn payoff_date(as_of: NaiveDate, months: u32) -> SbaLoanResult<NaiveDate> {
    let out_of_range = || LoanError::DateError(format!("{as_of} plus {months} months is out of range"));

    let shifted = as_of
        .checked_add_months(Months::new(months))
        .ok_or_else(out_of_range)?;
    if shifted.day() == as_of.day() {
        return Ok(shifted);
    }
    shifted
        .with_day(1)
        .and_then(|first| first.checked_add_months(Months::new(1)))
        .ok_or_else(out_of_range)
}

/// Compute the payment, summary figures and schedule for a validated request.
///
/// `as_of` is the date of the estimate: the payoff date is `as_of` plus the
/// term, and the first payment falls in the following month.
pub fn calculate_loan_terms(
    request: &LoanRequest,
    as_of: NaiveDate,
) -> SbaLoanResult<ComputationOutput<LoanResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let nper = number_of_payments(request.term_length_years)?;
    if !STANDARD_TERMS_YEARS.contains(&request.term_length_years) {
        warnings.push(format!(
            "Term of {} years is not one of the standard 5, 10 or 15 year terms",
            request.term_length_years
        ));
    }

    let rate = monthly_rate(request.annual_rate_percent);
    let down_payment_amount = request.amount_seeking * (request.down_payment_percent / dec!(100));
    let loan_after_down_payment = request.amount_seeking - down_payment_amount;

    let payment = monthly_payment(loan_after_down_payment, rate, nper)?;
    let total_repayment = payment * Decimal::from(nper);
    let total_interest_paid = total_repayment - loan_after_down_payment;

    // Fee is charged on the requested amount, before the down payment.
    let one_time_fee = request.amount_seeking * (request.sba_fees_percent / dec!(100));
    let total_cost_of_loan = total_repayment + one_time_fee;

    let payoff_date = payoff_date(as_of, nper)?;

    let schedule = build_schedule(
        loan_after_down_payment,
        rate,
        payment,
        nper,
        first_payment_period(as_of),
    );

    let output = LoanResult {
        estimated_monthly_payment: round_cents(payment),
        one_time_fee: round_cents(one_time_fee),
        down_payment_amount: round_cents(down_payment_amount),
        total_repayment: round_cents(total_repayment),
        total_cost_of_loan: round_cents(total_cost_of_loan),
        total_interest_paid: round_cents(total_interest_paid),
        loan_amount: round_cents(loan_after_down_payment),
        payoff_date,
        amortization_schedule: schedule,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "SBA Fixed-Rate Amortization",
        &serde_json::json!({
            "amount_seeking": request.amount_seeking.to_string(),
            "down_payment_percent": request.down_payment_percent.to_string(),
            "monthly_rate": rate.to_string(),
            "number_of_payments": nper,
            "as_of": as_of.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_value::pow_int;
    use rust_decimal_macros::dec;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn request() -> LoanRequest {
        LoanRequest {
            amount_seeking: dec!(250000),
            term_length_years: dec!(10),
            down_payment_percent: dec!(15),
            sba_fees_percent: dec!(3),
            annual_rate_percent: dec!(6.75),
        }
    }

    #[test]
    fn test_monthly_rate() {
        assert_eq!(monthly_rate(dec!(6.75)), dec!(0.005625));
    }

    #[test]
    fn test_number_of_payments() {
        assert_eq!(number_of_payments(dec!(10)).unwrap(), 120);
        assert_eq!(number_of_payments(dec!(2.5)).unwrap(), 30);
        assert!(number_of_payments(dec!(0)).is_err());
        assert!(number_of_payments(dec!(-5)).is_err());
        assert!(number_of_payments(dec!(1.01)).is_err());
        assert!(number_of_payments(dec!(1000)).is_err());
    }

    #[test]
    fn test_number_of_payments_out_of_decimal_range() {
        let huge = Decimal::from_scientific("1e28").unwrap();
        assert!(matches!(
            number_of_payments(huge),
            Err(LoanError::InvalidInput { .. })
        ));
        let negative = Decimal::from_scientific("-9e27").unwrap();
        assert!(number_of_payments(negative).is_err());
        assert!(number_of_payments(Decimal::MAX).is_err());
    }

    #[test]
    fn test_reference_scenario() {
        let out = calculate_loan_terms(&request(), as_of()).unwrap();
        let r = &out.result;

        assert_eq!(r.down_payment_amount, dec!(37500));
        assert_eq!(r.loan_amount, dec!(212500));
        assert_eq!(r.one_time_fee, dec!(7500));

        let rate = dec!(0.005625);
        let expected = dec!(212500) * rate / (Decimal::ONE - Decimal::ONE / pow_int(Decimal::ONE + rate, 120));
        assert_eq!(r.estimated_monthly_payment, round_cents(expected));

        assert_eq!(r.amortization_schedule.len(), 120);
        assert_eq!(r.payoff_date, NaiveDate::from_ymd_opt(2036, 10, 19).unwrap());
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_summary_identities() {
        let out = calculate_loan_terms(&request(), as_of()).unwrap();
        let r = &out.result;
        let tol = dec!(0.01);

        let rate = dec!(0.005625);
        let unrounded = dec!(212500) * rate / (Decimal::ONE - Decimal::ONE / pow_int(Decimal::ONE + rate, 120));
        assert_eq!(r.total_repayment, round_cents(unrounded * dec!(120)));
        assert!((r.total_cost_of_loan - (r.total_repayment + r.one_time_fee)).abs() <= tol);
        assert!((r.total_interest_paid - (r.total_repayment - r.loan_amount)).abs() <= tol);
    }

    #[test]
    fn test_fee_is_on_requested_amount() {
        let mut req = request();
        req.down_payment_percent = dec!(50);
        req.sba_fees_percent = dec!(2.5);
        let out = calculate_loan_terms(&req, as_of()).unwrap();
        assert_eq!(out.result.one_time_fee, dec!(6250));
        assert_eq!(out.result.loan_amount, dec!(125000));
    }

    #[test]
    fn test_non_standard_term_warns() {
        let mut req = request();
        req.term_length_years = dec!(7);
        let out = calculate_loan_terms(&req, as_of()).unwrap();
        assert_eq!(out.result.amortization_schedule.len(), 84);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_leap_day_payoff_rolls_to_march() {
        let leap = NaiveDate::from_ymd_opt(2028, 2, 29).unwrap();
        let mut req = request();
        req.term_length_years = dec!(5);
        let out = calculate_loan_terms(&req, leap).unwrap();
        assert_eq!(out.result.payoff_date, NaiveDate::from_ymd_opt(2033, 3, 1).unwrap());
    }

    #[test]
    fn test_payoff_date_keeps_existing_days() {
        let leap = NaiveDate::from_ymd_opt(2028, 2, 29).unwrap();
        assert_eq!(payoff_date(leap, 48).unwrap(), leap.with_year(2032).unwrap());
        let jan = NaiveDate::from_ymd_opt(2026, 1, 31).unwrap();
        assert_eq!(payoff_date(jan, 120).unwrap(), NaiveDate::from_ymd_opt(2036, 1, 31).unwrap());
        assert_eq!(payoff_date(jan, 1).unwrap(), NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
    }

    #[test]
    fn test_zero_term_is_rejected() {
        let mut req = request();
        req.term_length_years = Decimal::ZERO;
        assert!(calculate_loan_terms(&req, as_of()).is_err());
    }
}
