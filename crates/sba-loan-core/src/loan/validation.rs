use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::format::format_usd;
use crate::types::{Money, Percent};

use super::field::LoanField;

pub const MIN_AMOUNT_SEEKING: Money = dec!(50000);
pub const MAX_AMOUNT_SEEKING: Money = dec!(5000000);
pub const MIN_DOWN_PAYMENT: Percent = dec!(15);
pub const MAX_DOWN_PAYMENT: Percent = dec!(95);
pub const ANNUAL_RATE_ALLOWED: Percent = dec!(6.75);
pub const SBA_FEES_ALLOWED: [Percent; 2] = [dec!(2.5), dec!(3)];

/// Longest raw value accepted for any field.
pub const MAX_FIELD_LENGTH: usize = 10;

const NUMBERS_ONLY: &str = "Only numbers are allowed.";

// ---------------------------------------------------------------------------
// Raw and validated requests
// ---------------------------------------------------------------------------

/// The five fields exactly as submitted, before any parsing.
///
/// JSON callers may send either strings or bare numbers; both are kept as
/// their textual form so the format rules see what the user typed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLoanRequest {
    #[serde(default, deserialize_with = "raw_scalar")]
    pub amount_seeking: Option<String>,
    #[serde(default, deserialize_with = "raw_scalar")]
    pub term_length: Option<String>,
    #[serde(default, deserialize_with = "raw_scalar")]
    pub down_payment: Option<String>,
    #[serde(default, deserialize_with = "raw_scalar")]
    pub sba_fees: Option<String>,
    #[serde(default, deserialize_with = "raw_scalar")]
    pub annual_rate: Option<String>,
}

impl RawLoanRequest {
    pub fn get(&self, field: LoanField) -> Option<&str> {
        let value = match field {
            LoanField::AmountSeeking => &self.amount_seeking,
            LoanField::TermLength => &self.term_length,
            LoanField::DownPayment => &self.down_payment,
            LoanField::SbaFees => &self.sba_fees,
            LoanField::AnnualRate => &self.annual_rate,
        };
        value.as_deref()
    }

    pub fn set(&mut self, field: LoanField, value: impl Into<String>) {
        let slot = match field {
            LoanField::AmountSeeking => &mut self.amount_seeking,
            LoanField::TermLength => &mut self.term_length,
            LoanField::DownPayment => &mut self.down_payment,
            LoanField::SbaFees => &mut self.sba_fees,
            LoanField::AnnualRate => &mut self.annual_rate,
        };
        *slot = Some(value.into());
    }
}

fn raw_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(de::Error::custom(format!(
            "expected a string or number, found {other}"
        ))),
    }
}

/// A request whose every field passed validation. Percentages are still in
/// form units (6.75 means 6.75%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanRequest {
    pub amount_seeking: Money,
    pub term_length_years: Decimal,
    pub down_payment_percent: Percent,
    pub sba_fees_percent: Percent,
    pub annual_rate_percent: Percent,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Absent, blank, non-numeric or malformed currency/percentage syntax.
    Format,
    /// Longer than [`MAX_FIELD_LENGTH`].
    Length,
    /// Outside the allowed bounds or not one of the allowed values.
    Range,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub kind: ErrorKind,
    pub message: String,
}

impl FieldError {
    fn format() -> Self {
        FieldError {
            kind: ErrorKind::Format,
            message: NUMBERS_ONLY.into(),
        }
    }

    fn length(field: LoanField) -> Self {
        FieldError {
            kind: ErrorKind::Length,
            message: format!(
                "{} cannot be more than {MAX_FIELD_LENGTH} characters.",
                field.label()
            ),
        }
    }

    fn range(message: String) -> Self {
        FieldError {
            kind: ErrorKind::Range,
            message,
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// At most one message per field. The first error recorded for a field wins.
///
/// Serializes as `{ "<field>Error": message, ... }` in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<LoanField, FieldError>,
}

impl ValidationErrors {
    /// Record `error` unless the field already has one.
    pub fn record(&mut self, field: LoanField, error: FieldError) {
        self.errors.entry(field).or_insert(error);
    }

    pub fn get(&self, field: LoanField) -> Option<&FieldError> {
        self.errors.get(&field)
    }

    pub fn contains(&self, field: LoanField) -> bool {
        self.errors.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (LoanField, &FieldError)> {
        self.errors.iter().map(|(field, error)| (*field, error))
    }
}

impl Serialize for ValidationErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.errors.len()))?;
        for (field, error) in &self.errors {
            map.serialize_entry(field.error_key(), &error.message)?;
        }
        map.end()
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<String> = self
            .errors
            .iter()
            .map(|(field, error)| format!("{}: {}", field.label(), error.message))
            .collect();
        f.write_str(&messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

// ---------------------------------------------------------------------------
// Format checks
// ---------------------------------------------------------------------------

/// Generic numeric grammar: optional surrounding whitespace, optional sign,
/// digits with an optional decimal point, optional exponent.
/// Groups: sign, integer digits, fraction after integer digits, bare fraction, exponent.
static NUMERIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([+-]?)(?:([0-9]+)\.?([0-9]*)|\.([0-9]+))(?:[eE]([+-]?[0-9]+))?\s*$")
        .expect("numeric pattern compiles")
});

/// Whole dollars with optional comma grouping and at most one `$`.
static AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9,]*\$?[0-9,]*$").expect("amount pattern compiles"));

static DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("digits pattern compiles"));

/// Convert a match of [`NUMERIC`] to a decimal. `None` when it does not fit.
fn numeric_value(caps: &Captures<'_>) -> Option<Decimal> {
    let sign = if &caps[1] == "-" { "-" } else { "" };
    let int_part = caps.get(2).map_or("0", |m| m.as_str());
    let frac_part = caps.get(3).or_else(|| caps.get(4)).map_or("", |m| m.as_str());
    let mantissa = if frac_part.is_empty() {
        format!("{sign}{int_part}")
    } else {
        format!("{sign}{int_part}.{frac_part}")
    };

    match caps.get(5) {
        None => Decimal::from_str(&mantissa).ok(),
        Some(exp) => Decimal::from_scientific(&format!("{mantissa}e{}", exp.as_str())).ok(),
    }
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.filter(|s| !s.trim().is_empty())
}

/// `$`-prefixed, comma-grouped whole dollars ("$250,000", "250000").
fn parse_amount_seeking(raw: &str) -> Result<Decimal, FieldError> {
    if !AMOUNT.is_match(raw) {
        return Err(FieldError::format());
    }

    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Err(FieldError::format());
    }
    if digits.len() > MAX_FIELD_LENGTH {
        return Err(FieldError::length(LoanField::AmountSeeking));
    }
    Decimal::from_str(&digits).map_err(|_| FieldError::format())
}

/// Whole percentage points, digits only.
fn parse_down_payment(raw: &str) -> Result<Decimal, FieldError> {
    if !DIGITS.is_match(raw) {
        return Err(FieldError::format());
    }
    if raw.len() > MAX_FIELD_LENGTH {
        return Err(FieldError::length(LoanField::DownPayment));
    }
    Decimal::from_str(raw).map_err(|_| FieldError::format())
}

fn parse_generic(field: LoanField, raw: &str) -> Result<Decimal, FieldError> {
    let caps = NUMERIC.captures(raw).ok_or_else(FieldError::format)?;
    if raw.len() > MAX_FIELD_LENGTH {
        return Err(FieldError::length(field));
    }
    numeric_value(&caps).ok_or_else(FieldError::format)
}

/// Format and length checks for a single field.
///
/// Returns the parsed value, or the first error found for the field.
pub fn parse_field(field: LoanField, raw: Option<&str>) -> Result<Decimal, FieldError> {
    let raw = non_blank(raw).ok_or_else(FieldError::format)?;
    match field {
        LoanField::AmountSeeking => parse_amount_seeking(raw),
        LoanField::DownPayment => parse_down_payment(raw),
        _ => parse_generic(field, raw),
    }
}

// ---------------------------------------------------------------------------
// Range checks
// ---------------------------------------------------------------------------

/// Range and enumeration checks for a value that already passed [`parse_field`].
pub fn check_range(field: LoanField, value: Decimal) -> Result<(), FieldError> {
    match field {
        LoanField::AmountSeeking => {
            if value < MIN_AMOUNT_SEEKING {
                Err(FieldError::range(format!(
                    "The minimum amount you can request is {}.",
                    format_usd(MIN_AMOUNT_SEEKING, 0)
                )))
            } else if value > MAX_AMOUNT_SEEKING {
                Err(FieldError::range(format!(
                    "The maximum amount you can request is {}.",
                    format_usd(MAX_AMOUNT_SEEKING, 0)
                )))
            } else {
                Ok(())
            }
        }
        LoanField::DownPayment => {
            if value < MIN_DOWN_PAYMENT {
                Err(FieldError::range(format!(
                    "The minimum down payment is {MIN_DOWN_PAYMENT}%"
                )))
            } else if value > MAX_DOWN_PAYMENT {
                Err(FieldError::range(format!(
                    "The maximum down payment is {MAX_DOWN_PAYMENT}%"
                )))
            } else {
                Ok(())
            }
        }
        LoanField::SbaFees => {
            if SBA_FEES_ALLOWED.contains(&value) {
                Ok(())
            } else {
                let allowed: Vec<String> = SBA_FEES_ALLOWED.iter().map(|f| f.to_string()).collect();
                Err(FieldError::range(format!(
                    "SBA fees must be either {}%",
                    allowed.join("% or ")
                )))
            }
        }
        LoanField::AnnualRate => {
            if value == ANNUAL_RATE_ALLOWED {
                Ok(())
            } else {
                Err(FieldError::range(format!(
                    "Annual rate must be {ANNUAL_RATE_ALLOWED}%"
                )))
            }
        }
        LoanField::TermLength => Ok(()),
    }
}

/// Full check of one field: format and length first, then range.
pub fn validate_field(field: LoanField, raw: Option<&str>) -> Result<Decimal, FieldError> {
    let value = parse_field(field, raw)?;
    check_range(field, value)?;
    Ok(value)
}

/// Check all five fields independently and collect every failure.
///
/// No calculation input is produced unless every field passed.
pub fn validate(raw: &RawLoanRequest) -> Result<LoanRequest, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    let mut values: [Option<Decimal>; 5] = [None; 5];

    for (slot, field) in values.iter_mut().zip(LoanField::ALL) {
        match validate_field(field, raw.get(field)) {
            Ok(value) => *slot = Some(value),
            Err(error) => errors.record(field, error),
        }
    }

    match values {
        [Some(amount_seeking), Some(term_length_years), Some(down_payment_percent), Some(sba_fees_percent), Some(annual_rate_percent)]
            if errors.is_empty() =>
        {
            Ok(LoanRequest {
                amount_seeking,
                term_length_years,
                down_payment_percent,
                sba_fees_percent,
                annual_rate_percent,
            })
        }
        _ => {
            tracing::debug!(failed = errors.len(), "loan request rejected: {errors}");
            Err(errors)
        }
    }
}
