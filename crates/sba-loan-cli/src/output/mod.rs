pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;
pub mod yaml;

use crate::OutputFormat;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use sba_loan_core::format::format_usd;
use sba_loan_core::loan::LoanField;
use serde_json::{Map, Value};
use std::str::FromStr;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Yaml => yaml::print_yaml(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// The shape of a command's output.
pub(crate) enum Shape<'a> {
    /// `{"status":"success","data":{..}}`
    Estimate(&'a Map<String, Value>),
    /// `{"status":"error","errors":{..}}`
    Rejected(&'a Map<String, Value>),
    /// Schedule rows or year summaries
    Rows(&'a [Value]),
    Other(&'a Value),
}

pub(crate) fn classify(value: &Value) -> Shape<'_> {
    match value {
        Value::Object(map) => match (map.get("status").and_then(Value::as_str), map.get("data"), map.get("errors")) {
            (Some("success"), Some(Value::Object(data)), _) => Shape::Estimate(data),
            (Some("error"), _, Some(Value::Object(errors))) => Shape::Rejected(errors),
            _ => Shape::Other(value),
        },
        Value::Array(rows) => Shape::Rows(rows),
        _ => Shape::Other(value),
    }
}

/// Label for an error key such as `amountSeekingError`.
pub(crate) fn error_label(key: &str) -> &str {
    key.strip_suffix("Error")
        .and_then(LoanField::from_key)
        .map(LoanField::label)
        .unwrap_or(key)
}

/// Columns that hold counts or calendar values rather than dollars.
const NON_MONEY_KEYS: [&str; 3] = ["year", "month", "payments"];

pub(crate) fn is_money_key(key: &str) -> bool {
    !NON_MONEY_KEYS.contains(&key) && key != "payoffDate"
}

fn decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .ok()
            .or_else(|| n.as_f64().and_then(Decimal::from_f64)),
        _ => None,
    }
}

/// Render a JSON number as dollars, anything else as plain text.
pub(crate) fn money(value: &Value, fraction_digits: u32) -> String {
    decimal(value)
        .map(|d| format_usd(d, fraction_digits))
        .unwrap_or_else(|| plain(value))
}

pub(crate) fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
