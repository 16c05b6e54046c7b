use serde_json::Value;

use super::{classify, error_label, money, plain, Shape};

/// Print just the key answer: the monthly payment, or one line per error.
pub fn print_minimal(value: &Value) {
    match classify(value) {
        Shape::Estimate(data) => match data.get("estimatedMonthlyPayment") {
            Some(payment) => println!("{}", money(payment, 2)),
            None => println!("{}", plain(value)),
        },
        Shape::Rejected(errors) => {
            for (key, message) in errors {
                println!("{}: {}", error_label(key), plain(message));
            }
        }
        Shape::Rows(rows) => println!("{} rows", rows.len()),
        Shape::Other(other) => println!("{}", plain(other)),
    }
}
