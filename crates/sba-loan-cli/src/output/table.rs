use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{classify, error_label, is_money_key, money, plain, Shape};

const SUMMARY_FIELDS: [(&str, &str, u32); 8] = [
    ("estimatedMonthlyPayment", "Estimated Monthly Payment", 2),
    ("loanAmount", "Loan Amount", 0),
    ("downPaymentAmount", "Down Payment", 0),
    ("oneTimeFee", "One-Time SBA Fee", 0),
    ("totalRepayment", "Total Repayment", 0),
    ("totalInterestPaid", "Total Interest Paid", 0),
    ("totalCostOfLoan", "Total Cost of Loan", 0),
    ("payoffDate", "Payoff Date", 0),
];

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    match classify(value) {
        Shape::Estimate(data) => {
            print_summary(data);
            if let Some(Value::Array(rows)) = data.get("amortizationSchedule") {
                print_schedule_by_year(rows);
            }
        }
        Shape::Rejected(errors) => print_errors(errors),
        Shape::Rows(rows) => print_rows(rows),
        Shape::Other(other) => println!("{}", plain(other)),
    }
}

fn print_summary(data: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, label, digits) in SUMMARY_FIELDS {
        if let Some(val) = data.get(key) {
            let cell = if is_money_key(key) {
                money(val, digits)
            } else {
                plain(val)
            };
            builder.push_record([label.to_string(), cell]);
        }
    }
    println!("{}", Table::from(builder));
}

fn print_errors(errors: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Error"]);
    for (key, message) in errors {
        builder.push_record([error_label(key).to_string(), plain(message)]);
    }
    println!("{}", Table::from(builder));
}

/// One table per calendar year, like the schedule on the loan form.
fn print_schedule_by_year(rows: &[Value]) {
    let mut current_year: Option<i64> = None;
    let mut builder: Option<Builder> = None;

    for row in rows {
        let year = row.get("year").and_then(Value::as_i64);
        if year != current_year {
            if let Some(done) = builder.take() {
                println!("{}", Table::from(done));
            }
            current_year = year;
            println!("\n{}", year.map(|y| y.to_string()).unwrap_or_default());
            let mut fresh = Builder::default();
            fresh.push_record(["Month", "Beginning Balance", "Interest", "Principal", "Ending Balance"]);
            builder = Some(fresh);
        }

        if let Some(b) = builder.as_mut() {
            let month = row.get("month").map(plain).unwrap_or_default();
            let year = year.map(|y| y.to_string()).unwrap_or_default();
            let cell = |key: &str| row.get(key).map(|v| money(v, 0)).unwrap_or_default();
            b.push_record([
                format!("{month}/{year}"),
                cell("beginningBalance"),
                cell("interest"),
                cell("principal"),
                cell("endingBalance"),
            ]);
        }
    }

    if let Some(done) = builder {
        println!("{}", Table::from(done));
    }
}

fn print_rows(rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        println!("(empty)");
        return;
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(&headers);

    for item in rows {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| match map.get(h.as_str()) {
                    Some(v) if is_money_key(h) => money(v, 2),
                    Some(v) => plain(v),
                    None => String::new(),
                })
                .collect();
            builder.push_record(row);
        }
    }

    println!("{}", Table::from(builder));
}
