use serde_json::{Map, Value};
use std::io;

use super::{classify, plain, Shape};

type StdoutWriter<'a> = csv::Writer<io::StdoutLock<'a>>;

/// Write output as CSV to stdout.
///
/// An estimate is written as its schedule rows; the summary figures are
/// available through the json/table formats.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match classify(value) {
        Shape::Estimate(data) => match data.get("amortizationSchedule") {
            Some(Value::Array(rows)) => write_rows(&mut wtr, rows),
            _ => write_pairs(&mut wtr, ["field", "value"], data),
        },
        Shape::Rejected(errors) => write_pairs(&mut wtr, ["field", "message"], errors),
        Shape::Rows(rows) => write_rows(&mut wtr, rows),
        Shape::Other(other) => {
            let _ = wtr.write_record([plain(other)]);
        }
    }

    let _ = wtr.flush();
}

fn write_pairs(wtr: &mut StdoutWriter<'_>, header: [&str; 2], map: &Map<String, Value>) {
    let _ = wtr.write_record(header);
    for (key, val) in map {
        let _ = wtr.write_record([key.as_str(), &plain(val)]);
    }
}

fn write_rows(wtr: &mut StdoutWriter<'_>, rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        return;
    };

    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    let _ = wtr.write_record(&headers);

    for item in rows {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(plain).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&row);
        }
    }
}
