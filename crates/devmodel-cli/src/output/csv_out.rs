use serde_json::Value;
use std::io;

use super::{flatten, result_of, scalar};

/// Write output as CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let result = result_of(value);
    match result {
        Value::Array(rows) => write_rows(&mut wtr, rows),
        Value::Object(_) => {
            let _ = wtr.write_record(["field", "value"]);
            for (key, val) in flatten(result) {
                let _ = wtr.write_record([key, val]);
            }
        }
        other => {
            let _ = wtr.write_record([scalar(other)]);
        }
    }

    let _ = wtr.flush();
}

fn write_rows<W: io::Write>(wtr: &mut csv::Writer<W>, rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        for item in rows {
            let _ = wtr.write_record([scalar(item)]);
        }
        return;
    };

    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    let _ = wtr.write_record(&headers);
    for item in rows {
        let row: Vec<String> = headers
            .iter()
            .map(|h| item.get(*h).map(scalar).unwrap_or_default())
            .collect();
        let _ = wtr.write_record(&row);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rows_written_with_headers() {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        write_rows(
            &mut wtr,
            &[
                json!({"label": "Gross sales", "amount": "450000"}),
                json!({"label": "Land", "amount": "-100000"}),
            ],
        );
        let bytes = wtr.into_inner().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, "amount,label\n450000,Gross sales\n-100000,Land\n");
    }
}
