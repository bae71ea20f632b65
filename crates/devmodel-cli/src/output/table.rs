use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::{flatten, result_of, scalar};

/// Format output as a table using the tabled crate.
pub fn print_table(value: &Value) {
    let result = result_of(value);
    match result {
        Value::Array(rows) => print_rows(rows),
        Value::Object(_) => print_fields(result),
        other => println!("{}", scalar(other)),
    }

    if let Some(Value::Array(warnings)) = value.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = value.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_fields(result: &Value) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in flatten(result) {
        builder.push_record([key, val]);
    }
    println!("{}", Table::from(builder));
}

/// Waterfall steps and breakdown slices: one row per item, columns from the first item.
fn print_rows(rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        for item in rows {
            println!("{}", scalar(item));
        }
        return;
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(&headers);
    for item in rows {
        let row: Vec<String> = headers
            .iter()
            .map(|h| item.get(h.as_str()).map(scalar).unwrap_or_default())
            .collect();
        builder.push_record(row);
    }
    println!("{}", Table::from(builder));
}
