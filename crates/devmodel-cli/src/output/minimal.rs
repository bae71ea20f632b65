use serde_json::Value;

use super::{result_of, scalar};

/// Headline figures, in order of preference.
const PRIORITY_KEYS: [&str; 5] = [
    "developer_profit",
    "deviation_pct",
    "base_case_value",
    "total_project_cost",
    "land_cost",
];

/// Print just the headline value from the output.
pub fn print_minimal(value: &Value) {
    println!("{}", headline(result_of(value)));
}

fn headline(result: &Value) -> String {
    match result {
        Value::Object(map) => {
            for key in PRIORITY_KEYS {
                if let Some(val) = map.get(key).filter(|v| !v.is_null()) {
                    return scalar(val);
                }
            }
            map.iter()
                .next()
                .map(|(key, val)| format!("{key}: {}", scalar(val)))
                .unwrap_or_default()
        }
        // Waterfall: the last step is the profit
        Value::Array(rows) => rows
            .last()
            .and_then(|r| r.get("amount"))
            .map(scalar)
            .unwrap_or_default(),
        other => scalar(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_profit_preferred() {
        let v = json!({"total_project_cost": "335104.375", "developer_profit": "114895.625"});
        assert_eq!(headline(&v), "114895.625");
    }

    #[test]
    fn test_waterfall_headline_is_last_step() {
        let v = json!([{"amount": "450000"}, {"amount": "114895.625"}]);
        assert_eq!(headline(&v), "114895.625");
    }
}
