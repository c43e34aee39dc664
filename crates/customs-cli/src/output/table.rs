use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{plain, ROW_FIELDS};

/// Format output as tables using the tabled crate: scalar fields first, then
/// one table per list of rows (payment lines, search hits).
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => print_result(result, map),
            _ => print_fields(map),
        },
        Value::Array(arr) => print_rows(arr),
        _ => println!("{}", value),
    }
}

fn print_result(result: &Map<String, Value>, envelope: &Map<String, Value>) {
    let scalars: Map<String, Value> = result
        .iter()
        .filter(|(k, _)| !ROW_FIELDS.contains(&k.as_str()) && k.as_str() != "warnings")
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    print_fields(&scalars);

    for field in ROW_FIELDS {
        if let Some(Value::Array(rows)) = result.get(field) {
            println!("\n{}:", field);
            print_rows(rows);
        }
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_fields(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        match val {
            Value::Object(nested) => {
                for (sub, v) in nested {
                    builder.push_record([format!("{}.{}", key, sub), plain(v)]);
                }
            }
            _ => builder.push_record([key.clone(), plain(val)]),
        }
    }
    println!("{}", Table::from(builder));
}

fn print_rows(rows: &[Value]) {
    if rows.is_empty() {
        println!("(empty)");
        return;
    }

    let headers = row_headers(rows);
    if headers.is_empty() {
        for item in rows {
            println!("{}", plain(item));
        }
        return;
    }

    let mut builder = Builder::default();
    builder.push_record(headers.iter().cloned());
    for item in rows.iter().filter_map(Value::as_object) {
        builder.push_record(
            headers
                .iter()
                .map(|h| item.get(h).map(plain).unwrap_or_default()),
        );
    }
    println!("{}", Table::from(builder));
}

/// Union of the keys of every object row, in first-seen order.
pub(super) fn row_headers(rows: &[Value]) -> Vec<String> {
    let mut headers: Vec<String> = Vec::new();
    for map in rows.iter().filter_map(Value::as_object) {
        for key in map.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }
    headers
}
