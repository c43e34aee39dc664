use serde_json::Value;
use std::io;

use super::table::row_headers;
use super::{plain, ROW_FIELDS};

type StdoutWriter<'a> = csv::Writer<io::StdoutLock<'a>>;

/// Write output as CSV to stdout.
///
/// A result carrying payment lines or search hits is written as one row per
/// item; any other result as two-column `field,value` records.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => {
                let rows = ROW_FIELDS
                    .iter()
                    .find_map(|f| result.get(*f).and_then(Value::as_array));
                match rows {
                    Some(rows) => write_rows(&mut wtr, rows),
                    None => write_fields(&mut wtr, result),
                }
            }
            _ => write_fields(&mut wtr, map),
        },
        Value::Array(arr) => write_rows(&mut wtr, arr),
        _ => {
            let _ = wtr.write_record([plain(value)]);
        }
    }

    let _ = wtr.flush();
}

fn write_fields(wtr: &mut StdoutWriter<'_>, map: &serde_json::Map<String, Value>) {
    let _ = wtr.write_record(["field", "value"]);
    for (key, val) in map {
        let _ = wtr.write_record([key.as_str(), &plain(val)]);
    }
}

fn write_rows(wtr: &mut StdoutWriter<'_>, rows: &[Value]) {
    let headers = row_headers(rows);
    if headers.is_empty() {
        for item in rows {
            let _ = wtr.write_record([plain(item)]);
        }
        return;
    }

    let _ = wtr.write_record(&headers);
    for item in rows.iter().filter_map(Value::as_object) {
        let row: Vec<String> = headers
            .iter()
            .map(|h| item.get(h).map(plain).unwrap_or_default())
            .collect();
        let _ = wtr.write_record(&row);
    }
}
