use serde_json::Value;

use super::plain;

/// Print just the headline value of the output.
///
/// Looks for well-known result fields in order of priority, then falls back
/// to the first field in the result object.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let priority_keys = ["total_local", "total", "regime"];

    if let Value::Object(map) = result_obj {
        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}", plain(val));
                    return;
                }
            }
        }

        if let Some(Value::Array(hits)) = map.get("hits") {
            for hit in hits {
                let code = hit.get("code").map(plain).unwrap_or_default();
                let description = hit.get("description").map(plain).unwrap_or_default();
                println!("{}\t{}", code, description);
            }
            return;
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, plain(val));
            return;
        }
    }

    println!("{}", plain(result_obj));
}
