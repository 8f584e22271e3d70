//! Field-by-field rendering of JSON resources

use serde_json::Value;

/// Every non-null scalar in `value` as a `path: value` line
///
/// Object keys are joined with `.` and array items are written `[i]`, so a
/// patient's first given name comes out as `name[0].given[0]: Mary`.
pub fn flatten_fields(value: &Value) -> Vec<String> {
    let mut lines = Vec::new();
    collect(value, String::new(), &mut lines);
    lines
}

fn collect(value: &Value, path: String, lines: &mut Vec<String>) {
    match value {
        Value::Null => {}
        Value::Object(map) => {
            for (key, child) in map {
                let child_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                collect(child, child_path, lines);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                collect(child, format!("{path}[{index}]"), lines);
            }
        }
        Value::String(s) => lines.push(format!("{path}: {s}")),
        scalar => lines.push(format!("{path}: {scalar}")),
    }
}

pub fn print_resource(value: &Value) {
    for line in flatten_fields(value) {
        println!("  {line}");
    }
}
