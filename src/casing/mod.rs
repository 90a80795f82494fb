//! Key-style conversion between the wire format (snake_case) and the domain
//! format (camelCase).
//!
//! The backend returns nested records keyed in snake_case; everything above the
//! transport boundary works in camelCase. Conversion is total and best-effort:
//! values are never touched, arrays are recursed element-wise, and keys that do
//! not match the expected pattern pass through unchanged.

use serde_json::{Map, Value};

/// Convert every object key in the tree from snake_case to camelCase.
pub fn to_domain(value: &Value) -> Value {
    convert(value, snake_to_camel)
}

/// Inverse of [`to_domain`], used only when building payloads to send back.
pub fn to_wire(value: &Value) -> Value {
    convert(value, camel_to_snake)
}

fn convert(value: &Value, rename: fn(&str) -> String) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, inner) in map {
                out.insert(rename(key), convert(inner, rename));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(|v| convert(v, rename)).collect()),
        other => other.clone(),
    }
}

/// An underscore is consumed only when followed by a lowercase ascii letter;
/// anything else ("_private", "a_1", already-camel keys) passes through so the
/// conversion stays reversible for well-formed wire keys.
fn snake_to_camel(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut chars = key.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '_' {
            match chars.peek() {
                Some(next) if next.is_ascii_lowercase() => {
                    let next = chars.next().unwrap();
                    out.push(next.to_ascii_uppercase());
                }
                _ => out.push('_'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn camel_to_snake(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for (i, c) in key.chars().enumerate() {
        if c.is_ascii_uppercase() && i > 0 {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn converts_nested_objects_and_arrays() {
        let wire = json!({
            "school_id": "T1",
            "logo_url": null,
            "students": [
                { "guardian_code": "g1", "fee_payments": [{ "paid_at": "2026-01-05" }] }
            ]
        });

        let domain = to_domain(&wire);
        assert_eq!(domain["schoolId"], "T1");
        assert!(domain["logoUrl"].is_null());
        assert_eq!(domain["students"][0]["guardianCode"], "g1");
        assert_eq!(domain["students"][0]["feePayments"][0]["paidAt"], "2026-01-05");
    }

    #[test]
    fn values_are_left_untouched() {
        let wire = json!({ "display_name": "snake_case value stays_put" });
        let domain = to_domain(&wire);
        assert_eq!(domain["displayName"], "snake_case value stays_put");
    }

    #[test]
    fn malformed_keys_pass_through() {
        assert_eq!(snake_to_camel("_private"), "_private");
        assert_eq!(snake_to_camel("row_1"), "row_1");
        assert_eq!(snake_to_camel("alreadyCamel"), "alreadyCamel");
    }

    #[test]
    fn round_trips_snake_only_records() {
        let wire = json!({
            "is_active": true,
            "feature_flags": { "talking_cards": false },
            "exam_programs": [{ "sub_subject": "Géométrie", "score": 7.0 }]
        });
        assert_eq!(to_wire(&to_domain(&wire)), wire);
    }
}
