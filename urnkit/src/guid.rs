//! Content-hash identifiers.

use serde_json::Value;

/// Generates a deterministic id from a JSON object.
///
/// The object is serialized compactly with keys in sorted order and
/// non-ASCII characters escaped as `\uXXXX`, then hashed with MD5; the
/// lowercase hex digest is the id. Equal inputs always give equal ids,
/// independent of key insertion order.
pub fn datahub_guid(obj: &Value) -> String {
    let digest = md5::compute(ascii_escape(&canonical_json(obj)).as_bytes());
    hex::encode(digest.0)
}

fn ascii_escape(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for ch in json.chars() {
        if ch.is_ascii() {
            out.push(ch);
        } else {
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{unit:04x}"));
            }
        }
    }
    out
}

fn canonical_json(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let fields: Vec<String> = keys
                .into_iter()
                .map(|k| format!("{}:{}", Value::String(k.clone()), canonical_json(&map[k])))
                .collect();
            format!("{{{}}}", fields.join(","))
        }
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(canonical_json).collect();
            format!("[{}]", items.join(","))
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_canonical_json() {
        let value = json!({"b": 1, "a": {"d": [3, 2], "c": "text"}});
        assert_eq!(
            canonical_json(&value),
            r#"{"a":{"c":"text","d":[3,2]},"b":1}"#
        );
    }

    #[test]
    fn test_guid_matches_md5_of_canonical_form() {
        let guid = datahub_guid(&json!({"path": "Finance.Revenue"}));
        let expected = hex::encode(md5::compute(br#"{"path":"Finance.Revenue"}"#).0);
        assert_eq!(guid, expected);
        assert_eq!(guid.len(), 32);
        assert!(guid.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_non_ascii_is_escaped() {
        assert_eq!(ascii_escape(r#"{"path":"Café"}"#), r#"{"path":"Caf\u00e9"}"#);
        assert_eq!(ascii_escape("\u{1F600}"), r"\ud83d\ude00");
        let guid = datahub_guid(&json!({"path": "Café"}));
        let expected = hex::encode(md5::compute(br#"{"path":"Caf\u00e9"}"#).0);
        assert_eq!(guid, expected);
    }

    #[test]
    fn test_guid_is_deterministic() {
        let a = datahub_guid(&json!({"path": "Finance.Revenue"}));
        let b = datahub_guid(&json!({"path": "Finance.Revenue"}));
        let c = datahub_guid(&json!({"path": "Finance.Cost"}));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
