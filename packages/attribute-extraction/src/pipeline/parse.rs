//! Turning provider payload text into attributes.

use serde_json::Value;

use crate::error::PayloadError;
use crate::types::attribute::Attribute;

/// Remove markdown code fences (```` ```json ```` and ```` ``` ````) wherever
/// they appear, then trim.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json\n", "")
        .replace("```json", "")
        .replace("```", "")
        .trim()
        .to_string()
}

/// Parse a payload into attributes.
///
/// The payload must be a JSON array of objects, each carrying `attribute` and
/// `value` keys. Strings, numbers, and booleans are accepted and rendered as
/// text; anything else rejects the whole payload.
pub fn parse_attributes(text: &str) -> Result<Vec<Attribute>, PayloadError> {
    let cleaned = strip_code_fences(text);
    if cleaned.is_empty() {
        return Err(PayloadError::Empty);
    }

    let value: Value =
        serde_json::from_str(&cleaned).map_err(|e| PayloadError::Malformed(e.to_string()))?;

    let items = match value {
        Value::Array(items) => items,
        _ => return Err(PayloadError::UnexpectedFormat),
    };

    items
        .iter()
        .map(|item| {
            let name = item.get("attribute").and_then(coerce);
            let value = item.get("value").and_then(coerce);
            match (name, value) {
                (Some(name), Some(value)) => Ok(Attribute { name, value }),
                _ => Err(PayloadError::UnexpectedFormat),
            }
        })
        .collect()
}

fn coerce(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n[]\n```"), "[]");
        assert_eq!(strip_code_fences("```[1]```"), "[1]");
        assert_eq!(strip_code_fences("Here you go:\n```json\n[]\n```\n"), "Here you go:\n[]");
        assert_eq!(strip_code_fences("  []  "), "[]");
    }

    #[test]
    fn test_parse_fenced_payload() {
        let attrs =
            parse_attributes("```json\n[{\"attribute\":\"Color\",\"value\":\"Red\"}]\n```").unwrap();
        assert_eq!(attrs, vec![Attribute::new("Color", "Red")]);
    }

    #[test]
    fn test_parse_keeps_order_and_coerces_scalars() {
        let attrs = parse_attributes(
            r#"[
                {"attribute": "Weight", "value": 5.2},
                {"attribute": "Wireless", "value": true},
                {"attribute": "Color", "value": "Red", "source": "spec table"}
            ]"#,
        )
        .unwrap();

        assert_eq!(
            attrs,
            vec![
                Attribute::new("Weight", "5.2"),
                Attribute::new("Wireless", "true"),
                Attribute::new("Color", "Red"),
            ]
        );
    }

    #[test]
    fn test_parse_empty_array() {
        assert_eq!(parse_attributes("[]").unwrap(), vec![]);
    }

    #[test]
    fn test_parse_rejects_wrong_shapes() {
        for payload in [
            r#"{"attribute": "Color", "value": "Red"}"#,
            r#"[{"attribute": "Color"}]"#,
            r#"[{"name": "Color", "value": "Red"}]"#,
            r#"[{"attribute": "Color", "value": null}]"#,
            r#"[{"attribute": "Color", "value": ["Red", "Blue"]}]"#,
            r#"["Color", "Red"]"#,
            r#"[null]"#,
        ] {
            assert_eq!(
                parse_attributes(payload),
                Err(PayloadError::UnexpectedFormat),
                "payload: {}",
                payload
            );
        }
    }

    #[test]
    fn test_parse_malformed_and_empty() {
        assert!(matches!(parse_attributes("not json"), Err(PayloadError::Malformed(_))));
        assert_eq!(parse_attributes("```json\n```"), Err(PayloadError::Empty));
        assert_eq!(parse_attributes("   "), Err(PayloadError::Empty));
    }
}
