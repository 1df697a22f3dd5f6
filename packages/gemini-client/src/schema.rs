//! Conversion of JSON Schema documents into Gemini's `responseSchema` dialect.
//!
//! Gemini accepts an OpenAPI 3.0 subset: upper-case `type` names and a fixed
//! set of keywords. Anything outside that set is rejected by the API, so it
//! is dropped here rather than sent.

use serde_json::{Map, Value};

/// Keywords Gemini understands on a schema node.
const SUPPORTED_KEYS: &[&str] = &[
    "type",
    "format",
    "description",
    "nullable",
    "enum",
    "items",
    "properties",
    "required",
    "minItems",
    "maxItems",
    "propertyOrdering",
];

/// Convert a JSON Schema value into a Gemini response schema.
///
/// - `type` values are upper-cased (`"array"` becomes `"ARRAY"`)
/// - unsupported keywords (`additionalProperties`, `$schema`, `title`, ...) are removed
/// - `properties` and `items` are converted recursively
pub fn to_response_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => Value::Object(convert_node(map)),
        other => other.clone(),
    }
}

fn convert_node(map: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();

    for (key, value) in map {
        if !SUPPORTED_KEYS.contains(&key.as_str()) {
            continue;
        }

        let converted = match key.as_str() {
            "type" => match value {
                Value::String(t) => Value::String(t.to_uppercase()),
                other => other.clone(),
            },
            "items" => to_response_schema(value),
            "properties" => match value {
                Value::Object(props) => Value::Object(
                    props
                        .iter()
                        .map(|(name, prop)| (name.clone(), to_response_schema(prop)))
                        .collect(),
                ),
                other => other.clone(),
            },
            _ => value.clone(),
        };

        out.insert(key.clone(), converted);
    }

    out
}
