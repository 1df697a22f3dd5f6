//! LLM prompts for attribute extraction.
//!
//! Both providers receive the same instruction text; Gemini additionally
//! enforces the response constraint through `responseSchema`.

use serde_json::{json, Value};

use crate::types::schema::SchemaChoice;

/// System instruction for "on the fly" extraction.
pub const UNCONSTRAINED_SYSTEM_PROMPT: &str = r#"You are an expert AI assistant specializing in e-commerce product data extraction. Your primary function is to analyze a product page URL and extract its key specifications into a structured JSON format.

**Your Goal:**
Create a comprehensive list of product attributes and their corresponding values based on the content of the provided URL.

**Extraction Guidelines:**
- **FOCUS ON:** Technical specifications (e.g., CPU, RAM), physical properties (e.g., dimensions, weight, material), features (e.g., Screen Type, Resolution), and other core product details.
- **DO NOT INCLUDE:**
    - Pricing, discounts, or sale information.
    - Shipping details, delivery times, or return policies.
    - Stock status, availability, or "in stock" messages.
    - Customer reviews, ratings, or Q&A sections.
    - Marketing jargon, slogans, or promotional text.
    - Information about related or recommended products.
- Capitalize the first letter of every attribute name.
- When an attribute has several values, join them with a comma. Never repeat an attribute name for the same product.
- Capture values only from the provided source link and nothing beyond it.

**Output Format:**
- You MUST return a valid JSON array.
- Each element in the array must be an object with two string keys: "attribute" and "value".
- Do not include any explanatory text, markdown formatting (like ```json), or anything outside of the JSON array itself.

**Example of correct output:**
[
  { "attribute": "Color", "value": "Midnight Black" },
  { "attribute": "Screen Size", "value": "6.7 inches" },
  { "attribute": "Material", "value": "Aluminum, Glass" }
]"#;

/// User message for "on the fly" extraction.
fn unconstrained_user_prompt(link: &str) -> String {
    format!(
        "Capture the possible attributes and values from the selected link. URL: {}",
        link
    )
}

/// System instruction for schema-constrained extraction.
fn constrained_system_prompt(category: &str, fragment: &str) -> String {
    format!(
        r#"You are an expert AI assistant specializing in e-commerce product data extraction. Your task is to analyze a product page URL and extract its key specifications into a structured JSON format, strictly following the provided structure for the category "{category}".

**Extraction Guidelines:**
- **FOCUS ON:** Only the attributes defined in the provided JSON structure.
- **DO NOT INCLUDE:** Any attributes not present in the structure. Do not include pricing, shipping, reviews, etc. unless they are part of the structure.
- **Output Format:** You MUST return a valid JSON array. Each element must be an object with two string keys: "attribute" and "value". Do not include any explanatory text or anything outside of the JSON array.

**JSON Structure for Category "{category}":**
{fragment}"#,
        category = category,
        fragment = fragment,
    )
}

/// User message for schema-constrained extraction.
fn constrained_user_prompt(category: &str, link: &str) -> String {
    format!(
        r#"Using the provided structure, extract attributes for the category "{}" from the URL: {}"#,
        category, link
    )
}

/// Instruction pair plus the structured-output constraint for one call.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
    pub response_constraint: ResponseConstraint,
}

impl Prompt {
    /// System and user text as a single message, for providers that take one.
    pub fn combined(&self) -> String {
        format!("{}\n\n{}", self.system, self.user)
    }
}

/// Structured-output contract for a call.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseConstraint {
    /// JSON Schema of the expected `[{attribute, value}]` array
    pub schema: Value,

    /// Category fragment the attributes come from, when constrained
    pub fragment: Option<Value>,
}

/// JSON Schema for an array of `{attribute, value}` string pairs.
///
/// When `names` is non-empty, `attribute` is restricted to those names.
pub fn attribute_array_schema(names: &[String]) -> Value {
    let mut attribute = json!({
        "type": "string",
        "description": "The name of the product attribute (e.g., Color, Size)."
    });
    if !names.is_empty() {
        attribute["enum"] = json!(names);
    }

    json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "attribute": attribute,
                "value": {
                    "type": "string",
                    "description": "The value of the product attribute (e.g., Red, Large)."
                }
            },
            "required": ["attribute", "value"]
        }
    })
}

/// Build the prompt for extracting attributes of the product at `link`.
pub fn build_prompt(link: &str, choice: &SchemaChoice) -> Prompt {
    match choice {
        SchemaChoice::Unconstrained => Prompt {
            system: UNCONSTRAINED_SYSTEM_PROMPT.to_string(),
            user: unconstrained_user_prompt(link),
            response_constraint: ResponseConstraint {
                schema: attribute_array_schema(&[]),
                fragment: None,
            },
        },
        SchemaChoice::Constrained { category, fragment } => {
            let fragment_text = serde_json::to_string_pretty(fragment)
                .unwrap_or_else(|_| fragment.to_string());

            Prompt {
                system: constrained_system_prompt(category, &fragment_text),
                user: constrained_user_prompt(category, link),
                response_constraint: ResponseConstraint {
                    schema: attribute_array_schema(&choice.attribute_names()),
                    fragment: Some(fragment.clone()),
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconstrained_prompt_names_link_and_exclusions() {
        let prompt = build_prompt("https://shop.example/p/1", &SchemaChoice::Unconstrained);

        assert!(prompt.user.contains("https://shop.example/p/1"));
        assert!(prompt.system.contains("Pricing"));
        assert!(prompt.system.contains("\"attribute\""));
        assert!(prompt.response_constraint.fragment.is_none());
        assert!(prompt.response_constraint.schema["items"]["properties"]["attribute"]
            .get("enum")
            .is_none());
    }

    #[test]
    fn test_constrained_prompt_restates_fragment() {
        let choice = SchemaChoice::Constrained {
            category: "Laptops".into(),
            fragment: json!({ "CPU": "string", "RAM": "string" }),
        };
        let prompt = build_prompt("https://shop.example/p/2", &choice);

        assert!(prompt.system.contains(r#"category "Laptops""#));
        assert!(prompt.system.contains(r#""CPU": "string""#));
        assert!(prompt.user.contains("Laptops"));
        assert!(prompt.user.contains("https://shop.example/p/2"));
        assert_eq!(
            prompt.response_constraint.schema["items"]["properties"]["attribute"]["enum"],
            json!(["CPU", "RAM"])
        );
        assert_eq!(
            prompt.response_constraint.fragment,
            Some(json!({ "CPU": "string", "RAM": "string" }))
        );
    }

    #[test]
    fn test_placeholder_text_in_inputs_is_left_alone() {
        let choice = SchemaChoice::Constrained {
            category: "{fragment} {link}".into(),
            fragment: json!({ "Voltage": "string" }),
        };
        let prompt = build_prompt("https://shop.example/{category}", &choice);

        assert!(prompt.system.contains(r#"category "{fragment} {link}""#));
        assert_eq!(prompt.system.matches("Voltage").count(), 1);
        assert!(prompt.user.ends_with(
            r#"category "{fragment} {link}" from the URL: https://shop.example/{category}"#
        ));

        let prompt = build_prompt("https://shop.example/{link}", &SchemaChoice::Unconstrained);
        assert!(prompt.user.ends_with("URL: https://shop.example/{link}"));
    }

    #[test]
    fn test_schema_requires_both_keys() {
        let schema = attribute_array_schema(&[]);
        assert_eq!(schema["type"], "array");
        assert_eq!(schema["items"]["required"], json!(["attribute", "value"]));
    }

    #[test]
    fn test_combined_joins_system_and_user() {
        let prompt = build_prompt("https://x.example", &SchemaChoice::Unconstrained);
        let combined = prompt.combined();
        assert!(combined.starts_with(&prompt.system));
        assert!(combined.ends_with(&prompt.user));
    }
}
