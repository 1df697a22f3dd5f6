//! User-supplied extraction schemas.
//!
//! A schema file is a JSON object whose top-level keys are category names and
//! whose values are free-form fragments describing the attributes expected for
//! that category. Category order follows the file.

use std::path::Path;

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::SchemaError;

/// Parsed schema file: category name to fragment, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionSchema {
    categories: IndexMap<String, Value>,
}

impl ExtractionSchema {
    /// Parse schema text.
    pub fn parse(text: &str) -> Result<Self, SchemaError> {
        // Deserializing straight into an IndexMap keeps the file's key order;
        // a second parse only classifies the failure.
        let categories: IndexMap<String, Value> = match serde_json::from_str(text) {
            Ok(map) => map,
            Err(e) => {
                return Err(match serde_json::from_str::<Value>(text) {
                    Ok(_) => SchemaError::NotAnObject,
                    Err(_) => SchemaError::Parse(e.to_string()),
                })
            }
        };

        if categories.is_empty() {
            return Err(SchemaError::NoCategories);
        }

        Ok(Self { categories })
    }

    /// Read and parse a schema file.
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Category names in file order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    /// First category in the file, the default selection.
    pub fn default_category(&self) -> &str {
        // parse() rejects empty schemas
        self.categories.keys().next().map(String::as_str).unwrap_or_default()
    }

    /// Fragment for one category.
    pub fn fragment(&self, category: &str) -> Option<&Value> {
        self.categories.get(category)
    }

    /// Build a constrained choice for `category`, carrying only its fragment.
    pub fn choose(&self, category: &str) -> Result<SchemaChoice, SchemaError> {
        let fragment = self
            .fragment(category)
            .ok_or_else(|| SchemaError::UnknownCategory(category.to_string()))?;

        Ok(SchemaChoice::Constrained {
            category: category.to_string(),
            fragment: fragment.clone(),
        })
    }
}

/// How extraction is steered for a batch.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SchemaChoice {
    /// "On the fly": the model decides which attributes matter.
    #[default]
    Unconstrained,

    /// "Schema master": only the attributes of one category's fragment.
    Constrained { category: String, fragment: Value },
}

/// Keys that mark a fragment node as a JSON-Schema node rather than a
/// plain attribute map.
const SCHEMA_KEYWORDS: &[&str] = &["type", "properties", "items", "$schema", "$ref"];

impl SchemaChoice {
    pub fn category(&self) -> Option<&str> {
        match self {
            Self::Unconstrained => None,
            Self::Constrained { category, .. } => Some(category),
        }
    }

    pub fn fragment(&self) -> Option<&Value> {
        match self {
            Self::Unconstrained => None,
            Self::Constrained { fragment, .. } => Some(fragment),
        }
    }

    /// Attribute names the fragment names explicitly, if it names any.
    ///
    /// Understood shapes: a JSON-Schema object (`properties` keys), a plain
    /// object whose keys are attribute names, or an array of strings.
    pub fn attribute_names(&self) -> Vec<String> {
        match self.fragment() {
            Some(Value::Object(map)) => {
                if let Some(Value::Object(props)) = map.get("properties") {
                    props.keys().cloned().collect()
                } else if map.keys().any(|k| SCHEMA_KEYWORDS.contains(&k.as_str())) {
                    Vec::new()
                } else {
                    map.keys().cloned().collect()
                }
            }
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }
}
