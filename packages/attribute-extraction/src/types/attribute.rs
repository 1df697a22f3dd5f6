//! Extracted attribute pairs.

use serde::{Deserialize, Serialize};

/// One extracted `(name, value)` pair describing a product characteristic.
///
/// On the wire (provider payloads) the name is carried as `attribute`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    #[serde(rename = "attribute")]
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}
