//! Extraction pipeline.
//!
//! - Prompt construction per schema choice
//! - Payload parsing and shape checks
//! - Credential validation
//! - Concurrent fan-out over a batch

pub mod fetch;
pub mod parse;
pub mod prompts;
pub mod validate;

pub use fetch::{fetch_all, BatchReport, Outcome, PRODUCT_NOT_FOUND};
pub use parse::{parse_attributes, strip_code_fences};
pub use prompts::{attribute_array_schema, build_prompt, Prompt, ResponseConstraint};
pub use validate::{validate, ValidationOutcome, EMPTY_KEY_MESSAGE};
