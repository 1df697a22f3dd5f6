//! Domain types shared across the pipeline.

pub mod attribute;
pub mod config;
pub mod product;
pub mod provider;
pub mod schema;
