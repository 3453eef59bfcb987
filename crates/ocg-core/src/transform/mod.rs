pub mod binder;
pub mod dialect;
pub mod models;
pub mod name_normalizer;
pub mod namespace;
pub mod operations;
pub mod schema_resolver;
pub mod spec_to_ir;

pub use spec_to_ir::{TransformOptions, transform, transform_with_options};
