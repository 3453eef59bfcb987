use std::fmt;

use crate::transform::namespace::ModelLayout;
use crate::version::{Capabilities, VersionFamily};

use super::operations::IrOperation;
use super::schemas::IrModel;

/// A fully resolved, generator-ready intermediate representation of a spec.
#[derive(Debug, Clone)]
pub struct IrSpec {
    pub info: IrInfo,
    pub version: IrVersion,
    pub servers: Vec<IrServer>,
    /// Default base URL for generated clients (first server, or empty).
    pub base_url: String,
    pub models: Vec<IrModel>,
    pub layout: ModelLayout,
    pub operations: Vec<IrOperation>,
    pub webhooks: Vec<IrOperation>,
    pub modules: Vec<IrModule>,
}

impl IrSpec {
    pub fn model(&self, schema_name: &str) -> Option<&IrModel> {
        self.models.iter().find(|m| m.schema_name == schema_name)
    }
}

/// API metadata.
#[derive(Debug, Clone)]
pub struct IrInfo {
    pub title: String,
    pub description: Option<String>,
    pub version: String,
}

/// The detected spec version.
#[derive(Debug, Clone)]
pub struct IrVersion {
    pub raw: String,
    pub normalized: String,
    pub family: VersionFamily,
    pub capabilities: Capabilities,
}

/// A server URL.
#[derive(Debug, Clone, PartialEq)]
pub struct IrServer {
    pub url: String,
    pub description: Option<String>,
}

/// A module groups operations by tag.
#[derive(Debug, Clone)]
pub struct IrModule {
    pub name: NormalizedName,
    pub operations: Vec<usize>, // indices into IrSpec.operations
}

/// A name with multiple casing variants pre-computed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedName {
    pub original: String,
    pub pascal_case: String,
    pub camel_case: String,
    pub snake_case: String,
    pub screaming_snake: String,
}

impl fmt::Display for NormalizedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.original)
    }
}
