use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported spec version: {0}")]
    UnsupportedVersion(String),

    #[error("document declares neither `swagger` nor `openapi`")]
    MissingVersionDeclaration,

    #[error("document declares both `swagger` ({swagger}) and `openapi` ({openapi})")]
    ConflictingVersionDeclaration { swagger: String, openapi: String },
}

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
}

/// Errors raised by code generators while rendering output files.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("template error: {0}")]
    Template(String),
}
