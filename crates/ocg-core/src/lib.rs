pub mod config;
pub mod error;
pub mod ir;
pub mod parse;
pub mod transform;
pub mod version;

pub use error::GeneratorError;

/// A generated file with path and content.
#[derive(Debug, Clone)]
pub struct GeneratedFile {
    pub path: String,
    pub content: String,
}

/// Trait for code generators that produce files from an IR spec.
///
/// Generators work entirely in memory; writing the files is left to the caller.
pub trait CodeGenerator {
    type Config;
    fn generate(
        &self,
        ir: &ir::IrSpec,
        config: &Self::Config,
    ) -> Result<Vec<GeneratedFile>, GeneratorError>;
}
