use ocg_core::config::ClientConfig;
use ocg_core::ir::IrSpec;
use ocg_core::{CodeGenerator, GeneratedFile, GeneratorError};

use crate::emitters;

/// Typed Python client generator.
///
/// Produces a package of `requests`-based API classes, dict-backed model
/// classes laid out by schema namespace, and their shared base classes.
pub struct PythonClientGenerator;

impl CodeGenerator for PythonClientGenerator {
    type Config = ClientConfig;

    fn generate(
        &self,
        ir: &IrSpec,
        config: &ClientConfig,
    ) -> Result<Vec<GeneratedFile>, GeneratorError> {
        let env = emitters::environment()?;

        let mut files = emitters::scaffold::emit_base_files();
        files.extend(emitters::models::emit_models(&env, ir, !config.no_docstrings)?);

        let (api_files, api_classes) = emitters::apis::emit_apis(&env, ir, config)?;
        files.extend(api_files);
        files.push(emitters::scaffold::emit_package_init(&env, ir, &api_classes)?);

        if !ir.webhooks.is_empty() {
            log::info!(
                "{} webhooks described; clients do not call webhooks",
                ir.webhooks.len()
            );
        }
        log::debug!("rendered {} files", files.len());
        Ok(files)
    }
}
