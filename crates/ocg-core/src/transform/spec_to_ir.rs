use indexmap::IndexMap;

use crate::config::NamingStrategy;
use crate::error::TransformError;
use crate::ir::*;
use crate::parse::spec::ApiDocument;
use crate::transform::namespace::ModelLayout;

use super::dialect::dialect_for;
use super::models::extract_models;
use super::name_normalizer::normalize_name;
use super::operations::{extract_operations, extract_webhooks};
use super::schema_resolver::ResolveContext;

/// Module name for operations without tags.
pub const DEFAULT_MODULE: &str = "default";

/// Options controlling how the transform phase resolves operation names.
#[derive(Debug, Clone, Default)]
pub struct TransformOptions {
    pub naming_strategy: NamingStrategy,
    pub aliases: IndexMap<String, String>,
}

/// Transform a parsed document into the fully resolved IR.
pub fn transform(doc: &ApiDocument) -> Result<IrSpec, TransformError> {
    transform_with_options(doc, &TransformOptions::default())
}

/// Transform with explicit naming options.
pub fn transform_with_options(
    doc: &ApiDocument,
    options: &TransformOptions,
) -> Result<IrSpec, TransformError> {
    // Phase 1: Gate on the declared version
    let version = doc.spec_version()?;
    let dialect = dialect_for(version.family);
    let ctx = ResolveContext::new(doc, dialect);
    log::debug!(
        "transforming {} document ({})",
        version.family,
        version.normalized()
    );

    // Phase 2: Place every named schema, then build the models
    let layout = ModelLayout::build(dialect.schemas(doc).keys().map(String::as_str));
    let models = extract_models(&ctx, &layout);

    // Phase 3: Operations and webhooks
    let operations = extract_operations(&ctx, options.naming_strategy, &options.aliases);
    let webhooks = extract_webhooks(&ctx, options.naming_strategy, &options.aliases);

    // Phase 4: Group operations into modules by tag
    let modules = group_into_modules(&operations);

    // Phase 5: Build IR info and servers
    let info = IrInfo {
        title: doc.info.title.clone(),
        description: doc.info.description.clone(),
        version: doc.info.version.clone(),
    };
    let servers = dialect.servers(doc);
    let base_url = servers.first().map(|s| s.url.clone()).unwrap_or_default();

    log::info!(
        "resolved {} models, {} operations, {} webhooks",
        models.len(),
        operations.len(),
        webhooks.len()
    );

    Ok(IrSpec {
        info,
        version: IrVersion {
            normalized: version.normalized(),
            family: version.family,
            capabilities: version.capabilities(),
            raw: version.raw,
        },
        servers,
        base_url,
        models,
        layout,
        operations,
        webhooks,
        modules,
    })
}

fn group_into_modules(operations: &[IrOperation]) -> Vec<IrModule> {
    let mut tag_groups: IndexMap<String, Vec<usize>> = IndexMap::new();

    for (i, op) in operations.iter().enumerate() {
        if op.tags.is_empty() {
            tag_groups.entry(DEFAULT_MODULE.to_string()).or_default().push(i);
        } else {
            for tag in &op.tags {
                tag_groups.entry(tag.clone()).or_default().push(i);
            }
        }
    }

    let mut modules: Vec<IrModule> = tag_groups
        .into_iter()
        .map(|(name, ops)| IrModule {
            name: normalize_name(&name),
            operations: ops,
        })
        .collect();

    modules.sort_by(|a, b| a.name.original.cmp(&b.name.original));
    modules
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    #[test]
    fn test_modules_by_tag() {
        let doc = parse::from_yaml(
            r#"
openapi: 3.0.3
info: { title: t, version: "1" }
paths:
  /pets:
    get:
      tags: [pets, store]
      responses: { '200': { description: ok } }
  /health:
    get:
      responses: { '200': { description: ok } }
"#,
        )
        .unwrap();
        let ir = transform(&doc).unwrap();
        let names: Vec<&str> = ir.modules.iter().map(|m| m.name.original.as_str()).collect();
        assert_eq!(names, vec!["default", "pets", "store"]);
        assert_eq!(ir.modules[0].operations, vec![1]);
        assert_eq!(ir.base_url, "");
    }

    #[test]
    fn test_version_recorded() {
        let doc = parse::from_yaml(
            "openapi: '3.1'\ninfo: { title: t, version: '1' }\npaths: {}\n",
        )
        .unwrap();
        let ir = transform(&doc).unwrap();
        assert_eq!(ir.version.raw, "3.1");
        assert_eq!(ir.version.normalized, "3.1.0");
        assert!(ir.version.capabilities.supports(crate::version::Capability::Webhooks));
    }
}
