use indexmap::IndexMap;

use crate::config::NamingStrategy;
use crate::ir::{HttpMethod, IrOperation};
use crate::parse::operation::{Operation, PathItem};
use crate::version::Capability;

use super::binder::bind;
use super::name_normalizer::{
    NameAllocator, normalize_name, path_param_names, route_to_name, sanitize_identifier,
    to_snake_case,
};
use super::schema_resolver::ResolveContext;

/// Methods every generated client class inherits.
pub const CLIENT_METHODS: &[&str] = &["get_headers", "set_header", "close"];

/// Chooses unique Python method names for operations.
#[derive(Debug, Clone)]
pub struct MethodNamer<'a> {
    strategy: NamingStrategy,
    aliases: &'a IndexMap<String, String>,
    allocator: NameAllocator,
}

impl<'a> MethodNamer<'a> {
    pub fn new(strategy: NamingStrategy, aliases: &'a IndexMap<String, String>) -> Self {
        Self {
            strategy,
            aliases,
            allocator: NameAllocator::with_reserved(CLIENT_METHODS.iter().copied()),
        }
    }

    /// The raw name an operation is called by, before sanitizing.
    pub fn raw_name(&self, method: HttpMethod, path: &str, op: &Operation) -> String {
        let raw = match (self.strategy, op.operation_id.as_deref()) {
            (NamingStrategy::UseOperationId, Some(id)) if !id.trim().is_empty() => id.to_string(),
            _ => route_to_name(method.verb(), path),
        };
        match self.aliases.get(&raw) {
            Some(alias) => alias.clone(),
            None => raw,
        }
    }

    /// Allocate a method name. Collisions are first resolved with a
    /// `_by_<path params>` suffix, then numerically.
    pub fn allocate(&mut self, raw: &str, path: &str) -> String {
        let candidate = sanitize_identifier(&to_snake_case(raw));
        let params = path_param_names(path);
        let suffix = (!params.is_empty()).then(|| format!("by_{}", params.join("_and_")));
        self.allocator.allocate_with(&candidate, suffix.as_deref())
    }
}

/// Walk every path (document order) and every method within it (declared
/// order), producing one operation each.
pub fn extract_operations(
    ctx: &ResolveContext<'_>,
    strategy: NamingStrategy,
    aliases: &IndexMap<String, String>,
) -> Vec<IrOperation> {
    let mut namer = MethodNamer::new(strategy, aliases);
    extract_from(ctx, &ctx.doc.paths, &mut namer)
}

/// Webhooks, when the document's version defines them.
pub fn extract_webhooks(
    ctx: &ResolveContext<'_>,
    strategy: NamingStrategy,
    aliases: &IndexMap<String, String>,
) -> Vec<IrOperation> {
    if ctx.doc.webhooks.is_empty() {
        return Vec::new();
    }
    if !ctx.supports(Capability::Webhooks) {
        log::warn!(
            "ignoring {} webhook(s): not available in {}",
            ctx.doc.webhooks.len(),
            ctx.capabilities.family()
        );
        return Vec::new();
    }
    let mut namer = MethodNamer::new(strategy, aliases);
    extract_from(ctx, &ctx.doc.webhooks, &mut namer)
}

fn extract_from(
    ctx: &ResolveContext<'_>,
    items: &IndexMap<String, PathItem>,
    namer: &mut MethodNamer<'_>,
) -> Vec<IrOperation> {
    let mut operations = Vec::new();
    for (path, item) in items {
        for (&method, op) in &item.operations {
            let raw = namer.raw_name(method, path, op);
            let method_name = namer.allocate(&raw, path);
            log::debug!("{method} {path} -> {method_name}");
            operations.push(build_operation(ctx, path, item, method, op, raw, method_name));
        }
    }
    operations
}

fn build_operation(
    ctx: &ResolveContext<'_>,
    path: &str,
    item: &PathItem,
    method: HttpMethod,
    op: &Operation,
    raw_name: String,
    method_name: String,
) -> IrOperation {
    let binding = bind(ctx, path, item, op);
    IrOperation {
        name: normalize_name(&raw_name),
        method_name,
        method,
        path: path.to_string(),
        operation_id: op.operation_id.clone(),
        summary: op.summary.clone().or_else(|| item.summary.clone()),
        description: op.description.clone().or_else(|| item.description.clone()),
        tags: op.tags.clone(),
        deprecated: op.deprecated.unwrap_or(false),
        parameters: binding.parameters,
        request_body: binding.request_body,
        response: binding.response,
        signature: binding.signature,
        assembly: binding.assembly,
        request_content_type: binding.request_content_type,
        response_content_type: binding.response_content_type,
    }
}
