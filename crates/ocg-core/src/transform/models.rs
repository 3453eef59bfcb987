use indexmap::IndexMap;

use crate::ir::{IrEnumVariant, IrField, IrModel, IrModelImport, IrModelKind};
use crate::parse::schema::Schema;

use super::name_normalizer::{NameAllocator, enum_constant_name, sanitize_identifier, to_snake_case};
use super::namespace::ModelLayout;
use super::schema_resolver::{ResolveContext, resolve};

/// Names a field attribute must not take in the generated class body: the
/// base model's methods and storage, and the `property` builtin that every
/// later accessor is decorated with.
pub const RESERVED_ATTRIBUTES: &[&str] = &[
    "to_dict",
    "to_json",
    "from_dict",
    "from_json",
    "_data",
    "property",
];

/// Build one model per named schema, in declaration order.
pub fn extract_models(ctx: &ResolveContext<'_>, layout: &ModelLayout) -> Vec<IrModel> {
    ctx.dialect
        .schemas(ctx.doc)
        .iter()
        .filter_map(|(name, schema)| {
            let Some(node) = layout.node(name) else {
                log::warn!("schema {name} has no place in the model layout");
                return None;
            };
            let kind = if schema.enum_values.is_empty() {
                IrModelKind::Object {
                    fields: extract_fields(schema, ctx),
                }
            } else {
                IrModelKind::Enum {
                    variants: extract_variants(schema),
                }
            };
            let imports = collect_imports(name, &kind, layout);
            Some(IrModel {
                schema_name: name.clone(),
                node: node.clone(),
                description: schema.description.clone().or_else(|| schema.title.clone()),
                kind,
                imports,
            })
        })
        .collect()
}

/// Own properties followed by those of inline `allOf` members.
fn extract_fields(schema: &Schema, ctx: &ResolveContext<'_>) -> Vec<IrField> {
    let mut properties: IndexMap<&str, (&Schema, bool)> = IndexMap::new();
    for (name, prop) in &schema.properties {
        properties.insert(name.as_str(), (prop, schema.is_required(name)));
    }
    for member in schema.all_of.iter().filter(|m| m.reference.is_none()) {
        for (name, prop) in &member.properties {
            properties
                .entry(name.as_str())
                .or_insert((prop, member.is_required(name) || schema.is_required(name)));
        }
    }

    let mut allocator = NameAllocator::with_reserved(RESERVED_ATTRIBUTES.iter().copied());
    properties
        .into_iter()
        .map(|(name, (prop, required))| IrField {
            attribute: allocator.allocate(&sanitize_identifier(&to_snake_case(name))),
            original_name: name.to_string(),
            field_type: resolve(prop, ctx),
            required,
            description: prop.description.clone(),
            read_only: prop.read_only.unwrap_or(false),
        })
        .collect()
}

fn extract_variants(schema: &Schema) -> Vec<IrEnumVariant> {
    let mut allocator = NameAllocator::new();
    schema
        .enum_values
        .iter()
        .map(|value| {
            let text = match value {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Null => "NONE".to_string(),
                other => other.to_string(),
            };
            IrEnumVariant {
                name: allocator.allocate(&enum_constant_name(&text)),
                value: value.clone(),
            }
        })
        .collect()
}

fn collect_imports(name: &str, kind: &IrModelKind, layout: &ModelLayout) -> Vec<IrModelImport> {
    let IrModelKind::Object { fields } = kind else {
        return Vec::new();
    };
    let mut imports: Vec<IrModelImport> = fields
        .iter()
        .flat_map(|f| f.field_type.referenced_models())
        .filter(|target| *target != name)
        .filter_map(|target| {
            let path = layout.import_between(name, target)?;
            Some(IrModelImport {
                module: path.to_module_string(),
                class_name: path.class_name,
                schema_name: target.to_string(),
            })
        })
        .collect();
    imports.sort();
    imports.dedup();
    imports
}
