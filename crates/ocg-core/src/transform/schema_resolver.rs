use serde_json::Value;

use crate::ir::IrType;
use crate::parse::schema::{Schema, SchemaType, TypeSet};
use crate::parse::spec::ApiDocument;
use crate::version::{Capabilities, Capability};

use super::dialect::Dialect;

/// Everything schema resolution needs besides the schema itself.
#[derive(Clone, Copy)]
pub struct ResolveContext<'a> {
    pub doc: &'a ApiDocument,
    pub dialect: &'a dyn Dialect,
    pub capabilities: Capabilities,
}

impl<'a> ResolveContext<'a> {
    pub fn new(doc: &'a ApiDocument, dialect: &'a dyn Dialect) -> Self {
        Self {
            doc,
            dialect,
            capabilities: dialect.family().capabilities(),
        }
    }

    pub fn supports(&self, capability: Capability) -> bool {
        self.capabilities.supports(capability)
    }
}

/// Convert a parsed `Schema` to an `IrType`.
///
/// Rules are tried in order and the first match wins; the schema's own
/// nullability is applied last, at most once.
pub fn resolve(schema: &Schema, ctx: &ResolveContext<'_>) -> IrType {
    let base = resolve_base(schema, ctx);
    if schema.is_nullable() {
        base.nullable()
    } else {
        base
    }
}

fn resolve_base(schema: &Schema, ctx: &ResolveContext<'_>) -> IrType {
    if let Some(ref_path) = &schema.reference {
        return resolve_ref(ref_path, ctx);
    }

    if let Some(value) = &schema.const_value {
        return resolve_const(value, ctx);
    }

    // Composition: allOf narrows to its first referencing member.
    if let Some(first) = schema.all_of.first() {
        let member = schema
            .all_of
            .iter()
            .find(|m| m.reference.is_some())
            .unwrap_or(first);
        return resolve(member, ctx);
    }
    if !schema.one_of.is_empty() || !schema.any_of.is_empty() {
        return IrType::Any;
    }

    match &schema.schema_type {
        Some(TypeSet::Single(t)) => resolve_single(t, schema, ctx),
        Some(TypeSet::Multiple(types)) => resolve_type_array(types, schema, ctx),
        None => IrType::String,
    }
}

fn resolve_ref(ref_path: &str, ctx: &ResolveContext<'_>) -> IrType {
    match ctx.dialect.schema_name(ctx.doc, ref_path) {
        Some(name) => IrType::Model(name),
        None => {
            log::debug!("unresolvable schema reference {ref_path}, using Any");
            IrType::Any
        }
    }
}

fn resolve_const(value: &Value, ctx: &ResolveContext<'_>) -> IrType {
    if !ctx.supports(Capability::ConstLiterals) {
        log::debug!(
            "const is not available in {}, using Any",
            ctx.capabilities.family()
        );
        return IrType::Any;
    }
    match value {
        Value::String(_) => IrType::String,
        Value::Bool(_) => IrType::Boolean,
        Value::Number(n) if is_integral(n) => IrType::Integer,
        Value::Number(_) => IrType::Numeric,
        Value::Null | Value::Array(_) | Value::Object(_) => IrType::Any,
    }
}

/// `5`, `5.0` and `1e3` all count; `5.5` does not.
fn is_integral(n: &serde_json::Number) -> bool {
    n.is_i64()
        || n.is_u64()
        || n.as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0)
}

fn resolve_single(t: &SchemaType, schema: &Schema, ctx: &ResolveContext<'_>) -> IrType {
    match t {
        SchemaType::String | SchemaType::Unknown => IrType::String,
        SchemaType::Integer => IrType::Integer,
        SchemaType::Number => IrType::Number,
        SchemaType::Boolean => IrType::Boolean,
        SchemaType::Object => IrType::Map,
        SchemaType::Array => match &schema.items {
            Some(items) => IrType::array_of(resolve(items, ctx)),
            None => IrType::array_of(IrType::Any),
        },
        SchemaType::File | SchemaType::Null => IrType::Any,
    }
}

/// `type: [..]` is a JSON Schema 2020-12 form. One non-null member plus
/// `"null"` is a nullable type; anything wider is `Any`.
fn resolve_type_array(types: &[SchemaType], schema: &Schema, ctx: &ResolveContext<'_>) -> IrType {
    if !ctx.supports(Capability::JsonSchema202012) {
        log::debug!(
            "type arrays are not available in {}, using Any",
            ctx.capabilities.family()
        );
        return IrType::Any;
    }

    let has_null = types.contains(&SchemaType::Null);
    let non_null: Vec<&SchemaType> = types.iter().filter(|t| **t != SchemaType::Null).collect();
    match non_null.as_slice() {
        [single] => {
            let base = resolve_single(single, schema, ctx);
            if has_null { base.nullable() } else { base }
        }
        _ => IrType::Any,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use crate::transform::dialect::dialect_for;

    fn doc(version_line: &str, schemas_yaml: &str) -> ApiDocument {
        let table = if version_line.starts_with("swagger") {
            "definitions"
        } else {
            "components:\n  schemas"
        };
        let yaml = format!(
            "{version_line}\ninfo: {{ title: t, version: '1' }}\npaths: {{}}\n{table}:\n{schemas_yaml}"
        );
        parse::from_yaml(&yaml).unwrap()
    }

    fn resolve_in_doc(doc: &ApiDocument, schema_yaml: &str) -> IrType {
        let family = doc.spec_version().unwrap().family;
        let ctx = ResolveContext::new(doc, dialect_for(family));
        let schema: Schema = serde_yaml_ng::from_str(schema_yaml).unwrap();
        resolve(&schema, &ctx)
    }

    const USER: &str = "    User: { type: object }\n";

    #[test]
    fn test_swagger_nested_array_of_refs() {
        let d = doc("swagger: '2.0'", USER);
        let ty = resolve_in_doc(
            &d,
            "{ type: array, items: { type: array, items: { $ref: '#/definitions/User' } } }",
        );
        assert_eq!(
            ty,
            IrType::array_of(IrType::array_of(IrType::Model("User".into())))
        );
    }

    #[test]
    fn test_const_number_by_version() {
        let d30 = doc("openapi: 3.0.3", USER);
        let d31 = doc("openapi: 3.1.0", USER);
        assert_eq!(resolve_in_doc(&d31, "{ const: 3.14 }"), IrType::Numeric);
        assert_eq!(resolve_in_doc(&d31, "{ const: 3 }"), IrType::Integer);
        assert_eq!(resolve_in_doc(&d31, "{ const: 5.0 }"), IrType::Integer);
        assert_eq!(resolve_in_doc(&d31, "{ const: 1e3 }"), IrType::Integer);
        assert_eq!(resolve_in_doc(&d31, "{ const: 'on' }"), IrType::String);
        assert_eq!(resolve_in_doc(&d31, "{ const: true }"), IrType::Boolean);
        assert_eq!(resolve_in_doc(&d31, "{ const: null }"), IrType::Any);
        assert_eq!(resolve_in_doc(&d30, "{ const: 3.14 }"), IrType::Any);
    }

    #[test]
    fn test_type_array_requires_2020_12() {
        let d30 = doc("openapi: 3.0.3", USER);
        let d31 = doc("openapi: 3.1.0", USER);
        assert_eq!(
            resolve_in_doc(&d31, "{ type: [string, 'null'] }"),
            IrType::String.nullable()
        );
        assert_eq!(resolve_in_doc(&d31, "{ type: [string, integer] }"), IrType::Any);
        assert_eq!(resolve_in_doc(&d30, "{ type: [string, 'null'] }"), IrType::Any);
    }

    #[test]
    fn test_unresolvable_ref_is_any() {
        let d = doc("openapi: 3.0.3", USER);
        assert_eq!(
            resolve_in_doc(&d, "{ $ref: '#/components/schemas/Missing' }"),
            IrType::Any
        );
        assert_eq!(
            resolve_in_doc(&d, "{ $ref: 'other.yaml#/components/schemas/User' }"),
            IrType::Any
        );
        assert_eq!(
            resolve_in_doc(&d, "{ $ref: '#/components/schemas/User' }"),
            IrType::Model("User".into())
        );
    }

    #[test]
    fn test_nullable_ref_wraps_once() {
        let d = doc("openapi: 3.0.3", USER);
        let ty = resolve_in_doc(
            &d,
            "{ nullable: true, allOf: [ { $ref: '#/components/schemas/User', nullable: true } ] }",
        );
        assert_eq!(ty, IrType::Model("User".into()).nullable());

        let d2 = doc("swagger: '2.0'", USER);
        let ty = resolve_in_doc(&d2, "{ type: string, x-nullable: true }");
        assert_eq!(ty, IrType::String.nullable());
    }

    #[test]
    fn test_composition_and_fallbacks() {
        let d = doc("openapi: 3.0.3", USER);
        assert_eq!(
            resolve_in_doc(
                &d,
                "{ allOf: [ { type: object }, { $ref: '#/components/schemas/User' } ] }"
            ),
            IrType::Model("User".into())
        );
        assert_eq!(
            resolve_in_doc(&d, "{ allOf: [ { type: integer } ] }"),
            IrType::Integer
        );
        assert_eq!(
            resolve_in_doc(&d, "{ oneOf: [ { type: string }, { type: integer } ] }"),
            IrType::Any
        );
        assert_eq!(resolve_in_doc(&d, "{ type: array }"), IrType::array_of(IrType::Any));
        assert_eq!(resolve_in_doc(&d, "{ type: object }"), IrType::Map);
        assert_eq!(resolve_in_doc(&d, "{ description: untyped }"), IrType::String);
        assert_eq!(resolve_in_doc(&d, "{ type: number }"), IrType::Number);
    }

    #[test]
    fn test_array_depth_matches_nesting() {
        let d = doc("openapi: 3.0.3", USER);
        for depth in 0..5 {
            let mut yaml = "{ $ref: '#/components/schemas/User' }".to_string();
            for _ in 0..depth {
                yaml = format!("{{ type: array, items: {yaml} }}");
            }
            let ty = resolve_in_doc(&d, &yaml);
            assert_eq!(ty.array_depth(), depth);
            assert_eq!(ty.referenced_models(), vec!["User"]);
        }
    }
}
