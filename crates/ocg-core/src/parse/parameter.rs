use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use super::schema::{Schema, TypeSet};

/// Parameter location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
    /// Swagger 2.0 request payload.
    Body,
    /// Swagger 2.0 form field.
    FormData,
}

/// An API parameter.
///
/// OpenAPI 3.x describes the value with `schema`; Swagger 2.0 puts the type
/// keywords directly on the parameter (except for `in: body`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,

    #[serde(rename = "in")]
    pub location: ParameterLocation,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub required: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<TypeSet>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,

    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<serde_json::Value>,

    #[serde(rename = "default", skip_serializing_if = "Option::is_none")]
    pub default_value: Option<serde_json::Value>,

    #[serde(rename = "x-nullable", skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
}

impl Parameter {
    /// The schema describing this parameter's value, folding Swagger 2.0
    /// inline type keywords into a schema when no `schema` is declared.
    pub fn effective_schema(&self) -> Cow<'_, Schema> {
        match &self.schema {
            Some(schema) => Cow::Borrowed(schema),
            None => Cow::Owned(Schema {
                schema_type: self.schema_type.clone(),
                format: self.format.clone(),
                description: self.description.clone(),
                items: self.items.clone(),
                enum_values: self.enum_values.clone(),
                default_value: self.default_value.clone(),
                nullable: self.nullable,
                ..Default::default()
            }),
        }
    }
}

/// A reference or inline parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
    },
    Parameter(Parameter),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::schema::SchemaType;

    #[test]
    fn test_swagger_inline_type() {
        let yaml = r#"
name: tags
in: query
type: array
items:
  type: integer
"#;
        let p: Parameter = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(p.location, ParameterLocation::Query);
        let schema = p.effective_schema();
        assert_eq!(schema.single_type(), Some(&SchemaType::Array));
        assert_eq!(
            schema.items.as_deref().and_then(Schema::single_type),
            Some(&SchemaType::Integer)
        );
    }

    #[test]
    fn test_openapi_schema_wins() {
        let yaml = r#"
name: id
in: path
required: true
schema:
  type: integer
"#;
        let p: Parameter = serde_yaml_ng::from_str(yaml).unwrap();
        assert!(p.required);
        assert!(matches!(p.effective_schema(), Cow::Borrowed(_)));
    }

    #[test]
    fn test_form_data_and_body_locations() {
        let p: Parameter = serde_yaml_ng::from_str("name: file\nin: formData\ntype: file\n").unwrap();
        assert_eq!(p.location, ParameterLocation::FormData);
        let p: Parameter = serde_yaml_ng::from_str("name: body\nin: body\n").unwrap();
        assert_eq!(p.location, ParameterLocation::Body);
    }

    #[test]
    fn test_ref_variant() {
        let p: ParameterOrRef =
            serde_yaml_ng::from_str("$ref: '#/parameters/limitParam'\n").unwrap();
        assert!(matches!(p, ParameterOrRef::Ref { .. }));
    }
}
