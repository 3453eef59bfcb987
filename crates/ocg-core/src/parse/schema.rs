use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// A JSON Schema type keyword value. Swagger 2.0 adds `file`; unrecognized
/// words are kept as `Unknown` so they can degrade instead of failing the load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
    Null,
    File,
    #[serde(other)]
    Unknown,
}

/// The `type` field can be a single type or an array of types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeSet {
    Single(SchemaType),
    Multiple(#[serde(deserialize_with = "type_words")] Vec<SchemaType>),
}

/// A JSON-Schema-like type description shared by both spec families.
///
/// References are kept as the raw `$ref` pointer and looked up by name when
/// needed; nothing is inlined.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Schema {
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<TypeSet>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(
        rename = "default",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub default_value: Option<serde_json::Value>,

    #[serde(alias = "x-nullable", skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, Schema>,

    /// Only the object-level list of names; a Swagger-style boolean on a
    /// property is ignored.
    #[serde(
        default,
        deserialize_with = "required_names",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub required: Vec<String>,

    #[serde(
        rename = "additionalProperties",
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_properties: Option<AdditionalProperties>,

    /// A tuple form (`items: [..]`) is dropped, leaving the item type open.
    #[serde(
        default,
        deserialize_with = "single_items",
        skip_serializing_if = "Option::is_none"
    )]
    pub items: Option<Box<Schema>>,

    #[serde(rename = "allOf", default, skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<Schema>,

    #[serde(rename = "oneOf", default, skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<Schema>,

    #[serde(rename = "anyOf", default, skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<Schema>,

    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<serde_json::Value>,

    #[serde(
        rename = "const",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub const_value: Option<serde_json::Value>,

    #[serde(rename = "readOnly", skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,

    #[serde(rename = "writeOnly", skip_serializing_if = "Option::is_none")]
    pub write_only: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_json::Value>,
}

impl Schema {
    pub fn is_nullable(&self) -> bool {
        self.nullable.unwrap_or(false)
    }

    /// The single declared type, if the `type` keyword holds exactly one word.
    pub fn single_type(&self) -> Option<&SchemaType> {
        match &self.schema_type {
            Some(TypeSet::Single(t)) => Some(t),
            _ => None,
        }
    }

    pub fn is_required(&self, property: &str) -> bool {
        self.required.iter().any(|r| r == property)
    }
}

/// `additionalProperties` can be a boolean or a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Bool(bool),
    Schema(Box<Schema>),
}

/// Keeps an explicit `null` as `Some(Value::Null)` so `const: null` is not
/// confused with an absent keyword.
fn present<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

/// A YAML `null` inside a type array means the `null` type.
fn type_words<'de, D>(deserializer: D) -> Result<Vec<SchemaType>, D::Error>
where
    D: Deserializer<'de>,
{
    let words: Vec<Option<SchemaType>> = Vec::deserialize(deserializer)?;
    Ok(words
        .into_iter()
        .map(|w| w.unwrap_or(SchemaType::Null))
        .collect())
}

fn required_names<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Array(names) => Ok(names
            .into_iter()
            .filter_map(|n| match n {
                serde_json::Value::String(name) => Some(name),
                _ => None,
            })
            .collect()),
        _ => Ok(Vec::new()),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ItemsShape {
    Single(Box<Schema>),
    Tuple(Vec<serde::de::IgnoredAny>),
}

fn single_items<'de, D>(deserializer: D) -> Result<Option<Box<Schema>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<ItemsShape>::deserialize(deserializer)? {
        Some(ItemsShape::Single(schema)) => Ok(Some(schema)),
        Some(ItemsShape::Tuple(_)) => {
            log::debug!("tuple-form items are not supported, item type left open");
            Ok(None)
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ref_with_nullable() {
        let s: Schema =
            serde_yaml_ng::from_str("$ref: '#/components/schemas/Pet'\nnullable: true\n").unwrap();
        assert_eq!(s.reference.as_deref(), Some("#/components/schemas/Pet"));
        assert!(s.is_nullable());
    }

    #[test]
    fn test_x_nullable_alias() {
        let s: Schema = serde_yaml_ng::from_str("type: string\nx-nullable: true\n").unwrap();
        assert!(s.is_nullable());
        assert_eq!(s.single_type(), Some(&SchemaType::String));
    }

    #[test]
    fn test_unknown_type_word() {
        let s: Schema = serde_yaml_ng::from_str("type: decimal\n").unwrap();
        assert_eq!(s.single_type(), Some(&SchemaType::Unknown));
    }

    #[test]
    fn test_type_array() {
        let s: Schema = serde_yaml_ng::from_str("type: [string, 'null']\n").unwrap();
        assert_eq!(
            s.schema_type,
            Some(TypeSet::Multiple(vec![SchemaType::String, SchemaType::Null]))
        );
    }

    #[test]
    fn test_unquoted_null_in_type_array() {
        let s: Schema = serde_yaml_ng::from_str("type: [string, null]\n").unwrap();
        assert_eq!(
            s.schema_type,
            Some(TypeSet::Multiple(vec![SchemaType::String, SchemaType::Null]))
        );
    }

    #[test]
    fn test_boolean_required_on_property_is_ignored() {
        let yaml = r#"
type: object
properties:
  a: { type: string, required: true }
"#;
        let s: Schema = serde_yaml_ng::from_str(yaml).unwrap();
        assert!(s.properties["a"].required.is_empty());
        assert!(!s.is_required("a"));
    }

    #[test]
    fn test_tuple_items_leave_item_type_open() {
        let s: Schema =
            serde_yaml_ng::from_str("type: array\nitems:\n  - { type: string }\n").unwrap();
        assert_eq!(s.single_type(), Some(&SchemaType::Array));
        assert_eq!(s.items, None);
    }

    #[test]
    fn test_const_null_is_present() {
        let s: Schema = serde_json::from_str(r#"{"const": null}"#).unwrap();
        assert_eq!(s.const_value, Some(serde_json::Value::Null));
        let s: Schema = serde_json::from_str(r#"{"type": "string"}"#).unwrap();
        assert_eq!(s.const_value, None);
    }

    #[test]
    fn test_nested_items_and_properties() {
        let yaml = r#"
type: object
required: [id]
properties:
  id:
    type: integer
  tags:
    type: array
    items:
      type: string
"#;
        let s: Schema = serde_yaml_ng::from_str(yaml).unwrap();
        assert!(s.is_required("id"));
        assert!(!s.is_required("tags"));
        let tags = &s.properties["tags"];
        assert_eq!(
            tags.items.as_deref().and_then(Schema::single_type),
            Some(&SchemaType::String)
        );
    }
}
