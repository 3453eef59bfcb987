use std::fmt;

use indexmap::IndexMap;
use serde::de::{self, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use super::parameter::ParameterOrRef;
use super::request_body::RequestBodyOrRef;
use super::response::ResponseOrRef;

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
    Trace,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Trace => "TRACE",
        }
    }

    /// Lowercase verb, as used in path item keys and method names.
    pub fn verb(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
            HttpMethod::Patch => "patch",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
            HttpMethod::Trace => "trace",
        }
    }

    /// Parse a path item key; non-method keys (`parameters`, `x-*`, ...) yield `None`.
    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().as_str() {
            "get" => Some(HttpMethod::Get),
            "post" => Some(HttpMethod::Post),
            "put" => Some(HttpMethod::Put),
            "delete" => Some(HttpMethod::Delete),
            "patch" => Some(HttpMethod::Patch),
            "options" => Some(HttpMethod::Options),
            "head" => Some(HttpMethod::Head),
            "trace" => Some(HttpMethod::Trace),
            _ => None,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An API operation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Operation {
    #[serde(rename = "operationId", skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterOrRef>,

    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBodyOrRef>,

    #[serde(
        default,
        deserialize_with = "super::scalar_keys",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub responses: IndexMap<String, ResponseOrRef>,

    /// Swagger 2.0 request media types.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub consumes: Vec<String>,

    /// Swagger 2.0 response media types.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub produces: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
}

/// A path item: shared parameters plus operations keyed by HTTP method, in
/// the order the document declares them.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PathItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterOrRef>,

    #[serde(flatten)]
    pub operations: IndexMap<HttpMethod, Operation>,
}

impl<'de> Deserialize<'de> for PathItem {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PathItemVisitor;

        impl<'de> Visitor<'de> for PathItemVisitor {
            type Value = PathItem;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a path item object")
            }

            fn visit_map<A>(self, mut map: A) -> Result<PathItem, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut item = PathItem::default();
                while let Some(key) = map.next_key::<String>()? {
                    if let Some(method) = HttpMethod::from_key(&key) {
                        let op: Operation = map.next_value()?;
                        if item.operations.insert(method, op).is_some() {
                            return Err(de::Error::custom(format!("duplicate method `{key}`")));
                        }
                        continue;
                    }
                    match key.as_str() {
                        "summary" => item.summary = map.next_value()?,
                        "description" => item.description = map.next_value()?,
                        "parameters" => item.parameters = map.next_value()?,
                        _ => {
                            map.next_value::<IgnoredAny>()?;
                        }
                    }
                }
                Ok(item)
            }
        }

        deserializer.deserialize_map(PathItemVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_methods_keep_document_order() {
        let yaml = r#"
parameters:
  - name: id
    in: path
    required: true
    type: string
x-internal: true
put:
  operationId: replaceThing
  responses: {}
get:
  operationId: getThing
  responses: {}
delete:
  responses: {}
"#;
        let item: PathItem = serde_yaml_ng::from_str(yaml).unwrap();
        let methods: Vec<HttpMethod> = item.operations.keys().copied().collect();
        assert_eq!(
            methods,
            vec![HttpMethod::Put, HttpMethod::Get, HttpMethod::Delete]
        );
        assert_eq!(item.parameters.len(), 1);
        assert_eq!(
            item.operations[&HttpMethod::Get].operation_id.as_deref(),
            Some("getThing")
        );
    }

    #[test]
    fn test_numeric_response_keys() {
        let yaml = r#"
responses:
  200:
    description: ok
  '404':
    description: missing
"#;
        let op: Operation = serde_yaml_ng::from_str(yaml).unwrap();
        let keys: Vec<&str> = op.responses.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["200", "404"]);
    }

    #[test]
    fn test_from_key() {
        assert_eq!(HttpMethod::from_key("GET"), Some(HttpMethod::Get));
        assert_eq!(HttpMethod::from_key("parameters"), None);
        assert_eq!(HttpMethod::Patch.verb(), "patch");
    }
}
