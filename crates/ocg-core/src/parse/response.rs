use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::media_type::MediaType;
use super::schema::Schema;

/// A response definition. OpenAPI 3.x uses `content`; Swagger 2.0 puts a
/// single `schema` on the response.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Response {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

/// A reference or inline response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
    },
    Response(Response),
}

/// Where a status key falls among success responses: exact `2xx` codes
/// first in ascending order, then the `2XX` range.
pub fn success_rank(status: &str) -> Option<u16> {
    let status = status.trim();
    if status.eq_ignore_ascii_case("2xx") {
        return Some(300);
    }
    match status.parse::<u16>() {
        Ok(code) if (200..300).contains(&code) => Some(code),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_rank() {
        assert_eq!(success_rank("200"), Some(200));
        assert_eq!(success_rank("204"), Some(204));
        assert_eq!(success_rank("2XX"), Some(300));
        assert_eq!(success_rank("400"), None);
        assert_eq!(success_rank("default"), None);
        assert!(success_rank("201") < success_rank("2XX"));
    }

    #[test]
    fn test_swagger_response_schema() {
        let yaml = "description: ok\nschema:\n  type: string\n";
        let r: Response = serde_yaml_ng::from_str(yaml).unwrap();
        assert!(r.schema.is_some());
        assert!(r.content.is_empty());
    }
}
