pub mod components;
pub mod media_type;
pub mod operation;
pub mod parameter;
pub mod ref_resolve;
pub mod request_body;
pub mod response;
pub mod schema;
pub mod server;
pub mod spec;

use std::fmt;
use std::marker::PhantomData;

use indexmap::IndexMap;
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::error::ParseError;
use spec::ApiDocument;

/// Parse a Swagger 2.0 or OpenAPI 3.x document from YAML.
pub fn from_yaml(input: &str) -> Result<ApiDocument, ParseError> {
    let doc: ApiDocument = serde_yaml_ng::from_str(input)?;
    validate_version(&doc)?;
    Ok(doc)
}

/// Parse a Swagger 2.0 or OpenAPI 3.x document from JSON.
pub fn from_json(input: &str) -> Result<ApiDocument, ParseError> {
    let doc: ApiDocument = serde_json::from_str(input)?;
    validate_version(&doc)?;
    Ok(doc)
}

fn validate_version(doc: &ApiDocument) -> Result<(), ParseError> {
    let version = doc.spec_version()?;
    log::debug!(
        "{} {} detected as {}",
        version.key.as_str(),
        version.raw,
        version.family
    );
    Ok(())
}

/// A map key that accepts any scalar. YAML status codes are often written
/// unquoted (`200:`), which parses as an integer.
struct ScalarKey(String);

impl<'de> Deserialize<'de> for ScalarKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ScalarKeyVisitor;

        impl Visitor<'_> for ScalarKeyVisitor {
            type Value = ScalarKey;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string or integer key")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<ScalarKey, E> {
                Ok(ScalarKey(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<ScalarKey, E> {
                Ok(ScalarKey(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<ScalarKey, E> {
                Ok(ScalarKey(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<ScalarKey, E> {
                Ok(ScalarKey(v.to_string()))
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<ScalarKey, E> {
                Ok(ScalarKey(v.to_string()))
            }
        }

        deserializer.deserialize_any(ScalarKeyVisitor)
    }
}

/// Deserialize a string-keyed map whose keys may be written as bare scalars.
pub(crate) fn scalar_keys<'de, D, V>(deserializer: D) -> Result<IndexMap<String, V>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    struct MapVisitor<V>(PhantomData<V>);

    impl<'de, V: Deserialize<'de>> Visitor<'de> for MapVisitor<V> {
        type Value = IndexMap<String, V>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut out = IndexMap::new();
            while let Some((ScalarKey(key), value)) = map.next_entry::<ScalarKey, V>()? {
                out.insert(key, value);
            }
            Ok(out)
        }
    }

    deserializer.deserialize_map(MapVisitor(PhantomData))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_version() {
        let err = from_yaml("info:\n  title: x\n  version: '1'\npaths: {}\n").unwrap_err();
        assert!(matches!(err, ParseError::MissingVersionDeclaration));
    }

    #[test]
    fn test_unquoted_version_number() {
        let doc = from_yaml("openapi: 3.0\ninfo:\n  title: x\n  version: '1'\n").unwrap();
        assert_eq!(doc.openapi.as_deref(), Some("3.0"));
    }

    #[test]
    fn test_unsupported_version_rejected() {
        let err = from_json(r#"{"openapi": "4.0.0", "info": {"title": "x", "version": "1"}}"#)
            .unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedVersion(_)));
    }
}
