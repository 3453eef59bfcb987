use std::collections::HashSet;

use indexmap::IndexMap;

use super::parameter::{Parameter, ParameterOrRef};
use super::request_body::{RequestBody, RequestBodyOrRef};
use super::response::{Response, ResponseOrRef};

/// A value that is either inline or a `$ref` to an entry of a named table.
pub trait RefOr {
    type Target;

    fn ref_path(&self) -> Option<&str>;
    fn inline(&self) -> Option<&Self::Target>;
}

macro_rules! impl_ref_or {
    ($ty:ty, $target:ty, $variant:ident) => {
        impl RefOr for $ty {
            type Target = $target;

            fn ref_path(&self) -> Option<&str> {
                match self {
                    Self::Ref { ref_path } => Some(ref_path.as_str()),
                    _ => None,
                }
            }

            fn inline(&self) -> Option<&$target> {
                match self {
                    Self::$variant(value) => Some(value),
                    _ => None,
                }
            }
        }
    };
}

impl_ref_or!(ParameterOrRef, Parameter, Parameter);
impl_ref_or!(ResponseOrRef, Response, Response);
impl_ref_or!(RequestBodyOrRef, RequestBody, RequestBody);

/// Parse a local `$ref` like `#/components/schemas/Foo` against the expected
/// prefix and return the (JSON-pointer-unescaped) entry name.
///
/// Pointers into other documents or deeper into an entry yield `None`.
pub fn parse_ref_name(ref_path: &str, prefix: &str) -> Option<String> {
    let name = ref_path.strip_prefix(prefix)?;
    if name.is_empty() || name.contains('/') {
        return None;
    }
    Some(name.replace("~1", "/").replace("~0", "~"))
}

/// Follow `$ref` hops through `table` until an inline value is found.
///
/// Returns `None` for dangling or cyclic references.
pub fn resolve_in<'a, T: RefOr>(
    item: &'a T,
    table: &'a IndexMap<String, T>,
    prefix: &str,
) -> Option<&'a T::Target> {
    let mut visited = HashSet::new();
    let mut current = item;
    loop {
        if let Some(value) = current.inline() {
            return Some(value);
        }
        let ref_path = current.ref_path()?;
        if !visited.insert(ref_path.to_string()) {
            log::warn!("circular reference {ref_path}");
            return None;
        }
        let name = parse_ref_name(ref_path, prefix)?;
        current = table.get(&name)?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ref_name() {
        assert_eq!(
            parse_ref_name("#/components/schemas/Pet", "#/components/schemas/"),
            Some("Pet".to_string())
        );
        assert_eq!(
            parse_ref_name("#/definitions/pets.Pet", "#/definitions/"),
            Some("pets.Pet".to_string())
        );
        assert_eq!(
            parse_ref_name("#/definitions/a~1b", "#/definitions/"),
            Some("a/b".to_string())
        );
        assert_eq!(
            parse_ref_name("other.yaml#/components/schemas/Pet", "#/components/schemas/"),
            None
        );
        assert_eq!(
            parse_ref_name("#/definitions/Pet", "#/components/schemas/"),
            None
        );
        assert_eq!(
            parse_ref_name("#/components/schemas/Pet/properties/id", "#/components/schemas/"),
            None
        );
    }

    #[test]
    fn test_resolve_chain_and_cycle() {
        let yaml = r#"
Direct:
  description: ok
Alias:
  $ref: '#/components/responses/Direct'
LoopA:
  $ref: '#/components/responses/LoopB'
LoopB:
  $ref: '#/components/responses/LoopA'
"#;
        let table: IndexMap<String, ResponseOrRef> = serde_yaml_ng::from_str(yaml).unwrap();
        let prefix = "#/components/responses/";

        let resolved = resolve_in(&table["Alias"], &table, prefix).expect("should resolve");
        assert_eq!(resolved.description.as_deref(), Some("ok"));
        assert!(resolve_in(&table["LoopA"], &table, prefix).is_none());
    }
}
