use super::types::{IrSpec, NormalizedName};
use crate::config::SplitBy;
use crate::transform::name_normalizer::normalize_name;
use indexmap::IndexMap;

/// A group of operations that becomes one generated API class.
#[derive(Debug, Clone)]
pub struct OperationGroup {
    pub name: NormalizedName,
    pub operation_indices: Vec<usize>,
}

/// Group operations in the IR spec according to the split strategy.
///
/// `single_name` names the only group of the `Single` strategy.
pub fn group_operations(ir: &IrSpec, split_by: SplitBy, single_name: &str) -> Vec<OperationGroup> {
    match split_by {
        SplitBy::Single => group_single(ir, single_name),
        SplitBy::Tag => group_by_tag(ir),
        SplitBy::Route => group_by_route(ir),
    }
}

/// Everything in one group.
fn group_single(ir: &IrSpec, name: &str) -> Vec<OperationGroup> {
    vec![OperationGroup {
        name: normalize_name(name),
        operation_indices: (0..ir.operations.len()).collect(),
    }]
}

/// Group by tag — reuses `IrModule` groupings.
fn group_by_tag(ir: &IrSpec) -> Vec<OperationGroup> {
    ir.modules
        .iter()
        .map(|m| OperationGroup {
            name: m.name.clone(),
            operation_indices: m.operations.clone(),
        })
        .collect()
}

/// Group by route — group operations by their first path segment.
fn group_by_route(ir: &IrSpec) -> Vec<OperationGroup> {
    let mut groups: IndexMap<String, Vec<usize>> = IndexMap::new();

    for (i, op) in ir.operations.iter().enumerate() {
        let prefix = extract_path_prefix(&op.path);
        groups.entry(prefix).or_default().push(i);
    }

    groups
        .into_iter()
        .map(|(prefix, indices)| OperationGroup {
            name: normalize_name(&prefix),
            operation_indices: indices,
        })
        .collect()
}

/// Extract the first meaningful path segment as a group name.
/// e.g. "/pets/{petId}" → "pets", "/api/v1/store/inventory" → "store"
fn extract_path_prefix(path: &str) -> String {
    let segments: Vec<&str> = path
        .split('/')
        .filter(|s| !s.is_empty() && !s.starts_with('{'))
        .collect();

    let skip = match segments.as_slice() {
        [api, version, _, ..]
            if api.eq_ignore_ascii_case("api")
                && version.starts_with(['v', 'V'])
                && version[1..].chars().all(|c| c.is_ascii_digit()) =>
        {
            2
        }
        _ => 0,
    };

    segments.get(skip).unwrap_or(&"default").to_string()
}
