use std::collections::HashMap;

use ocg_core::ir::{IrModelKind, IrSpec, IrType};
use ocg_core::transform::name_normalizer::NameAllocator;

/// Names every generated module already binds at top level.
const MODULE_NAMES: &[&str] = &[
    "Any",
    "Dict",
    "List",
    "Optional",
    "Union",
    "TYPE_CHECKING",
    "BaseModel",
    "BaseClient",
    "annotations",
    "json",
    "requests",
    "warnings",
];

#[derive(Debug, Clone)]
struct Entry {
    local: String,
    /// Object models decode from a dict; enum constants are used as plain values.
    decodable: bool,
    import: Option<(String, String)>,
}

/// The Python names under which model classes are visible inside one
/// generated module. Two models with the same class name from different
/// folders get distinct local aliases.
#[derive(Debug, Clone)]
pub struct ImportTable {
    entries: HashMap<String, Entry>,
    allocator: NameAllocator,
}

impl Default for ImportTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportTable {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            allocator: NameAllocator::with_reserved(MODULE_NAMES.iter().copied()),
        }
    }

    /// Register the class the module itself defines.
    pub fn local(&mut self, schema_name: &str, class_name: &str, decodable: bool) {
        let local = self.allocator.allocate(class_name);
        self.entries.insert(
            schema_name.to_string(),
            Entry {
                local,
                decodable,
                import: None,
            },
        );
    }

    /// Register an imported class and return its local name.
    pub fn add(&mut self, schema_name: &str, module: &str, class_name: &str, decodable: bool) -> &str {
        if !self.entries.contains_key(schema_name) {
            let qualifier = schema_name
                .rsplit_once('.')
                .map(|(folders, _)| folders.replace('.', "_"));
            let local = self.allocator.allocate_with(class_name, qualifier.as_deref());
            self.entries.insert(
                schema_name.to_string(),
                Entry {
                    local,
                    decodable,
                    import: Some((module.to_string(), class_name.to_string())),
                },
            );
        }
        &self.entries[schema_name].local
    }

    pub fn name_of(&self, schema_name: &str) -> Option<&str> {
        self.entries.get(schema_name).map(|e| e.local.as_str())
    }

    pub fn is_decodable(&self, schema_name: &str) -> bool {
        self.entries.get(schema_name).is_some_and(|e| e.decodable)
    }

    /// `from <module> import <Class>` lines for one schema, if it is imported.
    pub fn import_line(&self, schema_name: &str) -> Option<String> {
        let entry = self.entries.get(schema_name)?;
        let (module, class_name) = entry.import.as_ref()?;
        Some(if *class_name == entry.local {
            format!("from {module} import {class_name}")
        } else {
            format!("from {module} import {class_name} as {}", entry.local)
        })
    }

    /// Every import line, sorted.
    pub fn import_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .entries
            .keys()
            .filter_map(|schema| self.import_line(schema))
            .collect();
        lines.sort();
        lines
    }
}

/// Whether the schema is an object model (as opposed to an enum).
pub fn is_object_model(ir: &IrSpec, schema_name: &str) -> bool {
    ir.model(schema_name)
        .is_some_and(|m| matches!(m.kind, IrModelKind::Object { .. }))
}

/// Map an `IrType` to its Python annotation.
pub fn python_type(ir_type: &IrType, names: &ImportTable) -> String {
    match ir_type {
        IrType::String => "str".to_string(),
        IrType::Integer => "int".to_string(),
        IrType::Number => "float".to_string(),
        IrType::Boolean => "bool".to_string(),
        IrType::Numeric => "Union[int, float]".to_string(),
        IrType::Map => "Dict[str, Any]".to_string(),
        IrType::Any => "Any".to_string(),
        IrType::Array(inner) => format!("List[{}]", python_type(inner, names)),
        IrType::Model(name) => names.name_of(name).unwrap_or("Any").to_string(),
        IrType::Nullable(inner) => format!("Optional[{}]", python_type(inner, names)),
    }
}

/// Annotation of an argument or field that may be absent.
pub fn optional_type(ir_type: &IrType, names: &ImportTable) -> String {
    let base = python_type(ir_type, names);
    if ir_type.is_nullable() || base == "Any" {
        base
    } else {
        format!("Optional[{base}]")
    }
}

/// Expression turning the decoded JSON value `expr` into `ir_type`, or
/// `None` when the value can be returned as is.
pub fn decode_expr(ir_type: &IrType, expr: &str, names: &ImportTable) -> Option<String> {
    decode_at(ir_type, expr, names, 0)
}

fn decode_at(ir_type: &IrType, expr: &str, names: &ImportTable, depth: usize) -> Option<String> {
    match ir_type {
        IrType::Model(schema) if names.is_decodable(schema) => {
            Some(format!("{}.from_dict({expr})", names.name_of(schema)?))
        }
        IrType::Array(inner) => {
            let var = if depth == 0 {
                "item".to_string()
            } else {
                format!("item{depth}")
            };
            let element = decode_at(inner, &var, names, depth + 1)?;
            Some(format!("[{element} for {var} in {expr}]"))
        }
        IrType::Nullable(inner) => {
            let value = decode_at(inner, expr, names, depth)?;
            Some(format!("{value} if {expr} is not None else None"))
        }
        _ => None,
    }
}

/// Python string literal.
pub fn py_str(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// Python literal for a JSON value.
pub fn python_literal(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "None".to_string(),
        serde_json::Value::Bool(true) => "True".to_string(),
        serde_json::Value::Bool(false) => "False".to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => py_str(s),
        serde_json::Value::Array(items) => {
            let items: Vec<String> = items.iter().map(python_literal).collect();
            format!("[{}]", items.join(", "))
        }
        serde_json::Value::Object(map) => {
            let entries: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", py_str(k), python_literal(v)))
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
    }
}

/// Python list literal of strings, as used for `__all__`.
pub fn py_str_list<I, S>(values: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let items: Vec<String> = values.into_iter().map(|v| py_str(v.as_ref())).collect();
    format!("[{}]", items.join(", "))
}
