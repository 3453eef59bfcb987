use crate::transform::namespace::NamespaceNode;

/// A resolved type descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IrType {
    String,
    Integer,
    Number,
    Boolean,
    /// Integer-or-float supertype.
    Numeric,
    /// String-keyed map of arbitrary values.
    Map,
    Array(Box<IrType>),
    /// Nominal reference to a schema, by its original name.
    Model(String),
    Any,
    Nullable(Box<IrType>),
}

impl IrType {
    /// Wrap in `Nullable` unless already nullable.
    pub fn nullable(self) -> IrType {
        match self {
            IrType::Nullable(_) => self,
            other => IrType::Nullable(Box::new(other)),
        }
    }

    pub fn array_of(item: IrType) -> IrType {
        IrType::Array(Box::new(item))
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, IrType::Nullable(_))
    }

    /// The descriptor without its outer nullable wrapper.
    pub fn non_null(&self) -> &IrType {
        match self {
            IrType::Nullable(inner) => inner,
            other => other,
        }
    }

    /// Number of nested `Array` wrappers (nullable wrappers are transparent).
    pub fn array_depth(&self) -> usize {
        match self.non_null() {
            IrType::Array(inner) => 1 + inner.array_depth(),
            _ => 0,
        }
    }

    /// Names of every schema referenced anywhere in this descriptor.
    pub fn referenced_models(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_models(&mut out);
        out
    }

    fn collect_models<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            IrType::Model(name) => out.push(name),
            IrType::Array(inner) | IrType::Nullable(inner) => inner.collect_models(out),
            _ => {}
        }
    }
}

/// A generated model class.
#[derive(Debug, Clone)]
pub struct IrModel {
    pub schema_name: String,
    pub node: NamespaceNode,
    pub description: Option<String>,
    pub kind: IrModelKind,
    /// Other models this one refers to, sorted and deduplicated.
    pub imports: Vec<IrModelImport>,
}

#[derive(Debug, Clone)]
pub enum IrModelKind {
    Object { fields: Vec<IrField> },
    Enum { variants: Vec<IrEnumVariant> },
}

/// A property of an object model.
#[derive(Debug, Clone)]
pub struct IrField {
    /// Python attribute name.
    pub attribute: String,
    /// Key in the wire representation.
    pub original_name: String,
    pub field_type: IrType,
    pub required: bool,
    pub description: Option<String>,
    pub read_only: bool,
}

#[derive(Debug, Clone)]
pub struct IrEnumVariant {
    pub name: String,
    pub value: serde_json::Value,
}

/// A relative import of another model class.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct IrModelImport {
    pub module: String,
    pub class_name: String,
    pub schema_name: String,
}
