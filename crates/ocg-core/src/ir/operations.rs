use super::schemas::IrType;
use super::types::NormalizedName;

pub use crate::parse::operation::HttpMethod;

/// A fully resolved API operation.
#[derive(Debug, Clone)]
pub struct IrOperation {
    /// The raw name the method name was derived from (operationId, alias, or route).
    pub name: NormalizedName,
    /// Unique, keyword-safe Python method name.
    pub method_name: String,
    pub method: HttpMethod,
    pub path: String,
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub deprecated: bool,
    /// Effective parameters in declaration order.
    pub parameters: Vec<IrParameter>,
    pub request_body: Option<IrRequestBody>,
    pub response: IrResponse,
    /// Method arguments in call order.
    pub signature: Vec<IrArgument>,
    pub assembly: IrRequestAssembly,
    /// Negotiated request media type, empty when none is declared.
    pub request_content_type: String,
    /// Negotiated response media type, empty when none is declared.
    pub response_content_type: String,
}

/// A resolved path/query/header/cookie/form parameter.
#[derive(Debug, Clone)]
pub struct IrParameter {
    pub name: NormalizedName,
    pub original_name: String,
    /// Variable name in the generated method signature.
    pub variable: String,
    pub location: IrParameterLocation,
    pub param_type: IrType,
    pub required: bool,
    pub description: Option<String>,
    pub deprecated: bool,
}

/// Parameter location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IrParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
    Form,
}

impl IrParameterLocation {
    /// Signature grouping order.
    pub const ORDER: [IrParameterLocation; 5] = [
        IrParameterLocation::Path,
        IrParameterLocation::Query,
        IrParameterLocation::Header,
        IrParameterLocation::Cookie,
        IrParameterLocation::Form,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IrParameterLocation::Path => "path",
            IrParameterLocation::Query => "query",
            IrParameterLocation::Header => "header",
            IrParameterLocation::Cookie => "cookie",
            IrParameterLocation::Form => "form",
        }
    }
}

/// A resolved request body.
#[derive(Debug, Clone)]
pub struct IrRequestBody {
    pub variable: String,
    pub body_type: IrType,
    pub required: bool,
    pub content_type: String,
    pub description: Option<String>,
}

/// What an operation returns.
#[derive(Debug, Clone, PartialEq)]
pub enum IrResponse {
    /// The first success response declaring a body schema.
    Typed {
        status: String,
        response_type: IrType,
        content_type: String,
        description: Option<String>,
    },
    /// No success response declares a body; the raw transport response is returned.
    Untyped,
}

impl IrResponse {
    pub fn response_type(&self) -> Option<&IrType> {
        match self {
            IrResponse::Typed { response_type, .. } => Some(response_type),
            IrResponse::Untyped => None,
        }
    }
}

/// One argument of a generated method.
#[derive(Debug, Clone)]
pub struct IrArgument {
    pub variable: String,
    pub arg_type: IrType,
    pub required: bool,
    pub source: IrArgumentSource,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrArgumentSource {
    Parameter(IrParameterLocation),
    Body,
}

/// How a call assembles its HTTP request from the method arguments.
#[derive(Debug, Clone, Default)]
pub struct IrRequestAssembly {
    /// Path with `{wireName}` placeholders rewritten to `{variable}`.
    pub path_template: String,
    pub query: Vec<IrWireBinding>,
    pub headers: Vec<IrWireBinding>,
    pub cookies: Vec<IrWireBinding>,
    pub form: Vec<IrWireBinding>,
}

/// Binds a method variable to a wire-level name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrWireBinding {
    pub wire_name: String,
    pub variable: String,
    pub required: bool,
}
