//! Binds declared parameters and payloads to method arguments and to the
//! parts of the HTTP request they end up in.

use crate::ir::{
    IrArgument, IrArgumentSource, IrParameter, IrParameterLocation, IrRequestAssembly,
    IrRequestBody, IrResponse, IrType, IrWireBinding,
};
use crate::parse::operation::{Operation, PathItem};
use crate::parse::parameter::{Parameter, ParameterLocation, ParameterOrRef};
use crate::parse::response::success_rank;

use super::name_normalizer::{NameAllocator, normalize_name, sanitize_identifier, to_snake_case};
use super::schema_resolver::{ResolveContext, resolve};

/// Variable holding the request payload.
pub const BODY_VARIABLE: &str = "payload";

/// Names a generated method body already uses.
const RESERVED_VARIABLES: &[&str] = &[
    "self",
    BODY_VARIABLE,
    "params",
    "headers",
    "cookies",
    "form_data",
    "response",
    "path",
    "data",
    "warnings",
];

/// The bound call surface of one operation.
#[derive(Debug, Clone)]
pub struct Binding {
    pub parameters: Vec<IrParameter>,
    pub request_body: Option<IrRequestBody>,
    pub signature: Vec<IrArgument>,
    pub assembly: IrRequestAssembly,
    pub request_content_type: String,
    pub response_content_type: String,
    pub response: IrResponse,
}

/// Bind one operation declared at `path`.
pub fn bind(ctx: &ResolveContext<'_>, path: &str, item: &PathItem, op: &Operation) -> Binding {
    let declared = effective_parameters(ctx, &item.parameters, &op.parameters);

    let mut allocator = NameAllocator::with_reserved(RESERVED_VARIABLES.iter().copied());
    let mut parameters: Vec<IrParameter> = declared
        .iter()
        .filter_map(|p| {
            let location = ir_location(p.location)?;
            let candidate = sanitize_identifier(&to_snake_case(&p.name));
            let variable = allocator.allocate_with(&candidate, Some(location.as_str()));
            Some(IrParameter {
                name: normalize_name(&p.name),
                original_name: p.name.clone(),
                variable,
                location,
                param_type: resolve(&p.effective_schema(), ctx),
                required: p.required || location == IrParameterLocation::Path,
                description: p.description.clone(),
                deprecated: p.deprecated.unwrap_or(false),
            })
        })
        .collect();
    for name in undeclared_placeholders(path, &parameters) {
        log::warn!("{path}: placeholder {{{name}}} has no path parameter, binding it as a string");
        let candidate = sanitize_identifier(&to_snake_case(name));
        parameters.push(IrParameter {
            name: normalize_name(name),
            original_name: name.to_string(),
            variable: allocator.allocate_with(&candidate, Some(IrParameterLocation::Path.as_str())),
            location: IrParameterLocation::Path,
            param_type: IrType::String,
            required: true,
            description: None,
            deprecated: false,
        });
    }

    let request_body = ctx
        .dialect
        .request_body(ctx.doc, op, &declared)
        .map(|decl| IrRequestBody {
            variable: BODY_VARIABLE.to_string(),
            body_type: decl
                .schema
                .map(|schema| resolve(schema, ctx))
                .unwrap_or(IrType::Any),
            required: decl.required,
            content_type: decl.content_type,
            description: decl.description.map(str::to_string),
        });

    let signature = build_signature(&parameters, request_body.as_ref());
    let assembly = build_assembly(path, &parameters);
    let response = select_response(ctx, op);

    let response_content_type = match &response {
        IrResponse::Typed { content_type, .. } => content_type.clone(),
        IrResponse::Untyped => ctx.dialect.response_content_type(ctx.doc, op),
    };

    Binding {
        request_content_type: ctx.dialect.request_content_type(ctx.doc, op),
        response_content_type,
        parameters,
        request_body,
        signature,
        assembly,
        response,
    }
}

/// Path-level parameters overlaid by operation-level ones; an operation
/// parameter replaces the path-level one with the same name and location.
fn effective_parameters<'a>(
    ctx: &ResolveContext<'a>,
    shared: &'a [ParameterOrRef],
    own: &'a [ParameterOrRef],
) -> Vec<&'a Parameter> {
    let mut merged: Vec<&'a Parameter> = Vec::new();
    for param in shared.iter().chain(own) {
        let Some(p) = ctx.dialect.parameter(ctx.doc, param) else {
            log::warn!("skipping unresolvable parameter {param:?}");
            continue;
        };
        match merged
            .iter_mut()
            .find(|m| m.name == p.name && m.location == p.location)
        {
            Some(slot) => *slot = p,
            None => merged.push(p),
        }
    }
    merged
}

/// `{name}` placeholders of the path template that no declared path
/// parameter fills, in order of appearance.
fn undeclared_placeholders<'p>(path: &'p str, parameters: &[IrParameter]) -> Vec<&'p str> {
    let mut found: Vec<&str> = Vec::new();
    let mut rest = path;
    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}') else {
            break;
        };
        let name = &rest[open + 1..open + close];
        let declared = parameters
            .iter()
            .any(|p| p.location == IrParameterLocation::Path && p.original_name == name);
        if !name.is_empty() && !declared && !found.contains(&name) {
            found.push(name);
        }
        rest = &rest[open + close + 1..];
    }
    found
}

fn ir_location(location: ParameterLocation) -> Option<IrParameterLocation> {
    match location {
        ParameterLocation::Path => Some(IrParameterLocation::Path),
        ParameterLocation::Query => Some(IrParameterLocation::Query),
        ParameterLocation::Header => Some(IrParameterLocation::Header),
        ParameterLocation::Cookie => Some(IrParameterLocation::Cookie),
        ParameterLocation::FormData => Some(IrParameterLocation::Form),
        ParameterLocation::Body => None,
    }
}

/// Required parameters by location group, then the payload, then optional
/// parameters by location group.
fn build_signature(parameters: &[IrParameter], body: Option<&IrRequestBody>) -> Vec<IrArgument> {
    let argument = |p: &IrParameter| IrArgument {
        variable: p.variable.clone(),
        arg_type: p.param_type.clone(),
        required: p.required,
        source: IrArgumentSource::Parameter(p.location),
        description: p.description.clone(),
    };
    let group = |required: bool| {
        IrParameterLocation::ORDER.into_iter().flat_map(move |location| {
            parameters
                .iter()
                .filter(move |p| p.location == location && p.required == required)
        })
    };

    let mut signature: Vec<IrArgument> = group(true).map(argument).collect();
    if let Some(body) = body {
        signature.push(IrArgument {
            variable: body.variable.clone(),
            arg_type: body.body_type.clone(),
            required: body.required,
            source: IrArgumentSource::Body,
            description: body.description.clone(),
        });
    }
    signature.extend(group(false).map(argument));
    signature
}

fn build_assembly(path: &str, parameters: &[IrParameter]) -> IrRequestAssembly {
    let mut assembly = IrRequestAssembly {
        path_template: path.to_string(),
        ..Default::default()
    };
    for p in parameters {
        let binding = IrWireBinding {
            wire_name: p.original_name.clone(),
            variable: p.variable.clone(),
            required: p.required,
        };
        match p.location {
            IrParameterLocation::Path => {
                assembly.path_template = assembly
                    .path_template
                    .replace(&format!("{{{}}}", p.original_name), &format!("{{{}}}", p.variable));
            }
            IrParameterLocation::Query => assembly.query.push(binding),
            IrParameterLocation::Header => assembly.headers.push(binding),
            IrParameterLocation::Cookie => assembly.cookies.push(binding),
            IrParameterLocation::Form => assembly.form.push(binding),
        }
    }
    assembly
}

/// The lowest-ranked success response that declares a body schema.
fn select_response(ctx: &ResolveContext<'_>, op: &Operation) -> IrResponse {
    let mut success: Vec<(u16, &String, _)> = op
        .responses
        .iter()
        .filter_map(|(status, r)| success_rank(status).map(|rank| (rank, status, r)))
        .collect();
    success.sort_by_key(|(rank, _, _)| *rank);

    for (_, status, response_ref) in success {
        let Some(response) = ctx.dialect.response(ctx.doc, response_ref) else {
            log::warn!("skipping unresolvable response {status}");
            continue;
        };
        if let Some(body) = ctx.dialect.response_body(ctx.doc, op, response) {
            return IrResponse::Typed {
                status: status.clone(),
                response_type: resolve(body.schema, ctx),
                content_type: body.content_type,
                description: response.description.clone(),
            };
        }
    }
    IrResponse::Untyped
}
