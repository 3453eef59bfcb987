use minijinja::{Environment, context};
use ocg_core::config::ClientConfig;
use ocg_core::ir::grouping::{OperationGroup, group_operations};
use ocg_core::ir::{IrOperation, IrResponse, IrSpec, IrType, IrWireBinding};
use ocg_core::parse::media_type::is_json_media_type;
use ocg_core::transform::name_normalizer::{NameAllocator, sanitize_identifier};
use ocg_core::{GeneratedFile, GeneratorError};

use super::{docstring, render, text_lines};
use crate::type_mapper::{
    ImportTable, decode_expr, is_object_model, optional_type, py_str, python_type,
};

/// A generated API class and the module that defines it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiClass {
    pub module: String,
    pub class_name: String,
}

/// How a method turns the HTTP response into its return value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseDecoding {
    /// The `requests.Response` itself.
    Raw,
    /// `response.json()` as is.
    Json,
    /// `response.text`.
    Text,
    /// `response.content`.
    Bytes,
    /// An expression over `response.json()`.
    Decoded(String),
    /// An expression over `data`, the possibly-null JSON value.
    Nullable(String),
}

impl ResponseDecoding {
    fn kind(&self) -> &'static str {
        match self {
            ResponseDecoding::Raw => "raw",
            ResponseDecoding::Json => "json",
            ResponseDecoding::Text => "text",
            ResponseDecoding::Bytes => "bytes",
            ResponseDecoding::Decoded(_) => "decoded",
            ResponseDecoding::Nullable(_) => "nullable",
        }
    }

    fn expr(&self) -> Option<&str> {
        match self {
            ResponseDecoding::Decoded(e) | ResponseDecoding::Nullable(e) => Some(e),
            _ => None,
        }
    }
}

/// The service name used by the `single` split: configured, or the API title.
pub fn service_name<'a>(ir: &'a IrSpec, config: &'a ClientConfig) -> &'a str {
    config
        .service_name
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(&ir.info.title)
}

/// Emit one `<group>_apis.py` module per operation group.
pub fn emit_apis(
    env: &Environment<'_>,
    ir: &IrSpec,
    config: &ClientConfig,
) -> Result<(Vec<GeneratedFile>, Vec<ApiClass>), GeneratorError> {
    let groups = group_operations(ir, config.split_by, service_name(ir, config));
    let base_url = config.base_url.as_deref().unwrap_or(&ir.base_url);

    let mut modules = NameAllocator::with_reserved(["models", "base"]);
    let mut classes = NameAllocator::new();
    let mut files = Vec::with_capacity(groups.len());
    let mut api_classes = Vec::with_capacity(groups.len());

    for group in &groups {
        let module = modules.allocate(&format!("{}_apis", module_stem(group)));
        let class_name = classes.allocate(&format!("{}APIs", class_stem(group)));
        log::debug!(
            "{class_name} in {module}.py: {} operations",
            group.operation_indices.len()
        );

        let content = emit_group(env, ir, config, group, &class_name, base_url)?;
        files.push(GeneratedFile {
            path: format!("{module}.py"),
            content,
        });
        api_classes.push(ApiClass { module, class_name });
    }

    Ok((files, api_classes))
}

fn module_stem(group: &OperationGroup) -> String {
    let snake = sanitize_identifier(&group.name.snake_case);
    if snake.is_empty() {
        "default".to_string()
    } else {
        snake
    }
}

fn class_stem(group: &OperationGroup) -> String {
    let pascal = heck::AsUpperCamelCase(&group.name.original).to_string();
    let pascal: String = pascal
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    match pascal.chars().next() {
        None => "Default".to_string(),
        Some(c) if c.is_ascii_digit() => format!("Api{pascal}"),
        Some(_) => pascal,
    }
}

fn emit_group(
    env: &Environment<'_>,
    ir: &IrSpec,
    config: &ClientConfig,
    group: &OperationGroup,
    class_name: &str,
    base_url: &str,
) -> Result<String, GeneratorError> {
    let operations: Vec<&IrOperation> = group
        .operation_indices
        .iter()
        .filter_map(|&i| ir.operations.get(i))
        .collect();

    let names = import_table(ir, &operations);
    let docstrings = !config.no_docstrings;
    let op_ctx: Vec<minijinja::Value> = operations
        .iter()
        .map(|op| operation_to_ctx(op, &names, docstrings))
        .collect();

    let class_doc = if docstrings {
        let mut lines = vec![format!("Client for {}.", ir.info.title)];
        if let Some(description) = ir.info.description.as_deref() {
            lines.push(String::new());
            lines.extend(text_lines(Some(description)));
        }
        docstring(&lines, "    ")
    } else {
        None
    };

    render(
        env,
        "api.py.j2",
        context! {
            title => ir.info.title.clone(),
            class_name => class_name,
            class_doc => class_doc,
            base_url => py_str(base_url),
            timeout => config.timeout_seconds,
            model_imports => names.import_lines(),
            uses_warnings => operations.iter().any(|op| op.deprecated),
            operations => op_ctx,
        },
    )
}

/// Every model referenced by the group's signatures and responses, imported
/// from the package root.
fn import_table(ir: &IrSpec, operations: &[&IrOperation]) -> ImportTable {
    let mut referenced: Vec<&str> = operations
        .iter()
        .flat_map(|op| {
            op.signature
                .iter()
                .flat_map(|arg| arg.arg_type.referenced_models())
                .chain(op.response.response_type().into_iter().flat_map(IrType::referenced_models))
        })
        .collect();
    referenced.sort();
    referenced.dedup();

    let mut names = ImportTable::new();
    for schema in referenced {
        match ir.layout.node(schema) {
            Some(node) => {
                names.add(
                    schema,
                    &node.package_import(),
                    &node.class_name,
                    is_object_model(ir, schema),
                );
            }
            None => log::debug!("{schema} has no generated class; typed as Any"),
        }
    }
    names
}

fn operation_to_ctx(op: &IrOperation, names: &ImportTable, docstrings: bool) -> minijinja::Value {
    let args: Vec<String> = op
        .signature
        .iter()
        .map(|arg| {
            if arg.required {
                format!("{}: {}", arg.variable, python_type(&arg.arg_type, names))
            } else {
                format!("{}: {} = None", arg.variable, optional_type(&arg.arg_type, names))
            }
        })
        .collect();

    let path = if op.assembly.path_template.contains('{') {
        format!("f{}", py_str(&op.assembly.path_template))
    } else {
        py_str(&op.assembly.path_template)
    };

    let (body_arg, content_type_header) = body_argument(op);
    let (decoding, return_type) = response_decoding(op, names);

    let doc = if docstrings {
        docstring(&doc_lines(op, names, &return_type), "        ")
    } else {
        None
    };

    context! {
        method_name => op.method_name.clone(),
        http_method => py_str(op.method.as_str()),
        args => args,
        return_type => return_type,
        doc => doc,
        deprecated => op.deprecated,
        deprecation => py_str(&format!("{} is deprecated", op.method_name)),
        path => path,
        query => bindings(&op.assembly.query),
        headers => bindings(&op.assembly.headers),
        cookies => bindings(&op.assembly.cookies),
        form => bindings(&op.assembly.form),
        body_arg => body_arg,
        content_type_header => content_type_header,
        response_kind => decoding.kind(),
        response_expr => decoding.expr().map(str::to_string),
    }
}

fn bindings(bindings: &[IrWireBinding]) -> Vec<minijinja::Value> {
    bindings
        .iter()
        .map(|b| {
            context! {
                wire => py_str(&b.wire_name),
                variable => b.variable.clone(),
                required => b.required,
            }
        })
        .collect()
}

fn is_form_media_type(content_type: &str) -> bool {
    content_type.eq_ignore_ascii_case("application/x-www-form-urlencoded")
}

fn is_multipart(content_type: &str) -> bool {
    content_type.to_ascii_lowercase().starts_with("multipart/")
}

/// The keyword argument carrying the request body, and an explicit
/// `Content-Type` header when the payload is sent raw.
fn body_argument(op: &IrOperation) -> (Option<String>, Option<String>) {
    match &op.request_body {
        Some(body) => {
            let var = &body.variable;
            let ct = body.content_type.as_str();
            if ct.is_empty() || is_json_media_type(ct) {
                (Some(format!("json=self._serialize({var})")), None)
            } else if is_form_media_type(ct) {
                (Some(format!("data=self._serialize({var})")), None)
            } else if is_multipart(ct) {
                (Some(format!("files=self._serialize({var})")), None)
            } else {
                (Some(format!("data={var}")), Some(py_str(ct)))
            }
        }
        None if !op.assembly.form.is_empty() => {
            if is_multipart(&op.request_content_type) {
                (Some("files=form_data".to_string()), None)
            } else {
                (Some("data=form_data".to_string()), None)
            }
        }
        None => (None, None),
    }
}

/// How the response is decoded, and the method's return annotation.
pub fn response_decoding(op: &IrOperation, names: &ImportTable) -> (ResponseDecoding, String) {
    let IrResponse::Typed {
        response_type,
        content_type,
        ..
    } = &op.response
    else {
        return (ResponseDecoding::Raw, "requests.Response".to_string());
    };

    if content_type.is_empty() || is_json_media_type(content_type) {
        let annotation = python_type(response_type, names);
        let decoding = if response_type.is_nullable() {
            decode_expr(response_type, "data", names).map(ResponseDecoding::Nullable)
        } else {
            decode_expr(response_type, "response.json()", names).map(ResponseDecoding::Decoded)
        };
        (decoding.unwrap_or(ResponseDecoding::Json), annotation)
    } else if content_type.to_ascii_lowercase().starts_with("text/") {
        (ResponseDecoding::Text, "str".to_string())
    } else {
        (ResponseDecoding::Bytes, "bytes".to_string())
    }
}

fn doc_lines(op: &IrOperation, names: &ImportTable, return_type: &str) -> Vec<String> {
    let mut lines = text_lines(op.summary.as_deref());
    if op.description.is_some() && op.description != op.summary {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.extend(text_lines(op.description.as_deref()));
    }
    if lines.is_empty() {
        lines.push(format!("{} {}", op.method.as_str(), op.path));
    }

    if !op.signature.is_empty() {
        lines.push(String::new());
        lines.push("Args:".to_string());
        for arg in &op.signature {
            let about = arg
                .description
                .as_deref()
                .and_then(|d| d.lines().next())
                .map(str::to_string)
                .unwrap_or_else(|| python_type(&arg.arg_type, names));
            lines.push(format!("    {}: {about}", arg.variable));
        }
    }

    if let IrResponse::Typed { description, .. } = &op.response {
        lines.push(String::new());
        lines.push("Returns:".to_string());
        let about = description
            .as_deref()
            .and_then(|d| d.lines().next())
            .unwrap_or(return_type);
        lines.push(format!("    {about}"));
    }
    lines
}
