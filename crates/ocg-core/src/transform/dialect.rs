//! Per-family document access.
//!
//! Swagger 2.0 and OpenAPI 3.x store the same concepts in different places:
//! schema tables, reusable parameters and responses, request payloads,
//! media types and servers. A [`Dialect`] is chosen once from the detected
//! [`VersionFamily`] and every later stage asks it instead of branching on
//! the version itself.

use indexmap::IndexMap;

use crate::ir::IrServer;
use crate::parse::media_type::{MediaType, preferred_media_type};
use crate::parse::operation::Operation;
use crate::parse::parameter::{Parameter, ParameterLocation, ParameterOrRef};
use crate::parse::ref_resolve::{parse_ref_name, resolve_in};
use crate::parse::request_body::RequestBodyOrRef;
use crate::parse::response::{Response, ResponseOrRef, success_rank};
use crate::parse::schema::Schema;
use crate::parse::spec::ApiDocument;
use crate::version::VersionFamily;

/// A request payload as declared by the document.
#[derive(Debug, Clone)]
pub struct BodyDecl<'a> {
    pub schema: Option<&'a Schema>,
    pub required: bool,
    pub description: Option<&'a str>,
    pub content_type: String,
}

/// A success response body: its schema and the media type it was found under.
#[derive(Debug, Clone)]
pub struct ResponseBody<'a> {
    pub schema: &'a Schema,
    pub content_type: String,
}

/// Family-specific view of an [`ApiDocument`].
pub trait Dialect {
    fn family(&self) -> VersionFamily;

    /// Prefix of a local schema `$ref`.
    fn schema_ref_prefix(&self) -> &'static str;

    /// The named schema table.
    fn schemas<'a>(&self, doc: &'a ApiDocument) -> &'a IndexMap<String, Schema>;

    /// Resolve an inline or referenced parameter.
    fn parameter<'a>(&self, doc: &'a ApiDocument, param: &'a ParameterOrRef)
    -> Option<&'a Parameter>;

    /// Resolve an inline or referenced response.
    fn response<'a>(&self, doc: &'a ApiDocument, response: &'a ResponseOrRef)
    -> Option<&'a Response>;

    /// Negotiated request media type.
    fn request_content_type(&self, doc: &ApiDocument, op: &Operation) -> String;

    /// Negotiated response media type across the success responses.
    fn response_content_type(&self, doc: &ApiDocument, op: &Operation) -> String;

    /// The request payload, from `requestBody` or an `in: body` parameter.
    fn request_body<'a>(
        &self,
        doc: &'a ApiDocument,
        op: &'a Operation,
        params: &[&'a Parameter],
    ) -> Option<BodyDecl<'a>>;

    /// The body schema of one response, if it declares one.
    fn response_body<'a>(
        &self,
        doc: &ApiDocument,
        op: &Operation,
        response: &'a Response,
    ) -> Option<ResponseBody<'a>>;

    fn servers(&self, doc: &ApiDocument) -> Vec<IrServer>;

    /// Name of the schema a `$ref` points to, if it is in this document's table.
    fn schema_name(&self, doc: &ApiDocument, ref_path: &str) -> Option<String> {
        parse_ref_name(ref_path, self.schema_ref_prefix())
            .filter(|name| self.schemas(doc).contains_key(name))
    }
}

/// Select the dialect for a family.
pub fn dialect_for(family: VersionFamily) -> &'static dyn Dialect {
    static OPENAPI_30: OpenApi3Dialect = OpenApi3Dialect {
        family: VersionFamily::OpenApi30,
    };
    static OPENAPI_31: OpenApi3Dialect = OpenApi3Dialect {
        family: VersionFamily::OpenApi31,
    };
    static OPENAPI_32: OpenApi3Dialect = OpenApi3Dialect {
        family: VersionFamily::OpenApi32,
    };

    match family {
        VersionFamily::Swagger2 => &Swagger2Dialect,
        VersionFamily::OpenApi30 => &OPENAPI_30,
        VersionFamily::OpenApi31 => &OPENAPI_31,
        VersionFamily::OpenApi32 => &OPENAPI_32,
    }
}

/// Swagger 2.0: `definitions`, top-level `parameters`/`responses`,
/// `consumes`/`produces` with spec-level defaults, `host` + `basePath`.
#[derive(Debug, Clone, Copy)]
pub struct Swagger2Dialect;

impl Swagger2Dialect {
    fn consumes<'a>(doc: &'a ApiDocument, op: &'a Operation) -> &'a [String] {
        if op.consumes.is_empty() {
            &doc.consumes
        } else {
            &op.consumes
        }
    }

    fn produces<'a>(doc: &'a ApiDocument, op: &'a Operation) -> &'a [String] {
        if op.produces.is_empty() {
            &doc.produces
        } else {
            &op.produces
        }
    }
}

impl Dialect for Swagger2Dialect {
    fn family(&self) -> VersionFamily {
        VersionFamily::Swagger2
    }

    fn schema_ref_prefix(&self) -> &'static str {
        "#/definitions/"
    }

    fn schemas<'a>(&self, doc: &'a ApiDocument) -> &'a IndexMap<String, Schema> {
        &doc.definitions
    }

    fn parameter<'a>(
        &self,
        doc: &'a ApiDocument,
        param: &'a ParameterOrRef,
    ) -> Option<&'a Parameter> {
        match param {
            ParameterOrRef::Parameter(p) => Some(p),
            ParameterOrRef::Ref { ref_path } => {
                let name = parse_ref_name(ref_path, "#/parameters/")?;
                doc.parameters.get(&name)
            }
        }
    }

    fn response<'a>(
        &self,
        doc: &'a ApiDocument,
        response: &'a ResponseOrRef,
    ) -> Option<&'a Response> {
        match response {
            ResponseOrRef::Response(r) => Some(r),
            ResponseOrRef::Ref { ref_path } => {
                let name = parse_ref_name(ref_path, "#/responses/")?;
                doc.responses.get(&name)
            }
        }
    }

    fn request_content_type(&self, doc: &ApiDocument, op: &Operation) -> String {
        preferred_media_type(Self::consumes(doc, op).iter().map(String::as_str))
    }

    fn response_content_type(&self, doc: &ApiDocument, op: &Operation) -> String {
        preferred_media_type(Self::produces(doc, op).iter().map(String::as_str))
    }

    fn request_body<'a>(
        &self,
        doc: &'a ApiDocument,
        op: &'a Operation,
        params: &[&'a Parameter],
    ) -> Option<BodyDecl<'a>> {
        let body: &'a Parameter = params
            .iter()
            .copied()
            .find(|p| p.location == ParameterLocation::Body)?;
        Some(BodyDecl {
            schema: body.schema.as_ref(),
            required: body.required,
            description: body.description.as_deref(),
            content_type: self.request_content_type(doc, op),
        })
    }

    fn response_body<'a>(
        &self,
        doc: &ApiDocument,
        op: &Operation,
        response: &'a Response,
    ) -> Option<ResponseBody<'a>> {
        response.schema.as_ref().map(|schema| ResponseBody {
            schema,
            content_type: self.response_content_type(doc, op),
        })
    }

    fn servers(&self, doc: &ApiDocument) -> Vec<IrServer> {
        let base_path = doc.base_path.as_deref().unwrap_or_default();
        match doc.host.as_deref().filter(|h| !h.is_empty()) {
            Some(host) => {
                let schemes: Vec<&str> = if doc.schemes.is_empty() {
                    vec!["https"]
                } else {
                    doc.schemes.iter().map(String::as_str).collect()
                };
                schemes
                    .into_iter()
                    .map(|scheme| IrServer {
                        url: format!("{scheme}://{host}{base_path}"),
                        description: None,
                    })
                    .collect()
            }
            None if !base_path.is_empty() => vec![IrServer {
                url: base_path.to_string(),
                description: None,
            }],
            None => Vec::new(),
        }
    }
}

/// OpenAPI 3.x: `components`, `requestBody`, per-response `content`, `servers`.
#[derive(Debug, Clone, Copy)]
pub struct OpenApi3Dialect {
    family: VersionFamily,
}

impl OpenApi3Dialect {
    fn media_keys(content: &IndexMap<String, MediaType>) -> String {
        preferred_media_type(content.keys().map(String::as_str))
    }
}

impl Dialect for OpenApi3Dialect {
    fn family(&self) -> VersionFamily {
        self.family
    }

    fn schema_ref_prefix(&self) -> &'static str {
        "#/components/schemas/"
    }

    fn schemas<'a>(&self, doc: &'a ApiDocument) -> &'a IndexMap<String, Schema> {
        &doc.components.schemas
    }

    fn parameter<'a>(
        &self,
        doc: &'a ApiDocument,
        param: &'a ParameterOrRef,
    ) -> Option<&'a Parameter> {
        resolve_in(
            param,
            &doc.components.parameters,
            "#/components/parameters/",
        )
    }

    fn response<'a>(
        &self,
        doc: &'a ApiDocument,
        response: &'a ResponseOrRef,
    ) -> Option<&'a Response> {
        resolve_in(
            response,
            &doc.components.responses,
            "#/components/responses/",
        )
    }

    fn request_content_type(&self, doc: &ApiDocument, op: &Operation) -> String {
        op.request_body
            .as_ref()
            .and_then(|body| {
                resolve_in(
                    body,
                    &doc.components.request_bodies,
                    "#/components/requestBodies/",
                )
            })
            .map(|body| Self::media_keys(&body.content))
            .unwrap_or_default()
    }

    fn response_content_type(&self, doc: &ApiDocument, op: &Operation) -> String {
        let mut success: Vec<(u16, &ResponseOrRef)> = op
            .responses
            .iter()
            .filter_map(|(status, r)| success_rank(status).map(|rank| (rank, r)))
            .collect();
        success.sort_by_key(|(rank, _)| *rank);

        let declared: Vec<&str> = success
            .into_iter()
            .filter_map(|(_, r)| self.response(doc, r))
            .flat_map(|r| r.content.keys().map(String::as_str))
            .collect();
        preferred_media_type(declared)
    }

    fn request_body<'a>(
        &self,
        doc: &'a ApiDocument,
        op: &'a Operation,
        _params: &[&'a Parameter],
    ) -> Option<BodyDecl<'a>> {
        let body_ref: &'a RequestBodyOrRef = op.request_body.as_ref()?;
        let Some(body) = resolve_in(
            body_ref,
            &doc.components.request_bodies,
            "#/components/requestBodies/",
        ) else {
            log::warn!("unresolvable request body reference in {:?}", op.operation_id);
            return None;
        };
        let content_type = Self::media_keys(&body.content);
        let schema = body
            .content
            .get(&content_type)
            .and_then(|media| media.schema.as_ref());
        Some(BodyDecl {
            schema,
            required: body.required,
            description: body.description.as_deref(),
            content_type,
        })
    }

    fn response_body<'a>(
        &self,
        _doc: &ApiDocument,
        _op: &Operation,
        response: &'a Response,
    ) -> Option<ResponseBody<'a>> {
        let content_type = Self::media_keys(&response.content);
        let schema = response.content.get(&content_type)?.schema.as_ref()?;
        Some(ResponseBody {
            schema,
            content_type,
        })
    }

    fn servers(&self, doc: &ApiDocument) -> Vec<IrServer> {
        doc.servers
            .iter()
            .map(|s| IrServer {
                url: s.resolved_url(),
                description: s.description.clone(),
            })
            .collect()
    }
}
