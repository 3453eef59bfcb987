use ocg_core::error::ParseError;
use ocg_core::parse;
use ocg_core::parse::operation::HttpMethod;
use ocg_core::parse::parameter::{ParameterLocation, ParameterOrRef};
use ocg_core::parse::response::ResponseOrRef;
use ocg_core::version::VersionFamily;

const PETSTORE: &str = include_str!("fixtures/petstore-swagger2.yaml");
const ITEMS: &str = include_str!("fixtures/items-openapi30.yaml");
const NAMESPACED: &str = include_str!("fixtures/namespaced-openapi31.yaml");

#[test]
fn parse_swagger_petstore() {
    let doc = parse::from_yaml(PETSTORE).expect("should parse petstore-swagger2.yaml");
    assert_eq!(doc.swagger.as_deref(), Some("2.0"));
    assert_eq!(doc.info.title, "Swagger Petstore");
    assert_eq!(doc.host.as_deref(), Some("petstore.swagger.io"));
    assert_eq!(doc.definitions.len(), 5);
    assert_eq!(doc.paths.len(), 5);
    assert_eq!(doc.spec_version().unwrap().family, VersionFamily::Swagger2);

    // Methods stay in document order
    let pet = doc.paths.get("/pet/{petId}").expect("should have /pet/{petId}");
    let methods: Vec<HttpMethod> = pet.operations.keys().copied().collect();
    assert_eq!(
        methods,
        vec![HttpMethod::Get, HttpMethod::Delete, HttpMethod::Post]
    );
    assert!(matches!(
        &pet.parameters[0],
        ParameterOrRef::Ref { ref_path } if ref_path == "#/parameters/petIdParam"
    ));

    // Unquoted status codes become string keys
    let get = &pet.operations[&HttpMethod::Get];
    let statuses: Vec<&str> = get.responses.keys().map(String::as_str).collect();
    assert_eq!(statuses, vec!["200", "404"]);
    assert!(matches!(get.responses["404"], ResponseOrRef::Ref { .. }));

    let form = &pet.operations[&HttpMethod::Post];
    assert_eq!(form.consumes, vec!["application/x-www-form-urlencoded"]);
    match &form.parameters[0] {
        ParameterOrRef::Parameter(p) => assert_eq!(p.location, ParameterLocation::FormData),
        other => panic!("expected inline parameter, got {other:?}"),
    }
}

#[test]
fn parse_openapi_30_items() {
    let doc = parse::from_yaml(ITEMS).expect("should parse items-openapi30.yaml");
    let version = doc.spec_version().unwrap();
    assert_eq!(version.raw, "3.0");
    assert_eq!(version.normalized(), "3.0.0");
    assert_eq!(version.family, VersionFamily::OpenApi30);

    assert_eq!(doc.components.schemas.len(), 3);
    assert!(doc.components.parameters.contains_key("Trace"));
    assert!(doc.components.responses.contains_key("Users"));
    assert_eq!(doc.servers[0].resolved_url(), "https://eu.items.example.com/v1");

    let display_name = &doc.components.schemas["User"].properties["displayName"];
    assert!(display_name.is_nullable());
}

#[test]
fn parse_openapi_31_namespaced() {
    let doc = parse::from_yaml(NAMESPACED).expect("should parse namespaced-openapi31.yaml");
    assert_eq!(doc.spec_version().unwrap().family, VersionFamily::OpenApi31);
    assert_eq!(doc.webhooks.len(), 1);
    assert!(doc.components.schemas.contains_key("orders.v1.Order"));

    let order = &doc.components.schemas["orders.v1.Order"];
    assert_eq!(order.properties["kind"].const_value, Some(serde_json::json!("order")));
}

#[test]
fn parse_json_document() {
    let json = r#"{
        "openapi": "3.1.1",
        "info": { "title": "JSON API", "version": "0.1" },
        "paths": {
            "/ping": { "get": { "responses": { "204": { "description": "pong" } } } }
        }
    }"#;
    let doc = parse::from_json(json).expect("should parse JSON");
    assert_eq!(doc.info.title, "JSON API");
    assert_eq!(doc.spec_version().unwrap().family, VersionFamily::OpenApi31);
}

#[test]
fn parse_unquoted_numeric_version() {
    let doc = parse::from_yaml("swagger: 2.0\ninfo: { title: t, version: '1' }\npaths: {}\n")
        .expect("numeric swagger version should load");
    assert_eq!(doc.swagger.as_deref(), Some("2.0"));
}

#[test]
fn reject_unsupported_versions() {
    let load = |header: &str| parse::from_yaml(&format!("{header}\ninfo: {{ title: t }}\npaths: {{}}\n"));

    assert!(matches!(
        load("swagger: '3.0'"),
        Err(ParseError::UnsupportedVersion(v)) if v == "swagger 3.0"
    ));
    assert!(matches!(
        load("openapi: 4.0.0"),
        Err(ParseError::UnsupportedVersion(_))
    ));
    assert!(matches!(
        load("openapi: '2.0'"),
        Err(ParseError::UnsupportedVersion(_))
    ));
    assert!(matches!(
        load("info_only: true"),
        Err(ParseError::MissingVersionDeclaration)
    ));
    assert!(matches!(
        load("swagger: '2.0'\nopenapi: 3.0.0"),
        Err(ParseError::ConflictingVersionDeclaration { .. })
    ));
}

#[test]
fn unknown_point_release_maps_to_newest_family() {
    let doc = parse::from_yaml("openapi: 3.9.4\ninfo: { title: t }\npaths: {}\n").unwrap();
    assert_eq!(doc.spec_version().unwrap().family, VersionFamily::OpenApi32);
}
