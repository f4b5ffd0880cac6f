//! A pet store service spread over two files

use weft_checker::syntax::{AttributeNode, DeclNode, PropertyNode, Statement, TypeExpr, ValueExpr};
use weft_checker::{FrozenProgram, stdlib};
use weft_foundation::codes;
use weft_http::metadata::{header_name, is_body, path_options, query_name};
use weft_http::route::{route_path, verb};
use weft_http::status_code::status_codes;
use weft_http::{AuthKind, HttpVerb, StatusCode, get_authentication, servers};

use crate::{check, codes as codes_of, file};

fn attr(name: &str) -> AttributeNode {
    AttributeNode::new(name)
}

fn route(path: &str) -> AttributeNode {
    attr("route").with_arg(ValueExpr::string(path))
}

fn param(name: &str, ty: &str, location: &str) -> PropertyNode {
    PropertyNode::new(name, TypeExpr::reference(ty)).with_attribute(attr(location))
}

fn pets_interface() -> DeclNode {
    DeclNode::interface(
        "Pets",
        vec![
            DeclNode::operation("list")
                .with_parameter(param("filter", "string", "query"))
                .returning(TypeExpr::reference("OkResponse")),
            DeclNode::operation("create")
                .with_attribute(attr("post"))
                .with_parameter(param("pet", "Pet", "body"))
                .returning(TypeExpr::Union(vec![
                    TypeExpr::reference("CreatedResponse"),
                    TypeExpr::reference("BadRequestResponse"),
                ])),
            DeclNode::operation("read")
                .with_attribute(route("{petId}"))
                .with_parameter(param("petId", "string", "path"))
                .with_parameter(param("ifMatch", "string", "header"))
                .returning(TypeExpr::Union(vec![
                    TypeExpr::reference("OkResponse"),
                    TypeExpr::reference("NotFoundResponse"),
                ])),
        ],
    )
    .with_attribute(route("/pets"))
}

fn service() -> FrozenProgram {
    let routes = file(
        0,
        "routes.tsp",
        vec![DeclNode::namespace(
            "PetStore",
            vec![
                Statement::Declaration(DeclNode::model("Params").with_property(PropertyNode::new(
                    "region",
                    TypeExpr::reference("string"),
                ))),
                Statement::Declaration(pets_interface()),
            ],
        )
        .with_attribute(
            attr("server")
                .with_arg(ValueExpr::string("https://{region}.pets.example.com"))
                .with_arg(ValueExpr::string("Regional endpoint"))
                .with_arg(ValueExpr::reference("Params")),
        )
        .with_attribute(attr("useAuth").with_arg(ValueExpr::reference("BearerAuth")))],
    );
    let models = file(
        1,
        "models.tsp",
        vec![DeclNode::namespace(
            "PetStore",
            vec![Statement::Declaration(
                DeclNode::model("Pet")
                    .with_attribute(attr("doc").with_arg(ValueExpr::string("A pet.")))
                    .with_property(PropertyNode::new("name", TypeExpr::reference("string"))),
            )],
        )],
    );
    check(&[routes, models])
}

// =============================================================================
// Whole Service
// =============================================================================

#[test]
fn service_checks_cleanly() {
    let program = service();
    assert!(codes_of(&program).is_empty(), "{:?}", program.diagnostics().all());
    assert!(program.should_emit(false));
}

#[test]
fn parameter_locations_and_names() {
    let program = service();
    let filter = program.lookup("PetStore.Pets.list.filter").unwrap();
    assert_eq!(query_name(&program, filter).as_deref(), Some("filter"));

    let pet_id = program.lookup("PetStore.Pets.read.petId").unwrap();
    let options = path_options(&program, pet_id).unwrap();
    assert_eq!(options.name, "petId");
    assert_eq!(options.style, "simple");

    let if_match = program.lookup("PetStore.Pets.read.ifMatch").unwrap();
    assert_eq!(header_name(&program, if_match).as_deref(), Some("if-match"));

    let body = program.lookup("PetStore.Pets.create.pet").unwrap();
    assert!(is_body(&program, body));
}

#[test]
fn routes_and_verbs() {
    let program = service();
    let op = |name: &str| program.lookup(&format!("PetStore.Pets.{name}")).unwrap();
    assert_eq!(route_path(&program, op("list")), "/pets");
    assert_eq!(route_path(&program, op("read")), "/pets/{petId}");
    assert_eq!(verb(&program, op("list")), HttpVerb::Get);
    assert_eq!(verb(&program, op("create")), HttpVerb::Post);
    assert_eq!(verb(&program, op("read")), HttpVerb::Get);
}

#[test]
fn servers_and_auth_reach_operations() {
    let program = service();
    let ns = program.lookup("PetStore").unwrap();
    let declared = servers(&program, ns);
    assert_eq!(declared.len(), 1);
    assert_eq!(declared[0].description.as_deref(), Some("Regional endpoint"));
    assert!(declared[0].parameters.contains_key("region"));

    let read = program.lookup("PetStore.Pets.read").unwrap();
    let auth = get_authentication(&program, read).unwrap();
    assert_eq!(auth.options.len(), 1);
    let scheme = &auth.options[0].schemes[0];
    assert_eq!(scheme.id, "BearerAuth");
    assert_eq!(scheme.kind, AuthKind::Http { scheme: "Bearer".into() });
}

#[test]
fn response_status_codes() {
    let program = service();
    let ok = program.lookup("Http.OkResponse.statusCode").unwrap();
    assert_eq!(status_codes(&program, ok), vec![StatusCode::Single(200)]);
    let missing = program.lookup("Http.NotFoundResponse.statusCode").unwrap();
    assert!(status_codes(&program, missing)[0].contains(404));
}

#[test]
fn models_from_other_files_are_visible() {
    let program = service();
    let pet = program.lookup("PetStore.Pet").unwrap();
    assert_eq!(stdlib::doc(&program, pet), Some("A pet."));
    let body = program.lookup("PetStore.Pets.create.pet").unwrap();
    assert_eq!(program.type_of(body), program.type_of(pet));
}

// =============================================================================
// Problems Across Files
// =============================================================================

#[test]
fn duplicate_route_across_files() {
    let a = file(
        0,
        "a.tsp",
        vec![DeclNode::operation("first").with_attribute(route("/items"))],
    );
    let b = file(
        1,
        "b.tsp",
        vec![DeclNode::operation("second").with_attribute(route("/items"))],
    );
    let program = check(&[a, b]);
    assert_eq!(codes_of(&program), vec![codes::DUPLICATE_OPERATION; 2]);
    assert!(!program.should_emit(false));
    assert!(program.should_emit(true));
}

#[test]
fn status_code_problems_are_all_reported() {
    let program = check(&[file(
        0,
        "main.tsp",
        vec![
            DeclNode::model("Bad").with_property(
                PropertyNode::new("code", TypeExpr::Integer(42)).with_attribute(attr("statusCode")),
            ),
            DeclNode::operation("twice").returning(TypeExpr::model(vec![
                PropertyNode::new("a", TypeExpr::Integer(200)).with_attribute(attr("statusCode")),
                PropertyNode::new("b", TypeExpr::Integer(201)).with_attribute(attr("statusCode")),
            ])),
        ],
    )]);
    let found = codes_of(&program);
    assert!(found.contains(&codes::STATUS_CODE_INVALID.to_string()));
    assert!(found.contains(&codes::MULTIPLE_STATUS_CODES.to_string()));
}
