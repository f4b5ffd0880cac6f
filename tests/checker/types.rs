//! Type evaluation, relations, and templates through the checker

use weft_checker::syntax::{DeclNode, PropertyNode, TemplateParamNode, TypeExpr};
use weft_checker::{FrozenProgram, Type};
use weft_foundation::{TypeId, codes};

use crate::check;

fn property_type(program: &FrozenProgram, path: &str) -> TypeId {
    program.type_of(program.lookup(path).unwrap()).unwrap()
}

fn prop(name: &str, ty: TypeExpr) -> PropertyNode {
    PropertyNode::new(name, ty)
}

// =============================================================================
// Relations
// =============================================================================

#[test]
fn literals_fit_scalars_within_bounds() {
    let program = check(vec![DeclNode::model("M")
        .with_property(prop("small", TypeExpr::Integer(100)))
        .with_property(prop("large", TypeExpr::Integer(300)))
        .with_property(prop("byte", TypeExpr::reference("int8")))
        .with_property(prop("text", TypeExpr::string("hi")))
        .with_property(prop("s", TypeExpr::reference("string")))]);
    let byte = property_type(&program, "M.byte");
    assert!(program.is_assignable(property_type(&program, "M.small"), byte));
    assert!(!program.is_assignable(property_type(&program, "M.large"), byte));
    assert!(program.is_assignable(property_type(&program, "M.text"), property_type(&program, "M.s")));
    assert!(!program.is_assignable(property_type(&program, "M.text"), byte));
}

#[test]
fn scalars_relate_through_their_base_chain() {
    let program = check(vec![DeclNode::model("M")
        .with_property(prop("a", TypeExpr::reference("int8")))
        .with_property(prop("b", TypeExpr::reference("integer")))
        .with_property(prop("c", TypeExpr::reference("numeric")))]);
    let (a, b, c) = (
        property_type(&program, "M.a"),
        property_type(&program, "M.b"),
        property_type(&program, "M.c"),
    );
    assert!(program.is_assignable(a, b));
    assert!(program.is_assignable(a, c));
    assert!(!program.is_assignable(c, a));
}

#[test]
fn models_relate_structurally() {
    let program = check(vec![
        DeclNode::model("Pet").with_property(prop("name", TypeExpr::reference("string"))),
        DeclNode::model("Dog")
            .with_property(prop("name", TypeExpr::reference("string")))
            .with_property(prop("breed", TypeExpr::reference("string"))),
        DeclNode::model("Exact")
            .with_property(prop("name", TypeExpr::reference("string")))
            .closed(),
    ]);
    let ty = |name: &str| program.type_of(program.lookup(name).unwrap()).unwrap();
    assert!(program.is_assignable(ty("Dog"), ty("Pet")));
    assert!(!program.is_assignable(ty("Pet"), ty("Dog")));
    assert!(program.is_assignable(ty("Pet"), ty("Exact")));
    assert!(!program.is_assignable(ty("Dog"), ty("Exact")));
}

#[test]
fn unions_accept_any_member() {
    let program = check(vec![DeclNode::model("M")
        .with_property(prop(
            "either",
            TypeExpr::Union(vec![TypeExpr::reference("string"), TypeExpr::reference("int32")]),
        ))
        .with_property(prop("n", TypeExpr::Integer(5)))
        .with_property(prop("b", TypeExpr::Boolean(true)))]);
    let either = property_type(&program, "M.either");
    assert!(program.is_assignable(property_type(&program, "M.n"), either));
    assert!(!program.is_assignable(property_type(&program, "M.b"), either));
}

#[test]
fn recursive_models_relate_without_looping() {
    let program = check(vec![
        DeclNode::model("A").with_property(PropertyNode::optional("next", TypeExpr::reference("A"))),
        DeclNode::model("B").with_property(PropertyNode::optional("next", TypeExpr::reference("B"))),
    ]);
    let ty = |name: &str| program.type_of(program.lookup(name).unwrap()).unwrap();
    assert!(program.is_assignable(ty("A"), ty("B")));
    assert!(program.diagnostics().is_empty());
}

// =============================================================================
// Templates
// =============================================================================

fn page() -> DeclNode {
    DeclNode::model("Page")
        .with_template_param(TemplateParamNode::new("T"))
        .with_property(prop("items", TypeExpr::array(TypeExpr::reference("T"))))
}

#[test]
fn equal_instantiations_share_one_type() {
    let program = check(vec![
        page(),
        DeclNode::model("Holder")
            .with_property(prop("a", TypeExpr::instance("Page", vec![TypeExpr::reference("string")])))
            .with_property(prop("b", TypeExpr::instance("Page", vec![TypeExpr::reference("string")])))
            .with_property(prop("c", TypeExpr::instance("Page", vec![TypeExpr::reference("int32")]))),
    ]);
    let a = property_type(&program, "Holder.a");
    assert_eq!(a, property_type(&program, "Holder.b"));
    assert_ne!(a, property_type(&program, "Holder.c"));
    assert_eq!(program.templates().len(), 2);
    assert_eq!(program.render_type(a), "Page<string>");
}

#[test]
fn instance_bodies_substitute_arguments() {
    let program = check(vec![
        page(),
        DeclNode::model("Holder")
            .with_property(prop("a", TypeExpr::instance("Page", vec![TypeExpr::reference("string")]))),
    ]);
    let a = property_type(&program, "Holder.a");
    let string = program.type_of(program.lookup("string").unwrap()).unwrap();
    let items = program.types().as_model(a).unwrap().properties["items"].ty;
    assert_eq!(program.types().get(items), &Type::Array(string));
}

#[test]
fn circular_alias_is_reported() {
    let program = check(vec![
        DeclNode::alias("A", TypeExpr::reference("B")),
        DeclNode::alias("B", TypeExpr::reference("A")),
    ]);
    assert_eq!(program.diagnostics().by_code(codes::CIRCULAR_TEMPLATE).count(), 1);
}

#[test]
fn template_constraints_are_checked() {
    let program = check(vec![
        DeclNode::model("Named")
            .with_template_param(TemplateParamNode::new("T").extends(TypeExpr::reference("string")))
            .with_property(prop("value", TypeExpr::reference("T"))),
        DeclNode::model("Use")
            .with_property(prop("bad", TypeExpr::instance("Named", vec![TypeExpr::Integer(1)]))),
    ]);
    assert!(program.diagnostics().by_code(codes::INVALID_ARGUMENT).count() >= 1);
    assert!(program.has_error());
}

#[test]
fn missing_template_arguments_are_reported() {
    let program = check(vec![
        page(),
        DeclNode::model("Use").with_property(prop("p", TypeExpr::instance("Page", Vec::new()))),
    ]);
    assert_eq!(program.diagnostics().by_code(codes::INVALID_TEMPLATE_ARGS).count(), 1);
}
