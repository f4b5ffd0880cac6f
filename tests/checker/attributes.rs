//! The attribute engine and library validators through the checker

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use weft_checker::stdlib;
use weft_checker::syntax::{AttributeNode, DeclNode, PropertyNode, TypeExpr, ValueExpr};
use weft_checker::{
    ArgValue, AttributeContext, AttributeDefinition, AttributeSignature, DeclKind, DuplicatePolicy,
    Library, ParamSignature, Program, ProgramValidator, StateKey, StateValue, TargetKinds,
};
use weft_foundation::{DiagnosticTarget, Error, Result, Severity, codes};

use crate::{check, check_with, file};

const LABEL: StateKey = StateKey::new("test.label");
const TAGS: StateKey = StateKey::new("test.tags");

fn label_attribute(policy: DuplicatePolicy) -> AttributeDefinition {
    AttributeDefinition::new(
        AttributeSignature::new("label", TargetKinds::of(&[DeclKind::Model]))
            .with_param(ParamSignature::required("text", TypeExpr::reference("string")))
            .with_param(ParamSignature::optional("weight", TypeExpr::reference("int32"))),
        |ctx: &mut AttributeContext<'_>, args: &[ArgValue]| -> Result<()> {
            let text = args
                .first()
                .and_then(ArgValue::as_str)
                .ok_or_else(|| Error::unexpected_value("string", "missing"))?;
            ctx.set_state(LABEL, StateValue::String(text.to_string()));
            Ok(())
        },
    )
    .with_policy(policy)
}

fn tags_library() -> Library {
    Library::new("tags")
        .with_attribute(label_attribute(DuplicatePolicy::Warn))
        .with_attribute(
            AttributeDefinition::new(
                AttributeSignature::new("tag", TargetKinds::any())
                    .with_param(ParamSignature::variadic("names", TypeExpr::reference("string"))),
                |ctx: &mut AttributeContext<'_>, args: &[ArgValue]| -> Result<()> {
                    for arg in args {
                        if let Some(name) = arg.as_str() {
                            ctx.push_state(TAGS, StateValue::String(name.to_string()));
                        }
                    }
                    Ok(())
                },
            )
            .with_policy(DuplicatePolicy::Accumulate),
        )
        .with_attribute(AttributeDefinition::new(
            AttributeSignature::new("explode", TargetKinds::any()),
            |_: &mut AttributeContext<'_>, _: &[ArgValue]| -> Result<()> { panic!("kaboom") },
        ))
        .with_attribute(AttributeDefinition::new(
            AttributeSignature::new("refuse", TargetKinds::any()),
            |_: &mut AttributeContext<'_>, _: &[ArgValue]| -> Result<()> {
                Err(Error::unexpected_value("model", "scalar"))
            },
        ))
}

fn check_tags(decls: Vec<DeclNode>) -> weft_checker::FrozenProgram {
    check_with(&[file(0, "main.tsp", decls)], vec![tags_library()])
}

fn label(text: &str) -> AttributeNode {
    AttributeNode::new("label").with_arg(ValueExpr::string(text))
}

fn label_of(program: &Program, path: &str) -> Option<String> {
    program
        .state_of(program.lookup(path)?, LABEL)
        .and_then(StateValue::as_str)
        .map(str::to_string)
}

// =============================================================================
// Successful Application
// =============================================================================

#[test]
fn behavior_records_state() {
    let program = check_tags(vec![DeclNode::model("Pet").with_attribute(label("animal"))]);
    assert!(program.diagnostics().is_empty());
    assert_eq!(label_of(&program, "Pet").as_deref(), Some("animal"));
    assert_eq!(program.applications().len(), 1);
}

#[test]
fn variadic_arguments_all_apply() {
    let program = check_tags(vec![
        DeclNode::model("Holder").with_attribute(
            AttributeNode::new("tag")
                .with_arg(ValueExpr::string("a"))
                .with_arg(ValueExpr::string("b")),
        ),
    ]);
    let holder = program.lookup("Holder").unwrap();
    let tags = program.state_of(holder, TAGS).and_then(StateValue::as_list).unwrap();
    assert_eq!(tags.len(), 2);
}

#[test]
fn accumulate_keeps_every_application() {
    let program = check_tags(vec![DeclNode::model("Pet")
        .with_attribute(AttributeNode::new("tag").with_arg(ValueExpr::string("x")))
        .with_attribute(AttributeNode::new("tag").with_arg(ValueExpr::string("y")))]);
    let pet = program.lookup("Pet").unwrap();
    let tags = program.state_of(pet, TAGS).and_then(StateValue::as_list).unwrap();
    assert_eq!(tags.len(), 2);
    assert!(program.diagnostics().is_empty());
}

#[test]
fn standard_doc_attribute() {
    let program = check(vec![DeclNode::model("Pet")
        .with_attribute(AttributeNode::new("doc").with_arg(ValueExpr::string("A pet.")))]);
    let pet = program.lookup("Pet").unwrap();
    assert_eq!(stdlib::doc(&program, pet), Some("A pet."));
}

// =============================================================================
// Rejected Applications
// =============================================================================

#[test]
fn unknown_attribute() {
    let program = check(vec![DeclNode::model("Pet").with_attribute(AttributeNode::new("nope"))]);
    let errors: Vec<_> = program.diagnostics().by_code(codes::UNKNOWN_ATTRIBUTE).collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "Unknown decorator @nope");
}

#[test]
fn wrong_target_kind() {
    let program = check_tags(vec![DeclNode::model("Pet").with_property(
        PropertyNode::new("name", TypeExpr::reference("string")).with_attribute(label("x")),
    )]);
    let errors: Vec<_> = program.diagnostics().by_code(codes::DECORATOR_WRONG_TARGET).collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].message,
        "Cannot apply @label decorator to Pet.name since it is not assignable to Model"
    );
    assert!(label_of(&program, "Pet.name").is_none());
}

#[test]
fn wrong_argument_count() {
    let program = check_tags(vec![
        DeclNode::model("A").with_attribute(AttributeNode::new("label")),
        DeclNode::model("B").with_attribute(
            label("x")
                .with_arg(ValueExpr::Integer(1))
                .with_arg(ValueExpr::Integer(2)),
        ),
    ]);
    let messages: Vec<_> = program
        .diagnostics()
        .by_code(codes::INVALID_ARGUMENT_COUNT)
        .map(|d| d.message.clone())
        .collect();
    assert_eq!(messages.len(), 2);
    assert!(messages.contains(&"Expected 1-2 arguments, but got 0.".to_string()));
    assert!(messages.contains(&"Expected 1-2 arguments, but got 3.".to_string()));
    assert!(label_of(&program, "A").is_none());
    assert!(label_of(&program, "B").is_none());
}

#[test]
fn wrong_argument_type() {
    let program = check_tags(vec![DeclNode::model("Pet")
        .with_attribute(AttributeNode::new("label").with_arg(ValueExpr::Integer(5)))]);
    let errors: Vec<_> = program.diagnostics().by_code(codes::INVALID_ARGUMENT).collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].message,
        "Argument of type '5' is not assignable to parameter of type 'string'"
    );
    assert!(program.applications().is_empty());
}

#[test]
fn duplicate_application_warns_and_first_in_source_wins() {
    let program = check_tags(vec![DeclNode::model("Pet")
        .with_attribute(label("first"))
        .with_attribute(label("second"))]);
    let warnings: Vec<_> = program.diagnostics().by_code(codes::DUPLICATE_ATTRIBUTE).collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].severity, Severity::Warning);
    assert_eq!(warnings[0].message, "@label is applied more than once");
    assert_eq!(label_of(&program, "Pet").as_deref(), Some("first"));
    assert!(program.should_emit(false));
}

#[test]
fn last_wins_is_silent() {
    let library = Library::new("quiet").with_attribute(label_attribute(DuplicatePolicy::LastWins));
    let program = check_with(
        &[file(
            0,
            "main.tsp",
            vec![DeclNode::model("Pet")
                .with_attribute(label("first"))
                .with_attribute(label("second"))],
        )],
        vec![library],
    );
    assert!(program.diagnostics().is_empty());
    assert_eq!(label_of(&program, "Pet").as_deref(), Some("first"));
}

// =============================================================================
// Faults
// =============================================================================

#[test]
fn panicking_behavior_becomes_a_diagnostic() {
    let program = check_tags(vec![
        DeclNode::model("Pet").with_attribute(AttributeNode::new("explode")),
        DeclNode::model("Toy").with_attribute(label("still applied")),
    ]);
    let errors: Vec<_> = program.diagnostics().by_code(codes::INTERNAL_ERROR).collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("attribute @explode failed"));
    assert!(errors[0].message.contains("kaboom"));
    assert_eq!(label_of(&program, "Toy").as_deref(), Some("still applied"));
}

#[test]
fn failing_behavior_becomes_a_diagnostic() {
    let program = check_tags(vec![DeclNode::model("Pet").with_attribute(AttributeNode::new("refuse"))]);
    let errors: Vec<_> = program.diagnostics().by_code(codes::INTERNAL_ERROR).collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("attribute @refuse failed"));
    let pet = program.lookup("Pet").unwrap();
    assert_eq!(errors[0].target, DiagnosticTarget::Decl(pet));
}

// =============================================================================
// Validators
// =============================================================================

struct CountingValidator(Arc<AtomicUsize>);

impl ProgramValidator for CountingValidator {
    fn name(&self) -> &str {
        "counting"
    }

    fn validate(&self, program: &mut Program) -> Result<()> {
        self.0.fetch_add(1, Ordering::SeqCst);
        let labelled: Vec<_> = program
            .decls()
            .filter(|d| program.state_of(d.id, LABEL).is_some())
            .map(|d| d.id)
            .collect();
        for id in labelled {
            program.error("labelled", id, "labelled model");
        }
        Ok(())
    }
}

struct FaultyValidator;

impl ProgramValidator for FaultyValidator {
    fn name(&self) -> &str {
        "faulty"
    }

    fn validate(&self, _: &mut Program) -> Result<()> {
        Err(Error::internal("lost track"))
    }
}

#[test]
fn validators_run_after_attributes() {
    let runs = Arc::new(AtomicUsize::new(0));
    let library = tags_library().with_validator(CountingValidator(Arc::clone(&runs)));
    let program = check_with(
        &[file(0, "main.tsp", vec![DeclNode::model("Pet").with_attribute(label("x"))])],
        vec![library],
    );
    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert_eq!(program.diagnostics().by_code("labelled").count(), 1);
}

#[test]
fn validator_fault_is_reported_and_checking_continues() {
    let runs = Arc::new(AtomicUsize::new(0));
    let library = Library::new("faults")
        .with_validator(FaultyValidator)
        .with_validator(CountingValidator(Arc::clone(&runs)));
    let program = check_with(&[file(0, "main.tsp", Vec::new())], vec![library]);
    let errors: Vec<_> = program.diagnostics().by_code(codes::INTERNAL_ERROR).collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.starts_with("validator faulty failed: "));
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}
