//! Repeated checks of the same sources produce the same program

use proptest::prelude::*;
use weft::checker::CheckerOptions;
use weft::checker::syntax::{AttributeNode, DeclNode, PropertyNode, TypeExpr, ValueExpr};

use crate::{check, file, widget_service};

#[test]
fn widget_service_is_stable() {
    let first = check(CheckerOptions::default(), &widget_service());
    let second = check(CheckerOptions::default(), &widget_service());
    assert_eq!(first.diagnostics().signature(), second.diagnostics().signature());
    assert_eq!(first.decl_count(), second.decl_count());
    assert_eq!(first.types().len(), second.types().len());
}

fn model_decl(name: &str, reference: &str, routed: bool) -> DeclNode {
    let model = DeclNode::model(name).with_property(PropertyNode::new("r", TypeExpr::reference(reference)));
    if routed {
        model.with_attribute(AttributeNode::new("route").with_arg(ValueExpr::string("/x")))
    } else {
        model
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn diagnostics_do_not_depend_on_the_run(
        decls in prop::collection::vec(
            ("[A-D]", prop::sample::select(vec!["string", "int32", "A", "B", "Missing"]), any::<bool>()),
            0..8,
        )
    ) {
        let build = || {
            let nodes = decls
                .iter()
                .map(|(name, reference, routed)| model_decl(name, reference, *routed))
                .collect();
            vec![file(0, "main.tsp", nodes)]
        };
        let first = check(CheckerOptions::default(), &build());
        let second = check(CheckerOptions::default(), &build());
        let messages = |p: &weft::checker::FrozenProgram| -> Vec<String> {
            p.diagnostics().all().iter().map(|d| d.message.clone()).collect()
        };
        prop_assert_eq!(first.diagnostics().signature(), second.diagnostics().signature());
        prop_assert_eq!(messages(&first), messages(&second));
    }
}
