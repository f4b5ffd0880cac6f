//! `@Private.includeInapplicableMetadataInPayload`.

use weft_checker::program::{DeclKind, Program};
use weft_checker::syntax::TypeExpr;
use weft_checker::{
    ArgValue, AttributeContext, AttributeSignature, Library, ParamSignature, StateKey, StateValue,
    TargetKinds,
};
use weft_foundation::{DeclId, Error, Result};

use crate::define;

/// Whether metadata that does not apply in a payload still appears in it.
pub const INCLUDE_INAPPLICABLE_METADATA: StateKey =
    StateKey::new("http.includeInapplicableMetadataInPayload");

fn apply(ctx: &mut AttributeContext<'_>, args: &[ArgValue]) -> Result<()> {
    let value = args
        .first()
        .and_then(ArgValue::as_bool)
        .ok_or_else(|| Error::unexpected_value("boolean", "missing argument"))?;
    ctx.set_state(INCLUDE_INAPPLICABLE_METADATA, StateValue::Bool(value));
    Ok(())
}

pub(crate) fn register(library: Library) -> Library {
    library.with_attribute(define(
        AttributeSignature::new(
            "Private.includeInapplicableMetadataInPayload",
            TargetKinds::of(&[DeclKind::Namespace, DeclKind::Model, DeclKind::ModelProperty]),
        )
        .with_param(ParamSignature::required("value", TypeExpr::reference("boolean"))),
        apply,
    ))
}

/// Resolves the setting nearest-wins from the declaration outward; `true`
/// when no scope sets it.
#[must_use]
pub fn include_inapplicable_metadata_in_payload(program: &Program, decl: DeclId) -> bool {
    program
        .effective_value(decl, INCLUDE_INAPPLICABLE_METADATA)
        .and_then(StateValue::as_bool)
        .unwrap_or(true)
}
