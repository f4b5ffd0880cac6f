//! `@statusCode`.
//!
//! The code is read from the property's type: an integer literal, a
//! three-digit string literal, a union of those, or a numeric scalar whose
//! bounds describe a range.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;

use indexmap::IndexMap;
use weft_checker::program::{DeclKind, Program};
use weft_checker::stdlib::numeric_bounds;
use weft_checker::{
    ArgValue, AttributeContext, AttributeSignature, Library, LiteralValue, ScalarKind, StateKey,
    StateValue, TargetKinds, Type,
};
use weft_foundation::{DeclId, Result, TypeId, codes};

use crate::define;

/// Resolved status codes.
pub const STATUS_CODE: StateKey = StateKey::new("http.statusCode");

const LOWEST: u16 = 100;
const HIGHEST: u16 = 599;

const INVALID: &str = "statusCode value must be a three digit code between 100 and 599";

/// A status code or an inclusive range of codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StatusCode {
    /// One code.
    Single(u16),
    /// Every code from `start` to `end`.
    Range {
        /// First code.
        start: u16,
        /// Last code.
        end: u16,
    },
}

impl StatusCode {
    /// Returns true if `code` is covered.
    #[must_use]
    pub fn contains(self, code: u16) -> bool {
        match self {
            Self::Single(c) => c == code,
            Self::Range { start, end } => (start..=end).contains(&code),
        }
    }

    fn to_state(self) -> StateValue {
        match self {
            Self::Single(code) => StateValue::Integer(i64::from(code)),
            Self::Range { start, end } => {
                let mut fields = IndexMap::new();
                fields.insert("start".to_string(), StateValue::Integer(i64::from(start)));
                fields.insert("end".to_string(), StateValue::Integer(i64::from(end)));
                StateValue::Record(fields)
            }
        }
    }

    fn from_state(value: &StateValue) -> Option<Self> {
        let code = |v: &StateValue| match v {
            StateValue::Integer(n) => u16::try_from(*n).ok(),
            _ => None,
        };
        match value {
            StateValue::Record(fields) => Some(Self::Range {
                start: code(fields.get("start")?)?,
                end: code(fields.get("end")?)?,
            }),
            other => code(other).map(Self::Single),
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(code) => write!(f, "{code}"),
            Self::Range { start, end } => write!(f, "{start}-{end}"),
        }
    }
}

// =============================================================================
// Resolution
// =============================================================================

fn in_range(code: i64) -> Option<u16> {
    u16::try_from(code)
        .ok()
        .filter(|c| (LOWEST..=HIGHEST).contains(c))
}

#[allow(clippy::cast_possible_truncation)]
fn literal_code(value: &LiteralValue) -> Option<u16> {
    match value {
        LiteralValue::Integer(n) => in_range(*n),
        LiteralValue::Float(n) if n.fract() == 0.0 && n.is_finite() => in_range(*n as i64),
        LiteralValue::String(s) if s.len() == 3 && s.chars().all(|c| c.is_ascii_digit()) => {
            s.parse().ok().and_then(in_range)
        }
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn bounded_range(program: &Program, decl: DeclId) -> Option<StatusCode> {
    let bounds = numeric_bounds(program, decl);
    let start = bounds
        .min
        .map_or(f64::from(LOWEST), |m| m.max(f64::from(LOWEST)))
        .ceil();
    let end = bounds
        .max
        .map_or(f64::from(HIGHEST), |m| m.min(f64::from(HIGHEST)))
        .floor();
    (start <= end).then(|| StatusCode::Range {
        start: start as u16,
        end: end as u16,
    })
}

/// Resolves the codes a type describes, or `None` if it describes none.
fn resolve(program: &Program, decl: DeclId, ty: TypeId) -> Option<Vec<StatusCode>> {
    let types = program.types();
    match types.get(types.unwrap_instance(ty)) {
        Type::Error => Some(Vec::new()),
        Type::Literal(value) => literal_code(value).map(|c| vec![StatusCode::Single(c)]),
        Type::Union { variants, .. } => {
            let mut codes = Vec::new();
            for variant in variants {
                codes.extend(resolve(program, decl, *variant)?);
            }
            Some(codes)
        }
        Type::Scalar(scalar) if matches!(scalar.kind, ScalarKind::Integer | ScalarKind::Numeric) => {
            bounded_range(program, decl).map(|range| vec![range])
        }
        _ => None,
    }
}

fn apply_status_code(ctx: &mut AttributeContext<'_>, _: &[ArgValue]) -> Result<()> {
    let ty = ctx.target_type();
    let target = ctx.target();
    let codes = match resolve(ctx.program(), target, ty) {
        Some(codes) => codes,
        None => {
            ctx.error(codes::STATUS_CODE_INVALID, INVALID);
            Vec::new()
        }
    };
    ctx.set_state(
        STATUS_CODE,
        StateValue::List(codes.into_iter().map(StatusCode::to_state).collect()),
    );
    Ok(())
}

pub(crate) fn register(library: Library) -> Library {
    library.with_attribute(define(
        AttributeSignature::new("statusCode", TargetKinds::of(&[DeclKind::ModelProperty])),
        apply_status_code,
    ))
}

// =============================================================================
// Accessors
// =============================================================================

/// Returns true if the property carries `@statusCode`.
#[must_use]
pub fn is_status_code(program: &Program, decl: DeclId) -> bool {
    program.state_of(decl, STATUS_CODE).is_some()
}

/// Returns the codes a `@statusCode` property resolved to.
#[must_use]
pub fn status_codes(program: &Program, decl: DeclId) -> Vec<StatusCode> {
    program
        .state_of(decl, STATUS_CODE)
        .and_then(StateValue::as_list)
        .map(|items| items.iter().filter_map(StatusCode::from_state).collect())
        .unwrap_or_default()
}
