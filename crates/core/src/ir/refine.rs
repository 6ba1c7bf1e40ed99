//! Refinement normalization.
//!
//! Maps raw JSON-Schema-style constraint keywords onto the closed
//! [`Refinement`] algebra and produces the canonical, order-stable sequence
//! downstream rendering depends on. Unknown keywords pass through silently
//! (forward-compatible); duplicate kinds are a hard error.

use regex::Regex;
use serde_json::Value;

use crate::document::RawConstraint;
use crate::error::ErrorKind;
use crate::ir::types::Refinement;

/// Normalize a raw constraint sequence into the canonical refinement set.
///
/// The output is sorted by the fixed kind precedence (lengths, numeric
/// bounds, pattern) and carries at most one refinement per kind, so
/// semantically identical constraint sets always normalize to the same
/// sequence. Feeding an already-normalized sequence back in is a no-op.
pub fn normalize(raw: &[RawConstraint]) -> Result<Vec<Refinement>, ErrorKind> {
    let mut out: Vec<Refinement> = Vec::new();

    for constraint in raw {
        let refinement = match constraint.key.as_str() {
            "minLength" => Refinement::MinLength(length_bound(constraint)?),
            "maxLength" => Refinement::MaxLength(length_bound(constraint)?),
            "minimum" => Refinement::Minimum(numeric_bound(constraint)?),
            "maximum" => Refinement::Maximum(numeric_bound(constraint)?),
            "pattern" => Refinement::Pattern(compiled_pattern(constraint)?),
            // Unknown keywords (format, default, description, ...) are not
            // refinements and are deliberately ignored.
            _ => continue,
        };

        if out.iter().any(|r| r.kind() == refinement.kind()) {
            return Err(ErrorKind::ConflictingRefinement(refinement.kind()));
        }
        out.push(refinement);
    }

    out.sort_by_key(Refinement::kind);
    Ok(out)
}

fn length_bound(constraint: &RawConstraint) -> Result<u64, ErrorKind> {
    constraint.value.as_u64().ok_or_else(|| {
        ErrorKind::MalformedDocument(format!(
            "'{}' must be a non-negative integer",
            constraint.key
        ))
    })
}

fn numeric_bound(constraint: &RawConstraint) -> Result<ordered_float::OrderedFloat<f64>, ErrorKind> {
    constraint
        .value
        .as_f64()
        .map(ordered_float::OrderedFloat)
        .ok_or_else(|| {
            ErrorKind::MalformedDocument(format!("'{}' must be a number", constraint.key))
        })
}

/// Validate the pattern compiles up front, so a broken regex is one
/// translation error instead of a latent failure in every generated decoder.
fn compiled_pattern(constraint: &RawConstraint) -> Result<String, ErrorKind> {
    let Value::String(pattern) = &constraint.value else {
        return Err(ErrorKind::MalformedDocument(
            "'pattern' must be a string".to_string(),
        ));
    };
    if Regex::new(pattern).is_err() {
        return Err(ErrorKind::InvalidSchema(format!(
            "invalid pattern '{pattern}'"
        )));
    }
    Ok(pattern.clone())
}
