//! The boundary a renderer consumes.
//!
//! The core never builds output text; it hands a renderer IR values plus one
//! guarantee: for any [`TypeRepr`] in its output, asking "what shape is this
//! value, and what refinements apply" always has an answer. [`Shape`] is
//! that total query, as a borrowed view so renderers can match without
//! cloning.
//!
//! Ordering guarantees over the whole IR:
//! - components appear in document declaration order
//! - routes within a path appear in method declaration order
//! - refinements appear in canonical kind order (lengths, bounds, pattern)
//! - decoder plan entries appear in first-encounter scan order

use crate::ir::types::{Literal, PrimitiveKind, Refinement, TypeRepr};

/// A borrowed, total view of one [`TypeRepr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape<'a> {
    /// Primitive scalar and the refinements that apply to it
    Primitive {
        /// Scalar kind
        kind: PrimitiveKind,
        /// Refinements in canonical kind order; empty for bare scalars
        refinements: &'a [Refinement],
    },
    /// Array of an element type
    Array(&'a TypeRepr),
    /// Closed literal set, never empty in translated output
    Enum(&'a [Literal]),
    /// Name of another component
    Ref(&'a str),
}

impl TypeRepr {
    /// The shape query. Total over every value the core produces.
    pub fn shape(&self) -> Shape<'_> {
        match self {
            TypeRepr::Primitive { kind, refinements } => Shape::Primitive {
                kind: *kind,
                refinements,
            },
            TypeRepr::Array(element) => Shape::Array(element),
            TypeRepr::Enum(values) => Shape::Enum(values),
            TypeRepr::Ref(name) => Shape::Ref(name),
        }
    }
}
