//! Typed translation errors.
//!
//! Translation is fail-fast: the first structural problem aborts the whole
//! document and surfaces as a single [`TranslateError`] carrying the violated
//! rule plus the component or path it was detected in. No partial IR is ever
//! produced.

use std::fmt;

use thiserror::Error;

use crate::ir::types::RefinementKind;

/// A translation failure: the violated rule plus where it was hit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{origin}: {kind}")]
pub struct TranslateError {
    /// Document location the failure was detected in
    pub origin: Origin,
    /// The violated rule
    pub kind: ErrorKind,
}

/// Where in the document a failure was detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// Top-level document structure
    Document,
    /// A named component under `components.schemas`
    Component(String),
    /// A path item under `paths`
    Path(String),
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Document => f.write_str("document"),
            Origin::Component(name) => write!(f, "component '{name}'"),
            Origin::Path(template) => write!(f, "path '{template}'"),
        }
    }
}

/// The closed taxonomy of translation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// Structurally invalid input: missing required keys, wrong node shapes
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// A reference to a component name absent from `components.schemas`
    #[error("unresolved reference '{0}'")]
    UnresolvedReference(String),

    /// Input the subset deliberately refuses: nested object definitions,
    /// external references, anonymous inline types
    #[error("unsupported feature: {0}")]
    UnsupportedFeature(String),

    /// The same refinement kind declared twice on one primitive
    #[error("conflicting refinement '{0}'")]
    ConflictingRefinement(RefinementKind),

    /// Semantically invalid schema content: empty enums, undeclared path
    /// parameters, duplicate methods
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
}

impl ErrorKind {
    /// Attach a document location, producing the user-visible error.
    pub fn at(self, origin: Origin) -> TranslateError {
        TranslateError { origin, kind: self }
    }

    /// Attach a component-name location.
    pub fn in_component(self, name: &str) -> TranslateError {
        self.at(Origin::Component(name.to_string()))
    }

    /// Attach a path-template location.
    pub fn at_path(self, template: &str) -> TranslateError {
        self.at(Origin::Path(template.to_string()))
    }

    /// Attach the top-level document location.
    pub fn in_document(self) -> TranslateError {
        self.at(Origin::Document)
    }
}
