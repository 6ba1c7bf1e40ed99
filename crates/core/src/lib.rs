#![forbid(unsafe_code)]
#![deny(warnings, unused_must_use, dead_code, missing_debug_implementations)]
#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]

//! OpenAPI-subset to IR translation core.
//!
//! This crate parses a restricted subset of an OpenAPI 3.0 document and
//! produces a structured, language-agnostic intermediate representation:
//! component type definitions, per-path route contracts, and a deduplicated
//! decoder plan. The pipeline is:
//! 1. Read: generic parsed tree -> [`CoreDocument`] (explicit, hand-written)
//! 2. Translate: schema definitions -> type IR, enforcing the subset rules
//! 3. Aggregate: operations grouped per path template
//! 4. Plan: shared decoders derived across all routes
//!
//! Rendering IR into target source text is a separate concern; a renderer
//! consumes the output through the shape query in [`ir::contract`] and never
//! feeds anything back. Translation is a pure, single-pass, fail-fast
//! transform: the same document always yields the same IR or the same error.

use tracing::debug;

pub mod document;
pub mod error;
pub mod ir;

pub use document::CoreDocument;
pub use error::{ErrorKind, Origin, TranslateError};
pub use ir::ApiIr;

/// Translate a generic parsed document tree into the renderer-facing IR.
pub fn translate(root: &serde_json::Value) -> Result<ApiIr, TranslateError> {
    translate_document(&CoreDocument::from_value(root)?)
}

/// Translate JSON document text.
pub fn translate_json(text: &str) -> Result<ApiIr, TranslateError> {
    translate_document(&CoreDocument::from_json(text)?)
}

/// Translate YAML document text.
pub fn translate_yaml(text: &str) -> Result<ApiIr, TranslateError> {
    translate_document(&CoreDocument::from_yaml(text)?)
}

/// Run the translation pipeline over an already-read document model.
///
/// Stages run strictly in order; the first error aborts the whole document,
/// so no partial IR ever escapes.
pub fn translate_document(doc: &CoreDocument) -> Result<ApiIr, TranslateError> {
    debug!(
        components = doc.components.len(),
        paths = doc.paths.len(),
        "document model read"
    );

    let components = ir::translate::translate_components(&doc.components)?;
    debug!(count = components.len(), "components translated");

    let paths = ir::routes::aggregate(doc)?;
    debug!(count = paths.len(), "routes aggregated");

    let decoders = ir::DecoderPlan::build(&components, &paths);
    debug!(
        refinements = decoders.refinement_decoders.len(),
        lists = decoders.list_decoders.len(),
        enums = decoders.enum_decoders.len(),
        "decoder plan built"
    );

    Ok(ApiIr {
        components,
        paths,
        decoders,
    })
}
