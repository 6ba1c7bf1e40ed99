//! Intermediate representation of one translated document.
//!
//! The IR is split in layers, each resolved before the next begins:
//! 1. Type IR: value shapes, refinements, component definitions
//! 2. Route IR: operations aggregated per path template
//! 3. Decoder plan: deduplicated parsing helpers derived from all routes
//!
//! The separation keeps every document-format corner case inside
//! translation; a renderer only ever sees resolved, order-stable values
//! through the contract in [`contract`].
//!
//! ## Module structure
//!
//! - `types`: TypeRepr, Refinement, TypeDef (value and component shapes)
//! - `refine`: raw constraint normalization
//! - `translate`: schema definitions -> type IR
//! - `routes`: path/operation aggregation
//! - `plan`: decoder deduplication across routes
//! - `contract`: the renderer-facing shape query and ordering guarantees

pub mod contract;
pub mod plan;
pub mod refine;
pub mod routes;
pub mod translate;
pub mod types;

use indexmap::IndexMap;
use serde::Serialize;

pub use contract::Shape;
pub use plan::DecoderPlan;
pub use routes::{PathItemAggregation, RouteItem};
pub use types::{Refinement, TypeDef, TypeRepr};

/// The complete IR of one document: everything a renderer consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiIr {
    /// Translated components, in document declaration order
    pub components: IndexMap<String, TypeDef>,
    /// Aggregated routes, in document declaration order
    pub paths: IndexMap<String, PathItemAggregation>,
    /// Deduplicated decoding helpers derived from all routes
    pub decoders: DecoderPlan,
}
