//! Decoder planning.
//!
//! Scans every aggregated route and derives the auxiliary parsing helpers a
//! renderer needs: refinement-constrained decoders, list-valued query
//! decoders, and enum decoders. Deduplication is by structural equality of
//! the type content, not identity, so two routes using the same constrained
//! string share exactly one decoder. References are chased into their
//! component definitions, with a visited set so reference cycles terminate.

use std::collections::HashSet;

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use crate::ir::routes::{ParamLocation, PathItemAggregation};
use crate::ir::types::{Literal, PrimitiveKind, Refinement, TypeDef, TypeDefKind, TypeRepr};

/// A shared decoder for one refinement-constrained primitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RefinementDecoder {
    /// Scalar kind being decoded
    pub kind: PrimitiveKind,
    /// Canonically ordered refinement set, never empty
    pub refinements: Vec<Refinement>,
}

/// A shared decoder for one list-valued query parameter type.
///
/// Query strings carry sequences by key repetition, so these decode
/// per-element and collect.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ListDecoder {
    /// The primitive element type, refinements included
    pub element: TypeRepr,
}

/// A shared decoder for one closed enumeration value set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EnumDecoder {
    /// The literal values, in declaration order
    pub values: Vec<Literal>,
}

/// The deduplicated decoding helpers derived from all routes.
///
/// Each list is order-stable: entries appear in first-encounter order over a
/// scan of paths, routes, then parameters, request body, and responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecoderPlan {
    /// One per distinct `(kind, refinement set)` pair
    pub refinement_decoders: Vec<RefinementDecoder>,
    /// One per distinct array-of-primitive query parameter type
    pub list_decoders: Vec<ListDecoder>,
    /// One per distinct enumeration value set
    pub enum_decoders: Vec<EnumDecoder>,
}

impl DecoderPlan {
    /// Derive the plan from translated components and aggregated routes.
    /// Requires the complete route set; this is why planning runs strictly
    /// after aggregation.
    pub fn build(
        components: &IndexMap<String, TypeDef>,
        paths: &IndexMap<String, PathItemAggregation>,
    ) -> Self {
        let mut planner = Planner {
            components,
            visited: HashSet::new(),
            refinements: IndexSet::new(),
            lists: IndexSet::new(),
            enums: IndexSet::new(),
        };

        for aggregation in paths.values() {
            for route in &aggregation.items {
                for param in &route.parameters {
                    planner.visit(&param.ty);
                    if param.location == ParamLocation::Query {
                        let element = planner.resolve_list_element(&param.ty);
                        if let Some(element) = element {
                            planner.lists.insert(ListDecoder { element });
                        }
                    }
                }
                if let Some(body) = &route.request_body {
                    planner.visit(body);
                }
                for ty in route.responses.values() {
                    planner.visit(ty);
                }
            }
        }

        DecoderPlan {
            refinement_decoders: planner.refinements.into_iter().collect(),
            list_decoders: planner.lists.into_iter().collect(),
            enum_decoders: planner.enums.into_iter().collect(),
        }
    }
}

struct Planner<'a> {
    components: &'a IndexMap<String, TypeDef>,
    /// Component names already scanned; makes reference cycles terminate
    visited: HashSet<String>,
    refinements: IndexSet<RefinementDecoder>,
    lists: IndexSet<ListDecoder>,
    enums: IndexSet<EnumDecoder>,
}

impl<'a> Planner<'a> {
    fn visit(&mut self, ty: &TypeRepr) {
        match ty {
            TypeRepr::Primitive { kind, refinements } => {
                if !refinements.is_empty() {
                    self.refinements.insert(RefinementDecoder {
                        kind: *kind,
                        refinements: refinements.clone(),
                    });
                }
            }
            TypeRepr::Array(element) => self.visit(element),
            TypeRepr::Enum(values) => {
                self.enums.insert(EnumDecoder {
                    values: values.clone(),
                });
            }
            TypeRepr::Ref(name) => {
                if !self.visited.insert(name.clone()) {
                    return;
                }
                let Some(def) = self.components.get(name) else {
                    // Unresolved references never survive translation; a
                    // missing component here means the caller bypassed it.
                    return;
                };
                match &def.kind {
                    TypeDefKind::Record { fields } => {
                        for field in fields {
                            self.visit(&field.ty);
                        }
                    }
                    TypeDefKind::Alias { ty } => self.visit(ty),
                }
            }
        }
    }

    /// Resolve a query parameter type down to an array-of-primitive element,
    /// chasing alias references on both the array and its element.
    fn resolve_list_element(&self, ty: &TypeRepr) -> Option<TypeRepr> {
        let array = self.resolve_alias(ty)?;
        let TypeRepr::Array(element) = array else {
            return None;
        };
        let element = self.resolve_alias(element)?;
        match element {
            TypeRepr::Primitive { .. } => Some(element.clone()),
            _ => None,
        }
    }

    /// Follow alias references until a non-reference shape is reached.
    fn resolve_alias<'b>(&'b self, ty: &'b TypeRepr) -> Option<&'b TypeRepr>
    where
        'a: 'b,
    {
        let mut current = ty;
        let mut chased: HashSet<&str> = HashSet::new();
        loop {
            let TypeRepr::Ref(name) = current else {
                return Some(current);
            };
            if !chased.insert(name.as_str()) {
                // Pure alias cycle; nothing concrete to decode.
                return None;
            }
            match self.components.get(name).map(|def| &def.kind) {
                Some(TypeDefKind::Alias { ty }) => current = ty,
                _ => return None,
            }
        }
    }
}
