//! Type translation from schema definitions to the renderer-facing IR.
//!
//! Components translate independently: references are resolved by name
//! lookup against the component name set, not by recursing into the target,
//! so declaration order never matters and mutually referencing components
//! need no topological sort. The nesting restriction is enforced here: an
//! object definition is only legal as a top-level component.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::document::SchemaDef;
use crate::error::{ErrorKind, TranslateError};
use crate::ir::refine;
use crate::ir::types::{FieldRepr, TypeDef, TypeDefKind, TypeRepr};

/// Translate every component of a document, in source order.
pub fn translate_components(
    components: &IndexMap<String, SchemaDef>,
) -> Result<IndexMap<String, TypeDef>, TranslateError> {
    let names: HashSet<&str> = components.keys().map(String::as_str).collect();

    let mut out = IndexMap::new();
    for (name, schema) in components {
        let def = translate_component(name, schema, &names)
            .map_err(|kind| kind.in_component(name))?;
        out.insert(name.clone(), def);
    }
    Ok(out)
}

/// Translate one top-level component.
///
/// Objects become records; every other shape becomes a named alias of its
/// translated [`TypeRepr`].
pub fn translate_component(
    name: &str,
    schema: &SchemaDef,
    names: &HashSet<&str>,
) -> Result<TypeDef, ErrorKind> {
    let kind = match schema {
        SchemaDef::Object { fields, required } => {
            let required: HashSet<&str> = required.iter().map(String::as_str).collect();
            let mut out = Vec::with_capacity(fields.len());
            for (field_name, field_schema) in fields {
                out.push(FieldRepr {
                    name: field_name.clone(),
                    ty: translate_type(field_schema, names)?,
                    required: required.contains(field_name.as_str()),
                });
            }
            TypeDefKind::Record { fields: out }
        }
        other => TypeDefKind::Alias {
            ty: translate_type(other, names)?,
        },
    };

    Ok(TypeDef {
        name: name.to_string(),
        kind,
    })
}

/// Translate a schema in nested position (a field, an array element, a
/// parameter or body type).
pub fn translate_type(schema: &SchemaDef, names: &HashSet<&str>) -> Result<TypeRepr, ErrorKind> {
    match schema {
        SchemaDef::Object { .. } => Err(ErrorKind::UnsupportedFeature(
            "nested object definition".to_string(),
        )),
        SchemaDef::Array(element) => {
            Ok(TypeRepr::Array(Box::new(translate_type(element, names)?)))
        }
        SchemaDef::Primitive { kind, constraints } => Ok(TypeRepr::Primitive {
            kind: *kind,
            refinements: refine::normalize(constraints)?,
        }),
        SchemaDef::Enum(values) => {
            if values.is_empty() {
                return Err(ErrorKind::InvalidSchema("empty enum".to_string()));
            }
            Ok(TypeRepr::Enum(values.clone()))
        }
        SchemaDef::Ref(name) => {
            if !names.contains(name.as_str()) {
                return Err(ErrorKind::UnresolvedReference(name.clone()));
            }
            Ok(TypeRepr::Ref(name.clone()))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::document::RawConstraint;
    use crate::ir::types::{Literal, PrimitiveKind, Refinement};

    fn string_schema(constraints: Vec<(&str, serde_json::Value)>) -> SchemaDef {
        SchemaDef::Primitive {
            kind: PrimitiveKind::String,
            constraints: constraints
                .into_iter()
                .map(|(key, value)| RawConstraint {
                    key: key.to_string(),
                    value,
                })
                .collect(),
        }
    }

    #[test]
    fn test_top_level_object_becomes_record() {
        let mut fields = IndexMap::new();
        fields.insert("id".to_string(), string_schema(vec![]));
        fields.insert(
            "tags".to_string(),
            SchemaDef::Array(Box::new(string_schema(vec![]))),
        );
        let schema = SchemaDef::Object {
            fields,
            required: vec!["id".to_string()],
        };

        let def = translate_component("Item", &schema, &HashSet::new()).unwrap();
        let TypeDefKind::Record { fields } = def.kind else {
            panic!("expected record");
        };
        assert_eq!(fields.len(), 2);
        assert!(fields[0].required);
        assert!(!fields[1].required);
    }

    #[test]
    fn test_nested_object_is_unsupported() {
        let mut inner_fields = IndexMap::new();
        inner_fields.insert("x".to_string(), string_schema(vec![]));
        let inner = SchemaDef::Object {
            fields: inner_fields,
            required: vec![],
        };

        let mut fields = IndexMap::new();
        fields.insert("inner".to_string(), inner.clone());
        let object_field = SchemaDef::Object {
            fields,
            required: vec![],
        };
        let err = translate_component("Outer", &object_field, &HashSet::new()).unwrap_err();
        assert_eq!(
            err,
            ErrorKind::UnsupportedFeature("nested object definition".to_string())
        );

        // The same object inside an array element chain is equally illegal.
        let in_array = SchemaDef::Array(Box::new(SchemaDef::Array(Box::new(inner))));
        let err = translate_component("List", &in_array, &HashSet::new()).unwrap_err();
        assert_eq!(
            err,
            ErrorKind::UnsupportedFeature("nested object definition".to_string())
        );
    }

    #[test]
    fn test_arrays_are_exempt_from_the_nesting_rule() {
        let nested = SchemaDef::Array(Box::new(SchemaDef::Array(Box::new(string_schema(
            vec![("minLength", json!(1))],
        )))));
        let ty = translate_type(&nested, &HashSet::new()).unwrap();
        assert_eq!(
            ty,
            TypeRepr::Array(Box::new(TypeRepr::Array(Box::new(TypeRepr::Primitive {
                kind: PrimitiveKind::String,
                refinements: vec![Refinement::MinLength(1)],
            }))))
        );
    }

    #[test]
    fn test_object_field_by_reference_succeeds_where_inline_fails() {
        let names: HashSet<&str> = ["Inner"].into_iter().collect();
        let mut fields = IndexMap::new();
        fields.insert("inner".to_string(), SchemaDef::Ref("Inner".to_string()));
        let schema = SchemaDef::Object {
            fields,
            required: vec![],
        };

        let def = translate_component("Outer", &schema, &names).unwrap();
        let TypeDefKind::Record { fields } = def.kind else {
            panic!("expected record");
        };
        assert_eq!(fields[0].ty, TypeRepr::Ref("Inner".to_string()));
    }

    #[test]
    fn test_reference_to_absent_component_is_unresolved() {
        let names: HashSet<&str> = ["Present"].into_iter().collect();
        let err = translate_type(&SchemaDef::Ref("X".to_string()), &names).unwrap_err();
        assert_eq!(err, ErrorKind::UnresolvedReference("X".to_string()));
    }

    #[test]
    fn test_components_resolve_in_any_declaration_order() {
        // "First" references "Last", declared after it; translation is
        // lookup-based, so order is irrelevant. Mutual references work the
        // same way.
        let mut components = IndexMap::new();
        let mut first_fields = IndexMap::new();
        first_fields.insert("next".to_string(), SchemaDef::Ref("Last".to_string()));
        components.insert(
            "First".to_string(),
            SchemaDef::Object {
                fields: first_fields,
                required: vec![],
            },
        );
        let mut last_fields = IndexMap::new();
        last_fields.insert("prev".to_string(), SchemaDef::Ref("First".to_string()));
        components.insert(
            "Last".to_string(),
            SchemaDef::Object {
                fields: last_fields,
                required: vec![],
            },
        );

        let translated = translate_components(&components).unwrap();
        assert_eq!(translated.len(), 2);
        let order: Vec<_> = translated.keys().cloned().collect();
        assert_eq!(order, vec!["First", "Last"]);
    }

    #[test]
    fn test_empty_enum_is_invalid() {
        let err = translate_type(&SchemaDef::Enum(vec![]), &HashSet::new()).unwrap_err();
        assert_eq!(err, ErrorKind::InvalidSchema("empty enum".to_string()));
    }

    #[test]
    fn test_enum_values_survive_translation() {
        let schema = SchemaDef::Enum(vec![
            Literal::Str("active".to_string()),
            Literal::Str("archived".to_string()),
        ]);
        let ty = translate_type(&schema, &HashSet::new()).unwrap();
        assert_eq!(
            ty,
            TypeRepr::Enum(vec![
                Literal::Str("active".to_string()),
                Literal::Str("archived".to_string()),
            ])
        );
    }

    #[test]
    fn test_translation_error_names_the_component() {
        let mut components = IndexMap::new();
        components.insert("Broken".to_string(), SchemaDef::Ref("Ghost".to_string()));
        let err = translate_components(&components).unwrap_err();
        assert_eq!(
            err.to_string(),
            "component 'Broken': unresolved reference 'Ghost'"
        );
    }
}
