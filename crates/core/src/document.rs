//! Document model and reader.
//!
//! This module defines the typed root representation of one source document
//! ([`CoreDocument`]) and the explicit, hand-written mapping that builds it
//! from a generic parsed tree (`serde_json::Value`). Every input shape the
//! subset does not support is a deliberate rejection here or in the
//! translator, never an implicit runtime failure.
//!
//! The reader is a pure transform: text or tree in, document model or typed
//! error out. File acquisition belongs to the build-tool integration, not to
//! this crate.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::error::{ErrorKind, TranslateError};
use crate::ir::routes::{HttpMethod, ParamLocation};
use crate::ir::types::{Literal, PrimitiveKind};

/// HTTP method keys that are real operations but outside the subset.
/// Dropping them silently would violate fail-fast, so they are rejected.
const UNSUPPORTED_METHOD_KEYS: [&str; 3] = ["head", "options", "trace"];

/// Typed root representation of one source document.
///
/// Invariant (closed world): every reference used anywhere in the document
/// must resolve to a key of `components`; the translator turns violations
/// into [`ErrorKind::UnresolvedReference`].
#[derive(Debug, Clone, PartialEq)]
pub struct CoreDocument {
    /// `components.schemas`, in source order
    pub components: IndexMap<String, SchemaDef>,
    /// `paths`, in source order
    pub paths: IndexMap<String, PathItem>,
}

/// A schema definition as declared in the document, before translation.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaDef {
    /// `type: object`. Permitted only as a top-level component.
    Object {
        /// `properties`, in source order
        fields: IndexMap<String, SchemaDef>,
        /// Names listed under `required`
        required: Vec<String>,
    },
    /// `type: array`. Arrays nest freely.
    Array(Box<SchemaDef>),
    /// A scalar `type` with its raw constraint keywords.
    Primitive {
        /// Scalar kind
        kind: PrimitiveKind,
        /// Every non-`type` keyword on the node, for refinement
        /// normalization (unknown keywords are ignored there)
        constraints: Vec<RawConstraint>,
    },
    /// `enum`. Emptiness is checked by the translator.
    Enum(Vec<Literal>),
    /// `$ref` to another component in the same document.
    Ref(String),
}

/// A raw constraint keyword lifted verbatim from a schema node.
#[derive(Debug, Clone, PartialEq)]
pub struct RawConstraint {
    /// Keyword, e.g. `minLength`
    pub key: String,
    /// Unparsed value
    pub value: Value,
}

/// The operations declared for one path template, in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct PathItem {
    /// One entry per HTTP method key, in declaration order
    pub operations: Vec<(HttpMethod, Operation)>,
}

/// One HTTP operation, with path-level parameters already merged in.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    /// Declared parameters; operation-level declarations override
    /// path-level ones with the same name and location
    pub parameters: Vec<RawParameter>,
    /// JSON request body schema, if any
    pub request_body: Option<SchemaDef>,
    /// `(status, schema)` per response that declares a JSON body
    pub responses: Vec<(u16, SchemaDef)>,
}

/// A declared parameter before type translation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawParameter {
    /// Parameter name
    pub name: String,
    /// `in`: query, path, or header
    pub location: ParamLocation,
    /// `required` flag (defaults to false)
    pub required: bool,
    /// Parameter schema
    pub schema: SchemaDef,
}

impl CoreDocument {
    /// Read a document from JSON text.
    pub fn from_json(text: &str) -> Result<Self, TranslateError> {
        let value: Value = serde_json::from_str(text).map_err(|e| {
            ErrorKind::MalformedDocument(format!("invalid JSON: {e}")).in_document()
        })?;
        Self::from_value(&value)
    }

    /// Read a document from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self, TranslateError> {
        let value: serde_yaml::Value = serde_yaml::from_str(text).map_err(|e| {
            ErrorKind::MalformedDocument(format!("invalid YAML: {e}")).in_document()
        })?;
        let value = yaml_to_json(value).map_err(ErrorKind::in_document)?;
        Self::from_value(&value)
    }

    /// Build the document model from a generic parsed tree.
    pub fn from_value(root: &Value) -> Result<Self, TranslateError> {
        let Some(obj) = root.as_object() else {
            return Err(ErrorKind::MalformedDocument(
                "document root must be an object".to_string(),
            )
            .in_document());
        };

        let mut components = IndexMap::new();
        if let Some(components_value) = obj.get("components") {
            let components_obj = components_value.as_object().ok_or_else(|| {
                ErrorKind::MalformedDocument("'components' must be an object".to_string())
                    .in_document()
            })?;
            if let Some(schemas_value) = components_obj.get("schemas") {
                let schemas = schemas_value.as_object().ok_or_else(|| {
                    ErrorKind::MalformedDocument(
                        "'components.schemas' must be an object".to_string(),
                    )
                    .in_document()
                })?;
                for (name, schema_value) in schemas {
                    let schema =
                        parse_schema(schema_value).map_err(|kind| kind.in_component(name))?;
                    components.insert(name.clone(), schema);
                }
            }
        }

        let paths_value = obj.get("paths").ok_or_else(|| {
            ErrorKind::MalformedDocument("missing 'paths'".to_string()).in_document()
        })?;
        let paths_obj = paths_value.as_object().ok_or_else(|| {
            ErrorKind::MalformedDocument("'paths' must be an object".to_string()).in_document()
        })?;
        let mut paths = IndexMap::new();
        for (template, item_value) in paths_obj {
            let item = parse_path_item(item_value).map_err(|kind| kind.at_path(template))?;
            paths.insert(template.clone(), item);
        }

        Ok(CoreDocument { components, paths })
    }
}

/// Convert a YAML tree to the JSON object model the reader walks.
/// YAML permits non-string mapping keys (unquoted status codes are the
/// common case); scalar keys are stringified, anything else is rejected.
fn yaml_to_json(value: serde_yaml::Value) -> Result<Value, ErrorKind> {
    match value {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::from(i))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::from(u))
            } else {
                Ok(Value::from(n.as_f64().unwrap_or(0.0)))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s)),
        serde_yaml::Value::Sequence(entries) => Ok(Value::Array(
            entries
                .into_iter()
                .map(yaml_to_json)
                .collect::<Result<Vec<_>, _>>()?,
        )),
        serde_yaml::Value::Mapping(mapping) => {
            let mut out = Map::new();
            for (key, entry) in mapping {
                let key = match key {
                    serde_yaml::Value::String(s) => s,
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    _ => {
                        return Err(ErrorKind::MalformedDocument(
                            "mapping keys must be scalars".to_string(),
                        ));
                    }
                };
                out.insert(key, yaml_to_json(entry)?);
            }
            Ok(Value::Object(out))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

fn parse_schema(value: &Value) -> Result<SchemaDef, ErrorKind> {
    let Some(obj) = value.as_object() else {
        return Err(ErrorKind::MalformedDocument(
            "schema must be an object".to_string(),
        ));
    };

    // $ref replaces the whole node.
    if let Some(ref_value) = obj.get("$ref") {
        let Some(target) = ref_value.as_str() else {
            return Err(ErrorKind::MalformedDocument(
                "'$ref' must be a string".to_string(),
            ));
        };
        return parse_reference(target);
    }

    for composite in ["anyOf", "oneOf", "allOf"] {
        if obj.contains_key(composite) {
            return Err(ErrorKind::UnsupportedFeature(format!(
                "'{composite}' schema composition"
            )));
        }
    }

    if let Some(enum_value) = obj.get("enum") {
        let Some(values) = enum_value.as_array() else {
            return Err(ErrorKind::MalformedDocument(
                "'enum' must be an array".to_string(),
            ));
        };
        let literals = values
            .iter()
            .map(parse_literal)
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(SchemaDef::Enum(literals));
    }

    match obj.get("type") {
        Some(Value::String(keyword)) => match keyword.as_str() {
            "array" => {
                let items = obj.get("items").ok_or_else(|| {
                    ErrorKind::InvalidSchema("array missing items".to_string())
                })?;
                Ok(SchemaDef::Array(Box::new(parse_schema(items)?)))
            }
            "object" => parse_object(obj),
            other => PrimitiveKind::from_keyword(other)
                .map(|kind| SchemaDef::Primitive {
                    kind,
                    constraints: collect_constraints(obj),
                })
                .ok_or_else(|| ErrorKind::UnsupportedFeature(format!("type '{other}'"))),
        },
        Some(Value::Array(_)) => Err(ErrorKind::UnsupportedFeature("type arrays".to_string())),
        Some(_) => Err(ErrorKind::MalformedDocument(
            "'type' must be a string".to_string(),
        )),
        None => Err(ErrorKind::UnsupportedFeature("untyped schema".to_string())),
    }
}

fn parse_reference(target: &str) -> Result<SchemaDef, ErrorKind> {
    if let Some(name) = target.strip_prefix("#/components/schemas/") {
        if name.is_empty() {
            return Err(ErrorKind::MalformedDocument("empty reference".to_string()));
        }
        if name.contains('/') {
            return Err(ErrorKind::UnsupportedFeature(
                "non-schema reference".to_string(),
            ));
        }
        return Ok(SchemaDef::Ref(name.to_string()));
    }
    if target.starts_with('#') {
        return Err(ErrorKind::UnsupportedFeature(
            "non-schema reference".to_string(),
        ));
    }
    Err(ErrorKind::UnsupportedFeature("external reference".to_string()))
}

fn parse_object(obj: &Map<String, Value>) -> Result<SchemaDef, ErrorKind> {
    if obj.contains_key("additionalProperties") {
        return Err(ErrorKind::UnsupportedFeature(
            "additionalProperties".to_string(),
        ));
    }

    let mut fields = IndexMap::new();
    if let Some(properties_value) = obj.get("properties") {
        let properties = properties_value.as_object().ok_or_else(|| {
            ErrorKind::MalformedDocument("'properties' must be an object".to_string())
        })?;
        for (name, schema_value) in properties {
            fields.insert(name.clone(), parse_schema(schema_value)?);
        }
    }

    let mut required = Vec::new();
    if let Some(required_value) = obj.get("required") {
        let entries = required_value.as_array().ok_or_else(|| {
            ErrorKind::MalformedDocument("'required' must be an array".to_string())
        })?;
        for entry in entries {
            let name = entry.as_str().ok_or_else(|| {
                ErrorKind::MalformedDocument("'required' entries must be strings".to_string())
            })?;
            if !fields.contains_key(name) {
                return Err(ErrorKind::InvalidSchema(format!(
                    "unknown required field '{name}'"
                )));
            }
            required.push(name.to_string());
        }
    }

    Ok(SchemaDef::Object { fields, required })
}

/// Lift every non-`type` keyword off a primitive node. Refinement
/// normalization maps the known constraint keywords and ignores the rest.
fn collect_constraints(obj: &Map<String, Value>) -> Vec<RawConstraint> {
    obj.iter()
        .filter(|(key, _)| key.as_str() != "type")
        .map(|(key, value)| RawConstraint {
            key: key.clone(),
            value: value.clone(),
        })
        .collect()
}

fn parse_literal(value: &Value) -> Result<Literal, ErrorKind> {
    match value {
        Value::Null => Ok(Literal::Null),
        Value::Bool(b) => Ok(Literal::Bool(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Literal::Int(i))
            } else if let Some(f) = n.as_f64() {
                Ok(Literal::Float(f.into()))
            } else {
                Err(ErrorKind::MalformedDocument(
                    "unrepresentable enum number".to_string(),
                ))
            }
        }
        Value::String(s) => Ok(Literal::Str(s.clone())),
        Value::Array(_) | Value::Object(_) => Err(ErrorKind::MalformedDocument(
            "enum values must be scalars".to_string(),
        )),
    }
}

fn parse_path_item(value: &Value) -> Result<PathItem, ErrorKind> {
    let Some(obj) = value.as_object() else {
        return Err(ErrorKind::MalformedDocument(
            "path item must be an object".to_string(),
        ));
    };

    let shared = match obj.get("parameters") {
        Some(params_value) => parse_parameters(params_value)?,
        None => Vec::new(),
    };

    let mut operations = Vec::new();
    for (key, op_value) in obj {
        if UNSUPPORTED_METHOD_KEYS.contains(&key.as_str()) {
            return Err(ErrorKind::UnsupportedFeature(format!("'{key}' operation")));
        }
        let Some(method) = HttpMethod::from_key(key) else {
            // summary, description, parameters, ... are not operations
            continue;
        };
        operations.push((method, parse_operation(op_value, &shared)?));
    }

    Ok(PathItem { operations })
}

fn parse_operation(value: &Value, shared: &[RawParameter]) -> Result<Operation, ErrorKind> {
    let Some(obj) = value.as_object() else {
        return Err(ErrorKind::MalformedDocument(
            "operation must be an object".to_string(),
        ));
    };

    let mut parameters = shared.to_vec();
    if let Some(params_value) = obj.get("parameters") {
        for param in parse_parameters(params_value)? {
            // Operation-level declarations override path-level ones.
            parameters.retain(|existing| {
                existing.name != param.name || existing.location != param.location
            });
            parameters.push(param);
        }
    }

    let request_body = match obj.get("requestBody") {
        Some(body_value) => Some(parse_request_body(body_value)?),
        None => None,
    };

    let responses = match obj.get("responses") {
        Some(responses_value) => parse_responses(responses_value)?,
        None => Vec::new(),
    };

    Ok(Operation {
        parameters,
        request_body,
        responses,
    })
}

fn parse_parameters(value: &Value) -> Result<Vec<RawParameter>, ErrorKind> {
    let Some(entries) = value.as_array() else {
        return Err(ErrorKind::MalformedDocument(
            "'parameters' must be an array".to_string(),
        ));
    };
    entries.iter().map(parse_parameter).collect()
}

fn parse_parameter(value: &Value) -> Result<RawParameter, ErrorKind> {
    let Some(obj) = value.as_object() else {
        return Err(ErrorKind::MalformedDocument(
            "parameter must be an object".to_string(),
        ));
    };

    let name = obj
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| ErrorKind::MalformedDocument("parameter missing 'name'".to_string()))?;

    let location = match obj.get("in").and_then(Value::as_str) {
        Some("query") => ParamLocation::Query,
        Some("path") => ParamLocation::Path,
        Some("header") => ParamLocation::Header,
        Some("cookie") => {
            return Err(ErrorKind::UnsupportedFeature("cookie parameter".to_string()));
        }
        Some(other) => {
            return Err(ErrorKind::MalformedDocument(format!(
                "unknown parameter location '{other}'"
            )));
        }
        None => {
            return Err(ErrorKind::MalformedDocument(format!(
                "parameter '{name}' missing 'in'"
            )));
        }
    };

    let required = match obj.get("required") {
        None => false,
        Some(Value::Bool(b)) => *b,
        Some(_) => {
            return Err(ErrorKind::MalformedDocument(format!(
                "parameter '{name}': 'required' must be a boolean"
            )));
        }
    };

    if obj.contains_key("content") {
        return Err(ErrorKind::UnsupportedFeature(
            "parameter content declaration".to_string(),
        ));
    }
    let schema_value = obj.get("schema").ok_or_else(|| {
        ErrorKind::MalformedDocument(format!("parameter '{name}' missing 'schema'"))
    })?;

    Ok(RawParameter {
        name: name.to_string(),
        location,
        required,
        schema: parse_schema(schema_value)?,
    })
}

fn parse_request_body(value: &Value) -> Result<SchemaDef, ErrorKind> {
    let Some(obj) = value.as_object() else {
        return Err(ErrorKind::MalformedDocument(
            "requestBody must be an object".to_string(),
        ));
    };
    let content = obj
        .get("content")
        .and_then(Value::as_object)
        .ok_or_else(|| {
            ErrorKind::MalformedDocument("requestBody missing 'content'".to_string())
        })?;
    let Some(media) = content.get("application/json") else {
        return Err(ErrorKind::UnsupportedFeature(
            "non-JSON request body".to_string(),
        ));
    };
    parse_media_schema(media)
}

fn parse_responses(value: &Value) -> Result<Vec<(u16, SchemaDef)>, ErrorKind> {
    let Some(obj) = value.as_object() else {
        return Err(ErrorKind::MalformedDocument(
            "'responses' must be an object".to_string(),
        ));
    };

    let mut out = Vec::new();
    for (status_key, response_value) in obj {
        let status = parse_status(status_key)?;
        let Some(response) = response_value.as_object() else {
            return Err(ErrorKind::MalformedDocument(
                "response must be an object".to_string(),
            ));
        };
        if let Some(content_value) = response.get("content") {
            let Some(content) = content_value.as_object() else {
                return Err(ErrorKind::MalformedDocument(
                    "response 'content' must be an object".to_string(),
                ));
            };
            if let Some(media) = content.get("application/json") {
                out.push((status, parse_media_schema(media)?));
            } else if !content.is_empty() {
                return Err(ErrorKind::UnsupportedFeature(
                    "non-JSON response body".to_string(),
                ));
            }
        }
        // A response without content (204 and friends) carries no type.
    }
    Ok(out)
}

fn parse_status(key: &str) -> Result<u16, ErrorKind> {
    if key == "default" || (key.len() == 3 && key.ends_with("XX")) {
        return Err(ErrorKind::UnsupportedFeature(
            "response code ranges".to_string(),
        ));
    }
    let status: u16 = key.parse().map_err(|_| {
        ErrorKind::MalformedDocument(format!("invalid status code '{key}'"))
    })?;
    if !(100..=599).contains(&status) {
        return Err(ErrorKind::MalformedDocument(format!(
            "invalid status code '{key}'"
        )));
    }
    Ok(status)
}

fn parse_media_schema(media: &Value) -> Result<SchemaDef, ErrorKind> {
    let schema_value = media
        .as_object()
        .and_then(|obj| obj.get("schema"))
        .ok_or_else(|| {
            ErrorKind::MalformedDocument("media type missing 'schema'".to_string())
        })?;
    parse_schema(schema_value)
}
