//! Route aggregation.
//!
//! Groups the operations of one document by path template into
//! [`PathItemAggregation`]s, translating every parameter, request body, and
//! response schema on the way. Path templates are parsed for `{param}`
//! placeholders, and each placeholder must be backed by a declared path
//! parameter.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::Serialize;

use crate::document::{CoreDocument, Operation, PathItem, SchemaDef};
use crate::error::{ErrorKind, TranslateError};
use crate::ir::translate;
use crate::ir::types::TypeRepr;

/// HTTP method of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum HttpMethod {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// PATCH
    Patch,
    /// DELETE
    Delete,
}

impl HttpMethod {
    /// Uppercase wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Map a path-item key to a method, if it is one the subset models.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "get" => Some(HttpMethod::Get),
            "post" => Some(HttpMethod::Post),
            "put" => Some(HttpMethod::Put),
            "patch" => Some(HttpMethod::Patch),
            "delete" => Some(HttpMethod::Delete),
            _ => None,
        }
    }
}

/// Where a parameter appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ParamLocation {
    /// Query string
    Query,
    /// Path template placeholder
    Path,
    /// Request header
    Header,
}

/// A translated route parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    /// Name as declared
    pub name: String,
    /// Query, path, or header
    pub location: ParamLocation,
    /// Whether the parameter must be present
    pub required: bool,
    /// Translated parameter type
    pub ty: TypeRepr,
}

impl Parameter {
    /// Whether this parameter needs a list-valued decoder: query strings
    /// carry sequences by key repetition, not by a native encoding, so an
    /// array-of-primitive query parameter decodes differently from a scalar.
    pub fn needs_list_decoder(&self) -> bool {
        self.location == ParamLocation::Query
            && matches!(&self.ty, TypeRepr::Array(element) if matches!(**element, TypeRepr::Primitive { .. }))
    }
}

/// One HTTP operation of a path, fully translated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteItem {
    /// HTTP method
    pub method: HttpMethod,
    /// Parameters in declaration order
    pub parameters: Vec<Parameter>,
    /// Translated JSON request body type, if any
    pub request_body: Option<TypeRepr>,
    /// Status code to translated response type, in declaration order
    pub responses: IndexMap<u16, TypeRepr>,
}

/// All routes declared for one path template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathItemAggregation {
    /// The path template, e.g. `/items/{id}`
    pub path_template: String,
    /// One route per declared method, in declaration order
    pub items: Vec<RouteItem>,
}

/// Aggregate every path of a document, in source order.
pub fn aggregate(
    doc: &CoreDocument,
) -> Result<IndexMap<String, PathItemAggregation>, TranslateError> {
    let names: HashSet<&str> = doc.components.keys().map(String::as_str).collect();

    let mut out = IndexMap::new();
    for (template, item) in &doc.paths {
        let aggregation =
            aggregate_path(template, item, &names).map_err(|kind| kind.at_path(template))?;
        out.insert(template.clone(), aggregation);
    }
    Ok(out)
}

fn aggregate_path(
    template: &str,
    item: &PathItem,
    names: &HashSet<&str>,
) -> Result<PathItemAggregation, ErrorKind> {
    let placeholders = template_placeholders(template)?;

    let mut seen = HashSet::new();
    let mut items = Vec::with_capacity(item.operations.len());
    for (method, operation) in &item.operations {
        if !seen.insert(*method) {
            return Err(ErrorKind::InvalidSchema("duplicate method".to_string()));
        }
        items.push(build_route(*method, operation, &placeholders, names)?);
    }

    Ok(PathItemAggregation {
        path_template: template.to_string(),
        items,
    })
}

fn build_route(
    method: HttpMethod,
    operation: &Operation,
    placeholders: &[String],
    names: &HashSet<&str>,
) -> Result<RouteItem, ErrorKind> {
    let mut seen = HashSet::new();
    for param in &operation.parameters {
        if !seen.insert((&param.name, param.location)) {
            return Err(ErrorKind::InvalidSchema(format!(
                "duplicate parameter '{}'",
                param.name
            )));
        }
    }

    let mut parameters = Vec::with_capacity(operation.parameters.len());
    for param in &operation.parameters {
        parameters.push(Parameter {
            name: param.name.clone(),
            location: param.location,
            required: param.required,
            ty: translate_route_type(&param.schema, names)?,
        });
    }

    // Every template placeholder needs a declared path parameter, and every
    // declared path parameter needs a placeholder.
    let declared: HashSet<&str> = parameters
        .iter()
        .filter(|p| p.location == ParamLocation::Path)
        .map(|p| p.name.as_str())
        .collect();
    for placeholder in placeholders {
        if !declared.contains(placeholder.as_str()) {
            return Err(ErrorKind::InvalidSchema(format!(
                "undeclared path parameter '{placeholder}'"
            )));
        }
    }
    for name in &declared {
        if !placeholders.iter().any(|p| p.as_str() == *name) {
            return Err(ErrorKind::InvalidSchema(format!(
                "unused path parameter '{name}'"
            )));
        }
    }

    let request_body = operation
        .request_body
        .as_ref()
        .map(|schema| translate_route_type(schema, names))
        .transpose()?;

    let mut responses = IndexMap::new();
    for (status, schema) in &operation.responses {
        responses.insert(*status, translate_route_type(schema, names)?);
    }

    Ok(RouteItem {
        method,
        parameters,
        request_body,
        responses,
    })
}

/// Translate a schema at a route position. Object definitions are never
/// legal here; they have no name for a renderer to hang a record on.
fn translate_route_type(schema: &SchemaDef, names: &HashSet<&str>) -> Result<TypeRepr, ErrorKind> {
    if matches!(schema, SchemaDef::Object { .. }) {
        return Err(ErrorKind::UnsupportedFeature(
            "anonymous inline type".to_string(),
        ));
    }
    translate::translate_type(schema, names)
}

/// Walk a path template and collect `{param}` placeholder names.
fn template_placeholders(template: &str) -> Result<Vec<String>, ErrorKind> {
    let mut placeholders = Vec::new();
    let mut name = String::new();
    let mut in_param = false;

    for c in template.chars() {
        match c {
            '{' if !in_param => {
                in_param = true;
                name.clear();
            }
            '}' if in_param => {
                if name.is_empty() {
                    return Err(ErrorKind::InvalidSchema(
                        "empty path parameter name".to_string(),
                    ));
                }
                placeholders.push(name.clone());
                in_param = false;
            }
            '{' | '}' => {
                return Err(ErrorKind::InvalidSchema(
                    "unbalanced path template".to_string(),
                ));
            }
            _ if in_param => name.push(c),
            _ => {}
        }
    }
    if in_param {
        return Err(ErrorKind::InvalidSchema(
            "unbalanced path template".to_string(),
        ));
    }

    Ok(placeholders)
}
