//! JSON Schema validation over `utoipa` derives.
//!
//! A [`SchemaDoc`] captures the schema a type derives with `utoipa::ToSchema`
//! (plus every component it references) in its serialized JSON form and checks
//! `serde_json::Value`s against it. The same derive feeds the OpenAPI document,
//! so what is published is exactly what is enforced.
//!
//! Supported keywords: `$ref`, `type` (single or list, including `null`),
//! `properties`, `required`, `additionalProperties` (schema form), `items`,
//! `minItems`/`maxItems`, `allOf`/`oneOf`/`anyOf`, `enum`, string
//! `format: email`, `minLength`/`maxLength`, `minimum`/`maximum` and their
//! exclusive variants (both the boolean and the numeric spelling).
//! Unknown keywords are ignored.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use utoipa::ToSchema;
use validator::ValidateEmail;

const COMPONENT_PREFIX: &str = "#/components/schemas/";
const MAX_DEPTH: usize = 64;

/// Machine-readable classification of a single validation issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    InvalidType,
    InvalidString,
    TooSmall,
    TooBig,
    InvalidEnumValue,
    InvalidUnion,
    /// The body is not JSON or does not deserialize.
    InvalidBody,
    /// Path or query parameters could not be extracted.
    InvalidParams,
}

/// One step into a JSON document: an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// A single mismatch between a value and its schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Issue {
    pub code: IssueCode,
    /// Location of the offending value, from the document root.
    pub path: Vec<PathSegment>,
    pub message: String,
}

impl Issue {
    pub fn new(code: IssueCode, path: Vec<PathSegment>, message: impl Into<String>) -> Self {
        Self {
            code,
            path,
            message: message.into(),
        }
    }

    /// Body-level failure (unparsable JSON, missing content type).
    pub fn body(message: impl Into<String>) -> Self {
        Self::new(IssueCode::InvalidBody, Vec::new(), message)
    }

    /// Parameter-level failure.
    pub fn params(message: impl Into<String>) -> Self {
        Self::new(IssueCode::InvalidParams, Vec::new(), message)
    }

    /// Whether the issue points at (or below) the given top-level key.
    pub fn touches(&self, key: &str) -> bool {
        matches!(self.path.first(), Some(PathSegment::Key(k)) if k == key)
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            return write!(f, "{}", self.message);
        }
        let path = self
            .path
            .iter()
            .map(|seg| match seg {
                PathSegment::Key(k) => k.clone(),
                PathSegment::Index(i) => i.to_string(),
            })
            .collect::<Vec<_>>()
            .join(".");
        write!(f, "{path}: {}", self.message)
    }
}

/// A root schema plus the component schemas it may reference.
#[derive(Debug, Clone)]
pub struct SchemaDoc {
    name: String,
    root: Value,
    components: Map<String, Value>,
}

impl SchemaDoc {
    /// Schema of `T` as derived by `utoipa`.
    pub fn of<T: ToSchema>() -> Self {
        let (name, components) = collect::<T>();
        Self {
            root: component_ref(&name),
            name,
            components,
        }
    }

    /// Schema of a JSON array whose items are `T`.
    pub fn array_of<T: ToSchema>() -> Self {
        let (name, components) = collect::<T>();
        Self {
            root: serde_json::json!({ "type": "array", "items": component_ref(&name) }),
            name: format!("Array<{name}>"),
            components,
        }
    }

    /// Build from raw JSON Schema parts.
    pub fn from_parts(name: impl Into<String>, root: Value, components: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            root,
            components,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Every mismatch between `value` and the schema; empty means valid.
    pub fn validate(&self, value: &Value) -> Vec<Issue> {
        let mut issues = Vec::new();
        let mut path = Vec::new();
        self.check(&self.root, value, &mut path, &mut issues, 0);
        issues
    }

    fn resolve<'a>(&'a self, reference: &str) -> Option<&'a Value> {
        reference
            .strip_prefix(COMPONENT_PREFIX)
            .and_then(|name| self.components.get(name))
    }

    fn check(
        &self,
        schema: &Value,
        value: &Value,
        path: &mut Vec<PathSegment>,
        issues: &mut Vec<Issue>,
        depth: usize,
    ) {
        // `true`, `{}` and anything unrecognised accept every value
        let Some(schema) = schema.as_object() else {
            if schema == &Value::Bool(false) {
                issues.push(Issue::new(
                    IssueCode::InvalidType,
                    path.clone(),
                    format!("Expected nothing, received {}", kind_of(value)),
                ));
            }
            return;
        };
        if depth > MAX_DEPTH {
            return;
        }

        if let Some(reference) = schema.get("$ref").and_then(Value::as_str) {
            match self.resolve(reference) {
                Some(target) => self.check(target, value, path, issues, depth + 1),
                None => tracing::warn!(reference, schema = %self.name, "unresolved schema reference"),
            }
        }

        if let Some(all) = schema.get("allOf").and_then(Value::as_array) {
            for sub in all {
                self.check(sub, value, path, issues, depth + 1);
            }
        }

        for key in ["oneOf", "anyOf"] {
            if let Some(alternatives) = schema.get(key).and_then(Value::as_array) {
                self.check_union(alternatives, value, path, issues, depth);
            }
        }

        if let Some(expected) = schema.get("type") {
            if !type_matches(expected, value) {
                issues.push(Issue::new(
                    IssueCode::InvalidType,
                    path.clone(),
                    format!(
                        "Expected {}, received {}",
                        describe_types(expected),
                        kind_of(value)
                    ),
                ));
                return;
            }
        }

        if let Some(allowed) = schema.get("enum").and_then(Value::as_array) {
            if !allowed.contains(value) {
                let options = allowed
                    .iter()
                    .map(|v| match v {
                        Value::String(s) => format!("'{s}'"),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(" | ");
                issues.push(Issue::new(
                    IssueCode::InvalidEnumValue,
                    path.clone(),
                    format!("Invalid enum value. Expected {options}, received {value}"),
                ));
            }
        }

        match value {
            Value::String(s) => check_string(schema, s, path, issues),
            Value::Number(_) => check_number(schema, value, path, issues),
            Value::Array(items) => self.check_array(schema, items, path, issues, depth),
            Value::Object(fields) => self.check_object(schema, fields, path, issues, depth),
            Value::Null | Value::Bool(_) => {}
        }
    }

    /// A union passes when any alternative accepts the value; the first match
    /// wins, the way an untagged serde enum picks its variant.
    fn check_union(
        &self,
        alternatives: &[Value],
        value: &Value,
        path: &mut Vec<PathSegment>,
        issues: &mut Vec<Issue>,
        depth: usize,
    ) {
        let mut attempts = Vec::with_capacity(alternatives.len());
        for alt in alternatives {
            let mut local = Vec::new();
            self.check(alt, value, path, &mut local, depth + 1);
            if local.is_empty() {
                return;
            }
            attempts.push(local);
        }

        // A single non-null alternative (Option<T>) reports its own issues
        let non_null: Vec<_> = alternatives
            .iter()
            .zip(attempts.iter())
            .filter(|(alt, _)| alt.get("type") != Some(&Value::String("null".into())))
            .collect();
        if let [(_, only)] = non_null.as_slice() {
            issues.extend(only.iter().cloned());
            return;
        }

        issues.push(Issue::new(
            IssueCode::InvalidUnion,
            path.clone(),
            "Invalid input",
        ));
    }

    fn check_array(
        &self,
        schema: &Map<String, Value>,
        items: &[Value],
        path: &mut Vec<PathSegment>,
        issues: &mut Vec<Issue>,
        depth: usize,
    ) {
        if let Some(min) = schema.get("minItems").and_then(Value::as_u64) {
            if (items.len() as u64) < min {
                issues.push(Issue::new(
                    IssueCode::TooSmall,
                    path.clone(),
                    format!("Array must contain at least {min} element(s)"),
                ));
            }
        }
        if let Some(max) = schema.get("maxItems").and_then(Value::as_u64) {
            if (items.len() as u64) > max {
                issues.push(Issue::new(
                    IssueCode::TooBig,
                    path.clone(),
                    format!("Array must contain at most {max} element(s)"),
                ));
            }
        }

        let Some(item_schema) = schema.get("items") else {
            return;
        };
        for (i, item) in items.iter().enumerate() {
            path.push(PathSegment::Index(i));
            self.check(item_schema, item, path, issues, depth + 1);
            path.pop();
        }
    }

    fn check_object(
        &self,
        schema: &Map<String, Value>,
        fields: &Map<String, Value>,
        path: &mut Vec<PathSegment>,
        issues: &mut Vec<Issue>,
        depth: usize,
    ) {
        let properties = schema.get("properties").and_then(Value::as_object);

        if let Some(required) = schema.get("required").and_then(Value::as_array) {
            for key in required.iter().filter_map(Value::as_str) {
                if !fields.contains_key(key) {
                    path.push(PathSegment::from(key));
                    issues.push(Issue::new(IssueCode::InvalidType, path.clone(), "Required"));
                    path.pop();
                }
            }
        }

        // Unknown keys are tolerated unless `additionalProperties` is a schema
        let extra = schema.get("additionalProperties").filter(|v| v.is_object());

        for (key, field) in fields {
            let sub = properties.and_then(|p| p.get(key)).or(extra);
            if let Some(sub) = sub {
                path.push(PathSegment::from(key.as_str()));
                self.check(sub, field, path, issues, depth + 1);
                path.pop();
            }
        }
    }
}

fn check_string(
    schema: &Map<String, Value>,
    s: &str,
    path: &[PathSegment],
    issues: &mut Vec<Issue>,
) {
    if schema.get("format").and_then(Value::as_str) == Some("email") && !s.validate_email() {
        issues.push(Issue::new(
            IssueCode::InvalidString,
            path.to_vec(),
            "Invalid email",
        ));
    }

    let len = s.chars().count() as u64;
    if let Some(min) = schema.get("minLength").and_then(Value::as_u64) {
        if len < min {
            issues.push(Issue::new(
                IssueCode::TooSmall,
                path.to_vec(),
                format!("String must contain at least {min} character(s)"),
            ));
        }
    }
    if let Some(max) = schema.get("maxLength").and_then(Value::as_u64) {
        if len > max {
            issues.push(Issue::new(
                IssueCode::TooBig,
                path.to_vec(),
                format!("String must contain at most {max} character(s)"),
            ));
        }
    }
}

fn check_number(
    schema: &Map<String, Value>,
    value: &Value,
    path: &[PathSegment],
    issues: &mut Vec<Issue>,
) {
    let Some(n) = value.as_f64() else {
        return;
    };

    // OpenAPI 3.0 spells exclusivity as a boolean next to minimum/maximum,
    // JSON Schema 2020-12 (OpenAPI 3.1) as a standalone number.
    let flag = |key: &str| schema.get(key).and_then(Value::as_bool).unwrap_or(false);
    let bound = |key: &str| schema.get(key).and_then(Value::as_f64);

    if let Some(min) = bound("minimum") {
        if flag("exclusiveMinimum") && n <= min {
            issues.push(too_small(path, format!("Number must be greater than {min}")));
        } else if n < min {
            issues.push(too_small(
                path,
                format!("Number must be greater than or equal to {min}"),
            ));
        }
    }
    if let Some(min) = bound("exclusiveMinimum") {
        if n <= min {
            issues.push(too_small(path, format!("Number must be greater than {min}")));
        }
    }
    if let Some(max) = bound("maximum") {
        if flag("exclusiveMaximum") && n >= max {
            issues.push(too_big(path, format!("Number must be less than {max}")));
        } else if n > max {
            issues.push(too_big(
                path,
                format!("Number must be less than or equal to {max}"),
            ));
        }
    }
    if let Some(max) = bound("exclusiveMaximum") {
        if n >= max {
            issues.push(too_big(path, format!("Number must be less than {max}")));
        }
    }
}

fn too_small(path: &[PathSegment], message: String) -> Issue {
    Issue::new(IssueCode::TooSmall, path.to_vec(), message)
}

fn too_big(path: &[PathSegment], message: String) -> Issue {
    Issue::new(IssueCode::TooBig, path.to_vec(), message)
}

fn collect<T: ToSchema>() -> (String, Map<String, Value>) {
    let name = T::name().to_string();
    let mut schemas = vec![(name.clone(), <T as utoipa::PartialSchema>::schema())];
    T::schemas(&mut schemas);

    let mut components = Map::new();
    for (component, schema) in schemas {
        match serde_json::to_value(&schema) {
            Ok(json) => {
                components.entry(component).or_insert(json);
            }
            Err(e) => tracing::warn!(component, error = %e, "schema is not serializable"),
        }
    }
    (name, components)
}

fn component_ref(name: &str) -> Value {
    serde_json::json!({ "$ref": format!("{COMPONENT_PREFIX}{name}") })
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn single_type_matches(expected: &str, value: &Value) -> bool {
    match expected {
        "null" => value.is_null(),
        "boolean" => value.is_boolean(),
        "string" => value.is_string(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        "number" => value.is_number(),
        "integer" => {
            value.is_i64()
                || value.is_u64()
                || value.as_f64().is_some_and(|f| f.fract() == 0.0)
        }
        _ => true,
    }
}

fn type_matches(expected: &Value, value: &Value) -> bool {
    match expected {
        Value::String(t) => single_type_matches(t, value),
        Value::Array(types) => types
            .iter()
            .filter_map(Value::as_str)
            .any(|t| single_type_matches(t, value)),
        _ => true,
    }
}

fn describe_types(expected: &Value) -> String {
    match expected {
        Value::String(t) => t.clone(),
        Value::Array(types) => types
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(" | "),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize, Deserialize, ToSchema)]
    #[allow(dead_code)]
    struct Contact {
        name: String,
        #[schema(format = "email")]
        email: String,
        age: f64,
        nickname: Option<String>,
    }

    #[derive(Serialize, Deserialize, ToSchema)]
    #[allow(dead_code)]
    struct Team {
        #[schema(min_length = 2, max_length = 5)]
        code: String,
        #[schema(minimum = 1, maximum = 10)]
        size: i32,
        lead: Contact,
        members: Vec<Contact>,
    }

    fn contact() -> Value {
        json!({ "name": "Ann", "email": "ann@example.com", "age": 30 })
    }

    #[test]
    fn derived_schema_accepts_valid_value() {
        assert!(SchemaDoc::of::<Contact>().validate(&contact()).is_empty());
    }

    #[test]
    fn missing_field_reports_required() {
        let issues = SchemaDoc::of::<Contact>().validate(&json!({ "name": "Ann", "age": 3 }));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, IssueCode::InvalidType);
        assert_eq!(issues[0].path, vec![PathSegment::from("email")]);
        assert_eq!(issues[0].message, "Required");
    }

    #[test]
    fn wrong_type_names_both_kinds() {
        let mut value = contact();
        value["name"] = json!(42);
        let issues = SchemaDoc::of::<Contact>().validate(&value);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].message, "Expected string, received number");
        assert!(issues[0].touches("name"));
    }

    #[test]
    fn malformed_email_is_invalid_string() {
        let mut value = contact();
        value["email"] = json!("not-an-email");
        let issues = SchemaDoc::of::<Contact>().validate(&value);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, IssueCode::InvalidString);
        assert_eq!(issues[0].message, "Invalid email");
        assert!(issues[0].touches("email"));
    }

    #[test]
    fn optional_field_accepts_null_and_rejects_wrong_type() {
        let doc = SchemaDoc::of::<Contact>();

        let mut value = contact();
        value["nickname"] = Value::Null;
        assert!(doc.validate(&value).is_empty());

        value["nickname"] = json!(true);
        let issues = doc.validate(&value);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].touches("nickname"));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let mut value = contact();
        value["id"] = json!("client-supplied");
        assert!(SchemaDoc::of::<Contact>().validate(&value).is_empty());
    }

    #[test]
    fn nested_refs_and_arrays_report_full_path() {
        let mut bad = contact();
        bad["email"] = json!("nope");
        let value = json!({
            "code": "ABC",
            "size": 3,
            "lead": contact(),
            "members": [contact(), bad],
        });

        let issues = SchemaDoc::of::<Team>().validate(&value);
        assert_eq!(issues.len(), 1);
        assert_eq!(
            issues[0].path,
            vec![
                PathSegment::from("members"),
                PathSegment::Index(1),
                PathSegment::from("email")
            ]
        );
    }

    #[test]
    fn length_and_range_bounds() {
        let value = json!({
            "code": "A",
            "size": 11,
            "lead": contact(),
            "members": [],
        });
        let issues = SchemaDoc::of::<Team>().validate(&value);
        let codes: Vec<_> = issues.iter().map(|i| i.code).collect();
        assert!(codes.contains(&IssueCode::TooSmall));
        assert!(codes.contains(&IssueCode::TooBig));
    }

    #[test]
    fn integer_rejects_fractions() {
        let value = json!({
            "code": "AB",
            "size": 2.5,
            "lead": contact(),
            "members": [],
        });
        let issues = SchemaDoc::of::<Team>().validate(&value);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].message, "Expected integer, received number");
    }

    #[test]
    fn array_of_checks_every_item() {
        let doc = SchemaDoc::array_of::<Contact>();
        assert_eq!(doc.name(), "Array<Contact>");
        assert!(doc.validate(&json!([contact(), contact()])).is_empty());

        let issues = doc.validate(&json!([contact(), { "name": "x" }]));
        assert!(issues
            .iter()
            .all(|i| i.path.first() == Some(&PathSegment::Index(1))));

        let issues = doc.validate(&json!({}));
        assert_eq!(issues[0].message, "Expected array, received object");
    }

    #[test]
    fn raw_keywords_enum_union_and_exclusive_bounds() {
        let doc = SchemaDoc::from_parts(
            "Raw",
            json!({
                "type": "object",
                "properties": {
                    "color": { "enum": ["red", "green"] },
                    "ratio": { "type": "number", "exclusiveMinimum": 0, "exclusiveMaximum": 1 },
                    "legacy": { "type": "number", "minimum": 0, "exclusiveMinimum": true },
                    "choice": { "oneOf": [{ "type": "string" }, { "type": "integer" }] }
                }
            }),
            Map::new(),
        );

        assert!(doc
            .validate(&json!({ "color": "red", "ratio": 0.5, "legacy": 1, "choice": 3 }))
            .is_empty());

        let issues = doc.validate(&json!({
            "color": "blue",
            "ratio": 1,
            "legacy": 0,
            "choice": false
        }));
        let codes: Vec<_> = issues.iter().map(|i| i.code).collect();
        assert!(codes.contains(&IssueCode::InvalidEnumValue));
        assert!(codes.contains(&IssueCode::TooBig));
        assert!(codes.contains(&IssueCode::TooSmall));
        assert!(codes.contains(&IssueCode::InvalidUnion));
    }

    #[test]
    fn issue_serializes_with_snake_case_code() {
        let issue = Issue::new(
            IssueCode::InvalidString,
            vec![PathSegment::from("email")],
            "Invalid email",
        );
        assert_eq!(
            serde_json::to_value(&issue).unwrap(),
            json!({ "code": "invalid_string", "path": ["email"], "message": "Invalid email" })
        );
        assert_eq!(issue.to_string(), "email: Invalid email");
    }
}
