use std::collections::BTreeMap;

use modkit::api::{OperationSpec, ParamLocation, RequestBodySpec, ResponseSpec, SchemaRef};
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::config::OpenApiMetaConfig;
use crate::model::ComponentsRegistry;

pub const OPENAPI_VERSION: &str = "3.0.3";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenApi {
    pub openapi: &'static str,
    pub info: OpenApiInfo,
    pub servers: Vec<OpenApiServer>,
    pub tags: Vec<OpenApiTag>,
    pub paths: BTreeMap<String, BTreeMap<String, Value>>,
    pub components: OpenApiComponents,
    pub external_docs: ExternalDocs,
}

#[derive(Debug, Serialize)]
pub struct OpenApiInfo {
    pub title: String,
    pub description: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct OpenApiServer {
    pub url: String,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct OpenApiTag {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct ExternalDocs {
    pub url: String,
    pub description: String,
}

#[derive(Debug, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct OpenApiComponents {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub schemas: BTreeMap<String, Value>,
    pub security_schemes: BTreeMap<String, Value>,
}

impl OpenApi {
    /// Assemble the document from operation specs and registered components.
    pub fn build<'a>(
        meta: &OpenApiMetaConfig,
        specs: impl IntoIterator<Item = &'a OperationSpec>,
        components: &ComponentsRegistry,
    ) -> Self {
        let mut paths: BTreeMap<String, BTreeMap<String, Value>> = BTreeMap::new();
        for spec in specs {
            paths
                .entry(spec.path.clone())
                .or_default()
                .insert(spec.method.as_str().to_lowercase(), operation(spec));
        }

        // Declared for clients; no route enforces it
        let mut security_schemes = BTreeMap::new();
        security_schemes.insert(
            "apiKey".to_string(),
            json!({ "type": "apiKey", "name": "apiKey", "in": "header" }),
        );

        Self {
            openapi: OPENAPI_VERSION,
            info: OpenApiInfo {
                title: meta.title.clone(),
                description: meta.description.clone(),
                version: meta.version.clone(),
            },
            servers: vec![OpenApiServer {
                url: meta.server_url.clone(),
                description: meta.server_description.clone(),
            }],
            tags: meta
                .tags
                .iter()
                .map(|t| OpenApiTag {
                    name: t.name.clone(),
                    description: t.description.clone(),
                })
                .collect(),
            paths,
            components: OpenApiComponents {
                schemas: components.schemas.clone(),
                security_schemes,
            },
            external_docs: ExternalDocs {
                url: meta.external_docs_url.clone(),
                description: meta.external_docs_description.clone(),
            },
        }
    }
}

fn component_ref(name: &str) -> Value {
    json!({ "$ref": format!("#/components/schemas/{name}") })
}

fn schema_value(schema: &SchemaRef) -> Value {
    match schema {
        SchemaRef::Component(name) => component_ref(name),
        SchemaRef::ArrayOf(name) => json!({ "type": "array", "items": component_ref(name) }),
    }
}

fn operation(spec: &OperationSpec) -> Value {
    let mut op = Map::new();

    // Prefer explicit operation_id, fallback to handler_id
    let op_id = spec
        .operation_id
        .clone()
        .unwrap_or_else(|| spec.handler_id.clone());
    op.insert("operationId".into(), Value::String(op_id));

    if let Some(summary) = &spec.summary {
        op.insert("summary".into(), Value::String(summary.clone()));
    }
    if let Some(description) = &spec.description {
        op.insert("description".into(), Value::String(description.clone()));
    }
    if !spec.tags.is_empty() {
        op.insert("tags".into(), json!(spec.tags));
    }

    if !spec.params.is_empty() {
        let params: Vec<Value> = spec
            .params
            .iter()
            .map(|p| {
                let mut param = json!({
                    "name": p.name,
                    "in": p.location.as_str(),
                    // OpenAPI requires all path params to be required
                    "required": p.location == ParamLocation::Path || p.required,
                    "schema": { "type": p.param_type },
                });
                if let Some(desc) = &p.description {
                    param["description"] = Value::String(desc.clone());
                }
                param
            })
            .collect();
        op.insert("parameters".into(), Value::Array(params));
    }

    if let Some(body) = &spec.request_body {
        op.insert("requestBody".into(), request_body(body));
    }

    let responses: Map<String, Value> = spec
        .responses
        .iter()
        .map(|r| (r.status.to_string(), response(r)))
        .collect();
    op.insert("responses".into(), Value::Object(responses));

    Value::Object(op)
}

fn request_body(body: &RequestBodySpec) -> Value {
    let mut rb = json!({
        "required": body.required,
        "content": {
            body.content_type: { "schema": component_ref(&body.schema_name) }
        }
    });
    if let Some(desc) = &body.description {
        rb["description"] = Value::String(desc.clone());
    }
    rb
}

fn response(resp: &ResponseSpec) -> Value {
    let mut obj = json!({ "description": resp.description });
    if let Some(content_type) = resp.content_type {
        let schema = resp
            .schema
            .as_ref()
            .map(schema_value)
            .unwrap_or_else(|| json!({}));
        obj["content"] = json!({ content_type: { "schema": schema } });
    }
    obj
}
