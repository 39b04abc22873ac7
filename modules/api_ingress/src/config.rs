use runtime::AppConfig;
use serde::{Deserialize, Serialize};

/// Default request body limit (16 MiB).
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 16 * 1024 * 1024;

/// API ingress configuration (`modules.api_ingress` in the config file).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiIngressConfig {
    /// `host:port`; overwritten from the `server` section when built from an [`AppConfig`].
    pub bind_addr: String,
    /// Serve `/openapi.json` and `/docs`, and allow exporting the document.
    pub enable_docs: bool,
    pub cors_enabled: bool,
    /// Larger request bodies fail validation before reaching handlers.
    pub body_limit_bytes: usize,
    pub openapi: OpenApiMetaConfig,
}

impl Default for ApiIngressConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            enable_docs: true,
            cors_enabled: false,
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
            openapi: OpenApiMetaConfig::default(),
        }
    }
}

impl ApiIngressConfig {
    /// Module section of `app` (defaults when absent) bound to the server address.
    pub fn from_app_config(app: &AppConfig) -> anyhow::Result<Self> {
        let mut cfg: Self = app.module_config_required("api_ingress")?;
        cfg.bind_addr = app.server.bind_addr();
        Ok(cfg)
    }
}

/// Document-level metadata of the published OpenAPI document.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct OpenApiMetaConfig {
    pub title: String,
    pub description: String,
    pub version: String,
    pub server_url: String,
    pub server_description: String,
    pub tags: Vec<TagConfig>,
    pub external_docs_url: String,
    pub external_docs_description: String,
}

impl Default for OpenApiMetaConfig {
    fn default() -> Self {
        Self {
            title: "Users API".to_string(),
            description: "API documentation for the users service".to_string(),
            version: "1.0.0".to_string(),
            server_url: "http://localhost:3000".to_string(),
            server_description: "Local server".to_string(),
            tags: vec![TagConfig {
                name: "users".to_string(),
                description: "User operations".to_string(),
            }],
            external_docs_url: "https://docs.rs/axum".to_string(),
            external_docs_description: "axum documentation".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TagConfig {
    pub name: String,
    pub description: String,
}
