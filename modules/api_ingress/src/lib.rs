use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arc_swap::ArcSwap;
use axum::http::{header, Method};
use axum::response::IntoResponse;
use axum::{extract::DefaultBodyLimit, middleware::from_fn, routing::get, Router};
use dashmap::DashMap;
use modkit::api::{OpenApiRegistry, OperationSpec, SchemaCollection};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
};

mod config;
mod model;
mod openapi;
pub mod request_id;
mod web;

pub use config::{ApiIngressConfig, OpenApiMetaConfig, TagConfig};
pub use openapi::OpenApi;

use model::{ComponentsRegistry, Registration};

/// API ingress: owns the HTTP router and collects typed operation specs to
/// emit a single OpenAPI document.
pub struct ApiIngress {
    // Lock-free config using arc-swap for read-mostly access
    config: ArcSwap<ApiIngressConfig>,
    // Copy-on-write components registry
    components_registry: ArcSwap<ComponentsRegistry>,

    // Duplicate detection (per (method, path) and per handler id)
    registered_routes: DashMap<(Method, String), ()>,
    registered_handlers: DashMap<String, ()>,

    // Operation specs for OpenAPI generation, keyed by "METHOD:path"
    operation_specs: DashMap<String, OperationSpec>,
}

impl Default for ApiIngress {
    fn default() -> Self {
        Self::new(ApiIngressConfig::default())
    }
}

impl ApiIngress {
    pub fn new(config: ApiIngressConfig) -> Self {
        Self {
            config: ArcSwap::from_pointee(config),
            components_registry: ArcSwap::from_pointee(ComponentsRegistry::default()),
            registered_routes: DashMap::new(),
            registered_handlers: DashMap::new(),
            operation_specs: DashMap::new(),
        }
    }

    /// Current configuration (cheap clone from ArcSwap)
    pub fn get_config(&self) -> ApiIngressConfig {
        (**self.config.load()).clone()
    }

    pub fn operation_count(&self) -> usize {
        self.operation_specs.len()
    }

    /// Build the OpenAPI document from registered operations and components.
    pub fn build_openapi(&self) -> OpenApi {
        let components = self.components_registry.load();
        let specs: Vec<OperationSpec> = self
            .operation_specs
            .iter()
            .map(|entry| entry.value().clone())
            .collect();

        tracing::info!("Building OpenAPI: found {} registered operations", specs.len());
        OpenApi::build(&self.get_config().openapi, &specs, &components)
    }

    /// Write the pretty-printed document to `path`, creating parent
    /// directories and overwriting any previous file.
    pub fn export_openapi(&self, path: &Path) -> Result<()> {
        if !self.get_config().enable_docs {
            anyhow::bail!("API documentation is disabled (api_ingress.enable_docs = false)");
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(&self.build_openapi())?;
        std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;

        tracing::info!(path = %path.display(), "OpenAPI document written");
        Ok(())
    }

    /// Global middleware, outermost first:
    /// PropagateRequestId -> SetRequestId -> push_req_id_to_extensions -> Trace
    /// -> error boundary -> panic catcher -> CORS -> DefaultBodyLimit
    ///
    /// The body limit is enforced where `ValidJson` buffers the body, so an
    /// oversized request is a validation error rendered by the boundary.
    fn apply_middleware(&self, mut router: Router) -> Router {
        let config = self.get_config();
        let x_request_id = request_id::header();

        // Layers are added innermost first
        router = router.layer(DefaultBodyLimit::max(config.body_limit_bytes));
        if config.cors_enabled {
            router = router.layer(CorsLayer::permissive());
        }
        router = router.layer(CatchPanicLayer::custom(modkit::panic_to_api_error));
        router = router.layer(from_fn(modkit::error_mapping_middleware));
        router = router.layer(request_id::create_trace_layer());
        router = router.layer(from_fn(request_id::push_req_id_to_extensions));
        router = router.layer(SetRequestIdLayer::new(
            x_request_id.clone(),
            request_id::MakeReqId,
        ));
        router.layer(PropagateRequestIdLayer::new(x_request_id))
    }

    /// Bind the configured address and serve `router` until `shutdown` resolves.
    pub async fn serve<F>(&self, router: Router, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.get_config().bind_addr;
        let listener = tokio::net::TcpListener::bind(&bind_addr)
            .await
            .with_context(|| format!("failed to bind {bind_addr}"))?;
        let addr = listener.local_addr()?;
        tracing::info!("Server listening at http://{addr}");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .context("HTTP server failed")?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

// REST host role: finalize the router, but do not start the server here.
impl modkit::contracts::RestHostModule for ApiIngress {
    fn rest_finalize(&self, mut router: Router) -> Result<Router> {
        let config = self.get_config();

        if config.enable_docs {
            // Build once, serve as static JSON (no per-request rebuild)
            let openapi_value = Arc::new(serde_json::to_value(self.build_openapi())?);

            router = router
                .route(
                    "/openapi.json",
                    get(move || {
                        let v = openapi_value.clone();
                        async move {
                            let json = axum::Json((*v).clone());
                            ([(header::CACHE_CONTROL, "no-store")], json).into_response()
                        }
                    }),
                )
                .route("/docs", get(web::serve_docs));
        }

        // Unknown paths and unsupported methods on known paths share one 404 body
        router = router
            .fallback(web::not_found)
            .method_not_allowed_fallback(web::not_found);

        tracing::debug!(
            operations = self.operation_count(),
            docs = config.enable_docs,
            "REST host finalized router"
        );
        Ok(self.apply_middleware(router))
    }

    fn as_registry(&self) -> &dyn OpenApiRegistry {
        self
    }
}

impl OpenApiRegistry for ApiIngress {
    fn register_operation(&self, spec: &OperationSpec) {
        // "First wins": a second registration is a programmer error
        if self
            .registered_handlers
            .insert(spec.handler_id.clone(), ())
            .is_some()
        {
            tracing::error!(
                handler_id = %spec.handler_id,
                method = %spec.method.as_str(),
                path = %spec.path,
                "Duplicate handler_id detected; ignoring subsequent registration"
            );
            return;
        }

        let route_key = (spec.method.clone(), spec.path.clone());
        if self.registered_routes.insert(route_key, ()).is_some() {
            tracing::error!(
                method = %spec.method.as_str(),
                path = %spec.path,
                "Duplicate (method, path) detected; ignoring subsequent registration"
            );
            return;
        }

        let operation_key = format!("{}:{}", spec.method.as_str(), spec.path);
        self.operation_specs.insert(operation_key.clone(), spec.clone());

        tracing::debug!(
            handler_id = %spec.handler_id,
            summary = %spec.summary.as_deref().unwrap_or("No summary"),
            operation_key = %operation_key,
            total_operations = self.operation_specs.len(),
            "Registered API operation"
        );
    }

    fn ensure_schema_raw(&self, root_name: &str, schemas: SchemaCollection) -> String {
        // Snapshot current registry, copy-on-write
        let current = self.components_registry.load();
        let mut reg = (**current).clone();
        let mut changed = false;

        for (name, schema) in schemas {
            let json = match serde_json::to_value(&schema) {
                Ok(v) => v,
                Err(e) => {
                    tracing::error!(%name, error = %e, "Failed to serialize schema to JSON");
                    continue;
                }
            };

            match reg.register_schema(name.clone(), json) {
                Registration::Inserted => {
                    tracing::debug!(%name, "Registered schema");
                    changed = true;
                }
                Registration::Identical => {}
                Registration::Conflict => tracing::error!(
                    %name,
                    "Conflicting schema content under the same component key; keeping the first"
                ),
            }
        }

        if changed {
            self.components_registry.store(Arc::new(reg));
        }
        root_name.to_string()
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
