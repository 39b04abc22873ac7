use axum::Router;

pub use crate::api::OpenApiRegistry;

/// Pure wiring; must be sync. Adds the module's routes and their docs.
pub trait RestfulModule: Send + Sync {
    fn register_rest(&self, router: Router, openapi: &dyn OpenApiRegistry)
        -> anyhow::Result<Router>;
}

/// REST host module: owns the ingress router and the OpenAPI registry.
/// Must be sync; does not start the server.
pub trait RestHostModule: Send + Sync + 'static {
    /// Attach /openapi.json, /docs, the fallback and the global middleware.
    fn rest_finalize(&self, router: Router) -> anyhow::Result<Router>;

    /// Registry that feature modules register their operations with.
    fn as_registry(&self) -> &dyn OpenApiRegistry;
}
