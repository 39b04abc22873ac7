//! Type-safe API operation builder with compile-time guarantees
//!
//! This module implements a type-state builder pattern that ensures:
//! - `register()` cannot be called unless a handler is set
//! - `register()` cannot be called unless at least one response is declared
//! - Descriptive methods remain available at any stage
//! - Request bodies, path parameters and responses are declared from the same
//!   `utoipa` derives that the validating extractors and responders use, so the
//!   published document and the runtime checks cannot drift apart.

use axum::{
    handler::Handler,
    routing::{MethodFilter, MethodRouter},
    Router,
};
use http::Method;
use std::marker::PhantomData;
use utoipa::openapi::path::ParameterIn;

use crate::api::error::ErrorBody;

/// Type alias for schema collections used in API operations.
pub type SchemaCollection = Vec<(
    String,
    utoipa::openapi::RefOr<utoipa::openapi::schema::Schema>,
)>;

/// Type-state markers for compile-time enforcement
pub mod state {
    /// Marker for missing required components
    #[derive(Debug, Clone, Copy)]
    pub struct Missing;

    /// Marker for present required components
    #[derive(Debug, Clone, Copy)]
    pub struct Present;
}

mod sealed {
    pub trait Sealed {}
}

/// Maps handler state to the concrete router slot type.
/// For `Missing` there is no router slot; for `Present` it is `MethodRouter<S>`.
pub trait HandlerSlot<S>: sealed::Sealed {
    type Slot;
}

impl sealed::Sealed for Missing {}
impl sealed::Sealed for Present {}

impl<S> HandlerSlot<S> for Missing {
    type Slot = ();
}
impl<S> HandlerSlot<S> for Present {
    type Slot = MethodRouter<S>;
}

pub use state::{Missing, Present};

/// Parameter specification for API operations
#[derive(Clone, Debug)]
pub struct ParamSpec {
    pub name: String,
    pub location: ParamLocation,
    pub required: bool,
    pub description: Option<String>,
    pub param_type: String, // JSON Schema type (string, integer, etc.)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParamLocation {
    Path,
    Query,
    Header,
    Cookie,
}

impl ParamLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamLocation::Path => "path",
            ParamLocation::Query => "query",
            ParamLocation::Header => "header",
            ParamLocation::Cookie => "cookie",
        }
    }

    fn from_openapi(value: &str) -> Self {
        match value {
            "query" => ParamLocation::Query,
            "header" => ParamLocation::Header,
            "cookie" => ParamLocation::Cookie,
            _ => ParamLocation::Path,
        }
    }
}

/// Request body specification for API operations
#[derive(Clone, Debug)]
pub struct RequestBodySpec {
    pub content_type: &'static str,
    pub description: Option<String>,
    /// Name of a registered component schema, referenced by `$ref`.
    pub schema_name: String,
    /// Whether request body is required (OpenAPI default is `false`).
    pub required: bool,
}

/// How a response body refers to registered component schemas.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SchemaRef {
    /// `{"$ref": "#/components/schemas/<name>"}`
    Component(String),
    /// `{"type": "array", "items": {"$ref": ...}}`
    ArrayOf(String),
}

/// Response specification for API operations
#[derive(Clone, Debug)]
pub struct ResponseSpec {
    pub status: u16,
    /// `None` for responses without a body (e.g. 204).
    pub content_type: Option<&'static str>,
    pub description: String,
    pub schema: Option<SchemaRef>,
}

/// Operation specification collected by the type-safe builder
#[derive(Clone, Debug)]
pub struct OperationSpec {
    pub method: Method,
    pub path: String,
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub params: Vec<ParamSpec>,
    pub request_body: Option<RequestBodySpec>,
    pub responses: Vec<ResponseSpec>,
    /// Handler identity derived from method and path
    pub handler_id: String,
}

/// Registry trait for OpenAPI operations and schemas
pub trait OpenApiRegistry {
    /// Register an API operation specification
    fn register_operation(&self, spec: &OperationSpec);

    /// Ensure schema for `T` (including transitive dependencies) is registered
    /// under components and return the canonical component name for `$ref`.
    /// This is a type-erased version for dyn compatibility.
    fn ensure_schema_raw(&self, name: &str, schemas: SchemaCollection) -> String;

    /// Downcast support for accessing the concrete implementation if needed.
    fn as_any(&self) -> &dyn std::any::Any;
}

/// Register `T` and everything it references; returns the component name.
pub fn ensure_schema<T: utoipa::ToSchema + 'static>(registry: &dyn OpenApiRegistry) -> String {
    let root_name = T::name().to_string();

    // T's own schema goes first (the actual object, not a ref)
    let mut collected: SchemaCollection =
        vec![(root_name.clone(), <T as utoipa::PartialSchema>::schema())];
    T::schemas(&mut collected);

    registry.ensure_schema_raw(&root_name, collected)
}

/// Type-safe operation builder with compile-time guarantees.
///
/// Generic parameters:
/// - `H`: Handler state (Missing | Present)
/// - `R`: Response state (Missing | Present)
/// - `S`: Router state type (what you put into `Router::with_state(S)`).
pub struct OperationBuilder<H, R, S>
where
    H: HandlerSlot<S>,
{
    spec: OperationSpec,
    method_filter: MethodFilter,
    method_router: <H as HandlerSlot<S>>::Slot,
    _has_handler: PhantomData<H>,
    _has_response: PhantomData<R>,
    #[allow(clippy::type_complexity)]
    _state: PhantomData<fn() -> S>,
}

// -------------------------------------------------------------------------------------------------
// Constructors: start with both handler and response missing
// -------------------------------------------------------------------------------------------------
impl<S> OperationBuilder<Missing, Missing, S> {
    fn new(method: Method, method_filter: MethodFilter, path: impl Into<String>) -> Self {
        let path_str = path.into();
        let handler_id = format!(
            "{}:{}",
            method.as_str().to_lowercase(),
            path_str.replace(['/', '{', '}'], "_")
        );

        Self {
            spec: OperationSpec {
                method,
                path: path_str,
                operation_id: None,
                summary: None,
                description: None,
                tags: Vec::new(),
                params: Vec::new(),
                request_body: None,
                responses: Vec::new(),
                handler_id,
            },
            method_filter,
            method_router: (),
            _has_handler: PhantomData,
            _has_response: PhantomData,
            _state: PhantomData,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, MethodFilter::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, MethodFilter::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, MethodFilter::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, MethodFilter::DELETE, path)
    }
}

// -------------------------------------------------------------------------------------------------
// Descriptive methods: available at any stage
// -------------------------------------------------------------------------------------------------
impl<H, R, S> OperationBuilder<H, R, S>
where
    H: HandlerSlot<S>,
{
    /// The operation as declared so far.
    pub fn spec(&self) -> &OperationSpec {
        &self.spec
    }

    pub fn operation_id(mut self, id: impl Into<String>) -> Self {
        self.spec.operation_id = Some(id.into());
        self
    }

    pub fn summary(mut self, text: impl Into<String>) -> Self {
        self.spec.summary = Some(text.into());
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.spec.description = Some(text.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.spec.tags.push(tag.into());
        self
    }

    /// Declare path parameters from a struct deriving `utoipa::IntoParams`.
    ///
    /// The same struct is what `ValidPath<T>` extracts, so names, types and
    /// descriptions are declared once.
    pub fn path_params<T: utoipa::IntoParams>(mut self) -> Self {
        for param in T::into_params(|| Some(ParameterIn::Path)) {
            let Ok(raw) = serde_json::to_value(&param) else {
                continue;
            };
            let name = raw["name"].as_str().unwrap_or_default().to_string();
            if name.is_empty() {
                continue;
            }
            self.spec.params.push(ParamSpec {
                name,
                location: ParamLocation::from_openapi(raw["in"].as_str().unwrap_or("path")),
                required: raw["required"].as_bool().unwrap_or(true),
                description: raw["description"].as_str().map(str::to_string),
                param_type: raw["schema"]["type"]
                    .as_str()
                    .unwrap_or("string")
                    .to_string(),
            });
        }
        self
    }

    /// Attach a required JSON request body and register its schema.
    pub fn json_request<T>(mut self, registry: &dyn OpenApiRegistry, desc: impl Into<String>) -> Self
    where
        T: utoipa::ToSchema + 'static,
    {
        let name = ensure_schema::<T>(registry);
        self.spec.request_body = Some(RequestBodySpec {
            content_type: "application/json",
            description: Some(desc.into()),
            schema_name: name,
            required: true,
        });
        self
    }

    /// Add a raw response spec. The first response moves `R` to `Present`.
    pub fn response(mut self, resp: ResponseSpec) -> OperationBuilder<H, Present, S> {
        self.spec.responses.push(resp);
        OperationBuilder {
            spec: self.spec,
            method_filter: self.method_filter,
            method_router: self.method_router,
            _has_handler: self._has_handler,
            _has_response: PhantomData::<Present>,
            _state: self._state,
        }
    }

    /// JSON response whose body is the registered schema of `T`.
    pub fn json_response_with_schema<T>(
        self,
        registry: &dyn OpenApiRegistry,
        status: u16,
        description: impl Into<String>,
    ) -> OperationBuilder<H, Present, S>
    where
        T: utoipa::ToSchema + 'static,
    {
        let name = ensure_schema::<T>(registry);
        self.response(ResponseSpec {
            status,
            content_type: Some("application/json"),
            description: description.into(),
            schema: Some(SchemaRef::Component(name)),
        })
    }

    /// JSON response whose body is an array of `T`.
    pub fn json_array_response_with_schema<T>(
        self,
        registry: &dyn OpenApiRegistry,
        status: u16,
        description: impl Into<String>,
    ) -> OperationBuilder<H, Present, S>
    where
        T: utoipa::ToSchema + 'static,
    {
        let name = ensure_schema::<T>(registry);
        self.response(ResponseSpec {
            status,
            content_type: Some("application/json"),
            description: description.into(),
            schema: Some(SchemaRef::ArrayOf(name)),
        })
    }

    /// Response without a body.
    pub fn empty_response(
        self,
        status: u16,
        description: impl Into<String>,
    ) -> OperationBuilder<H, Present, S> {
        self.response(ResponseSpec {
            status,
            content_type: None,
            description: description.into(),
            schema: None,
        })
    }

    /// Response rendered by the error boundary (`ErrorBody`).
    pub fn error_response(
        self,
        registry: &dyn OpenApiRegistry,
        status: u16,
        description: impl Into<String>,
    ) -> OperationBuilder<H, Present, S> {
        self.json_response_with_schema::<ErrorBody>(registry, status, description)
    }
}

// -------------------------------------------------------------------------------------------------
// Handler setting: transitions Missing -> Present for handler
// -------------------------------------------------------------------------------------------------
impl<R, S> OperationBuilder<Missing, R, S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Set the handler for this operation (function handlers are recommended).
    pub fn handler<F, T>(self, h: F) -> OperationBuilder<Present, R, S>
    where
        F: Handler<T, S> + Clone + Send + 'static,
        T: 'static,
    {
        OperationBuilder {
            spec: self.spec,
            method_filter: self.method_filter,
            method_router: axum::routing::on(self.method_filter, h),
            _has_handler: PhantomData::<Present>,
            _has_response: self._has_response,
            _state: self._state,
        }
    }
}

// -------------------------------------------------------------------------------------------------
// Registration: only available when both handler AND response are present
// -------------------------------------------------------------------------------------------------
impl<S> OperationBuilder<Present, Present, S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Register the operation with the router and OpenAPI registry.
    pub fn register(self, router: Router<S>, openapi: &dyn OpenApiRegistry) -> Router<S> {
        openapi.register_operation(&self.spec);
        router.route(&self.spec.path, self.method_router)
    }
}
