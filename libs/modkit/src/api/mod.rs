//! HTTP plumbing shared by every module: the type-safe operation builder,
//! schema validation, validating extractors and responders, and the error
//! boundary.

pub mod error;
pub mod error_layer;
pub mod extract;
pub mod operation_builder;
pub mod response;
pub mod schema;

pub use error::{ApiError, ApiResult, ErrorBody, ErrorDetails};
pub use error_layer::{error_mapping_middleware, panic_to_api_error, REQUEST_ID_HEADER};
pub use extract::{ValidJson, ValidPath};
pub use operation_builder::{
    ensure_schema, state, Missing, OpenApiRegistry, OperationBuilder, OperationSpec,
    ParamLocation, ParamSpec, Present, RequestBodySpec, ResponseSpec, SchemaCollection, SchemaRef,
};
pub use response::{checked_json, checked_json_array, no_content};
pub use schema::{Issue, IssueCode, PathSegment, SchemaDoc};
