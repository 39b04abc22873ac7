// === PUBLIC CONTRACT ===
// Only the contract module should be public for other modules to consume
pub mod contract;
pub use contract::model;

// === MODULE DEFINITION ===
pub mod module;
pub use module::UsersInfo;

// === INTERNAL MODULES ===
// Exposed for integration tests; the contract module is the stable API.
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
