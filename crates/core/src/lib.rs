//! Shared domain types for EcoCusco: error taxonomy, id/timestamp aliases,
//! the material-type allow-list, and the declarative validation engine.

pub mod error;
pub mod material;
pub mod types;
pub mod validation;

pub use error::CoreError;
