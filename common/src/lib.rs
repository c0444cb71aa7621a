//! Shared catalog vocabulary: entities, request payloads and the field
//! validation rules applied to them.

pub mod errors;
pub mod models;
pub mod validation;

pub use errors::*;
pub use models::*;
