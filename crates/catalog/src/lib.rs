//! C3 Tool Catalog — typed tool schemas, danger classifier, input
//! validation (§4.3).

pub mod catalog;
pub mod danger;
pub mod schema;
pub mod tools;
pub mod validate;

pub use catalog::Catalog;
pub use danger::is_dangerous_command;
pub use schema::{ToolFamily, ToolSchema};
pub use validate::{validate_input, ValidationError};
