//! Read-only document model: fqn paths and the parsed node tree.

mod fqn;
mod node;

pub use fqn::Fqn;
pub use node::{is_expression_token, DocumentNode, FieldValue};
