//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod document;
mod role;
mod schema_rule;

pub use document::RbacDocument;
pub use role::{Role, RoleSet};
pub use schema_rule::{LocationRule, SchemaPermissionTable};
