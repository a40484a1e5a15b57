use rbac_shield_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::{RoleSet, SchemaPermissionTable};

/// Serializable RBAC configuration: declared roles plus the schema table.
///
/// Both attributes are required. Role references are checked when the
/// document is compiled, not when it is parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RbacDocument {
    /// Declared roles in declaration order.
    pub roles: RoleSet,
    /// Schema permission table.
    pub schema: SchemaPermissionTable,
}

impl RbacDocument {
    /// Creates a document from its parts.
    #[must_use]
    pub fn new(roles: RoleSet, schema: SchemaPermissionTable) -> Self {
        Self { roles, schema }
    }

    /// Parses a JSON document.
    pub fn from_json(payload: &str) -> AppResult<Self> {
        serde_json::from_str(payload)
            .map_err(|error| AppError::Validation(format!("malformed rbac document: {error}")))
    }
}
