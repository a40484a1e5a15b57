use serde::{Deserialize, Serialize};

/// Requester identity resolved for a single request.
///
/// Only the role attribute takes part in authorization. A missing role is the
/// anonymous identity and never matches any declared role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedIdentity {
    #[serde(default)]
    role: Option<String>,
}

impl AuthenticatedIdentity {
    /// Creates an identity holding the given role.
    #[must_use]
    pub fn with_role(role: impl Into<String>) -> Self {
        Self {
            role: Some(role.into()),
        }
    }

    /// Creates an identity without any role.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Returns the role carried by the identity, if any.
    #[must_use]
    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    /// Returns whether no role is attached.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.role.is_none()
    }
}
