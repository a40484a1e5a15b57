use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

use rbac_shield_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

/// Opaque identifier naming a class of requester privilege.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(NonEmptyString);

impl Role {
    /// Creates a validated role identifier.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        NonEmptyString::new(value)
            .map(Self)
            .map_err(|_| AppError::Validation("role name must not be empty".to_owned()))
    }

    /// Returns the role identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for Role {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Declared roles in declaration order.
///
/// Membership is unique: declaring the same role twice is a configuration error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Role>", into = "Vec<Role>")]
pub struct RoleSet {
    roles: Vec<Role>,
}

impl RoleSet {
    /// Creates a role set, rejecting duplicate declarations.
    pub fn new(roles: impl IntoIterator<Item = Role>) -> AppResult<Self> {
        let roles: Vec<Role> = roles.into_iter().collect();
        let mut seen = BTreeSet::new();

        for role in &roles {
            if !seen.insert(role.as_str()) {
                return Err(AppError::Validation(format!(
                    "role '{role}' is declared more than once"
                )));
            }
        }

        Ok(Self { roles })
    }

    /// Parses and validates raw role names.
    pub fn from_names<I, S>(names: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let roles = names
            .into_iter()
            .map(Role::new)
            .collect::<AppResult<Vec<_>>>()?;
        Self::new(roles)
    }

    /// Iterates roles in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Role> {
        self.roles.iter()
    }

    /// Returns whether the role name is declared.
    #[must_use]
    pub fn contains(&self, role: &str) -> bool {
        self.roles.iter().any(|value| value.as_str() == role)
    }

    /// Returns the number of declared roles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Returns whether no role is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

impl TryFrom<Vec<Role>> for RoleSet {
    type Error = AppError;

    fn try_from(value: Vec<Role>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RoleSet> for Vec<Role> {
    fn from(value: RoleSet) -> Self {
        value.roles
    }
}
