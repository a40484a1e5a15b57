use std::collections::BTreeMap;
use std::sync::Arc;

use rbac_shield_core::AuthenticatedIdentity;
use rbac_shield_domain::{Role, RoleSet};

/// Exact-match test for one declared role.
#[derive(Debug, PartialEq, Eq)]
pub struct RolePredicate {
    role: Role,
}

impl RolePredicate {
    pub(crate) fn new(role: Role) -> Self {
        Self { role }
    }

    /// Returns the role this predicate tests for.
    #[must_use]
    pub fn role(&self) -> &Role {
        &self.role
    }

    /// Returns whether the identity holds exactly this role.
    #[must_use]
    pub fn matches(&self, identity: &AuthenticatedIdentity) -> bool {
        identity.role() == Some(self.role.as_str())
    }
}

/// One shared predicate per declared role.
#[derive(Debug, Default)]
pub(crate) struct RolePredicateTable {
    predicates: BTreeMap<Role, Arc<RolePredicate>>,
}

impl RolePredicateTable {
    pub(crate) fn build(roles: &RoleSet) -> Self {
        let predicates = roles
            .iter()
            .map(|role| (role.clone(), Arc::new(RolePredicate::new(role.clone()))))
            .collect();

        Self { predicates }
    }

    pub(crate) fn get(&self, role: &Role) -> Option<Arc<RolePredicate>> {
        self.predicates.get(role).cloned()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.predicates.len()
    }
}
