use std::collections::{BTreeMap, BTreeSet};

use rbac_shield_core::{AppError, AppResult};
use rbac_shield_domain::{LocationRule, Role, RoleSet, SchemaPermissionTable};
use tracing::debug;

use crate::role_predicates::RolePredicateTable;

use super::{CombinedPredicate, PermissionNode, PermissionTree};

impl PermissionTree {
    /// Compiles a schema permission table against the declared roles.
    ///
    /// Fails with a validation error when the table names a role that is not
    /// declared. A role listed twice for the same location is kept once.
    pub fn compile(roles: &RoleSet, table: &SchemaPermissionTable) -> AppResult<Self> {
        let predicates = RolePredicateTable::build(roles);
        let mut nodes = BTreeMap::new();

        for (location, rule) in table.iter() {
            let node = match rule {
                LocationRule::WholeType(permitted) => PermissionNode::WholeType(combine(
                    &predicates,
                    permitted,
                    location.as_str(),
                )?),
                LocationRule::Fields(fields) => {
                    let mut compiled = BTreeMap::new();
                    for (field, permitted) in fields {
                        let path = format!("{location}.{field}");
                        compiled.insert(field.clone(), combine(&predicates, permitted, &path)?);
                    }
                    PermissionNode::Fields(compiled)
                }
            };

            nodes.insert(location.clone(), node);
        }

        let tree = Self { nodes };
        debug!(
            roles = roles.len(),
            locations = tree.len(),
            leaves = tree.leaves().count(),
            "compiled permission tree"
        );

        Ok(tree)
    }
}

fn combine(
    predicates: &RolePredicateTable,
    permitted: &[Role],
    path: &str,
) -> AppResult<CombinedPredicate> {
    let mut seen = BTreeSet::new();
    let mut members = Vec::with_capacity(permitted.len());

    for role in permitted {
        if !seen.insert(role) {
            debug!(%role, path, "ignoring repeated role in rule");
            continue;
        }

        let predicate = predicates.get(role).ok_or_else(|| {
            AppError::Validation(format!(
                "role '{role}' referenced at '{path}' is not declared"
            ))
        })?;
        members.push(predicate);
    }

    Ok(CombinedPredicate::any_of(members))
}
