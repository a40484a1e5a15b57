//! Compiled permission tree consumed by field interception layers.
//!
//! The tree mirrors the schema permission table: every whole-type rule
//! becomes one combined predicate, every per-field rule becomes a map of
//! field name to combined predicate. Compiled trees are immutable and can be
//! shared across request handlers without synchronization.

mod compiler;

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;
use std::sync::Arc;

use rbac_shield_core::{AuthenticatedIdentity, NonEmptyString};
use rbac_shield_domain::Role;

use crate::RolePredicate;

/// OR-combination of role predicates permitted at one location.
#[derive(Debug, Clone, Default)]
pub struct CombinedPredicate {
    members: Vec<Arc<RolePredicate>>,
}

impl CombinedPredicate {
    /// Combines predicates; an empty list denies every identity.
    #[must_use]
    pub fn any_of(members: impl IntoIterator<Item = Arc<RolePredicate>>) -> Self {
        Self {
            members: members.into_iter().collect(),
        }
    }

    /// Returns whether any member predicate accepts the identity.
    #[must_use]
    pub fn evaluate(&self, identity: &AuthenticatedIdentity) -> bool {
        self.members.iter().any(|member| member.matches(identity))
    }

    /// Iterates the permitted roles in rule order.
    pub fn roles(&self) -> impl Iterator<Item = &Role> {
        self.members.iter().map(|member| member.role())
    }

    /// Returns the shared member predicates.
    #[must_use]
    pub fn members(&self) -> &[Arc<RolePredicate>] {
        &self.members
    }

    /// Returns whether the predicate can never succeed.
    #[must_use]
    pub fn denies_all(&self) -> bool {
        self.members.is_empty()
    }
}

/// Compiled node for one schema location.
#[derive(Debug, Clone)]
pub enum PermissionNode {
    /// Predicate applied to every field of the type.
    WholeType(CombinedPredicate),
    /// Predicates for the listed fields only.
    Fields(BTreeMap<NonEmptyString, CombinedPredicate>),
}

impl PermissionNode {
    /// Returns the predicate guarding a field of this location.
    #[must_use]
    pub fn predicate_for(&self, field_name: &str) -> Option<&CombinedPredicate> {
        match self {
            Self::WholeType(predicate) => Some(predicate),
            Self::Fields(fields) => fields.get(field_name),
        }
    }
}

/// Outcome of evaluating the tree for one field access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// A rule covers the field and accepts the identity.
    Allowed,
    /// A rule covers the field and rejects the identity.
    Denied,
    /// No rule covers the field; the interception layer's default applies.
    Unrestricted,
}

impl AccessDecision {
    /// Returns whether the decision lets field resolution proceed when the
    /// interception layer allows unrestricted fields.
    #[must_use]
    pub fn is_permitted(self) -> bool {
        !matches!(self, Self::Denied)
    }
}

/// Leaf of the compiled tree, as yielded by [`PermissionTree::leaves`].
#[derive(Debug, Clone, Copy)]
pub struct PermissionLeaf<'a> {
    /// Schema location name.
    pub location: &'a str,
    /// Field name, absent for whole-type rules.
    pub field: Option<&'a str>,
    /// Combined predicate at this leaf.
    pub predicate: &'a CombinedPredicate,
}

/// Immutable compiled permission tree keyed by schema location.
#[derive(Debug, Clone, Default)]
pub struct PermissionTree {
    nodes: BTreeMap<NonEmptyString, PermissionNode>,
}

impl PermissionTree {
    /// Returns the node compiled for a location.
    #[must_use]
    pub fn node(&self, location: &str) -> Option<&PermissionNode> {
        self.nodes.get(location)
    }

    /// Iterates compiled locations in name order.
    pub fn locations(&self) -> impl Iterator<Item = (&NonEmptyString, &PermissionNode)> {
        self.nodes.iter()
    }

    /// Returns the predicate guarding `type_name.field_name`, if any rule covers it.
    #[must_use]
    pub fn predicate_for(&self, type_name: &str, field_name: &str) -> Option<&CombinedPredicate> {
        self.node(type_name)
            .and_then(|node| node.predicate_for(field_name))
    }

    /// Evaluates field access for an already resolved identity.
    #[must_use]
    pub fn decide(
        &self,
        type_name: &str,
        field_name: &str,
        identity: &AuthenticatedIdentity,
    ) -> AccessDecision {
        match self.predicate_for(type_name, field_name) {
            Some(predicate) if predicate.evaluate(identity) => AccessDecision::Allowed,
            Some(_) => AccessDecision::Denied,
            None => AccessDecision::Unrestricted,
        }
    }

    /// Iterates every leaf predicate.
    pub fn leaves(&self) -> impl Iterator<Item = PermissionLeaf<'_>> {
        self.nodes.iter().flat_map(|(location, node)| {
            let leaves: Vec<PermissionLeaf<'_>> = match node {
                PermissionNode::WholeType(predicate) => vec![PermissionLeaf {
                    location: location.as_str(),
                    field: None,
                    predicate,
                }],
                PermissionNode::Fields(fields) => fields
                    .iter()
                    .map(|(field, predicate)| PermissionLeaf {
                        location: location.as_str(),
                        field: Some(field.as_str()),
                        predicate,
                    })
                    .collect(),
            };
            leaves
        })
    }

    /// Returns the number of compiled locations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns whether no location is compiled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
