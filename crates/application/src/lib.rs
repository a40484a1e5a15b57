//! Application services and ports.

#![forbid(unsafe_code)]

mod identity_context;
mod identity_ports;
mod permission_tree;
mod rbac_config_ports;
mod rbac_service;
mod role_predicates;

pub use identity_context::IdentityContext;
pub use identity_ports::{FnIdentityResolver, IdentityResolver, StaticIdentityResolver};
pub use permission_tree::{
    AccessDecision, CombinedPredicate, PermissionLeaf, PermissionNode, PermissionTree,
};
pub use rbac_config_ports::RbacConfigRepository;
pub use rbac_service::RbacService;
pub use role_predicates::RolePredicate;
