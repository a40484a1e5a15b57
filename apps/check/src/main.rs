//! Validates an RBAC configuration file and prints access decisions.

#![forbid(unsafe_code)]

mod check_config;

use std::sync::Arc;

use rbac_shield_application::{FnIdentityResolver, RbacService};
use rbac_shield_core::{AppResult, AuthenticatedIdentity};
use rbac_shield_domain::Role;
use rbac_shield_infrastructure::JsonFileRbacConfigRepository;
use tracing::{info, warn};

use crate::check_config::{CheckConfig, init_tracing};

#[tokio::main]
async fn main() -> AppResult<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = CheckConfig::load()?;
    let repository = JsonFileRbacConfigRepository::new(config.config_path.clone());

    // Each simulated request carries the role under test as its context.
    let service: RbacService<Role> = RbacService::load(
        &repository,
        Arc::new(FnIdentityResolver::new(|role: &Role| {
            Ok(AuthenticatedIdentity::with_role(role.as_str()))
        })),
    )
    .await?;

    let tree = service.permission_tree();
    info!(
        path = %repository.path().display(),
        roles = service.roles().len(),
        locations = tree.len(),
        leaves = tree.leaves().count(),
        "rbac configuration is valid"
    );

    for leaf in tree.leaves().filter(|leaf| leaf.predicate.denies_all()) {
        warn!(
            location = leaf.location,
            field = leaf.field.unwrap_or("*"),
            "rule lists no role and denies every requester"
        );
    }

    for role in &config.check_roles {
        if !service.roles().contains(role.as_str()) {
            warn!(%role, "role is not declared, every rule will deny it");
        }

        for leaf in tree.leaves() {
            let field = leaf.field.unwrap_or("*");
            let decision = service.check_field_access(role, leaf.location, field).await;
            info!(
                %role,
                location = leaf.location,
                field,
                decision = ?decision,
                "decision"
            );
        }
    }

    Ok(())
}
