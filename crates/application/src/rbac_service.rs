use std::sync::Arc;

use rbac_shield_core::{AppError, AppResult, AuthenticatedIdentity};
use rbac_shield_domain::{RbacDocument, RoleSet, SchemaPermissionTable};
use tracing::info;

use crate::{
    AccessDecision, IdentityContext, IdentityResolver, PermissionTree, RbacConfigRepository,
};


/// Compiled RBAC configuration for a GraphQL schema.
///
/// Built once at startup; the permission tree is handed to the field
/// interception layer and the identity context is merged into every request
/// context.
pub struct RbacService<C: ?Sized + Sync + 'static> {
    roles: RoleSet,
    permission_tree: Arc<PermissionTree>,
    context: IdentityContext<C>,
}

impl<C: ?Sized + Sync + 'static> RbacService<C> {
    /// Compiles the configuration, failing on any configuration fault.
    pub fn new(
        roles: RoleSet,
        schema: &SchemaPermissionTable,
        resolver: Arc<dyn IdentityResolver<C>>,
    ) -> AppResult<Self> {
        let permission_tree = PermissionTree::compile(&roles, schema)?;

        info!(
            roles = roles.len(),
            locations = permission_tree.len(),
            "rbac permission tree ready"
        );

        Ok(Self {
            roles,
            permission_tree: Arc::new(permission_tree),
            context: IdentityContext::new(resolver),
        })
    }

    /// Compiles a parsed configuration document.
    pub fn from_document(
        document: RbacDocument,
        resolver: Arc<dyn IdentityResolver<C>>,
    ) -> AppResult<Self> {
        Self::new(document.roles, &document.schema, resolver)
    }

    /// Loads the configuration from a repository and compiles it.
    pub async fn load(
        repository: &dyn RbacConfigRepository,
        resolver: Arc<dyn IdentityResolver<C>>,
    ) -> AppResult<Self> {
        let document = repository.load_document().await?;
        Self::from_document(document, resolver)
    }

    /// Returns the declared roles.
    #[must_use]
    pub fn roles(&self) -> &RoleSet {
        &self.roles
    }

    /// Returns the compiled permission tree.
    #[must_use]
    pub fn permission_tree(&self) -> Arc<PermissionTree> {
        Arc::clone(&self.permission_tree)
    }

    /// Returns the identity context bound to the configured resolver.
    #[must_use]
    pub fn context(&self) -> IdentityContext<C> {
        self.context.clone()
    }

    /// Resolves the requester and evaluates access to `type_name.field_name`.
    pub async fn check_field_access(
        &self,
        context: &C,
        type_name: &str,
        field_name: &str,
    ) -> AccessDecision {
        let identity = self.context.resolve(context).await;
        self.permission_tree.decide(type_name, field_name, &identity)
    }

    /// Ensures the requester may resolve `type_name.field_name`.
    ///
    /// Fields without a rule pass.
    pub async fn require_field_access(
        &self,
        context: &C,
        type_name: &str,
        field_name: &str,
    ) -> AppResult<()> {
        let identity = self.context.resolve(context).await;

        match self.permission_tree.decide(type_name, field_name, &identity) {
            AccessDecision::Allowed | AccessDecision::Unrestricted => Ok(()),
            AccessDecision::Denied => Err(AppError::Forbidden(format!(
                "{} is not allowed to access '{type_name}.{field_name}'",
                describe_requester(&identity)
            ))),
        }
    }
}

fn describe_requester(identity: &AuthenticatedIdentity) -> String {
    match identity.role() {
        Some(role) => format!("role '{role}'"),
        None => "anonymous requester".to_owned(),
    }
}
