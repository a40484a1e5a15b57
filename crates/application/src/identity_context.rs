use std::sync::Arc;

use rbac_shield_core::AuthenticatedIdentity;
use tracing::warn;

use crate::IdentityResolver;

/// Per-request identity source merged into the ambient request context.
///
/// Holds one attribute, `user`, bound to the configured resolver.
pub struct IdentityContext<C: ?Sized + Sync + 'static> {
    user: Arc<dyn IdentityResolver<C>>,
}

impl<C: ?Sized + Sync + 'static> IdentityContext<C> {
    /// Binds the context to a resolver.
    #[must_use]
    pub fn new(user: Arc<dyn IdentityResolver<C>>) -> Self {
        Self { user }
    }

    /// Returns the bound resolver.
    #[must_use]
    pub fn user(&self) -> &Arc<dyn IdentityResolver<C>> {
        &self.user
    }

    /// Resolves the identity for a request, falling back to anonymous.
    ///
    /// Anonymous identities fail every role predicate, so a broken resolver
    /// can only deny access.
    pub async fn resolve(&self, context: &C) -> AuthenticatedIdentity {
        match self.user.resolve_identity(context).await {
            Ok(identity) => identity,
            Err(error) => {
                warn!(%error, "identity resolution failed, treating requester as anonymous");
                AuthenticatedIdentity::anonymous()
            }
        }
    }
}

impl<C: ?Sized + Sync + 'static> Clone for IdentityContext<C> {
    fn clone(&self) -> Self {
        Self {
            user: Arc::clone(&self.user),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rbac_shield_core::{AppError, AuthenticatedIdentity};

    use crate::{FnIdentityResolver, IdentityContext, StaticIdentityResolver};

    struct RequestHeaders {
        role: Option<&'static str>,
    }

    #[tokio::test]
    async fn resolves_identity_through_closure() {
        let context: IdentityContext<RequestHeaders> =
            IdentityContext::new(Arc::new(FnIdentityResolver::new(|request: &RequestHeaders| {
                request
                    .role
                    .map(AuthenticatedIdentity::with_role)
                    .ok_or_else(|| AppError::Unauthorized("missing role header".to_owned()))
            })));

        let identity = context.resolve(&RequestHeaders { role: Some("ADMIN") }).await;
        assert_eq!(identity.role(), Some("ADMIN"));
    }

    #[tokio::test]
    async fn resolver_failure_yields_anonymous_identity() {
        let context: IdentityContext<RequestHeaders> =
            IdentityContext::new(Arc::new(FnIdentityResolver::new(|_: &RequestHeaders| {
                Err(AppError::Unauthorized("token expired".to_owned()))
            })));

        let identity = context.resolve(&RequestHeaders { role: None }).await;
        assert!(identity.is_anonymous());
    }

    #[tokio::test]
    async fn static_resolver_ignores_request() {
        let context: IdentityContext<RequestHeaders> = IdentityContext::new(Arc::new(
            StaticIdentityResolver::new(AuthenticatedIdentity::with_role("DEVELOPER")),
        ));

        let identity = context.resolve(&RequestHeaders { role: Some("ADMIN") }).await;
        assert_eq!(identity.role(), Some("DEVELOPER"));
    }
}
