use std::marker::PhantomData;

use async_trait::async_trait;
use rbac_shield_core::{AppResult, AuthenticatedIdentity};

/// Port resolving the requester identity from the ambient request context.
///
/// Implementations may suspend (token lookups, session stores). Errors are
/// treated as an anonymous requester by [`crate::IdentityContext`].
#[async_trait]
pub trait IdentityResolver<C>: Send + Sync
where
    C: ?Sized + Sync + 'static,
{
    /// Resolves the identity for one request.
    async fn resolve_identity(&self, context: &C) -> AppResult<AuthenticatedIdentity>;
}

/// Adapts a synchronous closure into an [`IdentityResolver`].
pub struct FnIdentityResolver<C: ?Sized, F> {
    resolve: F,
    _context: PhantomData<fn(&C)>,
}

impl<C: ?Sized, F> FnIdentityResolver<C, F>
where
    F: Fn(&C) -> AppResult<AuthenticatedIdentity> + Send + Sync,
{
    /// Wraps a resolver closure.
    #[must_use]
    pub fn new(resolve: F) -> Self {
        Self {
            resolve,
            _context: PhantomData,
        }
    }
}

#[async_trait]
impl<C, F> IdentityResolver<C> for FnIdentityResolver<C, F>
where
    C: ?Sized + Sync + 'static,
    F: Fn(&C) -> AppResult<AuthenticatedIdentity> + Send + Sync,
{
    async fn resolve_identity(&self, context: &C) -> AppResult<AuthenticatedIdentity> {
        (self.resolve)(context)
    }
}

/// Resolver returning the same identity for every request.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentityResolver {
    identity: AuthenticatedIdentity,
}

impl StaticIdentityResolver {
    /// Creates a resolver that always yields the given identity.
    #[must_use]
    pub fn new(identity: AuthenticatedIdentity) -> Self {
        Self { identity }
    }
}

#[async_trait]
impl<C> IdentityResolver<C> for StaticIdentityResolver
where
    C: ?Sized + Sync + 'static,
{
    async fn resolve_identity(&self, _context: &C) -> AppResult<AuthenticatedIdentity> {
        Ok(self.identity.clone())
    }
}
