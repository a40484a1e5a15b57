use async_trait::async_trait;
use rbac_shield_application::RbacConfigRepository;
use rbac_shield_core::AppResult;
use rbac_shield_domain::RbacDocument;

/// In-memory configuration adapter, mainly for embedding and tests.
#[derive(Debug, Clone)]
pub struct InMemoryRbacConfigRepository {
    document: RbacDocument,
}

impl InMemoryRbacConfigRepository {
    /// Creates a repository serving the given document.
    #[must_use]
    pub fn new(document: RbacDocument) -> Self {
        Self { document }
    }
}

#[async_trait]
impl RbacConfigRepository for InMemoryRbacConfigRepository {
    async fn load_document(&self) -> AppResult<RbacDocument> {
        Ok(self.document.clone())
    }
}

#[cfg(test)]
mod tests {
    use rbac_shield_application::RbacConfigRepository;
    use rbac_shield_domain::{RbacDocument, RoleSet, SchemaPermissionTable};

    use super::InMemoryRbacConfigRepository;

    #[tokio::test]
    async fn returns_configured_document() {
        let roles = RoleSet::from_names(["ADMIN"]).unwrap_or_else(|_| unreachable!());
        let schema = SchemaPermissionTable::new()
            .with_whole_type("Obj", ["ADMIN"])
            .unwrap_or_else(|_| unreachable!());
        let document = RbacDocument::new(roles, schema);
        let repository = InMemoryRbacConfigRepository::new(document.clone());

        let loaded = repository.load_document().await;
        assert!(matches!(loaded, Ok(value) if value == document));
    }
}
