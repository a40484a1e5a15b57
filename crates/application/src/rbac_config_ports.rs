use async_trait::async_trait;
use rbac_shield_core::AppResult;
use rbac_shield_domain::RbacDocument;

/// Repository port supplying the RBAC configuration document.
#[async_trait]
pub trait RbacConfigRepository: Send + Sync {
    /// Loads the declared roles and schema permission table.
    async fn load_document(&self) -> AppResult<RbacDocument>;
}
