use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rbac_shield_application::RbacConfigRepository;
use rbac_shield_core::{AppError, AppResult};
use rbac_shield_domain::RbacDocument;
use tracing::debug;

/// Reads the RBAC document from a JSON file on every load.
#[derive(Debug, Clone)]
pub struct JsonFileRbacConfigRepository {
    path: PathBuf,
}

impl JsonFileRbacConfigRepository {
    /// Creates a repository for the given file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the configured file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }
}

#[async_trait]
impl RbacConfigRepository for JsonFileRbacConfigRepository {
    async fn load_document(&self) -> AppResult<RbacDocument> {
        let payload = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|error| match error.kind() {
                std::io::ErrorKind::NotFound => AppError::NotFound(format!(
                    "rbac config file '{}' does not exist",
                    self.path.display()
                )),
                _ => AppError::Internal(format!(
                    "failed to read rbac config file '{}': {error}",
                    self.path.display()
                )),
            })?;

        debug!(path = %self.path.display(), bytes = payload.len(), "read rbac config file");

        RbacDocument::from_json(payload.as_str()).map_err(|error| match error {
            AppError::Validation(message) => {
                AppError::Validation(format!("{}: {message}", self.path.display()))
            }
            other => other,
        })
    }
}
