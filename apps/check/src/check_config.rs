use std::env;
use std::path::PathBuf;

use rbac_shield_core::{AppError, AppResult};
use rbac_shield_domain::Role;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub struct CheckConfig {
    pub config_path: PathBuf,
    pub check_roles: Vec<Role>,
}

impl CheckConfig {
    pub fn load() -> AppResult<Self> {
        let config_path = PathBuf::from(required_non_empty_env("RBAC_CONFIG_PATH")?);
        let check_roles = match env::var("RBAC_CHECK_ROLES") {
            Ok(value) => parse_role_list(value.as_str())?,
            Err(_) => Vec::new(),
        };

        Ok(Self {
            config_path,
            check_roles,
        })
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn parse_role_list(value: &str) -> AppResult<Vec<Role>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|role| !role.is_empty())
        .map(|role| {
            Role::new(role).map_err(|error| {
                AppError::Validation(format!("invalid RBAC_CHECK_ROLES entry '{role}': {error}"))
            })
        })
        .collect()
}

fn required_env(name: &str) -> AppResult<String> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn required_non_empty_env(name: &str) -> AppResult<String> {
    let value = required_env(name)?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}
