//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_rbac_config_repository;
mod json_file_rbac_config_repository;

pub use in_memory_rbac_config_repository::InMemoryRbacConfigRepository;
pub use json_file_rbac_config_repository::JsonFileRbacConfigRepository;
