//! Business logic services

pub mod auth;
pub mod inventory;
pub mod loans;

use crate::{config::AuthConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub inventory: inventory::InventoryService,
    pub loans: loans::LoansService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig) -> Self {
        Self {
            auth: auth::AuthService::new(repository.clone(), auth_config),
            inventory: inventory::InventoryService::new(repository.clone()),
            loans: loans::LoansService::new(repository),
        }
    }
}
