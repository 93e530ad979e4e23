//! Business logic services

pub mod auth;
pub mod catalog;
pub mod loans;
pub mod redis;
pub mod sessions;

use std::sync::Arc;

use chrono::NaiveDate;

use crate::{config::SessionConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub catalog: catalog::CatalogService,
    pub loans: loans::LoansService,
    pub sessions: sessions::SessionsService,
}

impl Services {
    /// Create all services over the given repository and session store
    pub fn new(
        repository: Repository,
        session_store: Arc<dyn sessions::SessionStore>,
        session_config: &SessionConfig,
    ) -> Self {
        Self {
            auth: auth::AuthService::new(repository.clone()),
            catalog: catalog::CatalogService::new(repository.clone()),
            loans: loans::LoansService::new(repository),
            sessions: sessions::SessionsService::new(session_store, session_config.ttl_seconds),
        }
    }
}

/// Current date in the server's local time zone
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
