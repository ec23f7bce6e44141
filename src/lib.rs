use std::sync::Arc;

use sqlx::SqlitePool;

pub mod access;
pub mod auth;
pub mod client;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;

pub use access::RolePolicy;
pub use auth::{IdentityProvider, IdentityVerifier};
pub use config::Config;
pub use database::repositories::{
    EquipmentRepository, SignupRepository, TeamRepository, UserRepository,
};
pub use error::AppError;
pub use services::{CsvSheet, SheetAppender, TeamService};

pub struct AppState {
    pub config: Config,
    pub identity_verifier: IdentityVerifier,
    pub identity_provider: IdentityProvider,
    pub role_policy: RolePolicy,
    pub team_service: TeamService,
    pub team_repository: TeamRepository,
    pub equipment_repository: EquipmentRepository,
    pub user_repository: UserRepository,
    pub signup_repository: SignupRepository,
    pub signup_sheet: Arc<dyn SheetAppender>,
}

impl AppState {
    /// Wire every repository and service from the pool and configuration.
    pub fn new(pool: SqlitePool, config: Config) -> Self {
        let team_repository = TeamRepository::new(pool.clone());

        Self {
            identity_verifier: IdentityVerifier::from_config(&config),
            identity_provider: IdentityProvider::from_config(&config),
            role_policy: RolePolicy::from_config(&config, team_repository.clone()),
            team_service: TeamService::new(team_repository.clone()),
            team_repository,
            equipment_repository: EquipmentRepository::new(pool.clone()),
            user_repository: UserRepository::new(pool.clone()),
            signup_repository: SignupRepository::new(pool),
            signup_sheet: Arc::new(CsvSheet::new(&config.signup_sheet_path)),
            config,
        }
    }

    pub fn with_role_policy(mut self, role_policy: RolePolicy) -> Self {
        self.role_policy = role_policy;
        self
    }

    pub fn with_signup_sheet(mut self, signup_sheet: Arc<dyn SheetAppender>) -> Self {
        self.signup_sheet = signup_sheet;
        self
    }
}
