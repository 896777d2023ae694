//! Service initialization and application state setup

use std::sync::Arc;

use anyhow::Result;
use mindoc_core::Config;
use mindoc_db::{
    PostgresDocumentRepository, PostgresGroupRepository, PostgresPermissionRepository,
    PostgresUserRepository,
};
use mindoc_storage::{ObjectStore, UploadCoordinator};
use sqlx::PgPool;

use crate::auth::jwt::JwtService;
use crate::services::{
    DocumentService, GroupService, LoginService, PermissionResolver, PermissionService,
    UserService,
};
use crate::state::AppState;

/// Initialize all services and repositories, returning the application state
pub fn initialize_services(
    config: &Config,
    pool: PgPool,
    store: Arc<dyn ObjectStore>,
) -> Result<Arc<AppState>> {
    let document_repository = Arc::new(PostgresDocumentRepository::new(pool.clone()));
    let permission_repository = Arc::new(PostgresPermissionRepository::new(pool.clone()));
    let user_repository = Arc::new(PostgresUserRepository::new(pool.clone()));
    let group_repository = Arc::new(PostgresGroupRepository::new(pool));

    let resolver = PermissionResolver::new(permission_repository.clone());
    let coordinator = UploadCoordinator::new(store.clone(), config.part_size_bytes());
    let jwt = JwtService::new(config.jwt_secret(), config.jwt_expiry_hours());

    let state = Arc::new(AppState {
        documents: DocumentService::new(
            document_repository.clone(),
            resolver,
            store,
            coordinator,
        ),
        permissions: PermissionService::new(document_repository, permission_repository),
        login: LoginService::new(user_repository.clone(), jwt),
        users: UserService::new(user_repository),
        groups: GroupService::new(group_repository),
        config: config.clone(),
    });

    tracing::info!(
        part_size_bytes = config.part_size_bytes(),
        "Services initialized"
    );

    Ok(state)
}
