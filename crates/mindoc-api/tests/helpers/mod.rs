//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p mindoc-api --test documents_test`
//! or `cargo test -p mindoc-api`. No database or object-store service is
//! required; repositories are in-memory and file bytes land in a per-test
//! temporary directory.

pub mod fakes;

use std::sync::{Arc, Mutex};

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use mindoc_api::auth::jwt::JwtService;
use mindoc_api::auth::password;
use mindoc_api::services::{
    DocumentService, GroupService, LoginService, PermissionResolver, PermissionService,
    UserService,
};
use mindoc_api::setup::routes::setup_routes;
use mindoc_api::state::AppState;
use mindoc_core::constants::API_PREFIX;
use mindoc_core::models::{NewUser, UserRole};
use mindoc_core::Config;
use mindoc_db::UserRepositoryTrait;
use mindoc_storage::{LocalObjectStore, ObjectStore, UploadCoordinator};
use serde_json::{json, Value};
use tempfile::TempDir;
use uuid::Uuid;

use fakes::{
    InMemoryDocumentRepository, InMemoryGroupRepository, InMemoryPermissionRepository,
    InMemoryUserRepository, SharedMemberships,
};

pub const TEST_JWT_SECRET: &str = "integration-test-secret-at-least-32-chars";
pub const ADMIN_PASSWORD: &str = "admin-password-1";
pub const MANAGER_PASSWORD: &str = "manager-password-1";
pub const USER_PASSWORD: &str = "user-password-1";

/// Small part size so a few kilobytes of payload already exercise the
/// multi-part upload path.
const TEST_PART_SIZE_BYTES: usize = 1024;

/// API path under the versioned prefix (e.g. `/api/v1`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", API_PREFIX, path)
}

/// Test application: server plus a direct handle on the document store
/// for seeding rows the API cannot produce (e.g. pending documents).
pub struct TestApp {
    pub server: TestServer,
    pub documents: Arc<InMemoryDocumentRepository>,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

/// Setup test app with in-memory repositories and local storage. Seeds one
/// user per role: `admin`, `manager`, and `user`.
pub async fn setup_test_app() -> TestApp {
    let temp_dir = TempDir::new().expect("Failed to create storage directory");
    let store: Arc<dyn ObjectStore> = Arc::new(
        LocalObjectStore::new(temp_dir.path())
            .await
            .expect("Failed to initialize local storage"),
    );

    let config = Config::for_tests(
        "postgres://unused-in-tests".to_string(),
        TEST_JWT_SECRET.to_string(),
        vec![
            "application/pdf".to_string(),
            "text/plain".to_string(),
            "text/csv".to_string(),
        ],
        TEST_PART_SIZE_BYTES,
    );

    let memberships: SharedMemberships = Arc::new(Mutex::new(Vec::new()));
    let document_repository = Arc::new(InMemoryDocumentRepository::default());
    let permission_repository = Arc::new(InMemoryPermissionRepository::new(memberships.clone()));
    let user_repository = Arc::new(InMemoryUserRepository::new(memberships.clone()));
    let group_repository = Arc::new(InMemoryGroupRepository::new(memberships));

    seed_user(&*user_repository, "admin", ADMIN_PASSWORD, UserRole::Admin).await;
    seed_user(
        &*user_repository,
        "manager",
        MANAGER_PASSWORD,
        UserRole::Manager,
    )
    .await;
    seed_user(&*user_repository, "user", USER_PASSWORD, UserRole::User).await;

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
        permissions: PermissionService::new(document_repository.clone(), permission_repository),
        login: LoginService::new(user_repository.clone(), jwt),
        users: UserService::new(user_repository),
        groups: GroupService::new(group_repository),
        config: config.clone(),
    });

    let router = setup_routes(&config, state)
        .await
        .expect("Failed to build router");
    let server = TestServer::new(router).expect("Failed to start test server");

    TestApp {
        server,
        documents: document_repository,
        _temp_dir: temp_dir,
    }
}

async fn seed_user(
    users: &dyn UserRepositoryTrait,
    username: &str,
    password: &str,
    role: UserRole,
) {
    let password_hash = password::hash_password(password).expect("Failed to hash password");
    users
        .insert(NewUser {
            username: username.to_string(),
            password_hash,
            role,
            inserted_by: "seed".to_string(),
        })
        .await
        .expect("Failed to seed user");
}

/// Log in through the API; returns the bearer token and the user's id.
pub async fn login(server: &TestServer, username: &str, password: &str) -> (String, Uuid) {
    let response = server
        .post(&api_path("/auth/login"))
        .json(&json!({ "username": username, "password": password }))
        .await;
    assert_eq!(
        response.status_code(),
        200,
        "login failed: {}",
        response.text()
    );
    let body: Value = response.json();
    let token = body["token"].as_str().expect("token missing").to_string();
    let user_id = body["user"]["id"]
        .as_str()
        .expect("user id missing")
        .parse()
        .expect("user id is not a uuid");
    (token, user_id)
}

/// Multipart upload form with the metadata fields ahead of the file part.
pub fn upload_form(
    name: &str,
    description: &str,
    category: &str,
    file_name: &str,
    content_type: &str,
    bytes: Vec<u8>,
) -> MultipartForm {
    MultipartForm::new()
        .add_text("name", name.to_string())
        .add_text("description", description.to_string())
        .add_text("category", category.to_string())
        .add_part(
            "file",
            Part::bytes(bytes)
                .file_name(file_name.to_string())
                .mime_type(content_type.to_string()),
        )
}

/// A few kilobytes of PDF-looking bytes, spanning several upload parts.
pub fn pdf_bytes() -> Vec<u8> {
    let mut bytes = b"%PDF-1.4\n".to_vec();
    while bytes.len() < TEST_PART_SIZE_BYTES * 8 {
        bytes.extend_from_slice(b"0 0 obj << /Type /Filler >> endobj\n");
    }
    bytes.extend_from_slice(b"%%EOF\n");
    bytes
}

/// Upload a document as the given token's user; asserts creation succeeded
/// and returns the document id.
pub async fn upload_document(
    server: &TestServer,
    token: &str,
    name: &str,
    description: &str,
    category: &str,
) -> Uuid {
    let response = server
        .post(&api_path("/documents"))
        .add_header("Authorization", format!("Bearer {}", token))
        .multipart(upload_form(
            name,
            description,
            category,
            name,
            "application/pdf",
            pdf_bytes(),
        ))
        .await;
    assert_eq!(
        response.status_code(),
        201,
        "upload failed: {}",
        response.text()
    );
    let body: Value = response.json();
    body["id"]
        .as_str()
        .expect("document id missing")
        .parse()
        .expect("document id is not a uuid")
}
