//! Mindoc Database Library
//!
//! Repositories for documents, permissions, users and groups, plus the
//! retry wrapper that shields every store operation from driver-transient
//! failures. Each repository is exposed as a trait so services can run
//! against in-memory doubles in tests, with the PostgreSQL implementation
//! as the production binding.

pub mod db;
pub mod retry;

pub use db::{
    DocumentRepositoryTrait, GroupRepositoryTrait, PermissionRepositoryTrait,
    PostgresDocumentRepository, PostgresGroupRepository, PostgresPermissionRepository,
    PostgresUserRepository, UserRepositoryTrait,
};
pub use retry::with_retry;
