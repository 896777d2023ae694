//! Database repositories for data access layer
//!
//! Each repository owns one table and is exposed as a trait with a
//! PostgreSQL implementation. All queries run through the retry wrapper in
//! `crate::retry`, so transient connection failures are absorbed here and
//! never leak into services.

pub mod documents;
pub mod groups;
pub mod permissions;
pub mod users;

pub use documents::{DocumentRepositoryTrait, PostgresDocumentRepository};
pub use groups::{GroupRepositoryTrait, PostgresGroupRepository};
pub use permissions::{PermissionRepositoryTrait, PostgresPermissionRepository};
pub use users::{PostgresUserRepository, UserRepositoryTrait};
