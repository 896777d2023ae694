//! Domain models.
//!
//! Plain data types shared by the db, storage, and api crates. Database row
//! mapping (`sqlx::FromRow`) is gated behind the `sqlx` feature.

pub mod document;
pub mod group;
pub mod permission;
pub mod upload;
pub mod user;

pub use document::{Document, DocumentResponse, NewDocument};
pub use group::{Group, GroupResponse, UserGroupMembership};
pub use permission::{DocumentPermission, DocumentPermissionResponse, PermissionSubject};
pub use upload::{derive_storage_key, UploadRequest, UploadRequestBuilder};
pub use user::{NewUser, User, UserResponse, UserRole};
