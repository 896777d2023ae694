//! Application services sitting between the HTTP handlers and the
//! repositories. Each service holds its repositories behind trait objects
//! so tests can swap in in-memory doubles.

pub mod document;
pub mod group;
pub mod login;
pub mod permission;
pub mod resolver;
pub mod user;

pub use document::DocumentService;
pub use group::GroupService;
pub use login::LoginService;
pub use permission::PermissionService;
pub use resolver::PermissionResolver;
pub use user::UserService;
