//! Application state shared by all handlers.

use mindoc_core::Config;

use crate::services::{
    DocumentService, GroupService, LoginService, PermissionService, UserService,
};

/// Shared application state, cloned into every handler via `State`.
#[derive(Clone)]
pub struct AppState {
    pub documents: DocumentService,
    pub permissions: PermissionService,
    pub login: LoginService,
    pub users: UserService,
    pub groups: GroupService,
    pub config: Config,
}

// Handlers run on a multi-threaded runtime; state must cross threads.
fn _assert_app_state_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AppState>();
}
