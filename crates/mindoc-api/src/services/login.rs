//! Credential verification and token issuance.

use std::sync::Arc;

use mindoc_core::models::User;
use mindoc_core::AppError;
use mindoc_db::UserRepositoryTrait;

use crate::auth::jwt::JwtService;
use crate::auth::password;

/// Exchanges username/password credentials for a bearer token.
#[derive(Clone)]
pub struct LoginService {
    users: Arc<dyn UserRepositoryTrait>,
    jwt: JwtService,
}

impl LoginService {
    pub fn new(users: Arc<dyn UserRepositoryTrait>, jwt: JwtService) -> Self {
        Self { users, jwt }
    }

    /// Verify credentials and mint a token. An unknown username and a bad
    /// password produce the same error so callers cannot probe for
    /// registered usernames.
    pub async fn login(&self, username: &str, password: &str) -> Result<(String, User), AppError> {
        let user = match self.users.find_by_username(username).await? {
            Some(user) if password::verify_password(password, &user.password_hash)? => user,
            _ => {
                tracing::debug!(username = %username, "Login rejected");
                return Err(AppError::Unauthorized(
                    "Invalid username or password".to_string(),
                ));
            }
        };

        let token = self.jwt.issue(&user)?;
        tracing::info!(user_id = %user.id, username = %user.username, "User logged in");
        Ok((token, user))
    }
}
