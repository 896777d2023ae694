//! Authentication: Argon2 password hashing, HS256 bearer tokens, the
//! verification middleware, and the [`models::Identity`] extractor.

pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
