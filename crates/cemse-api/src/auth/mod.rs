//! Bearer token authentication

pub mod middleware;
pub mod models;
pub mod verifier;

pub use middleware::auth_middleware;
pub use models::{AuthUser, JwtClaims};
pub use verifier::{JwtVerifier, TokenVerifier};
