use cemse_api::auth::JwtClaims;
use jsonwebtoken::{encode, EncodingKey, Header};

/// Signing secret shared by the test config and the token helpers.
pub const TEST_JWT_SECRET: &str = "test-jwt-secret-at-least-32-characters-long";

/// Issue a token for `user_id` valid for one hour.
pub fn token_for(user_id: &str) -> String {
    let now = chrono::Utc::now().timestamp();
    sign(JwtClaims {
        sub: user_id.to_string(),
        exp: now + 3600,
        iat: Some(now),
        role: Some("user".to_string()),
    })
}

/// Issue a token that expired a minute ago.
pub fn expired_token() -> String {
    let now = chrono::Utc::now().timestamp();
    sign(JwtClaims {
        sub: "expired-user".to_string(),
        exp: now - 60,
        iat: Some(now - 3660),
        role: None,
    })
}

/// Issue a token signed with a different secret.
pub fn foreign_token() -> String {
    let claims = JwtClaims {
        sub: "intruder".to_string(),
        exp: chrono::Utc::now().timestamp() + 3600,
        iat: None,
        role: None,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"some-other-secret-that-is-also-long-enough"),
    )
    .expect("Failed to sign token")
}

fn sign(claims: JwtClaims) -> String {
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .expect("Failed to sign token")
}
