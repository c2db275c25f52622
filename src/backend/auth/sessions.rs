//! JWT session tokens.
//!
//! Tokens carry the user id and email and expire after 30 days. The signing
//! secret comes from `JWT_SECRET`; the fallback value is only for local
//! development.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::backend::error::ApiError;

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub email: String,
    /// Expiration time (Unix timestamp).
    pub exp: u64,
    /// Issued at (Unix timestamp).
    pub iat: u64,
}

fn jwt_secret() -> String {
    std::env::var("JWT_SECRET").unwrap_or_else(|_| {
        tracing::warn!("JWT_SECRET not set, using insecure development secret");
        "taskflow-dev-secret-change-in-production".to_string()
    })
}

/// Create a token for a user.
pub fn create_token(user_id: Uuid, email: String) -> Result<String, ApiError> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| ApiError::Internal(format!("system clock before epoch: {e}")))?
        .as_secs();

    let claims = Claims {
        sub: user_id.to_string(),
        email,
        exp: now + 30 * 24 * 60 * 60,
        iat: now,
    };

    let key = EncodingKey::from_secret(jwt_secret().as_ref());
    encode(&Header::default(), &claims, &key)
        .map_err(|e| ApiError::Internal(format!("token encoding failed: {e}")))
}

/// Verify and decode a token. Any failure is `Unauthenticated`.
pub fn verify_token(token: &str) -> Result<Claims, ApiError> {
    let key = DecodingKey::from_secret(jwt_secret().as_ref());
    let data = decode::<Claims>(token, &key, &Validation::default())
        .map_err(|_| ApiError::Unauthenticated)?;
    Ok(data.claims)
}

/// Shortcut: verify a token and extract the user id.
pub fn user_id_from_token(token: &str) -> Result<Uuid, ApiError> {
    let claims = verify_token(token)?;
    Uuid::parse_str(&claims.sub).map_err(|_| ApiError::Unauthenticated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trips() {
        let user_id = Uuid::new_v4();
        let token = create_token(user_id, "test@example.com".into()).unwrap();

        let claims = verify_token(&token).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.email, "test@example.com");
        assert!(claims.exp > claims.iat);
        assert_eq!(user_id_from_token(&token).unwrap(), user_id);
    }

    #[test]
    fn garbage_token_is_unauthenticated() {
        assert!(matches!(
            verify_token("not.a.token"),
            Err(ApiError::Unauthenticated)
        ));
    }
}
