//! Bearer-token auth middleware and the extractor handlers use.
//!
//! The middleware verifies the JWT once per request and stashes the decoded
//! identity in request extensions; `AuthUser` pulls it back out. Token
//! verification is stateless, no database lookup happens here.

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

use crate::backend::auth::sessions;
use crate::backend::error::ApiError;
use crate::backend::server::AppState;

/// Identity decoded from the bearer token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
}

/// Pull `Bearer <token>` out of the Authorization header.
fn bearer_token(headers: &axum::http::HeaderMap) -> Result<&str, ApiError> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthenticated)
}

/// Middleware guarding the protected API surface.
pub async fn require_auth(
    State(_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers())?;
    let claims = sessions::verify_token(token)?;
    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| ApiError::Unauthenticated)?;

    request.extensions_mut().insert(AuthenticatedUser {
        user_id,
        email: claims.email,
    });
    Ok(next.run(request).await)
}

/// Extractor for the identity the middleware stored.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(ApiError::Unauthenticated)?;
        Ok(AuthUser {
            user_id: user.user_id,
            email: user.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderMap, HeaderValue};

    #[test]
    fn bearer_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc.def.ghi"),
        );
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def.ghi");

        let empty = HeaderMap::new();
        assert!(matches!(
            bearer_token(&empty),
            Err(ApiError::Unauthenticated)
        ));

        let mut basic = HeaderMap::new();
        basic.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Basic dXNlcjpwYXNz"),
        );
        assert!(matches!(
            bearer_token(&basic),
            Err(ApiError::Unauthenticated)
        ));
    }
}
