//! Bearer-token authentication
//!
//! Protected routes resolve an [`AuthContext`] through an [`AuthProvider`]
//! before the handler runs. The default provider verifies HS256 JSON Web
//! Tokens against the shared secret loaded from configuration.

use crate::core::error::{ApiError, ApiResult, RequestError};
use async_trait::async_trait;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Caller resolved from a verified bearer token
#[derive(Debug, Clone, PartialEq)]
pub struct AuthContext {
    pub subject: String,
}

impl AuthContext {
    pub fn subject(&self) -> &str {
        &self.subject
    }
}

/// Trait for auth providers
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Resolve the caller from the request headers
    ///
    /// Must fail with an `Unauthorized` error when credentials are missing
    /// or invalid; it never panics.
    async fn authenticate(&self, headers: &HeaderMap) -> ApiResult<AuthContext>;
}

/// Pull the token out of `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, RequestError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| RequestError::unauthorized("missing Authorization header"))?
        .to_str()
        .map_err(|_| RequestError::unauthorized("Authorization header is not valid text"))?;

    let (scheme, token) = value
        .split_once(' ')
        .ok_or_else(|| RequestError::unauthorized("expected 'Bearer <token>'"))?;

    if !scheme.eq_ignore_ascii_case("bearer") || token.trim().is_empty() {
        return Err(RequestError::unauthorized("expected 'Bearer <token>'"));
    }

    Ok(token.trim())
}

/// Token claims
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

/// HS256 JWT provider keyed by a shared secret
///
/// Built once at startup from configuration; the keys are immutable
/// afterwards.
pub struct JwtAuthProvider {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    token_ttl_secs: i64,
}

impl JwtAuthProvider {
    pub fn new(secret: &str, token_ttl_secs: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            token_ttl_secs: i64::try_from(token_ttl_secs).unwrap_or(i64::MAX),
        }
    }

    /// Sign a token for `subject` valid for the configured lifetime
    pub fn issue_token(&self, subject: &str, email: Option<&str>) -> ApiResult<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: subject.to_string(),
            email: email.map(str::to_string),
            iat: now,
            exp: now.saturating_add(self.token_ttl_secs),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| ApiError::Internal(format!("failed to sign token: {}", e)))
    }

    /// Verify signature and expiry of a raw token
    pub fn verify(&self, token: &str) -> Result<Claims, RequestError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                use jsonwebtoken::errors::ErrorKind;
                let reason = match e.kind() {
                    ErrorKind::ExpiredSignature => "token expired",
                    ErrorKind::InvalidSignature => "invalid token signature",
                    _ => "invalid token",
                };
                RequestError::unauthorized(reason)
            })
    }
}

#[async_trait]
impl AuthProvider for JwtAuthProvider {
    async fn authenticate(&self, headers: &HeaderMap) -> ApiResult<AuthContext> {
        let token = bearer_token(headers)?;
        let claims = self.verify(token).inspect_err(|e| {
            tracing::warn!("rejected bearer token: {}", e);
        })?;

        Ok(AuthContext {
            subject: claims.sub,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&headers_with("Bearer abc")).unwrap(), "abc");
        assert_eq!(bearer_token(&headers_with("bearer  abc ")).unwrap(), "abc");
        assert!(bearer_token(&headers_with("Basic abc")).is_err());
        assert!(bearer_token(&headers_with("Bearer ")).is_err());
        assert!(bearer_token(&headers_with("abc")).is_err());
        assert!(bearer_token(&HeaderMap::new()).is_err());
    }

    #[test]
    fn test_issue_then_verify() {
        let provider = JwtAuthProvider::new("secret", 3600);
        let token = provider.issue_token("user-1", Some("a@b.c")).unwrap();

        let claims = provider.verify(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.email.as_deref(), Some("a@b.c"));
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let issuer = JwtAuthProvider::new("secret", 3600);
        let verifier = JwtAuthProvider::new("other-secret", 3600);
        let token = issuer.issue_token("user-1", None).unwrap();

        let err = verifier.verify(&token).unwrap_err();
        assert!(err.to_string().contains("signature"));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let provider = JwtAuthProvider::new("secret", 3600);
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "user-1".to_string(),
            email: None,
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();

        let err = provider.verify(&token).unwrap_err();
        assert!(err.to_string().contains("expired"));
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        let provider = JwtAuthProvider::new("secret", 3600);
        assert!(provider.verify("not.a.jwt").is_err());
    }

    #[tokio::test]
    async fn test_authenticate_resolves_user_context() {
        let provider = JwtAuthProvider::new("secret", 60);
        let token = provider.issue_token("user-9", None).unwrap();

        let ctx = provider
            .authenticate(&headers_with(&format!("Bearer {}", token)))
            .await
            .unwrap();
        assert_eq!(ctx.subject(), "user-9");
    }

    #[tokio::test]
    async fn test_authenticate_without_header_is_unauthorized() {
        let provider = JwtAuthProvider::new("secret", 60);
        let err = provider.authenticate(&HeaderMap::new()).await.unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::UNAUTHORIZED);
    }
}
