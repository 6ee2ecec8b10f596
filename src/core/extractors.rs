//! Axum extractors shared by the resource handlers
//!
//! Extractors run before the handler body, so a rejection here
//! short-circuits the request without touching the store:
//! - [`Authenticated`] guards a route behind a bearer token
//! - [`JsonBody`] parses a JSON body into a typed value
//! - [`Validated`] parses and then validates a JSON body

use crate::core::auth::{AuthContext, AuthProvider};
use crate::core::error::{ApiError, ValidationError};
use axum::Json;
use axum::extract::{FromRef, FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use validator::Validate;

/// Caller identity, present only when a valid bearer token was sent
///
/// # Usage
///
/// ```rust,ignore
/// pub async fn get_product(
///     Authenticated(caller): Authenticated,
///     Path(id): Path<String>,
/// ) -> ApiResult<Json<Value>> {
///     // only reached with a verified token
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Authenticated(pub AuthContext);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
    Arc<dyn AuthProvider>: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let provider = Arc::<dyn AuthProvider>::from_ref(state);
        let context = provider.authenticate(&parts.headers).await?;

        parts.extensions.insert(context.clone());
        Ok(Authenticated(context))
    }
}

/// JSON body whose parse failures render as `400 VALIDATION_ERROR`
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
            ValidationError::InvalidBody {
                message: e.body_text(),
            }
        })?;

        Ok(JsonBody(value))
    }
}

/// JSON body that passed its `validator` rules
///
/// # Usage
///
/// ```rust,ignore
/// pub async fn create_order(
///     Validated(payload): Validated<CreateOrderRequest>,
/// ) -> ApiResult<Response> {
///     // payload is already validated!
/// }
/// ```
pub struct Validated<T>(pub T);

impl<S, T> FromRequest<S> for Validated<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let JsonBody(value) = JsonBody::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(Validated(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::auth::JwtAuthProvider;
    use axum::body::Body;
    use axum::http::StatusCode;
    use serde::Deserialize;

    #[derive(Clone)]
    struct TestState {
        auth: Arc<dyn AuthProvider>,
    }

    impl FromRef<TestState> for Arc<dyn AuthProvider> {
        fn from_ref(state: &TestState) -> Self {
            state.auth.clone()
        }
    }

    #[derive(Debug, Deserialize, Validate)]
    struct Payload {
        #[validate(length(min = 1))]
        name: String,
    }

    fn state() -> (TestState, Arc<JwtAuthProvider>) {
        let provider = Arc::new(JwtAuthProvider::new("secret", 60));
        (
            TestState {
                auth: provider.clone(),
            },
            provider,
        )
    }

    fn json_request(body: &str) -> Request {
        axum::http::Request::builder()
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_authenticated_accepts_valid_token() {
        let (state, provider) = state();
        let token = provider.issue_token("user-1", None).unwrap();
        let (mut parts, _) = axum::http::Request::builder()
            .header("authorization", format!("Bearer {}", token))
            .body(())
            .unwrap()
            .into_parts();

        let Authenticated(ctx) = Authenticated::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert_eq!(ctx.subject(), "user-1");
        assert!(parts.extensions.get::<AuthContext>().is_some());
    }

    #[tokio::test]
    async fn test_authenticated_rejects_missing_token() {
        let (state, _) = state();
        let (mut parts, _) = axum::http::Request::builder()
            .body(())
            .unwrap()
            .into_parts();

        let err = Authenticated::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_validated_accepts_good_payload() {
        let Validated(payload) = Validated::<Payload>::from_request(json_request(r#"{"name":"x"}"#), &())
            .await
            .unwrap();
        assert_eq!(payload.name, "x");
    }

    #[tokio::test]
    async fn test_validated_rejects_rule_violation() {
        let err = Validated::<Payload>::from_request(json_request(r#"{"name":""}"#), &())
            .await
            .err()
            .unwrap();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_json_body_rejects_malformed_json() {
        let err = JsonBody::<Payload>::from_request(json_request("{not json"), &())
            .await
            .err()
            .unwrap();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
