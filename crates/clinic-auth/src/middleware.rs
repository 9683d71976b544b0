//! Tower authentication middleware.
//!
//! `AuthLayer` wraps an inner service with bearer token validation and puts
//! the resulting [`Principal`](crate::Principal) into request extensions.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::response::{IntoResponse, Response};
use http::{HeaderMap, Request, StatusCode, Uri};
use tower::{Layer, Service};

use crate::{AuthConfig, Principal, TokenValidator};

/// Tower `Layer` that wraps services with token authentication.
#[derive(Clone)]
pub struct AuthLayer<V: TokenValidator> {
    validator: Arc<V>,
    config: AuthConfig,
}

impl<V: TokenValidator> AuthLayer<V> {
    /// Create a new auth layer with the given validator and config.
    pub fn new(validator: Arc<V>, config: AuthConfig) -> Self {
        Self { validator, config }
    }
}

impl<V: TokenValidator, S> Layer<S> for AuthLayer<V> {
    type Service = AuthService<V, S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthService {
            inner,
            validator: self.validator.clone(),
            config: self.config.clone(),
        }
    }
}

/// Tower `Service` that validates tokens before forwarding requests.
#[derive(Clone)]
pub struct AuthService<V: TokenValidator, S> {
    inner: S,
    validator: Arc<V>,
    config: AuthConfig,
}

impl<V, S> Service<Request<Body>> for AuthService<V, S>
where
    V: TokenValidator,
    S: Service<Request<Body>, Error = Infallible> + Clone + Send + 'static,
    S::Response: IntoResponse,
    S::Future: Send,
{
    type Response = Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        // The clone may not be ready; call the instance poll_ready was called on.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let validator = self.validator.clone();
        let config = self.config.clone();

        Box::pin(async move {
            if config.enabled {
                let caller =
                    authenticate(validator.as_ref(), &config, req.headers(), req.uri()).await;
                match caller {
                    Ok(principal) => {
                        req.extensions_mut().insert(principal);
                    }
                    Err(resp) => return Ok(resp),
                }
            }
            let Ok(resp) = inner.call(req).await;
            Ok(resp.into_response())
        })
    }
}

/// Resolves the caller from the request headers, or the 401 to send back.
async fn authenticate<V: TokenValidator>(
    validator: &V,
    config: &AuthConfig,
    headers: &HeaderMap,
    uri: &Uri,
) -> Result<Principal, Response> {
    let Some(token) = bearer_token(headers) else {
        return Err(unauthorized("missing or invalid bearer token"));
    };
    match validator.validate(token, config).await {
        Ok(principal) => {
            log::debug!(
                "Authenticated {} {} for {}",
                principal.role,
                principal.id,
                uri.path()
            );
            Ok(principal)
        }
        Err(e) => {
            log::warn!("Rejected token for {}: {e}", uri.path());
            Err(unauthorized(&e.to_string()))
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// 401 in the API error envelope, with `WWW-Authenticate: Bearer`.
fn unauthorized(message: &str) -> Response {
    let body = serde_json::json!({
        "error": { "category": "authentication", "message": message }
    });
    (
        StatusCode::UNAUTHORIZED,
        [(http::header::WWW_AUTHENTICATE, "Bearer")],
        axum::Json(body),
    )
        .into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::JwtKeys;
    use clinic_core::{DoctorId, Role, UserId};
    use tower::{ServiceExt, service_fn};

    /// Echoes the principal the layer attached, as `role:id`, or `anonymous`.
    async fn whoami(req: Request<Body>) -> Result<Response, Infallible> {
        let caller = req
            .extensions()
            .get::<Principal>()
            .map_or("anonymous".to_string(), |p| format!("{}:{}", p.role, p.id));
        Ok(caller.into_response())
    }

    fn keys() -> Arc<JwtKeys> {
        Arc::new(JwtKeys::new("middleware-secret", 1))
    }

    fn request(authorization: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/appointments");
        if let Some(value) = authorization {
            builder = builder.header(http::header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn call(keys: Arc<JwtKeys>, enabled: bool, req: Request<Body>) -> (StatusCode, String) {
        let service = AuthLayer::new(keys, AuthConfig { enabled }).layer(service_fn(whoami));
        let resp = service.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[test]
    fn test_bearer_token_parsing() {
        let token = |auth| bearer_token(request(auth).headers()).map(str::to_string);
        assert_eq!(token(Some("Bearer abc.def")).as_deref(), Some("abc.def"));
        assert_eq!(token(Some("Bearer   ")), None);
        assert_eq!(token(Some("Basic dXNlcjpwYXNz")), None);
        assert_eq!(token(None), None);
    }

    #[tokio::test]
    async fn test_disabled_auth_forwards_anonymously() {
        let (status, body) = call(keys(), false, request(None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "anonymous");
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let service = AuthLayer::new(keys(), AuthConfig { enabled: true }).layer(service_fn(whoami));
        let resp = service.oneshot(request(None)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(resp.headers()[http::header::WWW_AUTHENTICATE], "Bearer");
    }

    #[tokio::test]
    async fn test_signed_token_attaches_principal() {
        let keys = keys();
        let token = keys
            .issue(&Principal::doctor(DoctorId::new(8), "lim@clinic.ph", "Dr. Lim"))
            .unwrap();
        let (status, body) = call(keys, true, request(Some(&format!("Bearer {token}")))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, format!("{}:8", Role::Doctor));
    }

    #[tokio::test]
    async fn test_token_from_another_secret_is_rejected() {
        let foreign = JwtKeys::new("some-other-secret", 1)
            .issue(&Principal::user(UserId::new(2), "ana@clinic.ph", "Ana"))
            .unwrap();
        let (status, body) = call(keys(), true, request(Some(&format!("Bearer {foreign}")))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["error"]["category"], "authentication");
    }
}
