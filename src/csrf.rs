//! Cookie based CSRF protection.
//!
//! Every request gets a token: the one carried in the `XSRF-TOKEN` cookie, or
//! a freshly generated one that is sent back as that cookie. Handlers read it
//! through the [`CsrfToken`] request extension. With enforcement on,
//! state-changing requests must echo the cookie value in `X-XSRF-TOKEN`.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue, Method, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tower::{Layer, Service};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::AppError;

pub const CSRF_COOKIE: &str = "XSRF-TOKEN";
pub const CSRF_HEADER: &str = "X-XSRF-TOKEN";
pub const CSRF_PARAMETER: &str = "_csrf";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsrfToken {
    pub token: String,
    pub header_name: String,
    pub parameter_name: String,
}

impl CsrfToken {
    fn new(token: String) -> Self {
        Self {
            token,
            header_name: CSRF_HEADER.to_string(),
            parameter_name: CSRF_PARAMETER.to_string(),
        }
    }
}

#[must_use]
pub fn csrf_layer(enforce: bool) -> CsrfLayer {
    CsrfLayer { enforce }
}

#[derive(Clone, Debug)]
pub struct CsrfLayer {
    enforce: bool,
}

impl<S> Layer<S> for CsrfLayer {
    type Service = CsrfMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CsrfMiddleware {
            inner,
            enforce: self.enforce,
        }
    }
}

#[derive(Clone, Debug)]
pub struct CsrfMiddleware<S> {
    inner: S,
    enforce: bool,
}

impl<S> Service<Request> for CsrfMiddleware<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let existing = cookie_token(req.headers());
        let issued = existing.is_none();
        let token = existing.unwrap_or_else(|| Uuid::new_v4().to_string());

        if self.enforce && !is_safe(req.method()) {
            let presented = req
                .headers()
                .get(CSRF_HEADER)
                .and_then(|v| v.to_str().ok());

            if issued || presented != Some(token.as_str()) {
                warn!("rejected {} {}: invalid CSRF token", req.method(), req.uri());
                let mut response =
                    AppError::Forbidden("Invalid CSRF token".to_string()).into_response();
                if issued {
                    set_token_cookie(&mut response, &token);
                }
                return Box::pin(async move { Ok(response) });
            }
        }

        req.extensions_mut().insert(CsrfToken::new(token.clone()));
        let fut = self.inner.call(req);

        Box::pin(async move {
            let mut response = fut.await?;
            if issued {
                debug!("issued new CSRF token");
                set_token_cookie(&mut response, &token);
            }
            Ok(response)
        })
    }
}

fn is_safe(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE)
}

fn cookie_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == CSRF_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

fn set_token_cookie(response: &mut Response, token: &str) {
    let cookie = format!("{CSRF_COOKIE}={token}; Path=/; SameSite=Lax");
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Extension, Router,
        body::Body,
        http::{Request, StatusCode},
        routing::{get, post},
    };
    use tower::ServiceExt;

    fn app(enforce: bool) -> Router {
        Router::new()
            .route(
                "/token",
                get(|Extension(token): Extension<CsrfToken>| async move { token.token }),
            )
            .route("/write", post(|| async { "written" }))
            .layer(csrf_layer(enforce))
    }

    fn issued_cookie(response: &Response) -> Option<String> {
        response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string())
    }

    #[test]
    fn reads_token_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; XSRF-TOKEN=abc123; lang=en"),
        );
        assert_eq!(cookie_token(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn ignores_empty_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("XSRF-TOKEN="));
        assert_eq!(cookie_token(&headers), None);
    }

    #[tokio::test]
    async fn issues_cookie_when_missing() {
        let response = app(true)
            .oneshot(Request::builder().uri("/token").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = issued_cookie(&response).expect("cookie should be issued");
        assert!(cookie.starts_with("XSRF-TOKEN="));
    }

    #[tokio::test]
    async fn keeps_token_from_cookie() {
        let response = app(true)
            .oneshot(
                Request::builder()
                    .uri("/token")
                    .header(header::COOKIE, "XSRF-TOKEN=known")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(issued_cookie(&response).is_none());
    }

    #[tokio::test]
    async fn rejects_write_without_header() {
        let response = app(true)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/write")
                    .header(header::COOKIE, "XSRF-TOKEN=known")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn rejects_write_with_mismatched_header() {
        let response = app(true)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/write")
                    .header(header::COOKIE, "XSRF-TOKEN=known")
                    .header(CSRF_HEADER, "other")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn accepts_write_with_matching_header() {
        let response = app(true)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/write")
                    .header(header::COOKIE, "XSRF-TOKEN=known")
                    .header(CSRF_HEADER, "known")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn writes_pass_when_not_enforced() {
        let response = app(false)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/write")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
