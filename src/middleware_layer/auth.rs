use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use tower_cookies::Cookies;

use crate::token::SESSION_COOKIE;

/// API routes reachable without a session. Never protect the whole
/// `/api/auth` prefix: login and signup must run before a session exists.
const PUBLIC_API: &[&str] = &[
    "/api/auth/login",
    "/api/auth/signup",
    "/api/auth/logout",
    "/api/lambda",
];

/// Browser-navigable routes that require a session.
const PROTECTED_ROUTES: &[&str] = &["/dashboard", "/api/auth/user"];

/// Route-protection middleware.
///
/// Unauthenticated API calls get a JSON 401, never an HTML redirect.
/// Unauthenticated browser navigations get a redirect to the login page.
///
/// Only cookie *presence* is checked here; expiry and shape validation stay
/// with the handlers, which may still reject with 401 after this passes.
pub async fn route_guard(cookies: Cookies, request: Request<Body>, next: Next) -> Response {
    let path = request.uri().path().to_string();

    if path.starts_with("/api/") {
        if PUBLIC_API.iter().any(|p| path.starts_with(p)) {
            return next.run(request).await;
        }

        if cookies.get(SESSION_COOKIE).is_none() {
            tracing::debug!("❌ Unauthenticated API request to {}", path);
            return (
                StatusCode::UNAUTHORIZED,
                Json(sonic_rs::json!({
                    "success": false,
                    "error": "Unauthorized",
                })),
            )
                .into_response();
        }

        return next.run(request).await;
    }

    if PROTECTED_ROUTES.iter().any(|p| path.starts_with(p))
        && cookies.get(SESSION_COOKIE).is_none()
    {
        tracing::debug!("➡️ Redirecting unauthenticated navigation to /login");
        return Redirect::to("/login").into_response();
    }

    next.run(request).await
}
