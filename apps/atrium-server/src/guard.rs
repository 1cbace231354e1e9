//! Access guard: coarse request-time gate, evaluated before any page handler.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};

use crate::cookies;

/// Route prefixes that require a session cookie.
const PROTECTED_PATHS: &[&str] = &["/feed", "/directory", "/companies", "/profile", "/admin"];

/// Routes that bounce already-signed-in visitors back into the app.
const AUTH_PATHS: &[&str] = &["/login", "/signup"];

/// Default landing page once authenticated.
const HOME: &str = "/feed";

/// Presence-only gate. The token is never verified here: this is a UX
/// redirect, not the authorization boundary. Every privileged operation
/// re-verifies the cookie cryptographically.
pub async fn access_guard(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let has_session = cookies::session_token(request.headers()).is_some();

    if is_protected(&path) && !has_session {
        return Redirect::temporary(&format!("/login?next={path}")).into_response();
    }
    if is_auth_page(&path) && has_session {
        return Redirect::temporary(HOME).into_response();
    }
    next.run(request).await
}

fn is_protected(path: &str) -> bool {
    PROTECTED_PATHS.iter().any(|p| path.starts_with(p))
}

fn is_auth_page(path: &str) -> bool {
    AUTH_PATHS.iter().any(|p| path.starts_with(p))
}
