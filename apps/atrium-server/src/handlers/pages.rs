//! Shell page routes fronted by the access guard.
//!
//! Rendering is out of scope for this service; these serve a minimal shell
//! the client app hydrates, and exist so the guard has real routes to
//! classify. `/signup` takes its invitation code from the query string
//! client-side and probes `/api/invitations/check` with it.

use axum::extract::Path;
use axum::response::Html;

fn shell(page: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>{page} · Atrium</title></head>
<body><div id="app" data-page="{page}"></div></body>
</html>"#
    ))
}

pub async fn index() -> Html<String> {
    shell("home")
}

pub async fn feed() -> Html<String> {
    shell("feed")
}

pub async fn directory() -> Html<String> {
    shell("directory")
}

pub async fn companies() -> Html<String> {
    shell("companies")
}

pub async fn profile(Path(_uid): Path<String>) -> Html<String> {
    shell("profile")
}

pub async fn admin() -> Html<String> {
    shell("admin")
}

pub async fn login() -> Html<String> {
    shell("login")
}

pub async fn signup() -> Html<String> {
    shell("signup")
}
