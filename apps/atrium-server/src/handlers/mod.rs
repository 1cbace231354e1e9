//! Handler modules and router assembly.
//!
//! This module contains handler functions organized by domain:
//! - invitations: issue (admin-only), eligibility probe
//! - session: mint, revoke
//! - accounts: invitation-gated signup completion
//! - posts: feed posts with broadcast notification
//! - pages: shell routes fronted by the access guard

pub mod accounts;
pub mod invitations;
pub mod pages;
pub mod posts;
pub mod session;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;

use crate::guard;
use crate::server::AtriumServer;

pub fn router(server: AtriumServer) -> Router {
    let api = Router::new()
        .route("/api/invitations", post(invitations::issue))
        .route("/api/invitations/check", get(invitations::check))
        .route(
            "/api/session",
            post(session::mint).delete(session::revoke),
        )
        .route("/api/accounts", post(accounts::signup))
        .route("/api/posts", post(posts::create));

    let pages = Router::new()
        .route("/", get(pages::index))
        .route("/feed", get(pages::feed))
        .route("/directory", get(pages::directory))
        .route("/companies", get(pages::companies))
        .route("/profile/{uid}", get(pages::profile))
        .route("/admin", get(pages::admin))
        .route("/login", get(pages::login))
        .route("/signup", get(pages::signup))
        .layer(middleware::from_fn(guard::access_guard));

    api.merge(pages).with_state(server)
}
