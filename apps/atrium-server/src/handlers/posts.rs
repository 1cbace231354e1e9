//! Feed post creation with broadcast notification.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use tracing::warn;

use atrium_storage::{CreatePostParams, Post, UserId};

use crate::email::templates::PostNotification;
use crate::email::OutboundEmail;
use crate::error::ApiError;
use crate::server::AtriumServer;

#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

pub async fn create(
    State(server): State<AtriumServer>,
    headers: HeaderMap,
    Json(req): Json<CreateRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    // Strict verification: a present-but-bogus cookie gets past the access
    // guard, never past this.
    let claims = server.require_session(&headers).await?;

    let title = req.title.as_deref().map(str::trim).unwrap_or_default();
    let description = req.description.as_deref().map(str::trim).unwrap_or_default();
    if title.is_empty() || description.is_empty() {
        return Err(ApiError::InvalidInput(
            "Title and description required".to_string(),
        ));
    }

    let post = server
        .store
        .create_post(&CreatePostParams {
            author_id: UserId(claims.sub.clone()),
            title: title.to_string(),
            description: description.to_string(),
        })
        .await?;

    notify_subscribers(&server, &post);

    Ok(Json(serde_json::json!({ "id": post.id.to_string() })))
}

/// Broadcast to every profile that has notifications enabled, off the
/// request path. Failures are logged only.
fn notify_subscribers(server: &AtriumServer, post: &Post) {
    let Some(mailer) = server.mailer.clone() else {
        return;
    };
    let store = server.store.clone();
    let feed_link = format!("{}/feed", server.config.app_url);
    let title = post.title.clone();
    let description = post.description.clone();

    tokio::spawn(async move {
        let profiles = match store.list_profiles().await {
            Ok(profiles) => profiles,
            Err(e) => {
                warn!(error = %e, "failed to load notification subscribers");
                return;
            }
        };

        let content = PostNotification::new(&title, &description, &feed_link);
        let messages: Vec<OutboundEmail> = profiles
            .into_iter()
            .filter(|p| p.email_notifications)
            .map(|p| OutboundEmail {
                to: p.email,
                subject: content.subject.clone(),
                html: content.html.clone(),
            })
            .collect();

        if messages.is_empty() {
            return;
        }
        if let Err(e) = mailer.send_batch(&messages).await {
            warn!(error = %e, "failed to send post notifications");
        }
    });
}
