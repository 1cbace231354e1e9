//! Email content for invitations and feed notifications.

/// Invitation email parameterized by the signup link.
pub struct InvitationEmail {
    pub subject: String,
    pub text: String,
    pub html: String,
}

impl InvitationEmail {
    /// Create invitation email content with the given signup link.
    pub fn new(signup_link: &str) -> Self {
        Self {
            subject: "You're invited to join the alumni network".to_string(),
            text: Self::text_template(signup_link),
            html: Self::html_template(signup_link),
        }
    }

    fn text_template(signup_link: &str) -> String {
        format!(
            r#"You've been invited to join our private alumni network.

Create your account: {}

This link is unique to you — please don't share it."#,
            signup_link
        )
    }

    fn html_template(signup_link: &str) -> String {
        format!(
            r#"<p>You've been invited to join our private alumni network.</p>
<p><a href="{}">Click here to create your account</a></p>
<p>This link is unique to you — please don't share it.</p>"#,
            signup_link
        )
    }
}

/// Broadcast notification for a new feed post.
pub struct PostNotification {
    pub subject: String,
    pub html: String,
}

impl PostNotification {
    pub fn new(title: &str, description: &str, feed_link: &str) -> Self {
        Self {
            subject: format!("New post: {}", title),
            html: format!(
                r#"<h2>{}</h2>
<p>{}</p>
<p><a href="{}">View in feed</a></p>"#,
                title, description, feed_link
            ),
        }
    }
}
