//! Server configuration module.
//!
//! Everything is read once at startup from environment variables:
//!
//! ```bash
//! # Core settings
//! ATRIUM_ADMIN_EMAIL=founder@example.com   # bootstrap admin, always eligible
//! ATRIUM_APP_URL=https://alumni.example.com
//! ATRIUM_SESSION_TTL_DAYS=5
//! ATRIUM_COOKIE_SECURE=true                # Secure cookie attribute (production)
//! ATRIUM_SESSION_KEY=<64 hex chars>        # Ed25519 seed for session signing
//!
//! # Provider: Resend
//! ATRIUM_EMAIL_PROVIDER=resend
//! RESEND_API_KEY=re_...
//!
//! # Provider: SMTP
//! ATRIUM_EMAIL_PROVIDER=smtp
//! SMTP_HOST=smtp.gmail.com
//! SMTP_PORT=587
//! SMTP_USERNAME=user@example.com
//! SMTP_PASSWORD=app_password
//! SMTP_USE_TLS=true
//!
//! # Sender config
//! ATRIUM_EMAIL_FROM=noreply@alumni.example.com
//! ATRIUM_EMAIL_FROM_NAME="Atrium Alumni"
//! ```

use std::env;

use chrono::Duration;
use thiserror::Error;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bootstrap admin address; always eligible, checked before any
    /// invitation lookup.
    pub admin_email: String,
    /// Public base URL, used to build signup links.
    pub app_url: String,
    /// Session cookie lifetime.
    pub session_ttl: Duration,
    /// Whether the session cookie carries the Secure attribute.
    pub cookie_secure: bool,
    /// Ed25519 seed for the session signer. None = ephemeral key.
    pub session_key: Option<[u8; 32]>,
    /// Email provider configuration, if any.
    pub email: Option<EmailConfig>,
}

/// Email configuration for the notification sink
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// Email provider configuration
    pub provider: EmailProviderConfig,
    /// From email address
    pub from_address: String,
    /// Optional from name
    pub from_name: Option<String>,
}

/// Email provider configuration
#[derive(Debug, Clone)]
pub enum EmailProviderConfig {
    /// Resend email provider
    Resend {
        #[allow(dead_code)] // Used when email-resend feature is enabled
        api_key: String,
    },
    /// SMTP email provider
    Smtp {
        host: String,
        port: u16,
        username: Option<String>,
        password: Option<String>,
        use_tls: bool,
    },
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid email provider: {0}. Expected 'resend' or 'smtp'")]
    InvalidProvider(String),

    #[error("Invalid port number: {0}")]
    InvalidPort(String),

    #[error("Missing from address: ATRIUM_EMAIL_FROM is required when email is configured")]
    MissingFromAddress,

    #[error("SMTP provider requires SMTP_HOST")]
    SmtpMissingHost,

    #[error("Invalid ATRIUM_SESSION_KEY: expected 64 hex characters")]
    InvalidSessionKey,

    #[error("Invalid ATRIUM_SESSION_TTL_DAYS: {0}")]
    InvalidTtl(String),
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let admin_email = env::var("ATRIUM_ADMIN_EMAIL")
            .map_err(|_| ConfigError::MissingEnvVar("ATRIUM_ADMIN_EMAIL".to_string()))?
            .to_lowercase();

        let app_url = env::var("ATRIUM_APP_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .trim_end_matches('/')
            .to_string();

        let session_ttl = match env::var("ATRIUM_SESSION_TTL_DAYS") {
            Ok(raw) => {
                let days = raw
                    .parse::<i64>()
                    .ok()
                    .filter(|d| *d > 0)
                    .ok_or(ConfigError::InvalidTtl(raw))?;
                Duration::days(days)
            }
            Err(_) => Duration::days(5),
        };

        let cookie_secure = env::var("ATRIUM_COOKIE_SECURE")
            .map(|v| v.to_lowercase() == "true" || v == "1")
            .unwrap_or(false);

        let session_key = match env::var("ATRIUM_SESSION_KEY") {
            Ok(raw) => {
                let bytes = hex::decode(raw.trim()).map_err(|_| ConfigError::InvalidSessionKey)?;
                let seed: [u8; 32] = bytes
                    .try_into()
                    .map_err(|_| ConfigError::InvalidSessionKey)?;
                Some(seed)
            }
            Err(_) => None,
        };

        Ok(Self {
            admin_email,
            app_url,
            session_ttl,
            cookie_secure,
            session_key,
            email: Self::email_from_env()?,
        })
    }

    fn email_from_env() -> Result<Option<EmailConfig>, ConfigError> {
        let provider_type = match env::var("ATRIUM_EMAIL_PROVIDER") {
            Ok(p) => p,
            Err(_) => return Ok(None),
        };

        let provider = match provider_type.to_lowercase().as_str() {
            "resend" => {
                let api_key = env::var("RESEND_API_KEY")
                    .map_err(|_| ConfigError::MissingEnvVar("RESEND_API_KEY".to_string()))?;
                EmailProviderConfig::Resend { api_key }
            }
            "smtp" => {
                let host = env::var("SMTP_HOST").map_err(|_| ConfigError::SmtpMissingHost)?;
                let port = env::var("SMTP_PORT")
                    .unwrap_or_else(|_| "587".to_string())
                    .parse::<u16>()
                    .map_err(|_| {
                        ConfigError::InvalidPort(
                            env::var("SMTP_PORT").unwrap_or_else(|_| "invalid".to_string()),
                        )
                    })?;
                let username = env::var("SMTP_USERNAME").ok();
                let password = env::var("SMTP_PASSWORD").ok();
                let use_tls = env::var("SMTP_USE_TLS")
                    .map(|v| v.to_lowercase() == "true" || v == "1")
                    .unwrap_or(true); // TLS by default

                EmailProviderConfig::Smtp {
                    host,
                    port,
                    username,
                    password,
                    use_tls,
                }
            }
            other => return Err(ConfigError::InvalidProvider(other.to_string())),
        };

        let from_address =
            env::var("ATRIUM_EMAIL_FROM").map_err(|_| ConfigError::MissingFromAddress)?;
        let from_name = env::var("ATRIUM_EMAIL_FROM_NAME").ok();

        Ok(Some(EmailConfig {
            provider,
            from_address,
            from_name,
        }))
    }
}
