mod config;
mod cookies;
mod email;
mod error;
mod guard;
mod handlers;
mod server;
#[cfg(test)]
mod tests;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use atrium_identity::{CredentialIssuer, TokenSigner};
use atrium_storage::{CreateInvitationParams, InviteCode, Store, StoreError};
use atrium_store_sqlite::SqliteStore;

use config::ServerConfig;
use server::AtriumServer;

// ────────────────────────────────────── CLI Types ──────────────────────────────────────

#[derive(Parser)]
#[command(name = "atrium-server")]
#[command(about = "Atrium server CLI for administration and serving")]
struct Cli {
    /// SQLite database URL (sqlite://path/to/store.db); defaults to ~/.atrium/store.db
    #[arg(long, global = true, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP server
    Serve {
        /// Server address
        #[arg(long, default_value = "0.0.0.0:3000")]
        addr: String,
    },
    /// Invitation management commands
    Invite {
        #[command(subcommand)]
        invite_cmd: InviteCommand,
    },
}

#[derive(Subcommand)]
enum InviteCommand {
    /// Create an invitation server-side (for bootstrapping the first members)
    Create {
        /// Email address the invitation is bound to
        #[arg(long)]
        email: String,
        /// Output only the signup link (for scripts)
        #[arg(long)]
        plain: bool,
    },
    /// List all invitations
    List,
}

// ────────────────────────────────────── Entry point ──────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { addr } => serve(cli.database_url.as_deref(), &addr).await,
        Command::Invite { invite_cmd } => invite(cli.database_url.as_deref(), invite_cmd).await,
    }
}

async fn serve(database_url: Option<&str>, addr: &str) -> anyhow::Result<()> {
    let config = Arc::new(ServerConfig::from_env()?);

    let store: Arc<dyn Store> = Arc::new(open_store(database_url).await?);

    let signer = match config.session_key {
        Some(seed) => TokenSigner::from_seed(seed),
        None => {
            warn!("ATRIUM_SESSION_KEY not set; using an ephemeral signing key, sessions will not survive a restart");
            TokenSigner::generate()
        }
    };
    let issuer: Arc<dyn CredentialIssuer> = Arc::new(signer);

    let mailer = email::create_mailer(config.email.as_ref())?.map(|m| Arc::from(m));
    if mailer.is_none() {
        info!("no email provider configured; invitation links will be logged instead of sent");
    }

    let server = AtriumServer::new(store, issuer, mailer, config);
    let app = handlers::router(server);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "atrium-server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn invite(database_url: Option<&str>, command: InviteCommand) -> anyhow::Result<()> {
    let store = open_store(database_url).await?;

    match command {
        InviteCommand::Create { email, plain } => {
            let email = email.trim().to_lowercase();
            let invitation = store
                .put_invitation(&CreateInvitationParams {
                    code: InviteCode::generate(),
                    email,
                    sent_by: None, // server-created
                })
                .await?;

            let app_url = std::env::var("ATRIUM_APP_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string());
            let link = format!(
                "{}/signup?code={}",
                app_url.trim_end_matches('/'),
                invitation.code
            );
            if plain {
                println!("{link}");
            } else {
                println!("Invitation created for {}", invitation.email);
                println!("  code: {}", invitation.code);
                println!("  link: {link}");
            }
        }
        InviteCommand::List => {
            for invitation in store.list_invitations().await? {
                let status = if invitation.is_unused() {
                    "pending"
                } else {
                    "used"
                };
                println!(
                    "{}  {}  {}  sent {}",
                    invitation.code,
                    invitation.email,
                    status,
                    invitation.sent_at.format("%Y-%m-%d %H:%M"),
                );
            }
        }
    }

    Ok(())
}

async fn open_store(database_url: Option<&str>) -> Result<SqliteStore, StoreError> {
    match database_url {
        Some(url) => SqliteStore::open(url).await,
        None => SqliteStore::open_default().await,
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}
