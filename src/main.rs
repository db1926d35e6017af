//! Synergazing backend server
//!
//! Connects to the database, runs migrations, starts the notification
//! dispatcher, and serves the HTTP API.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use synergazing_api::{ApiServer, ApiServerConfig};
use synergazing_auth::{JwtClaims, JwtValidator};
use synergazing_core::{spawn_dispatcher, DbNotifier, Outbox, DEFAULT_QUEUE_CAPACITY};

#[derive(Parser, Debug)]
#[command(name = "synergazing")]
#[command(about = "Run the Synergazing backend API server", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    server_args: ServerArgs,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a session token for a user (testing and operations)
    GenerateToken {
        /// JWT secret (must match the server's --jwt-secret)
        #[arg(long, env = "SYNERGAZING_JWT_SECRET")]
        secret: String,

        /// User the token authenticates
        #[arg(long)]
        user_id: Uuid,

        /// Email embedded in the token
        #[arg(long)]
        email: String,

        /// Token validity in hours
        #[arg(long, default_value = "24")]
        hours: i64,
    },
}

#[derive(Parser, Debug)]
struct ServerArgs {
    /// HTTP API bind address
    #[arg(long, env = "SYNERGAZING_API_ADDR", default_value = "0.0.0.0:3002")]
    api_addr: SocketAddr,

    /// Database URL (postgres://... or sqlite://...)
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite::memory:")]
    database_url: String,

    /// Secret for signing session tokens
    #[arg(long, env = "SYNERGAZING_JWT_SECRET")]
    jwt_secret: Option<String>,

    /// Session token validity in hours
    #[arg(long, env = "SYNERGAZING_SESSION_HOURS", default_value = "72")]
    session_hours: i64,

    /// Log level (RUST_LOG takes precedence)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Additional allowed CORS origin (repeatable); localhost is always allowed
    #[arg(long = "cors-origin")]
    cors_origins: Vec<String>,

    /// Capacity of the notification queue
    #[arg(long, default_value_t = DEFAULT_QUEUE_CAPACITY)]
    notification_queue: usize,
}

fn generate_token(secret: &str, user_id: Uuid, email: &str, hours: i64) -> Result<()> {
    let claims = JwtClaims::session(user_id, email, chrono::Duration::hours(hours));

    let token = JwtValidator::encode(secret.as_bytes(), &claims)
        .map_err(|e| anyhow::anyhow!("Failed to generate token: {}", e))?;

    println!("User ID:   {}", user_id);
    println!("Valid for: {} hours", hours);
    println!("Expires:   {}", claims.expires_at().to_rfc3339());
    println!();
    println!("{}", token);

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(command) = cli.command {
        return match command {
            Commands::GenerateToken {
                secret,
                user_id,
                email,
                hours,
            } => generate_token(&secret, user_id, &email, hours),
        };
    }

    let args = cli.server_args;
    init_logging(&args.log_level)?;

    let jwt_secret = args
        .jwt_secret
        .context("--jwt-secret (or SYNERGAZING_JWT_SECRET) is required")?;

    info!("Starting Synergazing backend");

    info!("Connecting to database: {}", args.database_url);
    let db = synergazing_db::connect(&args.database_url).await?;
    synergazing_db::migrate(&db)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to run database migrations: {}", e))?;

    let (outbox, events) = Outbox::channel(args.notification_queue);
    let dispatcher = spawn_dispatcher(events, Arc::new(DbNotifier::new(db.clone())));
    info!(
        "Notification dispatcher started (queue capacity {})",
        args.notification_queue
    );

    let config = ApiServerConfig {
        bind_addr: args.api_addr,
        enable_cors: true,
        cors_origins: args.cors_origins,
        jwt_secret,
        session_hours: args.session_hours,
    };
    let server = ApiServer::new(config, db, outbox);

    let api_handle = tokio::spawn(async move {
        if let Err(e) = server.start().await {
            error!("API server error: {}", e);
        }
    });

    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received, stopping server..."),
        Err(err) => error!("Error listening for shutdown signal: {}", err),
    }

    api_handle.abort();
    dispatcher.abort();
    info!("Synergazing backend stopped");

    Ok(())
}

fn init_logging(log_level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(log_level))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    Ok(())
}
