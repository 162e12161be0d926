//! Wauth - Active Directory authentication server
//!
//! Serves routes protected by the Windows authentication strategy, and
//! checks credentials against the configured directory from the shell.

use clap::{Parser, Subcommand};
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use wauth_core::{
    config::LoggingConfig, AuthRequest, Error, Outcome, Profile, Verified, WauthConfig,
};
use wauth_server::AuthServer;
use wauth_strategy::{AuthStrategy, Strategy, StrategyOptions, Verify};

#[derive(Parser)]
#[command(name = "wauth")]
#[command(author = "Wauth Team")]
#[command(version = wauth_core::VERSION)]
#[command(about = "Active Directory authentication server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long, global = true, env = "WAUTH_CONFIG")]
    config: Option<String>,

    /// Bind address
    #[arg(long, env = "WAUTH_BIND_ADDRESS")]
    bind: Option<String>,

    /// Port number
    #[arg(short, long, env = "WAUTH_PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "WAUTH_LOG_LEVEL")]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the authentication server
    Serve,

    /// Authenticate a username and password against the directory
    Check {
        #[arg(short, long)]
        username: String,

        #[arg(long, env = "WAUTH_CHECK_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Load config
    let mut config = match cli.config {
        Some(ref path) => WauthConfig::from_file(path)?,
        None => WauthConfig::from_env(),
    };

    // Override with CLI args
    if let Some(bind) = cli.bind {
        config.server.bind_address = bind;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    init_logging(&config.logging);

    match cli.command {
        Some(Commands::Version) => print_version(),
        Some(Commands::Check { username, password }) => check(config, username, password).await?,
        Some(Commands::Serve) | None => serve(config).await?,
    }

    Ok(())
}

fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().with_target(true)).init();
    }
}

fn print_version() {
    println!("wauth {}", wauth_core::VERSION);
}

/// Callback accepting every profile the strategy resolves
fn accept_all(pass_request: bool) -> Verify<Profile> {
    if pass_request {
        Verify::request_and_profile(|req: AuthRequest, profile| async move {
            let mut verified = Verified::accept(profile);
            if let Some(agent) = req.header("user-agent") {
                verified = verified.with_info(json!({ "userAgent": agent }));
            }
            Ok(verified)
        })
    } else {
        Verify::profile(|profile| async move { Ok(Verified::accept(profile)) })
    }
}

async fn serve(config: WauthConfig) -> anyhow::Result<()> {
    info!("Starting wauth server...");
    match config.ldap {
        Some(ref ldap) => info!("Directory: {} ({})", ldap.url, ldap.base_dn),
        None => info!("Directory: none"),
    }

    let options = StrategyOptions::from_config(&config.strategy, config.ldap.as_ref());
    let strategy = Strategy::new(options, accept_all(config.strategy.pass_req_to_callback))?;

    let server = AuthServer::new(config.server, Arc::new(strategy));
    server.run().await?;

    Ok(())
}

async fn check(config: WauthConfig, username: String, password: String) -> anyhow::Result<()> {
    if config.ldap.is_none() {
        return Err(Error::Config(
            "check needs a directory: configure [ldap] or WAUTH_LDAP_URL".into(),
        )
        .into());
    }

    let mut options = StrategyOptions::from_config(&config.strategy, config.ldap.as_ref());
    options.integrated = false;

    let req = AuthRequest::default()
        .with_body_field(options.username_field.clone(), username)
        .with_body_field(options.password_field.clone(), password);

    let strategy = Strategy::new(options, accept_all(false))?;

    match strategy.authenticate(req).await {
        Outcome::Success { user, .. } => {
            println!("{}", serde_json::to_string_pretty(&user)?);
            Ok(())
        }
        Outcome::Fail(info) => {
            let message = info
                .as_ref()
                .and_then(|v| v.as_str())
                .unwrap_or("Unauthorized");
            anyhow::bail!("authentication failed: {}", message)
        }
        Outcome::Error(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_check_requires_directory() {
        let err = check(WauthConfig::default(), "anyone".into(), "wrong".into())
            .await
            .unwrap_err();

        let err = err.downcast::<Error>().unwrap();
        assert!(matches!(err, Error::Config(_)));
    }
}
