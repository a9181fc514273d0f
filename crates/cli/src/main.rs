//! ElectroMart CLI - account access from the terminal.
//!
//! Shares the storefront's session store, so logging in here also signs in
//! the local storefront (and the reverse).
//!
//! # Usage
//!
//! ```bash
//! # Sign in
//! em-cli login -e a@x.com -p secret
//!
//! # Create an account (welcome bonus is credited by the API)
//! em-cli register -n "Asha Rao" -e a@x.com -p secret --phone 9876543210
//!
//! # Show the signed-in user, loyalty standing, order history
//! em-cli whoami
//! em-cli loyalty
//! em-cli orders
//!
//! # Sign out
//! em-cli logout
//! ```
//!
//! # Environment Variables
//!
//! Same as the storefront: `ELECTROMART_API_URL`, `STOREFRONT_DATA_DIR`.
//! `RUST_LOG` overrides the default log filter.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

/// Command output is logged at info; library chatter stays at warn.
const DEFAULT_LOG_FILTER: &str = "em_cli=info,electromart_storefront=warn";

#[derive(Parser)]
#[command(name = "em-cli")]
#[command(author, version, about = "ElectroMart account tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session
    Login {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },
    /// Create an account and sign in to it
    Register {
        /// Full name
        #[arg(short, long)]
        name: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password
        #[arg(short, long)]
        password: String,

        /// Phone number
        #[arg(long)]
        phone: Option<String>,
    },
    /// Clear the stored session
    Logout,
    /// Show the signed-in user
    Whoami {
        /// Refetch points and tier first
        #[arg(short, long)]
        refresh: bool,
    },
    /// Show loyalty tier, points and benefits
    Loyalty,
    /// List past orders
    Orders,
}

#[tokio::main]
async fn main() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    let ctx = commands::Context::open()?;

    match cli.command {
        Commands::Login { email, password } => {
            commands::auth::login(&ctx, &email, password).await?;
        }
        Commands::Register {
            name,
            email,
            password,
            phone,
        } => {
            commands::auth::register(&ctx, name, email, password, phone).await?;
        }
        Commands::Logout => commands::auth::logout(&ctx),
        Commands::Whoami { refresh } => commands::auth::whoami(&ctx, refresh).await?,
        Commands::Loyalty => commands::account::loyalty(&ctx).await?,
        Commands::Orders => commands::account::orders(&ctx).await?,
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tracing::level_filters::LevelFilter;

    use super::*;

    #[test]
    fn test_default_filter_shows_command_output() {
        let filter: EnvFilter = DEFAULT_LOG_FILTER.parse().unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
        // Log targets in this binary are prefixed with its crate name.
        let own = format!("{}=info", env!("CARGO_CRATE_NAME"));
        assert!(DEFAULT_LOG_FILTER.split(',').any(|directive| directive == own));
    }

    #[test]
    fn test_cli_parses_whoami_refresh() {
        let cli = Cli::try_parse_from(["em-cli", "whoami", "--refresh"]).unwrap();
        assert!(matches!(cli.command, Commands::Whoami { refresh: true }));
    }
}
