//! Gita Admin CLI - operational checks against the live Firebase project.
//!
//! # Usage
//!
//! ```bash
//! # Verify that an account resolves as an admin (password from the
//! # GITA_ADMIN_PASSWORD environment variable unless --password is given)
//! gita-admin login -e admin@gitagita.com
//!
//! # Print both historical admin-document id candidates for an email
//! gita-admin doc-id -e a.b@x.com
//! ```
//!
//! # Environment Variables
//!
//! - `GITA_FIREBASE_API_KEY` - Firebase web API key
//! - `GITA_FIREBASE_PROJECT_ID` - Firebase project id
//! - `GITA_ADMIN_PASSWORD` - Password for `login` when --password is omitted

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "gita-admin")]
#[command(author, version, about = "Gita admin panel CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and print the resolved admin profile
    Login {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Account password (falls back to GITA_ADMIN_PASSWORD)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Print the admin-document id candidates for an email
    DocId {
        /// Email address to derive ids for
        #[arg(short, long)]
        email: String,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Login { email, password } => {
            commands::login::run(&email, password).await?;
        }
        Commands::DocId { email } => {
            commands::doc_id::run(&email)?;
        }
    }
    Ok(())
}
