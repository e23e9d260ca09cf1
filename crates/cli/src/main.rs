//! Directorio CLI - Database migrations and user management.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! directorio migrate
//!
//! # Create a user
//! directorio user create -u ana -p 'long password' --password-confirm 'long password'
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

use directorio_api::models::UserIn;

mod commands;

#[derive(Parser)]
#[command(name = "directorio")]
#[command(author, version, about = "Directorio CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user
    Create {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// Email address
        #[arg(short, long)]
        email: Option<String>,

        /// Password (at least 8 characters)
        #[arg(short, long)]
        password: String,

        /// Password again
        #[arg(long)]
        password_confirm: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::User { action } => match action {
            UserAction::Create {
                username,
                email,
                password,
                password_confirm,
            } => {
                commands::user::create(UserIn {
                    username,
                    email,
                    password,
                    password_confirm,
                })
                .await?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_user_create() {
        let cli = Cli::try_parse_from([
            "directorio",
            "user",
            "create",
            "-u",
            "ana",
            "-p",
            "correct-horse",
            "--password-confirm",
            "correct-horse",
        ])
        .unwrap_or_else(|e| panic!("{e}"));

        let Commands::User {
            action: UserAction::Create {
                username, email, ..
            },
        } = cli.command
        else {
            panic!("expected user create");
        };
        assert_eq!(username, "ana");
        assert!(email.is_none());
    }

    #[test]
    fn password_confirm_is_required() {
        let result = Cli::try_parse_from(["directorio", "user", "create", "-u", "ana", "-p", "x"]);
        assert!(result.is_err());
    }
}
