//! Society Manager terminal session front-end
//!
//! Restores the saved session on every run, applies one command and prints
//! the resulting screen.
//!
//! ```sh
//! # Show the current screen
//! society-session status
//!
//! # Sign in (the mock provider accepts any password)
//! society-session login --email admin@society.com
//!
//! # Sign out
//! society-session logout
//!
//! # Produce a hash for an [[auth.accounts]] entry
//! society-session hash-password 'correct horse'
//! ```

mod view;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::info;

use society_session::config::{AppConfig, CONFIG_ENV};
use society_session::domain::ConfigError;
use society_session::infrastructure::crypto::password::hash_password;
use society_session::{default_config_path, init_tracing, start_session};

/// Society Manager session CLI.
#[derive(Parser, Debug)]
#[command(
    name = "society-session",
    version,
    about = "Sign in and out of the society management dashboard",
    long_about = "Terminal front-end for the society management session.\n\n\
                  Default config: ~/.config/society-session/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = CONFIG_ENV)]
    config: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the current screen.
    Status,
    /// Sign in.
    Login {
        #[arg(short, long)]
        email: String,
        /// Password (or set SOCIETY_PASSWORD).
        #[arg(short, long, env = "SOCIETY_PASSWORD", hide_env_values = true, default_value = "")]
        password: String,
    },
    /// Sign out. Safe to repeat.
    Logout,
    /// Print a bcrypt hash for use in [[auth.accounts]].
    HashPassword { password: String },
    /// Validate the configuration file and print the effective settings.
    Check,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let mut config = match resolve_config(&config_path, &cli.command) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("❌ Invalid configuration {}: {}", config_path.display(), e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    init_tracing(&config.logging);
    info!("Configuration: {}", config_path.display());

    match run(cli.command, &config, &config_path).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Load the config for a command. A missing file means defaults; an invalid
/// one is an error for every command that touches the session.
fn resolve_config(path: &Path, command: &Command) -> Result<AppConfig, ConfigError> {
    match AppConfig::load_or_default(path) {
        Ok(config) => Ok(config),
        Err(_) if matches!(command, Command::HashPassword { .. }) => Ok(AppConfig::default()),
        Err(e) => Err(e),
    }
}

async fn run(
    command: Command,
    config: &AppConfig,
    config_path: &Path,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match &command {
        Command::HashPassword { password } => {
            println!("{}", hash_password(password)?);
            return Ok(ExitCode::SUCCESS);
        }
        Command::Check => {
            println!("✅ Configuration is valid");
            println!("   Config file : {}", config_path.display());
            println!("   Storage     : {:?} ({})", config.storage.backend, config.storage.path.display());
            println!("   Session key : {}", config.storage.key);
            println!("   Auth        : {:?}", config.auth.provider);
            match config.auth.login_timeout() {
                Some(limit) => println!("   Timeout     : {}s", limit.as_secs()),
                None => println!("   Timeout     : none"),
            }
            println!("   Log level   : {}", config.logging.level);
            return Ok(ExitCode::SUCCESS);
        }
        _ => {}
    }

    let session = start_session(config).await?;

    let code = match command {
        Command::Login { email, password } => match session.login(&email, &password).await {
            Ok(outcome) => {
                info!(user_id = %outcome.user_id, role = %outcome.role, "Signed in");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("login failed: {}", e);
                ExitCode::FAILURE
            }
        },
        Command::Logout => {
            session.logout().await?;
            ExitCode::SUCCESS
        }
        _ => ExitCode::SUCCESS,
    };

    print!("{}", view::render(&session.state()));
    Ok(code)
}
