use clap::{Parser, Subcommand};
use rusqlite::Connection;
use crate::config::Config;
use crate::db::DbConnection;
use crate::models::AuthSession;
use crate::repo::{AuthError, DashboardRepo, UserRepo};
use crate::cli::commands_clients::{handle_clients, handle_stages, ClientCommands, StageCommands};
use crate::cli::commands_estimates::{handle_estimates, EstimateCommands};
use crate::cli::commands_partners::{handle_contractors, handle_suppliers, ContractorCommands, SupplierCommands};
use crate::cli::commands_tasks::{handle_tasks, TaskCommands};
use crate::cli::error::{user_error, validate_non_empty};
use crate::cli::output::{format_dashboard, OutputOptions};
use crate::cli::session;
use crate::utils::today;
use anyhow::{Context, Result};

#[derive(Parser)]
#[command(name = "parkcrm")]
#[command(about = "Park Construction CRM - client pipeline, estimates, suppliers and tasks")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign up, log in and out
    Auth {
        #[command(subcommand)]
        subcommand: AuthCommands,
    },
    /// Client management and pipeline overview
    Clients {
        #[command(subcommand)]
        subcommand: ClientCommands,
    },
    /// Pipeline stages of a client
    Stages {
        #[command(subcommand)]
        subcommand: StageCommands,
    },
    /// Estimates (smety) with line items
    Estimates {
        #[command(subcommand)]
        subcommand: EstimateCommands,
    },
    /// Material suppliers, their orders and reviews
    Suppliers {
        #[command(subcommand)]
        subcommand: SupplierCommands,
    },
    /// Subcontractors, their projects and reviews
    Contractors {
        #[command(subcommand)]
        subcommand: ContractorCommands,
    },
    /// Task board
    Tasks {
        #[command(subcommand)]
        subcommand: TaskCommands,
    },
    /// Totals, recent clients and today's tasks
    Dashboard {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Create an account
    Signup {
        #[arg(long)]
        email: String,
        /// At least 6 characters
        #[arg(long)]
        password: String,
        /// Full name, used as the author of comments and reviews
        #[arg(long)]
        name: String,
    },
    /// Log in and remember the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// End the current session
    Logout,
    /// Show the logged-in user
    Whoami {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

pub fn run() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version are not errors
            e.print()?;
            if e.use_stderr() {
                std::process::exit(1);
            }
            return Ok(());
        }
    };

    let config = Config::load()?;
    let conn = DbConnection::open(&config.db_path)
        .context("Failed to connect to database")?;
    let opts = OutputOptions::detect();

    match cli.command {
        Commands::Auth { subcommand } => handle_auth(&conn, &config, subcommand),
        command => {
            let session = require_session(&conn, &config)?;
            log::debug!("Running as user {}", session.user.id);
            handle_command(&conn, &session, command, opts)
        }
    }
}

/// Resolve the stored session token, or fail with "Not logged in"
fn require_session(conn: &Connection, config: &Config) -> Result<AuthSession> {
    let token = match session::read_token(&config.session_path)? {
        Some(token) => token,
        None => return Err(AuthError::NotLoggedIn.into()),
    };
    match UserRepo::resolve_session(conn, &token)? {
        Some(session) => Ok(session),
        None => {
            log::warn!("Stored session token is no longer valid");
            Err(AuthError::NotLoggedIn.into())
        }
    }
}

fn handle_command(conn: &Connection, session: &AuthSession, command: Commands, opts: OutputOptions) -> Result<()> {
    match command {
        Commands::Auth { .. } => Ok(()),
        Commands::Clients { subcommand } => handle_clients(conn, session, subcommand, opts),
        Commands::Stages { subcommand } => handle_stages(conn, subcommand, opts),
        Commands::Estimates { subcommand } => handle_estimates(conn, subcommand, opts),
        Commands::Suppliers { subcommand } => handle_suppliers(conn, session, subcommand, opts),
        Commands::Contractors { subcommand } => handle_contractors(conn, session, subcommand, opts),
        Commands::Tasks { subcommand } => handle_tasks(conn, subcommand, opts),
        Commands::Dashboard { json } => handle_dashboard(conn, json, opts),
    }
}

fn handle_auth(conn: &Connection, config: &Config, cmd: AuthCommands) -> Result<()> {
    match cmd {
        AuthCommands::Signup { email, password, name } => {
            if let Err(e) = validate_non_empty(&name, "Full name") {
                user_error(&e);
            }
            let user = UserRepo::sign_up(conn, &email, &password, &name)?;
            println!("Registered {} <{}>. Log in with 'parkcrm auth login'.", user.full_name, user.email);
            Ok(())
        }
        AuthCommands::Login { email, password } => {
            // Replace any session this terminal already holds
            if let Some(old) = session::read_token(&config.session_path)? {
                UserRepo::sign_out(conn, &old)?;
            }
            let auth = UserRepo::sign_in(conn, &email, &password)?;
            session::write_token(&config.session_path, &auth.token)?;
            println!("Logged in as {} <{}>", auth.user.full_name, auth.user.email);
            Ok(())
        }
        AuthCommands::Logout => {
            match session::read_token(&config.session_path)? {
                Some(token) => {
                    UserRepo::sign_out(conn, &token)?;
                    session::clear_token(&config.session_path)?;
                    println!("Logged out.");
                }
                None => println!("Not logged in."),
            }
            Ok(())
        }
        AuthCommands::Whoami { json } => {
            let auth = require_session(conn, config)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&auth.user)?);
            } else {
                println!("{} <{}>", auth.user.full_name, auth.user.email);
            }
            Ok(())
        }
    }
}

fn handle_dashboard(conn: &Connection, json: bool, opts: OutputOptions) -> Result<()> {
    let dashboard = DashboardRepo::load(conn, &today())
        .context("Failed to load dashboard")?;
    if json {
        println!("{}", serde_json::to_string_pretty(&dashboard)?);
    } else {
        println!("{}", format_dashboard(&dashboard, opts));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use crate::pipeline::PipelineStatus;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_nested_subcommands() {
        let cli = Cli::try_parse_from(["parkcrm", "stages", "toggle", "3", "2"]).unwrap();
        assert!(matches!(cli.command, Commands::Stages { .. }));

        let cli = Cli::try_parse_from(["parkcrm", "dashboard", "--json"]).unwrap();
        assert!(matches!(cli.command, Commands::Dashboard { json: true }));

        assert!(Cli::try_parse_from(["parkcrm", "auth", "login", "--email", "a@b.ru"]).is_err());

        let cli = Cli::try_parse_from(["parkcrm", "clients", "list", "--status", "in-progress"]).unwrap();
        match cli.command {
            Commands::Clients { subcommand: ClientCommands::List { status, .. } } => {
                assert_eq!(status, Some(PipelineStatus::InProgress));
            }
            _ => panic!("expected clients list"),
        }
        assert!(Cli::try_parse_from(["parkcrm", "clients", "list", "--status", "won"]).is_err());
    }
}
