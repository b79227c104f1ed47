// Client and pipeline stage commands

use clap::{Args, Subcommand};
use rusqlite::Connection;
use crate::models::{AuthSession, ClientFields, CommentType, SERVICE_CATALOG};
use crate::pipeline::PipelineStatus;
use crate::repo::{ClientRepo, CommentRepo, StageRepo};
use crate::cli::error::{parse_amount, user_error, validate_id, validate_non_empty, validate_stage_order};
use crate::cli::output::{format_client_detail, format_client_table, format_stage_list, OutputOptions};
use crate::utils::parse_date;
use anyhow::{Context, Result};

#[derive(Subcommand)]
pub enum ClientCommands {
    /// Add a client; the 9 default pipeline stages are created with it
    Add {
        /// Client name
        name: String,
        #[command(flatten)]
        fields: ClientArgs,
    },
    /// List clients with their pipeline status
    List {
        /// Match name, phone or email (case-insensitive)
        #[arg(long, short = 's')]
        search: Option<String>,
        /// Only clients in this pipeline status
        #[arg(long, value_enum)]
        status: Option<PipelineStatus>,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Show a client card with stages and comments
    Show {
        /// Client ID
        id: String,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Change client fields
    Modify {
        /// Client ID
        id: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        fields: ClientArgs,
        /// Remove all services
        #[arg(long, conflicts_with = "services")]
        clear_services: bool,
    },
    /// Add a comment to a client
    Comment {
        /// Client ID
        id: String,
        /// Comment kind: note, call, meeting or email
        #[arg(long = "type", default_value = "note")]
        comment_type: String,
        /// Comment text
        #[arg(trailing_var_arg = true, required = true)]
        text: Vec<String>,
    },
    /// List the service catalog codes
    Services,
}

/// Optional client fields shared by `add` and `modify`
#[derive(Args, Default)]
pub struct ClientArgs {
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    /// Project description
    #[arg(long)]
    pub description: Option<String>,
    /// Budget in rubles
    #[arg(long)]
    pub budget: Option<String>,
    /// Project area in square meters
    #[arg(long)]
    pub area: Option<String>,
    /// Date of last contact (YYYY-MM-DD, DD.MM.YYYY, today)
    #[arg(long)]
    pub last_contact: Option<String>,
    #[arg(long)]
    pub next_action: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
    /// Service code (repeatable); see `clients services`
    #[arg(long = "service", id = "services")]
    pub services: Vec<String>,
}

impl ClientArgs {
    /// Validate and convert into repository fields
    fn into_fields(self, name: Option<String>) -> ClientFields {
        let budget = self.budget.map(|b| parse_amount(&b, "budget").unwrap_or_else(|e| user_error(&e)));
        let project_area = self.area.map(|a| parse_amount(&a, "area").unwrap_or_else(|e| user_error(&e)));
        let last_contact = self.last_contact.map(|d| {
            parse_date(&d).unwrap_or_else(|e| user_error(&e.to_string()))
        });
        ClientFields {
            name,
            phone: self.phone,
            email: self.email,
            address: self.address,
            project_description: self.description,
            budget,
            project_area,
            last_contact,
            next_action: self.next_action,
            notes: self.notes,
            services: if self.services.is_empty() { None } else { Some(self.services) },
        }
    }
}

#[derive(Subcommand)]
pub enum StageCommands {
    /// Show a client's stages and pipeline status
    List {
        /// Client ID
        client_id: String,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Flip a stage between done and open
    Toggle {
        /// Client ID
        client_id: String,
        /// Stage number (1-9)
        stage: String,
    },
    /// Mark a stage done
    Done {
        client_id: String,
        stage: String,
    },
    /// Reopen a stage
    Undo {
        client_id: String,
        stage: String,
    },
}

fn client_id_arg(id: &str) -> i64 {
    validate_id(id, "client").unwrap_or_else(|e| user_error(&e))
}

pub fn handle_clients(conn: &Connection, session: &AuthSession, cmd: ClientCommands, opts: OutputOptions) -> Result<()> {
    match cmd {
        ClientCommands::Add { name, fields } => {
            if let Err(e) = validate_non_empty(&name, "Client name") {
                user_error(&e);
            }
            let client = ClientRepo::create(conn, &fields.into_fields(Some(name)))?;
            println!("Created client {}: {}", client.id.unwrap_or_default(), client.name);
            Ok(())
        }
        ClientCommands::List { search, status, json } => {
            let clients = ClientRepo::list_overviews(conn, search.as_deref(), status)
                .context("Failed to list clients")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&clients)?);
            } else {
                println!("{}", format_client_table(&clients, opts));
            }
            Ok(())
        }
        ClientCommands::Show { id, json } => {
            let id = client_id_arg(&id);
            let detail = match ClientRepo::detail(conn, id)? {
                Some(detail) => detail,
                None => user_error(&format!("Client {} not found", id)),
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&detail)?);
            } else {
                println!("{}", format_client_detail(&detail, opts));
            }
            Ok(())
        }
        ClientCommands::Modify { id, name, fields, clear_services } => {
            let id = client_id_arg(&id);
            if let Some(name) = &name {
                if let Err(e) = validate_non_empty(name, "Client name") {
                    user_error(&e);
                }
            }
            let mut fields = fields.into_fields(name);
            if clear_services {
                fields.services = Some(Vec::new());
            }
            let client = ClientRepo::update(conn, id, &fields)?;
            println!("Modified client {}: {}", id, client.name);
            Ok(())
        }
        ClientCommands::Comment { id, comment_type, text } => {
            let id = client_id_arg(&id);
            let comment_type = CommentType::from_str(&comment_type).unwrap_or_else(|| {
                user_error(&format!(
                    "Invalid comment type '{}'. Use note, call, meeting or email.",
                    comment_type
                ))
            });
            let content = text.join(" ");
            let comment = CommentRepo::add(conn, id, &content, comment_type, &session.user.full_name)?;
            println!("Added comment {} to client {}", comment.id.unwrap_or_default(), id);
            Ok(())
        }
        ClientCommands::Services => {
            for (code, label) in SERVICE_CATALOG {
                println!("{:<20} {}", code, label);
            }
            Ok(())
        }
    }
}

pub fn handle_stages(conn: &Connection, cmd: StageCommands, opts: OutputOptions) -> Result<()> {
    let (client_id, order, completed) = match cmd {
        StageCommands::List { client_id, json } => {
            let client_id = client_id_arg(&client_id);
            if !ClientRepo::exists(conn, client_id)? {
                user_error(&format!("Client {} not found", client_id));
            }
            let stages = StageRepo::list_for_client(conn, client_id)?;
            let summary = StageRepo::summary(conn, client_id)?;
            if json {
                let value = serde_json::json!({
                    "client_id": client_id,
                    "stages": stages,
                    "pipeline": summary,
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("{}", format_stage_list(&stages, &summary, opts));
            }
            return Ok(());
        }
        StageCommands::Toggle { client_id, stage } => (client_id, stage, None),
        StageCommands::Done { client_id, stage } => (client_id, stage, Some(true)),
        StageCommands::Undo { client_id, stage } => (client_id, stage, Some(false)),
    };

    let client_id = client_id_arg(&client_id);
    let order = validate_stage_order(&order).unwrap_or_else(|e| user_error(&e));
    let stage = match completed {
        Some(completed) => StageRepo::set_completed(conn, client_id, order, completed)?,
        None => StageRepo::toggle(conn, client_id, order)?,
    };
    let summary = StageRepo::summary(conn, client_id)?;

    println!(
        "Stage {} '{}' {}. Client {} is now {} ({}/{})",
        stage.order,
        stage.name,
        if stage.completed { "done" } else { "reopened" },
        client_id,
        summary.status_label,
        summary.completed_stages,
        summary.total_stages,
    );
    Ok(())
}
