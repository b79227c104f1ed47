// Estimate commands

use clap::Subcommand;
use rusqlite::Connection;
use crate::models::{EstimateItem, EstimateStatus};
use crate::repo::{EstimateFields, EstimateRepo};
use crate::cli::error::{user_error, validate_id, validate_non_empty};
use crate::cli::output::{format_estimate_detail, format_estimate_table, format_money, OutputOptions};
use crate::utils::parse_date;
use anyhow::{Context, Result};

#[derive(Subcommand)]
pub enum EstimateCommands {
    /// Create a draft estimate
    Add {
        /// Estimate title
        title: String,
        /// Client ID
        #[arg(long)]
        client: Option<String>,
        /// Valid until (YYYY-MM-DD, DD.MM.YYYY)
        #[arg(long)]
        valid_until: Option<String>,
        /// Line item as "name;quantity;unit;price" (repeatable)
        #[arg(long = "item")]
        items: Vec<String>,
    },
    /// List estimates
    List {
        /// Match title, client name or estimate number
        #[arg(long, short = 's')]
        search: Option<String>,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Show an estimate with its items
    Show {
        id: String,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Change an estimate; --item replaces all items
    Modify {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, conflicts_with = "no_client")]
        client: Option<String>,
        /// Detach the estimate from its client
        #[arg(long)]
        no_client: bool,
        /// draft, sent, approved or rejected
        #[arg(long)]
        status: Option<String>,
        #[arg(long, conflicts_with = "no_valid_until")]
        valid_until: Option<String>,
        /// Clear the validity date
        #[arg(long)]
        no_valid_until: bool,
        #[arg(long = "item", conflicts_with = "clear_items")]
        items: Vec<String>,
        /// Remove all items
        #[arg(long)]
        clear_items: bool,
    },
    /// Duplicate an estimate as a new draft
    Copy {
        id: String,
    },
    /// Delete an estimate
    Delete {
        id: String,
    },
}

fn parse_items(specs: &[String]) -> Vec<EstimateItem> {
    specs
        .iter()
        .map(|spec| EstimateItem::parse_spec(spec).unwrap_or_else(|e| user_error(&e)))
        .collect()
}

fn parse_client(client: &str) -> i64 {
    validate_id(client, "client").unwrap_or_else(|e| user_error(&e))
}

fn parse_valid_until(date: &str) -> String {
    parse_date(date).unwrap_or_else(|e| user_error(&e.to_string()))
}

fn estimate_id_arg(id: &str) -> i64 {
    validate_id(id, "estimate").unwrap_or_else(|e| user_error(&e))
}

pub fn handle_estimates(conn: &Connection, cmd: EstimateCommands, opts: OutputOptions) -> Result<()> {
    match cmd {
        EstimateCommands::Add { title, client, valid_until, items } => {
            if let Err(e) = validate_non_empty(&title, "Estimate title") {
                user_error(&e);
            }
            let client_id = client.as_deref().map(parse_client);
            let valid_until = valid_until.as_deref().map(parse_valid_until);
            let items = parse_items(&items);

            let estimate = EstimateRepo::create(conn, &title, client_id, valid_until.as_deref(), &items)?;
            println!(
                "Created estimate {}: {} ({})",
                estimate.id.unwrap_or_default(),
                estimate.title,
                format_money(estimate.total())
            );
            Ok(())
        }
        EstimateCommands::List { search, json } => {
            let estimates = EstimateRepo::list(conn, search.as_deref())
                .context("Failed to list estimates")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&estimates)?);
            } else {
                println!("{}", format_estimate_table(&estimates, opts));
            }
            Ok(())
        }
        EstimateCommands::Show { id, json } => {
            let id = estimate_id_arg(&id);
            let estimate = match EstimateRepo::get_by_id(conn, id)? {
                Some(estimate) => estimate,
                None => user_error(&format!("Estimate {} not found", id)),
            };
            if json {
                let mut value = serde_json::to_value(&estimate)?;
                value["total"] = serde_json::json!(estimate.total());
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("{}", format_estimate_detail(&estimate, opts));
            }
            Ok(())
        }
        EstimateCommands::Modify {
            id, title, client, no_client, status, valid_until, no_valid_until, items, clear_items,
        } => {
            let id = estimate_id_arg(&id);
            let status = status.map(|s| {
                EstimateStatus::from_str(&s).unwrap_or_else(|| {
                    user_error(&format!("Invalid status '{}'. Use draft, sent, approved or rejected.", s))
                })
            });
            let client_id = if no_client {
                Some(None)
            } else {
                client.as_deref().map(|c| Some(parse_client(c)))
            };
            let valid_until = if no_valid_until {
                Some(None)
            } else {
                valid_until.as_deref().map(|d| Some(parse_valid_until(d)))
            };
            let items = if clear_items {
                Some(Vec::new())
            } else if items.is_empty() {
                None
            } else {
                Some(parse_items(&items))
            };

            let estimate = EstimateRepo::update(conn, id, &EstimateFields {
                title,
                client_id,
                status,
                valid_until,
                items,
            })?;
            println!("Modified estimate {}: {} ({})", id, estimate.title, format_money(estimate.total()));
            Ok(())
        }
        EstimateCommands::Copy { id } => {
            let id = estimate_id_arg(&id);
            let copy = EstimateRepo::copy(conn, id)?;
            println!("Copied estimate {} to {}: {}", id, copy.id.unwrap_or_default(), copy.title);
            Ok(())
        }
        EstimateCommands::Delete { id } => {
            let id = estimate_id_arg(&id);
            EstimateRepo::delete(conn, id)?;
            println!("Deleted estimate {}", id);
            Ok(())
        }
    }
}
