// Task board commands

use clap::{Args, Subcommand};
use rusqlite::Connection;
use crate::models::{TaskCategory, TaskFields, TaskPriority, TaskStatus};
use crate::repo::TaskRepo;
use crate::cli::error::{user_error, validate_id, validate_non_empty};
use crate::cli::output::{format_task_board, format_task_detail, OutputOptions};
use crate::utils::parse_date;
use anyhow::{Context, Result};

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Add a task to the board
    Add {
        /// Task title
        title: String,
        #[command(flatten)]
        fields: TaskArgs,
    },
    /// Show the board: pending, in progress and completed columns
    #[command(visible_alias = "list")]
    Board {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Show one task
    Show {
        id: String,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Change task fields
    Modify {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[command(flatten)]
        fields: TaskArgs,
    },
    /// Move a task to another column: pending, in_progress, completed or cancelled
    Move {
        id: String,
        status: String,
    },
    /// Delete a task
    Delete {
        id: String,
    },
}

#[derive(Args)]
pub struct TaskArgs {
    #[arg(long)]
    pub description: Option<String>,
    /// Client ID
    #[arg(long)]
    pub client: Option<String>,
    /// call, estimate, proposal or other
    #[arg(long)]
    pub category: Option<String>,
    /// high, medium or low
    #[arg(long)]
    pub priority: Option<String>,
    /// Due date (YYYY-MM-DD, DD.MM.YYYY, today, tomorrow)
    #[arg(long)]
    pub due: Option<String>,
}

impl TaskArgs {
    fn into_fields(self, title: Option<String>) -> TaskFields {
        let client_id = self
            .client
            .as_deref()
            .map(|c| validate_id(c, "client").unwrap_or_else(|e| user_error(&e)));
        let category = self.category.map(|c| {
            TaskCategory::from_str(&c).unwrap_or_else(|| {
                user_error(&format!("Invalid category '{}'. Use call, estimate, proposal or other.", c))
            })
        });
        let priority = self.priority.map(|p| {
            TaskPriority::from_str(&p).unwrap_or_else(|| {
                user_error(&format!("Invalid priority '{}'. Use high, medium or low.", p))
            })
        });
        let due_date = self
            .due
            .map(|d| parse_date(&d).unwrap_or_else(|e| user_error(&e.to_string())));
        TaskFields {
            title,
            description: self.description,
            client_id,
            category,
            priority,
            status: None,
            due_date,
        }
    }
}

fn task_id_arg(id: &str) -> i64 {
    validate_id(id, "task").unwrap_or_else(|e| user_error(&e))
}

pub fn handle_tasks(conn: &Connection, cmd: TaskCommands, opts: OutputOptions) -> Result<()> {
    match cmd {
        TaskCommands::Add { title, fields } => {
            if let Err(e) = validate_non_empty(&title, "Task title") {
                user_error(&e);
            }
            let task = TaskRepo::create(conn, &fields.into_fields(Some(title)))?;
            println!("Created task {}: {}", task.id.unwrap_or_default(), task.title);
            Ok(())
        }
        TaskCommands::Board { json } => {
            let board = TaskRepo::board(conn).context("Failed to load task board")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&board)?);
            } else {
                println!("{}", format_task_board(&board, opts));
            }
            Ok(())
        }
        TaskCommands::Show { id, json } => {
            let id = task_id_arg(&id);
            let task = match TaskRepo::get_by_id(conn, id)? {
                Some(task) => task,
                None => user_error(&format!("Task {} not found", id)),
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&task)?);
            } else {
                println!("{}", format_task_detail(&task, opts));
            }
            Ok(())
        }
        TaskCommands::Modify { id, title, fields } => {
            let id = task_id_arg(&id);
            let task = TaskRepo::update(conn, id, &fields.into_fields(title))?;
            println!("Modified task {}: {}", id, task.title);
            Ok(())
        }
        TaskCommands::Move { id, status } => {
            let id = task_id_arg(&id);
            let status = TaskStatus::from_str(&status).unwrap_or_else(|| {
                user_error(&format!(
                    "Invalid status '{}'. Use pending, in_progress, completed or cancelled.",
                    status
                ))
            });
            TaskRepo::set_status(conn, id, status)?;
            println!("Task {} moved to {}", id, status.as_str());
            Ok(())
        }
        TaskCommands::Delete { id } => {
            let id = task_id_arg(&id);
            TaskRepo::delete(conn, id)?;
            println!("Deleted task {}", id);
            Ok(())
        }
    }
}
