//! Parkcrm - a command-line CRM for a landscaping contractor
//!
//! This library provides the core functionality for Parkcrm, including:
//! - The client pipeline engine (stage progress to status)
//! - Database operations and migrations
//! - Data models for clients, estimates, suppliers, contractors and tasks
//! - Repository layer for data access
//! - CLI command parsing and execution
//!
//! # Example
//!
//! ```no_run
//! use parkcrm::cli::run;
//!
//! fn main() {
//!     if let Err(e) = run() {
//!         eprintln!("Error: {}", e);
//!         std::process::exit(1);
//!     }
//! }
//! ```

pub mod config;
pub mod db;
pub mod models;
pub mod pipeline;
pub mod repo;
pub mod cli;
pub mod utils;
