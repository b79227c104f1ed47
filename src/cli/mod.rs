pub mod commands;
pub mod commands_clients;
pub mod commands_estimates;
pub mod commands_partners;
pub mod commands_tasks;
pub mod error;
pub mod output;
pub mod session;

pub use commands::*;
pub use output::*;
pub use error::*;
