// Repository layer: each repo is a unit struct of functions over a borrowed
// connection, so callers control transactions and connection lifetime.

pub mod client;
pub mod comment;
pub mod contractor;
pub mod dashboard;
pub mod estimate;
pub mod rating;
pub mod stage;
pub mod supplier;
pub mod task;
pub mod user;

pub use client::*;
pub use comment::*;
pub use contractor::*;
pub use dashboard::*;
pub use estimate::*;
pub use rating::*;
pub use stage::*;
pub use supplier::*;
pub use task::*;
pub use user::*;

/// `?, ?, ?` for an `IN (...)` list of `count` parameters
pub(crate) fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}
