// Core data models for the CRM
// These structs represent the domain entities

pub mod client;
pub mod stage;
pub mod estimate;
pub mod supplier;
pub mod contractor;
pub mod rating;
pub mod task;
pub mod user;

pub use client::*;
pub use stage::*;
pub use estimate::*;
pub use supplier::*;
pub use contractor::*;
pub use rating::*;
pub use task::*;
pub use user::*;
