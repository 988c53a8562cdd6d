// Module declarations
pub mod cli_context;
pub mod client;
pub mod commands;
pub mod config;
pub mod constants;
pub mod controllers;
pub mod error;
pub mod formatting;
pub mod identity;
pub mod interactive;
pub mod logging;
pub mod models;
pub mod viz;

#[cfg(test)]
mod tests;

// Re-export commonly used items
pub use client::{CivicClient, IssueApi, IssueQuery};
pub use config::{load_config, Config};
pub use controllers::{IssueBoard, IssueDetailController, IssueSubmissionController};
pub use error::{CivicError, CivicResult};
pub use models::*;
