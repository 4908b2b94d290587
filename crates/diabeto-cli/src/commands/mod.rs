//! Subcommand implementations.

pub mod auth;
pub mod history;
pub mod scan;
pub mod visits;
