//! CLI command definitions and handlers
//!
//! This module organizes the CLI into logical submodules:
//! - [`commands`] - Command and subcommand enum definitions
//! - [`handlers`] - Command execution handlers
//! - [`doctor`] - Readiness checks behind `regru doctor`

mod commands;
pub mod doctor;
mod handlers;

pub use commands::*;
pub use handlers::*;
