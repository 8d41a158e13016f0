//! Metafill CLI library.
//!
//! This library provides the core functionality for the Metafill command-line
//! interface, including configuration management, command execution,
//! interactive review, and output formatting.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod plan;
pub mod review;

pub use cli::{Cli, Command};
pub use config::{AuthOverrides, Config};
pub use error::{CliError, Result};
pub use output::Formatter;
