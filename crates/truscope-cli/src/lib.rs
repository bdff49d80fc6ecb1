//! TruScope CLI library.
//!
//! This library provides the core functionality for the TruScope command-line
//! interface: configuration management, provider wiring, command execution
//! and output formatting.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod fixtures;
pub mod output;
pub mod session;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use fixtures::{FixtureProvider, FixtureSet};
pub use output::Formatter;
pub use session::Session;
