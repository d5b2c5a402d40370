//! Presentation layer with the command-line front end.

/// CLI commands.
pub mod cli;

pub use cli::App;
