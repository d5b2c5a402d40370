//! Mediacache - a bounded content cache for fetched images and videos.
//!
//! Resources are fetched from `http`, `https` or `file` locators, gated on
//! their media type, optionally transformed and stored in a FIFO-evicting
//! memory or disk backend. The disk backend persists one file per entry so
//! the cache survives restarts.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing the request engine and DTOs.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing cache backends and adapters.
pub mod infrastructure;
/// Presentation layer containing the command-line front end.
pub mod presentation;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "mediacache";
