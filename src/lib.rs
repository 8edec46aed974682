//! # `tasklist`
//!
//! A single-user command-line to-do list backed by a local `SQLite` database.
//!
//! The [`tasks`] module owns persistence; [`app`] holds the interactive
//! session and menu loop. The binary in `main.rs` is a thin wrapper that
//! parses the user name and wires the two together.

pub mod app;
pub mod error;
pub mod tasks;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
