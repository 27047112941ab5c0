//! Command-line front end for moonlit.
//!
//! `moonlit chat` is the terminal view over the conversation core;
//! `moonlit serve` runs the companion backend.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Silence unused dev-dependency warnings; they are used by integration tests
#[cfg(test)]
use async_trait as _;
#[cfg(test)]
use serde_json as _;

// Used by main.rs only
use dotenvy as _;

pub mod commands;
pub mod handlers;
pub mod logging;
pub mod parser;
pub mod presentation;
pub mod repl;

// Re-export primary types for convenient access
pub use commands::{ChatArgs, Commands, ServeArgs};
pub use parser::Cli;
pub use repl::{ReplCommand, ReplError};
