//! Main CLI parser and top-level argument handling.

use clap::Parser;

use crate::commands::Commands;

/// Talk to a companion chat backend and hear the replies.
#[derive(Parser)]
#[command(name = "moonlit")]
#[command(about = "Talk to a companion chat backend and hear the replies")]
#[command(version)]
pub struct Cli {
    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
