//! cli subcommands for givestream.
//!
//! - `givestream serve` - run the api server
//! - `givestream admins create` - create an admin account
//! - `givestream admins list` - list admin accounts
//! - etc.

mod admins;
mod serve;

pub use admins::AdminsCommand;
pub use serve::ServeCommand;

use clap::{Parser, Subcommand};

/// givestream - donation pledge tracking server
#[derive(Parser, Debug)]
#[command(name = "givestream")]
#[command(about = "Donation pledge tracking server", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// top-level commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// run the api server
    Serve(ServeCommand),

    /// manage admin accounts
    #[command(subcommand)]
    Admins(AdminsCommand),
}
