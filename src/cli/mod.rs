//! CLI module - command-line interface for tubevault.

mod commands;

use clap::{Parser, Subcommand};

pub use commands::{cmd_fetch, cmd_harvest, cmd_init, cmd_list_queries, cmd_run_query};

/// tubevault - YouTube channel metadata harvesting and warehousing
#[derive(Parser)]
#[command(name = "tubevault")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch a channel's metadata and print a summary without storing it
    #[command(alias = "f")]
    Fetch {
        /// Platform channel id (e.g. UC...)
        channel_id: String,
        /// Dump the full bundle as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Fetch a channel and replace its warehouse rows with the result
    #[command(alias = "h")]
    Harvest {
        /// Platform channel id (e.g. UC...)
        channel_id: String,
    },

    /// Run one named analytics query from the catalog
    #[command(alias = "q")]
    Query {
        /// Query name as shown by `queries`
        name: String,
    },

    /// List the names of all catalog queries
    #[command(alias = "ls")]
    Queries,

    /// Create a default config file
    #[command(alias = "--init")]
    Init,
}
