//! Command-line arguments.

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "marquee", version, about = "Admin client for the movie catalog API")]
pub struct Cli {
    /// Base URL of the API, e.g. http://localhost:8000/api/v1
    #[arg(long, env = "MARQUEE_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Print records as JSON instead of a table
    #[arg(long, global = true)]
    pub json: bool,

    /// Keep the session in memory only; nothing is read from or written to disk
    #[arg(long, global = true)]
    pub ephemeral: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and store the session
    Login {
        #[arg(short, long)]
        username: Option<String>,

        /// Read from the environment instead of prompting
        #[arg(long, env = "MARQUEE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show whether the stored session is still valid
    Status,
    /// Catalog totals and movies per genre
    Dashboard,
    Genres {
        #[command(subcommand)]
        action: ResourceAction,
    },
    Actors {
        #[command(subcommand)]
        action: ResourceAction,
    },
    Movies {
        #[command(subcommand)]
        action: MovieAction,
    },
    Reviews {
        #[command(subcommand)]
        action: ResourceAction,
    },
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum ResourceAction {
    /// List all records
    List,
    /// Show one record
    Get { id: i64 },
    /// Create a record from a JSON payload (inline, or @path/to/file.json)
    Create {
        #[arg(long)]
        data: String,
    },
    /// Update a record from a JSON payload (inline, or @path/to/file.json);
    /// fields left out keep their current values
    Update {
        id: i64,
        #[arg(long)]
        data: String,
    },
    /// Delete a record
    Delete { id: i64 },
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum MovieAction {
    /// Catalog statistics (same as `dashboard`)
    Stats,
    #[command(flatten)]
    Resource(ResourceAction),
}
