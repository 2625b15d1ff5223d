//! Marquee - a command-line admin front-end for the movie catalog API.
//!
//! Logs in against the API, keeps the token pair between runs, and lists,
//! creates, updates and deletes genres, actors, movies and reviews.

mod cli;
mod commands;
mod output;
mod utils;

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use marquee_core::ApiError;

use cli::Cli;

/// Exit status when the user has to log in (again)
const EXIT_LOGIN_REQUIRED: u8 = 2;

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

/// Message and exit status for a failed command
fn describe_failure(err: &anyhow::Error) -> (String, ExitCode) {
    match err.downcast_ref::<ApiError>() {
        Some(ApiError::SessionInvalidated) => (
            "Your session has expired. Run `marquee login` to sign in again.".to_string(),
            ExitCode::from(EXIT_LOGIN_REQUIRED),
        ),
        Some(ApiError::Unauthorized(_)) => (
            format!("Error: {:#}\nRun `marquee login` to sign in.", err),
            ExitCode::from(EXIT_LOGIN_REQUIRED),
        ),
        _ => (format!("Error: {:#}", err), ExitCode::FAILURE),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing();
    info!("marquee starting");

    match commands::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let (message, code) = describe_failure(&e);
            eprintln!("{}", message);
            code
        }
    }
}
