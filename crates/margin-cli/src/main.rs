//! margin - Readwise highlight imports and Things task automation
//!
//! Readwise commands print JSON on stdout; failures exit with status 1.

mod cli;
mod commands {
    pub mod auth;
    pub mod common;
    pub mod completions;
    pub mod fetch;
    pub mod import;
    pub mod search;
    pub mod sync;
    pub mod tasks;
}
mod error;
mod settings;

use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::commands::auth::run_auth;
use crate::commands::completions::run_completions;
use crate::commands::fetch::run_fetch;
use crate::commands::import::run_import;
use crate::commands::search::run_search;
use crate::commands::sync::run_sync;
use crate::commands::tasks::run_tasks;
use crate::error::CliError;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    match run().await {
        Ok(()) => {}
        Err(CliError::Reported) => std::process::exit(1),
        Err(error) => {
            eprintln!("Error: {error}");
            std::process::exit(1);
        }
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(
                "margin=info"
                    .parse()
                    .map_err(|error| CliError::Config(format!("Invalid log directive: {error}")))?,
            ),
        )
        .init();

    let cli = Cli::parse();
    let secrets_file = cli.secrets_file.as_deref();

    match cli.command {
        Commands::Auth => run_auth(secrets_file).await?,
        Commands::Search {
            query,
            category,
            json,
        } => run_search(&query, category, json, secrets_file).await?,
        Commands::Import {
            book_id,
            output_dir,
        } => run_import(book_id, &output_dir, secrets_file).await?,
        Commands::Sync { filepath } => run_sync(&filepath, secrets_file).await?,
        Commands::Fetch { url, output } => run_fetch(&url, output.as_deref()).await?,
        Commands::Tasks { things_db, command } => run_tasks(things_db, command)?,
        Commands::Completions { shell, output } => run_completions(shell, output.as_deref())?,
    }

    Ok(())
}
