use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use margin_core::config::{default_secrets_path, load_secrets_file, ReadwiseConfig};
use margin_core::readwise::{BookSummary, ReadwiseClient};
use margin_core::tasks::store::DB_PATH_ENV_VAR;
use margin_core::tasks::{
    format_task_list, resolve_database_path, summarize_tasks, FormatOptions, Task, TaskStore,
};
use serde::Serialize;
use serde_json::json;

use crate::cli::ListView;
use crate::error::CliError;
use crate::settings::TaskSettings;

/// Load the secrets file, then build a client from the environment.
pub fn readwise_client(secrets_file: Option<&Path>) -> Result<ReadwiseClient, CliError> {
    let secrets_path = secrets_file
        .map(Path::to_path_buf)
        .or_else(default_secrets_path);
    if let Some(path) = secrets_path {
        load_secrets_file(&path)?;
    }

    let config = ReadwiseConfig::from_env()?;
    tracing::debug!("Using Readwise API at {}", config.base_url);
    Ok(ReadwiseClient::new(config)?)
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn normalize_search_query(query: &str) -> Result<String, CliError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(CliError::EmptySearchQuery);
    }
    Ok(query.to_string())
}

pub fn normalize_task_id(id: &str) -> Result<String, CliError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(CliError::EmptyTaskId);
    }
    Ok(id.to_string())
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn json_failure(error: &CliError) -> String {
    json!({ "success": false, "error": error.to_string() }).to_string()
}

/// Write a JSON failure object to stderr and mark the error as reported.
pub fn report_json_failure(error: CliError) -> CliError {
    if matches!(error, CliError::Reported) {
        return error;
    }
    eprintln!("{}", json_failure(&error));
    CliError::Reported
}

pub fn format_search_results(results: &[BookSummary]) -> String {
    if results.is_empty() {
        return "No results found.".to_string();
    }

    let mut lines = vec![format!("\nFound {} result(s):\n", results.len())];
    for (index, item) in results.iter().enumerate() {
        lines.push(format!(
            "{}. [{}] {}",
            index + 1,
            item.category.to_uppercase(),
            item.title
        ));
        lines.push(format!("   Author: {}", item.author));
        lines.push(format!("   Highlights: {}", item.num_highlights));
        lines.push(format!("   ID: {}", item.id));
        if !item.source_url.is_empty() {
            lines.push(format!("   URL: {}", item.source_url));
        }
        lines.push(String::new());
    }
    lines.join("\n")
}

/// Explicit path, then `THINGS_DB_PATH`, then the saved setting, then the
/// default Things container.
pub fn resolve_task_db_path(
    explicit: Option<PathBuf>,
    settings: &TaskSettings,
) -> Result<PathBuf, CliError> {
    let chosen = explicit
        .or_else(|| std::env::var_os(DB_PATH_ENV_VAR).map(PathBuf::from))
        .or_else(|| settings.database_path.clone());
    Ok(resolve_database_path(chosen)?)
}

pub fn open_task_store(things_db: Option<PathBuf>) -> Result<TaskStore, CliError> {
    let settings = TaskSettings::load()?;
    let path = resolve_task_db_path(things_db, &settings)?;
    Ok(TaskStore::open(path)?)
}

pub fn render_task_list(tasks: &[Task], view: ListView) -> Result<String, CliError> {
    if view.json {
        return Ok(serde_json::to_string_pretty(tasks)?);
    }

    let options = FormatOptions {
        verbose: view.verbose,
        show_uuid: view.uuid,
    };
    let mut rendered = format_task_list(tasks, options, view.group_by.map(Into::into));
    if view.summary && !tasks.is_empty() {
        rendered.push_str("\n\n");
        rendered.push_str(&summarize_tasks(tasks));
    }
    Ok(rendered)
}
