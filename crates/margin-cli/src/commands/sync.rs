use std::path::Path;

use chrono::NaiveDate;
use margin_core::readwise::{resync_document, ReadwiseClient, SyncReport};

use crate::commands::common::{print_json, readwise_client, report_json_failure, today};
use crate::error::CliError;

pub async fn run_sync(filepath: &Path, secrets_file: Option<&Path>) -> Result<(), CliError> {
    let outcome: Result<SyncReport, CliError> = async {
        if !filepath.is_file() {
            return Err(CliError::FileNotFound(filepath.display().to_string()));
        }
        let client = readwise_client(secrets_file)?;
        sync_with(&client, filepath, today()).await
    }
    .await;

    match outcome {
        Ok(report) => print_json(&report),
        Err(error) => Err(report_json_failure(error)),
    }
}

pub async fn sync_with(
    client: &ReadwiseClient,
    filepath: &Path,
    today: NaiveDate,
) -> Result<SyncReport, CliError> {
    Ok(resync_document(client, filepath, today).await?)
}
