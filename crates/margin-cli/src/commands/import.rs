use std::path::Path;

use chrono::NaiveDate;
use margin_core::readwise::{import_book, ImportReport, ReadwiseClient};

use crate::commands::common::{print_json, readwise_client, report_json_failure, today};
use crate::error::CliError;

pub async fn run_import(
    book_id: u64,
    output_dir: &Path,
    secrets_file: Option<&Path>,
) -> Result<(), CliError> {
    let outcome: Result<ImportReport, CliError> = async {
        let client = readwise_client(secrets_file)?;
        import_with(&client, book_id, output_dir, today()).await
    }
    .await;

    match outcome {
        Ok(report) => print_json(&report),
        Err(error) => Err(report_json_failure(error)),
    }
}

pub async fn import_with(
    client: &ReadwiseClient,
    book_id: u64,
    output_dir: &Path,
    today: NaiveDate,
) -> Result<ImportReport, CliError> {
    Ok(import_book(client, book_id, output_dir, today).await?)
}
