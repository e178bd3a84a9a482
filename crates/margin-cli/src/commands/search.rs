use std::path::Path;

use margin_core::readwise::{search_books, BookSummary, ReadwiseClient};

use crate::cli::ReadwiseCategory;
use crate::commands::common::{
    format_search_results, normalize_search_query, print_json, readwise_client,
    report_json_failure,
};
use crate::error::CliError;

pub async fn run_search(
    query: &str,
    category: Option<ReadwiseCategory>,
    as_json: bool,
    secrets_file: Option<&Path>,
) -> Result<(), CliError> {
    let outcome: Result<Vec<BookSummary>, CliError> = async {
        let client = readwise_client(secrets_file)?;
        search_with(&client, query, category).await
    }
    .await;

    match outcome {
        Ok(results) if as_json => print_json(&results),
        Ok(results) => {
            println!("{}", format_search_results(&results));
            Ok(())
        }
        Err(error) if as_json => Err(report_json_failure(error)),
        Err(error) => Err(error),
    }
}

pub async fn search_with(
    client: &ReadwiseClient,
    query: &str,
    category: Option<ReadwiseCategory>,
) -> Result<Vec<BookSummary>, CliError> {
    let query = normalize_search_query(query)?;
    let results = search_books(client, &query, category.map(ReadwiseCategory::as_str)).await?;
    tracing::debug!("Search {:?} matched {} item(s)", query, results.len());
    Ok(results)
}
