use std::path::Path;

use margin_core::readwise::content::fetch_url_content;

use crate::error::CliError;

pub async fn run_fetch(url: &str, output_path: Option<&Path>) -> Result<(), CliError> {
    let content = fetch_url_content(url).await?;

    if let Some(path) = output_path {
        std::fs::write(path, content)?;
        println!("Content saved to: {}", path.display());
    } else {
        println!("{content}");
    }

    Ok(())
}
