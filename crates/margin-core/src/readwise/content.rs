//! Raw page fetcher for a highlight's original source.
//!
//! Returns the body exactly as served. No HTML parsing happens here.

use std::time::Duration;

use reqwest::header::USER_AGENT;
use reqwest::Client;

use crate::error::{Error, Result};
use crate::readwise::client::error_body;
use crate::util::is_http_url;

const FETCH_TIMEOUT_SECS: u64 = 30;
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

pub async fn fetch_url_content(url: &str) -> Result<String> {
    let url = url.trim();
    if !is_http_url(url) {
        return Err(Error::InvalidInput(
            "URL must include http:// or https://".to_string(),
        ));
    }

    let client = Client::builder()
        .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
        .build()?;
    let response = client
        .get(url)
        .header(USER_AGENT, BROWSER_USER_AGENT)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::Http {
            status: status.as_u16(),
            body: error_body(response).await,
        });
    }

    Ok(response.text().await?)
}
