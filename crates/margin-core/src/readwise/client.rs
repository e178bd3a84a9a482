//! Authenticated Readwise v2 HTTP client.

use reqwest::header::{ACCEPT, AUTHORIZATION, RETRY_AFTER};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;

use crate::config::ReadwiseConfig;
use crate::error::{Error, Result};
use crate::readwise::models::{AuthStatus, Book, Highlight};
use crate::readwise::paginate::{collect_paginated, JsonSource};
use crate::util::compact_text;

const USER_AGENT: &str = concat!("margin/", env!("CARGO_PKG_VERSION"));

/// Issues authenticated requests against the Readwise API.
///
/// Every call is a single attempt: rate limits and transport failures are
/// surfaced to the caller and never retried here.
#[derive(Clone)]
pub struct ReadwiseClient {
    config: ReadwiseConfig,
    client: Client,
}

impl ReadwiseClient {
    pub fn new(config: ReadwiseConfig) -> Result<Self> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { config, client })
    }

    pub const fn config(&self) -> &ReadwiseConfig {
        &self.config
    }

    /// Probe `/auth/` with the short timeout.
    ///
    /// 204 means the token is valid, 401 means it is not; anything else is
    /// reported with its status code.
    pub async fn check_auth(&self) -> AuthStatus {
        let request = self
            .authorized(self.client.get(self.url("/auth/")))
            .timeout(self.config.auth_timeout);

        match request.send().await {
            Ok(response) => auth_status_for(response.status()),
            Err(error) => AuthStatus {
                success: false,
                message: format!("Connection error: {error}"),
            },
        }
    }

    /// GET a JSON document with the data timeout.
    pub async fn get(&self, path: &str, params: &[(String, String)]) -> Result<Value> {
        let request = self
            .authorized(self.client.get(self.url(path)))
            .header(ACCEPT, "application/json")
            .query(params)
            .timeout(self.config.request_timeout);

        tracing::debug!("GET {} {:?}", path, params);
        let response = ensure_success(request.send().await?).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|error| {
            Error::InvalidResponse(format!(
                "{path} returned non-JSON body ({error}): {}",
                compact_text(&body)
            ))
        })
    }

    /// Follow `pageCursor` links until the collection is exhausted.
    pub async fn get_paginated(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<Vec<Value>> {
        collect_paginated(self, path, params, self.config.max_pages).await
    }

    pub async fn get_book(&self, book_id: u64) -> Result<Book> {
        let body = self.get(&format!("/books/{book_id}/"), &[]).await?;
        Ok(serde_json::from_value(body)?)
    }

    pub async fn get_highlights(&self, book_id: u64) -> Result<Vec<Highlight>> {
        let params = vec![("book_id".to_string(), book_id.to_string())];
        self.get_paginated("/highlights/", &params)
            .await?
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(Error::from))
            .collect()
    }

    pub async fn list_books(&self, category: Option<&str>) -> Result<Vec<Book>> {
        let params = category
            .map(|category| vec![("category".to_string(), category.to_string())])
            .unwrap_or_default();
        self.get_paginated("/books/", &params)
            .await?
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(Error::from))
            .collect()
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url,
            path.trim_start_matches('/')
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(AUTHORIZATION, format!("Token {}", self.config.api_token))
    }
}

impl JsonSource for ReadwiseClient {
    async fn get_json(&self, path: &str, params: &[(String, String)]) -> Result<Value> {
        self.get(path, params).await
    }
}

fn auth_status_for(status: StatusCode) -> AuthStatus {
    match status {
        StatusCode::NO_CONTENT => AuthStatus {
            success: true,
            message: "Authentication successful".to_string(),
        },
        StatusCode::UNAUTHORIZED => AuthStatus {
            success: false,
            message: "Invalid API token".to_string(),
        },
        other => AuthStatus {
            success: false,
            message: format!("Unexpected response: {}", other.as_u16()),
        },
    }
}

async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .map_or_else(|| "unknown".to_string(), ToString::to_string);
        return Err(Error::RateLimited { retry_after });
    }

    Err(Error::Http {
        status: status.as_u16(),
        body: error_body(response).await,
    })
}

/// Body of a failed response; a read failure is noted in place of the text.
pub(crate) async fn error_body(response: Response) -> String {
    response
        .text()
        .await
        .unwrap_or_else(|error| format!("<unreadable body: {error}>"))
}
