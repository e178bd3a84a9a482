//! Cursor-following collector for paginated Readwise endpoints.
//!
//! A paginated response is `{"results": [...], "next": <url or null>}`. The
//! continuation cursor is the `pageCursor` query parameter of `next`. Some
//! endpoints return a bare JSON array instead, which is the complete result set.

use reqwest::Url;
use serde_json::Value;

use crate::error::{Error, Result};

pub const PAGE_CURSOR_PARAM: &str = "pageCursor";

/// Anything that can answer a GET with a JSON body.
#[allow(async_fn_in_trait)]
pub trait JsonSource {
    async fn get_json(&self, path: &str, params: &[(String, String)]) -> Result<Value>;
}

/// Fetch every page of `path` and return all results in arrival order.
///
/// Stops after the first page that has no `next`, after a bare-array response,
/// or with [`Error::PaginationLimit`] once `max_pages` requests were issued
/// without reaching the end.
pub async fn collect_paginated<S: JsonSource>(
    source: &S,
    path: &str,
    params: &[(String, String)],
    max_pages: usize,
) -> Result<Vec<Value>> {
    let mut results = Vec::new();
    let mut cursor: Option<String> = None;
    let mut pages = 0usize;

    loop {
        if pages >= max_pages {
            tracing::warn!("Stopping pagination of {} after {} pages", path, pages);
            return Err(Error::PaginationLimit(pages));
        }

        let request_params = with_cursor(params, cursor.as_deref());
        let body = source.get_json(path, &request_params).await?;
        pages += 1;

        match body {
            Value::Array(items) => return Ok(items),
            Value::Object(mut page) => {
                match page.remove("results") {
                    Some(Value::Array(items)) => results.extend(items),
                    Some(Value::Null) | None => {}
                    Some(other) => {
                        return Err(Error::InvalidResponse(format!(
                            "expected `results` to be an array, got {other}"
                        )));
                    }
                }

                let next = page
                    .get("next")
                    .and_then(Value::as_str)
                    .filter(|next| !next.trim().is_empty());
                let Some(next) = next else {
                    break;
                };

                let Some(next_cursor) = extract_page_cursor(next) else {
                    tracing::warn!("`next` link without a page cursor, stopping: {}", next);
                    break;
                };
                tracing::debug!(page = pages, results = results.len(), "Following cursor");
                cursor = Some(next_cursor);
            }
            other => {
                return Err(Error::InvalidResponse(format!(
                    "expected an object or array from {path}, got {other}"
                )));
            }
        }
    }

    Ok(results)
}

/// Pull the `pageCursor` value out of a `next` link.
///
/// Accepts absolute URLs and bare query strings (`?pageCursor=...`).
pub fn extract_page_cursor(next: &str) -> Option<String> {
    let url = Url::parse(next)
        .or_else(|_| Url::parse("http://placeholder.invalid/").and_then(|base| base.join(next)))
        .ok()?;

    url.query_pairs()
        .find(|(key, _)| key == PAGE_CURSOR_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

fn with_cursor(params: &[(String, String)], cursor: Option<&str>) -> Vec<(String, String)> {
    let mut merged = params
        .iter()
        .filter(|(key, _)| key != PAGE_CURSOR_PARAM)
        .cloned()
        .collect::<Vec<_>>();
    if let Some(cursor) = cursor {
        merged.push((PAGE_CURSOR_PARAM.to_string(), cursor.to_string()));
    }
    merged
}
