use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::github::client::ensure_success;
use crate::github::rate_limiter::RateLimiter;

/// Walks a paged GitHub listing one page at a time.
///
/// Pages are only requested when `next_page` is called, so a caller that
/// stops early never pays for the rest of the listing.
pub struct Paginator<'a> {
    client: &'a Client,
    rate_limiter: &'a RateLimiter,
    base_url: String,
    per_page: u32,
    page: u32,
    done: bool,
}

impl<'a> Paginator<'a> {
    pub fn new(
        client: &'a Client,
        rate_limiter: &'a RateLimiter,
        base_url: impl Into<String>,
        per_page: u32,
    ) -> Self {
        Self {
            client,
            rate_limiter,
            base_url: base_url.into(),
            per_page,
            page: 1,
            done: false,
        }
    }

    /// Fetches the next page, or `None` once the listing is exhausted.
    pub async fn next_page<T: DeserializeOwned>(&mut self) -> Result<Option<Vec<T>>> {
        if self.done {
            return Ok(None);
        }

        let separator = if self.base_url.contains('?') { "&" } else { "?" };
        let url = format!(
            "{}{}per_page={}&page={}",
            self.base_url, separator, self.per_page, self.page
        );

        tracing::debug!("Fetching: {}", url);
        let response = self.client.get(&url).send().await?;
        self.rate_limiter.update_from_response(&response).await;
        let response = ensure_success(response, self.rate_limiter, &url).await?;

        // Check for next page in Link header
        let has_next = response
            .headers()
            .get("link")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.contains("rel=\"next\""))
            .unwrap_or(false);

        let items: Vec<T> = response.json().await?;

        if !has_next || items.len() < self.per_page as usize {
            self.done = true;
        }
        self.page += 1;

        Ok(Some(items))
    }

    pub async fn fetch_all<T: DeserializeOwned>(mut self) -> Result<Vec<T>> {
        let mut all_items = Vec::new();
        while let Some(items) = self.next_page().await? {
            all_items.extend(items);
        }
        Ok(all_items)
    }
}
