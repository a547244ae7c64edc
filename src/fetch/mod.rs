mod basic;
mod client;
mod source;

pub use basic::BasicClient;
pub use client::HttpClient;
pub use source::{DirFeedSource, FeedSource, HttpFeedSource};

use bytes::Bytes;
use tracing::debug;

use crate::error::FetchError;

/// GETs `url` and returns the body, treating non-success statuses as errors.
#[tracing::instrument(skip(client))]
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Bytes, FetchError> {
    let url: reqwest::Url = url
        .parse()
        .map_err(|_| FetchError::UnknownFeed(url.to_string()))?;
    let req = reqwest::Request::new(reqwest::Method::GET, url);

    let resp = client.execute(req).await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            status,
            url: resp.url().to_string(),
        });
    }

    let body = resp.bytes().await?;
    debug!(bytes = body.len(), "Feed bytes received");
    Ok(body)
}
