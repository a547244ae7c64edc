use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Url;

use super::client::HttpClient;
use super::fetch_bytes;
use crate::error::FetchError;
use crate::feeds::FeedId;

/// Supplies raw feed bytes for a feed identifier.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_feed_bytes(&self, feed: FeedId) -> Result<Bytes, FetchError>;
}

/// Fetches feeds over HTTP, either straight from the agency or through a
/// relay that takes the upstream URL as its `feed` query parameter.
pub struct HttpFeedSource<C> {
    client: C,
    proxy: Option<Url>,
}

impl<C: HttpClient> HttpFeedSource<C> {
    pub fn direct(client: C) -> Self {
        Self {
            client,
            proxy: None,
        }
    }

    pub fn via_proxy(client: C, proxy: Url) -> Self {
        Self {
            client,
            proxy: Some(proxy),
        }
    }

    /// URL requested for `feed`.
    pub fn request_url(&self, feed: FeedId) -> String {
        match &self.proxy {
            Some(proxy) => {
                let mut url = proxy.clone();
                url.query_pairs_mut().append_pair("feed", &feed.url());
                url.to_string()
            }
            None => feed.url(),
        }
    }
}

#[async_trait]
impl<C: HttpClient> FeedSource for HttpFeedSource<C> {
    async fn fetch_feed_bytes(&self, feed: FeedId) -> Result<Bytes, FetchError> {
        fetch_bytes(&self.client, &self.request_url(feed)).await
    }
}

/// Reads feeds from `<dir>/<feed key>.pb`, for replaying captured feeds.
pub struct DirFeedSource {
    dir: PathBuf,
}

impl DirFeedSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, feed: FeedId) -> PathBuf {
        self.dir.join(format!("{}.pb", feed.key()))
    }
}

#[async_trait]
impl FeedSource for DirFeedSource {
    async fn fetch_feed_bytes(&self, feed: FeedId) -> Result<Bytes, FetchError> {
        let path = self.path_for(feed);
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(source) => Err(FetchError::Io { path, source }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::BasicClient;
    use std::env;

    #[test]
    fn test_direct_request_url() {
        let source = HttpFeedSource::direct(BasicClient::new().unwrap());
        assert_eq!(source.request_url(FeedId::Nqrw), FeedId::Nqrw.url());
    }

    #[test]
    fn test_proxy_request_url_encodes_upstream() {
        let proxy = Url::parse("https://subway.example.com/api").unwrap();
        let source = HttpFeedSource::via_proxy(BasicClient::new().unwrap(), proxy);

        let url = Url::parse(&source.request_url(FeedId::Ace)).unwrap();
        let (key, value) = url.query_pairs().next().unwrap();

        assert_eq!(url.path(), "/api");
        assert_eq!(key, "feed");
        assert_eq!(value, FeedId::Ace.url());
        assert_eq!(FeedId::from_url(&value), Some(FeedId::Ace));
    }

    #[tokio::test]
    async fn test_dir_source_reads_and_reports_missing() {
        let dir = env::temp_dir().join("subway_arrivals_dir_source");
        tokio::fs::create_dir_all(&dir).await.unwrap();
        tokio::fs::write(dir.join("g.pb"), b"\x0a\x00").await.unwrap();

        let source = DirFeedSource::new(&dir);

        let bytes = source.fetch_feed_bytes(FeedId::G).await.unwrap();
        assert_eq!(&bytes[..], b"\x0a\x00");

        let missing = source.fetch_feed_bytes(FeedId::StatenIsland).await;
        assert!(matches!(missing, Err(FetchError::Io { .. })));

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
