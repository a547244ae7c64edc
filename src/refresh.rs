//! One refresh cycle: fetch every feed a view needs, decode, aggregate.

use std::collections::HashMap;

use chrono::Utc;
use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::aggregate::{FeedStatus, aggregate};
use crate::config::StationConfig;
use crate::display::DisplayModel;
use crate::error::{AggregateError, FeedError};
use crate::feeds::FeedId;
use crate::fetch::FeedSource;
use crate::model::FeedMessage;
use crate::parser::parse_feed;

/// Fetches and decodes one feed.
async fn load_feed<S: FeedSource + ?Sized>(
    source: &S,
    feed: FeedId,
) -> Result<FeedMessage, FeedError> {
    let fetch_start = std::time::Instant::now();
    let bytes = source.fetch_feed_bytes(feed).await?;
    let parsed = parse_feed(&bytes)?;
    debug!(
        feed = %feed,
        bytes = bytes.len(),
        entities = parsed.entities.len(),
        elapsed_ms = fetch_start.elapsed().as_millis() as u64,
        "Feed decoded"
    );
    Ok(parsed)
}

/// Fetches `feeds` concurrently and waits for all of them. Failures are
/// recorded as [`FeedStatus::Unavailable`] and never affect sibling fetches.
pub async fn fetch_feeds<S: FeedSource + ?Sized>(
    source: &S,
    feeds: &[FeedId],
) -> HashMap<FeedId, FeedStatus> {
    let results = join_all(feeds.iter().map(|&feed| async move {
        let result = load_feed(source, feed).await;
        if let Err(e) = &result {
            warn!(feed = %feed, error = %e, "Feed unavailable this cycle");
        }
        (feed, FeedStatus::from(result))
    }))
    .await;

    results.into_iter().collect()
}

/// Runs a full refresh for `view`.
///
/// The view is passed in explicitly; nothing about which station is on screen
/// is kept between cycles.
#[tracing::instrument(skip_all, fields(view = %view.key))]
pub async fn refresh_view<S: FeedSource + ?Sized>(
    source: &S,
    view: &StationConfig,
) -> Result<DisplayModel, AggregateError> {
    let required = view.required_feeds();
    let feeds = fetch_feeds(source, &required).await;
    let model = aggregate(view, &feeds, Utc::now().timestamp())?;

    info!(lines = model.lines.len(), "View refreshed");
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StationTable;
    use crate::error::FetchError;
    use crate::gtfs_rt;
    use async_trait::async_trait;
    use bytes::Bytes;
    use prost::Message;
    use std::sync::Mutex;

    /// Serves canned bytes per feed and records what was requested.
    struct FakeSource {
        feeds: HashMap<FeedId, Vec<u8>>,
        requested: Mutex<Vec<FeedId>>,
    }

    impl FakeSource {
        fn new(feeds: HashMap<FeedId, Vec<u8>>) -> Self {
            Self {
                feeds,
                requested: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl FeedSource for FakeSource {
        async fn fetch_feed_bytes(&self, feed: FeedId) -> Result<Bytes, FetchError> {
            self.requested.lock().unwrap().push(feed);
            self.feeds
                .get(&feed)
                .map(|b| Bytes::from(b.clone()))
                .ok_or_else(|| FetchError::UnknownFeed(feed.to_string()))
        }
    }

    fn empty_feed() -> Vec<u8> {
        gtfs_rt::FeedMessage {
            header: Some(gtfs_rt::FeedHeader {
                gtfs_realtime_version: Some("2.0".to_string()),
                timestamp: None,
            }),
            entity: vec![],
        }
        .encode_to_vec()
    }

    #[tokio::test]
    async fn test_fetch_feeds_records_each_outcome() {
        let source = FakeSource::new(HashMap::from([
            (FeedId::Nqrw, empty_feed()),
            (FeedId::Bdfm, vec![0xFF, 0xFE, 0x00, 0x01]),
        ]));

        let feeds = fetch_feeds(&source, &[FeedId::Nqrw, FeedId::Bdfm, FeedId::Numbered]).await;

        assert_eq!(feeds.len(), 3);
        assert!(matches!(feeds[&FeedId::Nqrw], FeedStatus::Available(_)));
        assert!(matches!(
            feeds[&FeedId::Bdfm],
            FeedStatus::Unavailable(FeedError::Decode(_))
        ));
        assert!(matches!(
            feeds[&FeedId::Numbered],
            FeedStatus::Unavailable(FeedError::Fetch(_))
        ));
    }

    #[tokio::test]
    async fn test_refresh_view_requests_only_required_feeds() {
        let table = StationTable::builtin();
        let downtown = table.get("timessq").unwrap();
        let source = FakeSource::new(HashMap::from([(FeedId::Bdfm, empty_feed())]));

        let model = refresh_view(&source, downtown).await.unwrap();
        assert!(model.is_empty());

        let mut requested = source.requested.lock().unwrap().clone();
        requested.sort();
        assert_eq!(requested, vec![FeedId::Bdfm, FeedId::Nqrw, FeedId::Numbered]);
    }

    #[tokio::test]
    async fn test_refresh_view_total_failure() {
        let table = StationTable::builtin();
        let uptown = table.get("atlantic").unwrap();
        let source = FakeSource::new(HashMap::new());

        let result = refresh_view(&source, uptown).await;
        assert!(matches!(result, Err(AggregateError::TotalUnavailable { .. })));
    }
}
