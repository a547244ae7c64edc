//! Station aggregation: one display model per view, across every feed the
//! view and its merge targets need.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::arrivals::{extract_at, group};
use crate::config::StationConfig;
use crate::display::DisplayModel;
use crate::error::{AggregateError, FeedError};
use crate::feeds::FeedId;
use crate::model::FeedMessage;

/// Outcome of fetching and decoding one feed for the current cycle.
#[derive(Debug)]
pub enum FeedStatus {
    Available(FeedMessage),
    Unavailable(FeedError),
}

impl FeedStatus {
    pub fn message(&self) -> Option<&FeedMessage> {
        match self {
            FeedStatus::Available(feed) => Some(feed),
            FeedStatus::Unavailable(_) => None,
        }
    }
}

impl From<Result<FeedMessage, FeedError>> for FeedStatus {
    fn from(result: Result<FeedMessage, FeedError>) -> Self {
        match result {
            Ok(feed) => FeedStatus::Available(feed),
            Err(e) => FeedStatus::Unavailable(e),
        }
    }
}

/// Builds the display model for `view` from decoded `feeds`.
///
/// Feeds absent from the map count as unavailable. Partial data is a normal
/// result; only when every required feed is unavailable does this fail with
/// [`AggregateError::TotalUnavailable`]. A view with reachable feeds but no
/// upcoming trains yields an empty model.
pub fn aggregate(
    view: &StationConfig,
    feeds: &HashMap<FeedId, FeedStatus>,
    now: i64,
) -> Result<DisplayModel, AggregateError> {
    let required = view.required_feeds();
    let available = required
        .iter()
        .filter(|id| feeds.get(*id).and_then(FeedStatus::message).is_some())
        .count();

    if available == 0 {
        warn!(view = %view.key, required = required.len(), "No feed available for view");
        return Err(AggregateError::TotalUnavailable {
            view: view.key.clone(),
        });
    }

    let mut arrivals = Vec::new();
    for station in view.stations() {
        for feed_id in &station.feeds {
            let Some(feed) = feeds.get(feed_id).and_then(FeedStatus::message) else {
                debug!(station = %station.key, feed = %feed_id, "Skipping unavailable feed");
                continue;
            };
            arrivals.extend(extract_at(feed, &station.stops, now));
        }
    }

    debug!(
        view = %view.key,
        arrivals = arrivals.len(),
        available,
        required = required.len(),
        "Arrivals extracted"
    );

    Ok(DisplayModel::build(
        &view.name,
        &view.direction_label,
        group(arrivals),
    ))
}
