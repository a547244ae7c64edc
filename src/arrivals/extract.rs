use std::collections::HashSet;

use chrono::Utc;
use tracing::trace;

use crate::arrivals::types::RawArrival;
use crate::model::FeedMessage;

/// Direction assumed when a station watches no stops.
const DEFAULT_DIRECTION: char = 'S';

/// Splits a stop id such as `D24N` into its stop code and trailing direction.
fn split_stop_id(stop_id: &str) -> Option<(&str, char)> {
    let (idx, direction) = stop_id.char_indices().next_back()?;
    Some((&stop_id[..idx], direction))
}

/// Extracts upcoming arrivals at `stop_ids` from `feed`, measured from the
/// current wall-clock time.
pub fn extract(feed: &FeedMessage, stop_ids: &[String]) -> Vec<RawArrival> {
    extract_at(feed, stop_ids, Utc::now().timestamp())
}

/// Extracts upcoming arrivals at `stop_ids` from `feed`, measured from `now`
/// (seconds since epoch).
///
/// The direction is taken from the first stop id, and an update matches only
/// when both its stop code and its direction match. One stop code serves both
/// directions, so `D24S` never matches a station watching `D24N`. Events at
/// or before `now` are dropped. Minutes are rounded half up.
pub fn extract_at(feed: &FeedMessage, stop_ids: &[String], now: i64) -> Vec<RawArrival> {
    let mut arrivals = Vec::new();

    let direction = stop_ids
        .first()
        .and_then(|id| split_stop_id(id))
        .map_or(DEFAULT_DIRECTION, |(_, dir)| dir);
    let prefixes: HashSet<&str> = stop_ids
        .iter()
        .filter_map(|id| split_stop_id(id))
        .map(|(prefix, _)| prefix)
        .collect();

    if prefixes.is_empty() {
        return arrivals;
    }

    for entity in &feed.entities {
        let Some(trip) = &entity.trip_update else {
            continue;
        };
        let route = trip.trip.route_id.as_deref().unwrap_or_default();

        for stu in &trip.stop_time_updates {
            let Some((prefix, stop_dir)) = stu.stop_id.as_deref().and_then(split_stop_id) else {
                continue;
            };
            if stop_dir != direction || !prefixes.contains(prefix) {
                continue;
            }

            let Some(event_time) = stu.event_time() else {
                continue;
            };
            if event_time <= now {
                continue;
            }

            let delta = event_time - now;
            let minutes_away = u32::try_from((delta + 30) / 60).unwrap_or(u32::MAX);

            trace!(entity = %entity.id, route, stop_id = ?stu.stop_id, minutes_away, "Arrival matched");

            arrivals.push(RawArrival {
                route: route.to_string(),
                minutes_away,
            });
        }
    }

    arrivals
}
