use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::FeedMessage;

/// Summary of a decoded feed, printed by `inspect`.
#[derive(Debug, Default, Serialize)]
pub struct FeedStats {
    pub timestamp: DateTime<Utc>,
    pub feed_id: Option<String>,
    pub version: String,
    pub captured_at: Option<DateTime<Utc>>,
    pub total_entities: usize,

    // entity types
    pub trip_updates: usize,
    pub other_entities: usize,

    // trip fields
    pub with_route_id: usize,
    pub with_trip_id: usize,
    pub routes: BTreeSet<String>,

    // stop time update fields
    pub stop_time_updates: usize,
    pub with_stop_id: usize,
    pub with_arrival_time: usize,
    pub with_departure_time: usize,
    pub without_time: usize,
}

impl FeedStats {
    pub fn from_feed(feed: &FeedMessage) -> Self {
        let mut s = FeedStats {
            timestamp: Utc::now(),
            version: feed.header.version.clone(),
            captured_at: feed.header.captured_at(),
            total_entities: feed.entities.len(),
            ..Default::default()
        };

        for e in &feed.entities {
            let Some(trip) = &e.trip_update else {
                s.other_entities += 1;
                continue;
            };
            s.trip_updates += 1;

            if let Some(route) = &trip.trip.route_id {
                s.with_route_id += 1;
                s.routes.insert(route.clone());
            }

            if trip.trip.trip_id.is_some() {
                s.with_trip_id += 1;
            }

            for stu in &trip.stop_time_updates {
                s.stop_time_updates += 1;

                if stu.stop_id.is_some() {
                    s.with_stop_id += 1;
                }

                if stu.arrival.and_then(|a| a.time).is_some() {
                    s.with_arrival_time += 1;
                }

                if stu.departure.and_then(|d| d.time).is_some() {
                    s.with_departure_time += 1;
                }

                if stu.event_time().is_none() {
                    s.without_time += 1;
                }
            }
        }

        s
    }

    pub fn pct(part: usize, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            (part as f64 / total as f64) * 100.0
        }
    }

    /// Share of stop time updates that carry a usable time.
    pub fn timed_pct(&self) -> f64 {
        Self::pct(
            self.stop_time_updates - self.without_time,
            self.stop_time_updates,
        )
    }

    /// Set the feed key this summary describes
    pub fn with_feed_id(mut self, feed_id: &str) -> Self {
        self.feed_id = Some(feed_id.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        FeedEntity, FeedHeader, StopTimeEvent, StopTimeUpdate, TripDescriptor, TripUpdate,
    };

    #[test]
    fn test_pct_with_zero_total() {
        assert_eq!(FeedStats::pct(10, 0), 0.0);
    }

    #[test]
    fn test_pct_normal_values() {
        assert_eq!(FeedStats::pct(50, 100), 50.0);
        assert_eq!(FeedStats::pct(1, 4), 25.0);
    }

    #[test]
    fn test_from_feed_empty() {
        let feed = create_feed(vec![]);
        let stats = FeedStats::from_feed(&feed);

        assert_eq!(stats.total_entities, 0);
        assert_eq!(stats.trip_updates, 0);
        assert_eq!(stats.version, "2.0");
        assert_eq!(stats.timed_pct(), 0.0);
    }

    #[test]
    fn test_from_feed_with_trip_update() {
        let feed = create_feed(vec![
            FeedEntity {
                id: "t1".to_string(),
                trip_update: Some(TripUpdate {
                    trip: TripDescriptor {
                        route_id: Some("Q".to_string()),
                        trip_id: Some("061100_Q..S".to_string()),
                    },
                    stop_time_updates: vec![
                        StopTimeUpdate {
                            stop_id: Some("R16S".to_string()),
                            arrival: Some(StopTimeEvent {
                                time: Some(1234567990),
                            }),
                            departure: Some(StopTimeEvent {
                                time: Some(1234568000),
                            }),
                        },
                        StopTimeUpdate {
                            stop_id: Some("R17S".to_string()),
                            ..Default::default()
                        },
                    ],
                }),
            },
            FeedEntity {
                id: "a1".to_string(),
                trip_update: None,
            },
        ]);

        let stats = FeedStats::from_feed(&feed).with_feed_id("nqrw");

        assert_eq!(stats.feed_id.as_deref(), Some("nqrw"));
        assert_eq!(stats.total_entities, 2);
        assert_eq!(stats.trip_updates, 1);
        assert_eq!(stats.other_entities, 1);
        assert_eq!(stats.with_route_id, 1);
        assert_eq!(stats.with_trip_id, 1);
        assert_eq!(stats.stop_time_updates, 2);
        assert_eq!(stats.with_stop_id, 2);
        assert_eq!(stats.with_arrival_time, 1);
        assert_eq!(stats.with_departure_time, 1);
        assert_eq!(stats.without_time, 1);
        assert_eq!(stats.timed_pct(), 50.0);
        assert!(stats.routes.contains("Q"));
    }

    fn create_feed(entities: Vec<FeedEntity>) -> FeedMessage {
        FeedMessage {
            header: FeedHeader {
                version: "2.0".to_string(),
                timestamp: Some(1234567890),
            },
            entities,
        }
    }
}
