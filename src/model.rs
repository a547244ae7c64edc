//! Strongly typed trip-update feed, produced by [`crate::parser::parse_feed`].
//!
//! Optional fields stay `Option` so "no data" is never confused with a zero
//! value. Timestamps are seconds since the Unix epoch.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct FeedMessage {
    pub header: FeedHeader,
    pub entities: Vec<FeedEntity>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedHeader {
    pub version: String,
    pub timestamp: Option<u64>,
}

impl FeedHeader {
    /// Capture time of the feed, if the producer set one.
    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp
            .and_then(|t| i64::try_from(t).ok())
            .and_then(|t| DateTime::from_timestamp(t, 0))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntity {
    pub id: String,
    pub trip_update: Option<TripUpdate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TripUpdate {
    pub trip: TripDescriptor,
    pub stop_time_updates: Vec<StopTimeUpdate>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripDescriptor {
    pub route_id: Option<String>,
    pub trip_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StopTimeUpdate {
    pub stop_id: Option<String>,
    pub arrival: Option<StopTimeEvent>,
    pub departure: Option<StopTimeEvent>,
}

impl StopTimeUpdate {
    /// Arrival time if known, otherwise departure time.
    pub fn event_time(&self) -> Option<i64> {
        self.arrival
            .as_ref()
            .and_then(|e| e.time)
            .or_else(|| self.departure.as_ref().and_then(|e| e.time))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StopTimeEvent {
    pub time: Option<i64>,
}
