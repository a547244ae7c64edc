//! Protobuf decoder for GTFS Realtime trip-update feeds.

use prost::Message;

use crate::error::DecodeError;
use crate::gtfs_rt;
use crate::model::{
    FeedEntity, FeedHeader, FeedMessage, StopTimeEvent, StopTimeUpdate, TripDescriptor, TripUpdate,
};

/// Decodes a protobuf-encoded GTFS-RT feed into a [`FeedMessage`].
///
/// # Errors
///
/// Returns [`DecodeError::Malformed`] if the bytes are not valid protobuf and
/// [`DecodeError::MissingField`] if the header, its version, an entity id or a
/// trip descriptor is absent.
pub fn parse_feed(bytes: &[u8]) -> Result<FeedMessage, DecodeError> {
    let raw = gtfs_rt::FeedMessage::decode(bytes)?;
    convert_feed(raw)
}

fn convert_feed(raw: gtfs_rt::FeedMessage) -> Result<FeedMessage, DecodeError> {
    let header = raw.header.ok_or(DecodeError::MissingField("header"))?;
    let version = header
        .gtfs_realtime_version
        .ok_or(DecodeError::MissingField("header.gtfs_realtime_version"))?;

    let entities = raw
        .entity
        .into_iter()
        .map(convert_entity)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(FeedMessage {
        header: FeedHeader {
            version,
            timestamp: header.timestamp,
        },
        entities,
    })
}

fn convert_entity(raw: gtfs_rt::FeedEntity) -> Result<FeedEntity, DecodeError> {
    let id = raw.id.ok_or(DecodeError::MissingField("entity.id"))?;
    let trip_update = raw.trip_update.map(convert_trip_update).transpose()?;

    Ok(FeedEntity { id, trip_update })
}

fn convert_trip_update(raw: gtfs_rt::TripUpdate) -> Result<TripUpdate, DecodeError> {
    let trip = raw
        .trip
        .ok_or(DecodeError::MissingField("trip_update.trip"))?;

    Ok(TripUpdate {
        trip: TripDescriptor {
            route_id: trip.route_id,
            trip_id: trip.trip_id,
        },
        stop_time_updates: raw
            .stop_time_update
            .into_iter()
            .map(|stu| StopTimeUpdate {
                stop_id: stu.stop_id,
                arrival: stu.arrival.map(convert_event),
                departure: stu.departure.map(convert_event),
            })
            .collect(),
    })
}

fn convert_event(raw: gtfs_rt::trip_update::StopTimeEvent) -> StopTimeEvent {
    StopTimeEvent { time: raw.time }
}
