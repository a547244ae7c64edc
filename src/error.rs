//! Error types for the feed pipeline.
//!
//! Per-feed failures ([`FetchError`], [`DecodeError`]) are folded into
//! [`FeedError`] and recorded as unavailable for the current cycle. Only
//! [`AggregateError`] escapes a refresh.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("malformed protobuf: {0}")]
    Malformed(#[from] prost::DecodeError),
    #[error("required field `{0}` is absent")]
    MissingField(&'static str),
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("feed `{0}` is not in the allow-list")]
    UnknownFeed(String),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("upstream {url} answered {status}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a single feed is unavailable for this cycle.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),
}

#[derive(Error, Debug)]
pub enum AggregateError {
    #[error("every feed needed by view `{view}` is unavailable")]
    TotalUnavailable { view: String },
}
