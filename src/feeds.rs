//! MTA subway GTFS-RT feed table.
//!
//! This is the only place feed keys are mapped to upstream URLs. Both the
//! fetch layer and any proxy validating `?feed=` requests go through
//! [`FeedId`], so the allow-list cannot drift from the URL table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// Base URL shared by all subway feeds.
pub const MTA_FEED_BASE_URL: &str =
    "https://api-endpoint.mta.info/Dataservice/mtagtfsfeeds/nyct%2Fgtfs";

/// Public cache lifetime a proxy should attach to relayed feed bytes.
pub const PROXY_CACHE_MAX_AGE_SECS: u32 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FeedId {
    #[serde(rename = "ace")]
    Ace,
    #[serde(rename = "bdfm")]
    Bdfm,
    #[serde(rename = "g")]
    G,
    #[serde(rename = "jz")]
    Jz,
    #[serde(rename = "nqrw")]
    Nqrw,
    #[serde(rename = "l")]
    L,
    #[serde(rename = "1234567")]
    Numbered,
    #[serde(rename = "si")]
    StatenIsland,
}

impl FeedId {
    pub const ALL: [FeedId; 8] = [
        FeedId::Ace,
        FeedId::Bdfm,
        FeedId::G,
        FeedId::Jz,
        FeedId::Nqrw,
        FeedId::L,
        FeedId::Numbered,
        FeedId::StatenIsland,
    ];

    /// Short key used in configuration and on the command line.
    pub fn key(self) -> &'static str {
        match self {
            FeedId::Ace => "ace",
            FeedId::Bdfm => "bdfm",
            FeedId::G => "g",
            FeedId::Jz => "jz",
            FeedId::Nqrw => "nqrw",
            FeedId::L => "l",
            FeedId::Numbered => "1234567",
            FeedId::StatenIsland => "si",
        }
    }

    fn url_suffix(self) -> &'static str {
        match self {
            FeedId::Numbered => "",
            FeedId::Ace => "-ace",
            FeedId::Bdfm => "-bdfm",
            FeedId::G => "-g",
            FeedId::Jz => "-jz",
            FeedId::Nqrw => "-nqrw",
            FeedId::L => "-l",
            FeedId::StatenIsland => "-si",
        }
    }

    /// Upstream URL serving this feed.
    pub fn url(self) -> String {
        format!("{}{}", MTA_FEED_BASE_URL, self.url_suffix())
    }

    /// Resolves an upstream URL back to its feed, rejecting anything outside
    /// the allow-list.
    pub fn from_url(url: &str) -> Option<FeedId> {
        FeedId::ALL.into_iter().find(|f| f.url() == url)
    }
}

impl fmt::Display for FeedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for FeedId {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FeedId::ALL
            .into_iter()
            .find(|f| f.key() == s)
            .ok_or_else(|| FetchError::UnknownFeed(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        assert_eq!(
            FeedId::Numbered.url(),
            "https://api-endpoint.mta.info/Dataservice/mtagtfsfeeds/nyct%2Fgtfs"
        );
        assert_eq!(
            FeedId::Nqrw.url(),
            "https://api-endpoint.mta.info/Dataservice/mtagtfsfeeds/nyct%2Fgtfs-nqrw"
        );
    }

    #[test]
    fn test_key_round_trips_through_from_str() {
        for feed in FeedId::ALL {
            assert_eq!(feed.key().parse::<FeedId>().unwrap(), feed);
        }
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(matches!(
            "7".parse::<FeedId>(),
            Err(FetchError::UnknownFeed(k)) if k == "7"
        ));
    }

    #[test]
    fn test_from_url_allow_list() {
        assert_eq!(FeedId::from_url(&FeedId::Bdfm.url()), Some(FeedId::Bdfm));
        assert_eq!(FeedId::from_url("https://example.com/feed"), None);
        assert_eq!(
            FeedId::from_url("https://api-endpoint.mta.info/Dataservice/mtagtfsfeeds/nyct%2Fgtfs-7"),
            None
        );
    }

    #[test]
    fn test_serde_uses_keys() {
        let json = serde_json::to_string(&FeedId::Numbered).unwrap();
        assert_eq!(json, "\"1234567\"");
        let parsed: FeedId = serde_json::from_str("\"si\"").unwrap();
        assert_eq!(parsed, FeedId::StatenIsland);
    }
}
