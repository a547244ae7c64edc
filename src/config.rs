//! Station configuration.
//!
//! A view is a top-level [`StationConfig`]; its `merge` list names physically
//! separate stations shown together with it. The table is loaded once at
//! startup and never mutated.
//!
//! The JSON form mirrors the struct:
//! ```json
//! [
//!   {
//!     "key": "timessq",
//!     "name": "Times Sq-42 St",
//!     "direction": "S",
//!     "direction_label": "Downtown / Brooklyn",
//!     "stops": ["R16S", "127S", "725S"],
//!     "feeds": ["nqrw", "1234567"],
//!     "merge": []
//!   }
//! ]
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::feeds::FeedId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationConfig {
    pub key: String,
    pub name: String,
    pub direction: char,
    pub direction_label: String,
    pub stops: Vec<String>,
    pub feeds: Vec<FeedId>,
    #[serde(default)]
    pub merge: Vec<StationConfig>,
}

impl StationConfig {
    /// Feeds needed by this station and every merge target, deduplicated in
    /// first-seen order.
    pub fn required_feeds(&self) -> Vec<FeedId> {
        let mut feeds = Vec::new();
        for station in self.stations() {
            for feed in &station.feeds {
                if !feeds.contains(feed) {
                    feeds.push(*feed);
                }
            }
        }
        feeds
    }

    /// This station followed by its merge targets.
    pub fn stations(&self) -> impl Iterator<Item = &StationConfig> {
        std::iter::once(self).chain(self.merge.iter())
    }
}

#[derive(Debug, Clone)]
pub struct StationTable {
    views: Vec<StationConfig>,
}

impl StationTable {
    pub fn new(views: Vec<StationConfig>) -> Self {
        Self { views }
    }

    /// Loads a table from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read station table '{path}'"))?;
        let views: Vec<StationConfig> = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse station table '{path}'"))?;
        anyhow::ensure!(!views.is_empty(), "station table '{path}' defines no views");
        Ok(Self { views })
    }

    /// Atlantic Av-Barclays Ctr uptown, and Times Sq-42 St downtown merged
    /// with 42 St-Bryant Park.
    pub fn builtin() -> Self {
        let bryant_park = StationConfig {
            key: "bryantpark".to_string(),
            name: "42 St-Bryant Park".to_string(),
            direction: 'S',
            direction_label: "Downtown / Brooklyn".to_string(),
            stops: strings(&["D15S", "D16S", "D17S"]),
            feeds: vec![FeedId::Bdfm],
            merge: vec![],
        };

        Self::new(vec![
            StationConfig {
                key: "atlantic".to_string(),
                name: "Atlantic Av-Barclays Ctr".to_string(),
                direction: 'N',
                direction_label: "Uptown / Manhattan".to_string(),
                stops: strings(&["D24N", "R36N", "234N", "423N"]),
                feeds: vec![FeedId::Bdfm, FeedId::Nqrw, FeedId::Numbered],
                merge: vec![],
            },
            StationConfig {
                key: "timessq".to_string(),
                name: "Times Sq-42 St".to_string(),
                direction: 'S',
                direction_label: "Downtown / Brooklyn".to_string(),
                stops: strings(&["R16S", "127S", "725S"]),
                feeds: vec![FeedId::Nqrw, FeedId::Numbered],
                merge: vec![bryant_park],
            },
        ])
    }

    pub fn get(&self, key: &str) -> Option<&StationConfig> {
        self.views.iter().find(|v| v.key == key)
    }

    pub fn first(&self) -> Option<&StationConfig> {
        self.views.first()
    }

    pub fn views(&self) -> &[StationConfig] {
        &self.views
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    #[test]
    fn test_required_feeds_union_deduplicated() {
        let table = StationTable::builtin();
        let downtown = table.get("timessq").unwrap();

        assert_eq!(
            downtown.required_feeds(),
            vec![FeedId::Nqrw, FeedId::Numbered, FeedId::Bdfm]
        );
    }

    #[test]
    fn test_stations_includes_merge_targets() {
        let table = StationTable::builtin();
        let keys: Vec<_> = table
            .get("timessq")
            .unwrap()
            .stations()
            .map(|s| s.key.as_str())
            .collect();
        assert_eq!(keys, vec!["timessq", "bryantpark"]);
    }

    #[test]
    fn test_unknown_view() {
        assert!(StationTable::builtin().get("grandcentral").is_none());
    }

    #[test]
    fn test_load_from_json() {
        let path = format!("{}/subway_arrivals_stations.json", env::temp_dir().display());
        let json = serde_json::to_string(StationTable::builtin().views()).unwrap();
        fs::write(&path, json).unwrap();

        let table = StationTable::load(&path).unwrap();
        assert_eq!(table.views(), StationTable::builtin().views());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_rejects_unknown_feed() {
        let path = format!("{}/subway_arrivals_bad_feed.json", env::temp_dir().display());
        fs::write(
            &path,
            r#"[{"key":"x","name":"X","direction":"N","direction_label":"Up",
                "stops":["A1N"],"feeds":["7"]}]"#,
        )
        .unwrap();

        assert!(StationTable::load(&path).is_err());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_rejects_empty_table() {
        let path = format!("{}/subway_arrivals_empty.json", env::temp_dir().display());
        fs::write(&path, "[]").unwrap();

        assert!(StationTable::load(&path).is_err());

        fs::remove_file(&path).unwrap();
    }
}
