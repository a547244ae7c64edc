//! Display model handed to renderers.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::arrivals::rank;

/// Badge color for lines missing from [`LINE_COLORS`].
pub const DEFAULT_LINE_COLOR: &str = "#888888";

/// Official MTA line colors.
static LINE_COLORS: &[(&str, &str)] = &[
    ("1", "#EE352E"),
    ("2", "#EE352E"),
    ("3", "#EE352E"),
    ("4", "#00933C"),
    ("5", "#00933C"),
    ("6", "#00933C"),
    ("7", "#B933AD"),
    ("A", "#0039A6"),
    ("C", "#0039A6"),
    ("E", "#0039A6"),
    ("B", "#FF6319"),
    ("D", "#FF6319"),
    ("F", "#FF6319"),
    ("M", "#FF6319"),
    ("G", "#6CBE45"),
    ("J", "#996633"),
    ("Z", "#996633"),
    ("L", "#A7A9AC"),
    ("N", "#FCCC0A"),
    ("Q", "#FCCC0A"),
    ("R", "#FCCC0A"),
    ("W", "#FCCC0A"),
    ("S", "#808183"),
];

/// Lines whose badge needs dark text to stay readable.
static DARK_TEXT_LINES: &[&str] = &["N", "Q", "R", "W"];

/// Chips at or below this many minutes read "Now".
pub const ARRIVING_THRESHOLD_MINUTES: u32 = 1;

pub fn line_color(route: &str) -> &'static str {
    LINE_COLORS
        .iter()
        .find(|(r, _)| *r == route)
        .map_or(DEFAULT_LINE_COLOR, |(_, color)| *color)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeChip {
    pub minutes: u32,
    pub arriving: bool,
    pub label: String,
}

impl TimeChip {
    pub fn new(minutes: u32) -> Self {
        let arriving = minutes <= ARRIVING_THRESHOLD_MINUTES;
        let label = if arriving {
            "Now".to_string()
        } else {
            format!("{minutes} min")
        };
        Self {
            minutes,
            arriving,
            label,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineRow {
    pub route: String,
    pub color: &'static str,
    pub dark_text: bool,
    pub times: Vec<TimeChip>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayModel {
    pub station: String,
    pub direction_label: String,
    pub lines: Vec<LineRow>,
}

impl DisplayModel {
    /// Ranks grouped arrivals and decorates each route for display.
    pub fn build(
        station: &str,
        direction_label: &str,
        mut grouped: BTreeMap<String, Vec<u32>>,
    ) -> Self {
        let lines = rank(grouped.keys().cloned().collect::<Vec<_>>())
            .into_iter()
            .map(|route| {
                let times = grouped
                    .remove(&route)
                    .unwrap_or_default()
                    .into_iter()
                    .map(TimeChip::new)
                    .collect();
                LineRow {
                    color: line_color(&route),
                    dark_text: DARK_TEXT_LINES.contains(&route.as_str()),
                    route,
                    times,
                }
            })
            .collect();

        Self {
            station: station.to_string(),
            direction_label: direction_label.to_string(),
            lines,
        }
    }

    /// True when no train is scheduled. This is a successful result, distinct
    /// from every feed being unavailable.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
