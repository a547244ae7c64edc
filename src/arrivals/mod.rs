//! Arrival prediction pipeline.
//!
//! Stop-time updates are filtered to a station's platforms, turned into
//! minutes-away counts, grouped per route and ordered for display.

pub mod extract;
pub mod group;
pub mod rank;
pub mod types;

pub use extract::{extract, extract_at};
pub use group::{MAX_TIMES_PER_ROUTE, group};
pub use rank::{LINE_PRIORITY, rank};
pub use types::RawArrival;
