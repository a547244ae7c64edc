use serde::Serialize;

/// One predicted train at a watched platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawArrival {
    pub route: String,
    pub minutes_away: u32,
}
