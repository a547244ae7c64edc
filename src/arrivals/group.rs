use std::collections::BTreeMap;

use crate::arrivals::types::RawArrival;

/// Minute counts kept per route.
pub const MAX_TIMES_PER_ROUTE: usize = 3;

/// Partitions arrivals by route, keeping the soonest [`MAX_TIMES_PER_ROUTE`]
/// minute counts per route in ascending order.
pub fn group(arrivals: Vec<RawArrival>) -> BTreeMap<String, Vec<u32>> {
    let mut grouped: BTreeMap<String, Vec<u32>> = BTreeMap::new();

    for arrival in arrivals {
        grouped
            .entry(arrival.route)
            .or_default()
            .push(arrival.minutes_away);
    }

    for times in grouped.values_mut() {
        times.sort_unstable();
        times.truncate(MAX_TIMES_PER_ROUTE);
    }

    grouped
}
