/// Display order for lines at the configured stations. Lines not listed here
/// sort after all of these.
pub static LINE_PRIORITY: &[&str] = &[
    "Q", "B", "D", "N", "R", "W", "F", "M", "1", "2", "3", "4", "5", "7", "S",
];

fn priority(route: &str) -> Option<usize> {
    LINE_PRIORITY.iter().position(|r| *r == route)
}

/// Orders routes by [`LINE_PRIORITY`]. The sort is stable, so unknown routes
/// keep their input order.
pub fn rank<I, S>(routes: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut ranked: Vec<String> = routes.into_iter().map(Into::into).collect();
    ranked.sort_by_key(|r| priority(r).unwrap_or(usize::MAX));
    ranked
}
