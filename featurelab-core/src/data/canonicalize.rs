//! Canonicalize fetched bars: ascending date order, one bar per date.

use super::provider::RawBar;

/// Outcome of canonicalization.
#[derive(Debug, Clone)]
pub struct Canonicalized {
    pub bars: Vec<RawBar>,
    /// Bars discarded because a later bar had the same date.
    pub duplicates_removed: usize,
}

/// Sort by date (stable) and keep the last bar for each date.
///
/// Providers occasionally repeat the most recent session when a request
/// straddles the current day; the later row is the revised one.
pub fn canonicalize(mut bars: Vec<RawBar>) -> Canonicalized {
    bars.sort_by_key(|b| b.date);

    let before = bars.len();
    let mut out: Vec<RawBar> = Vec::with_capacity(before);
    for bar in bars {
        match out.last_mut() {
            Some(last) if last.date == bar.date => *last = bar,
            _ => out.push(bar),
        }
    }

    Canonicalized {
        duplicates_removed: before - out.len(),
        bars: out,
    }
}
