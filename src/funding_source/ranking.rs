//! Orders the funding sources that can pay for an expense, most likely choice first.

use std::collections::HashSet;

use crate::funding_source::{FundingSource, FundingSourceId};

/// The most recently used sources that are placed first.
const RECENTLY_USED_COUNT: usize = 2;
/// The most used sources that are placed after the recently used ones.
const MOST_USED_COUNT: usize = 2;

/// Turn a NaN or negative threshold into zero.
pub fn normalize_threshold(amount_threshold: f64) -> f64 {
    if amount_threshold.is_nan() || amount_threshold < 0.0 {
        0.0
    } else {
        amount_threshold
    }
}

/// Rank the funding sources that can cover `amount_threshold`.
///
/// Only sources whose available balance is strictly greater than the
/// threshold are kept, where a NaN or negative threshold counts as zero.
/// The kept sources are ordered as:
/// 1. the two most recently used sources, newest first,
/// 2. then the two most used of the rest, by usage count,
/// 3. then everything else, debit accounts before credit lines and larger
///    balances first.
///
/// Ties keep the order of `sources`. If an id appears more than once, only
/// its first eligible entry is kept.
pub fn rank(sources: &[FundingSource], amount_threshold: f64) -> Vec<FundingSource> {
    let threshold = normalize_threshold(amount_threshold);

    let mut seen = HashSet::new();
    let mut remaining: Vec<&FundingSource> = sources
        .iter()
        .filter(|source| source.available_balance > threshold)
        .filter(|source| seen.insert(source.id))
        .collect();

    let mut recently_used: Vec<&FundingSource> = remaining
        .iter()
        .copied()
        .filter(|source| source.last_used_at.is_some())
        .collect();
    recently_used.sort_by(|a, b| b.last_used_at.cmp(&a.last_used_at));
    recently_used.truncate(RECENTLY_USED_COUNT);
    remove_placed(&mut remaining, &recently_used);

    let mut most_used = remaining.clone();
    most_used.sort_by(|a, b| b.usage_count.cmp(&a.usage_count));
    most_used.truncate(MOST_USED_COUNT);
    remove_placed(&mut remaining, &most_used);

    remaining.sort_by(|a, b| {
        a.kind()
            .cmp(&b.kind())
            .then_with(|| b.available_balance.total_cmp(&a.available_balance))
    });

    recently_used
        .into_iter()
        .chain(most_used)
        .chain(remaining)
        .cloned()
        .collect()
}

fn remove_placed(remaining: &mut Vec<&FundingSource>, placed: &[&FundingSource]) {
    let placed_ids: HashSet<FundingSourceId> = placed.iter().map(|source| source.id).collect();

    remaining.retain(|source| !placed_ids.contains(&source.id));
}
