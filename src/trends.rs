//! Period-over-period ranking of broad subcategories.
//!
//! The two most recent (year, month) periods are compared; a subcategory
//! new in the latest period ranks as `+Infinity`, one that vanished as -100%.

use crate::aggregate::{group_sum, AmountPolicy};
use crate::month::{month_at, month_index, parse_month, period_label};
use crate::types::{Bucket, Record, TrendEntry, TrendOutcome, TrendRankings};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use tracing::debug;

pub const RANKING_SIZE: usize = 5;

/// (year, zero-based month), ordered chronologically.
type PeriodKey = (i32, usize);

// Only records that can land in a period bucket define a period.
fn period_of(record: &Record) -> Option<PeriodKey> {
    if record.broad_subcategory.is_empty() || record.amount <= 0.0 {
        return None;
    }
    let year = record.year.filter(|y| *y != 0)?;
    let month = parse_month(&record.month)?;
    Some((year, month_index(month)))
}

fn totals_for(records: &[Record], period: PeriodKey) -> Vec<Bucket> {
    group_sum(
        records,
        |r| (period_of(r) == Some(period)).then(|| r.broad_subcategory.clone()),
        |r| r.amount,
        AmountPolicy::PositiveOnly,
    )
}

fn label(period: PeriodKey) -> String {
    match month_at(period.1) {
        Some(month) => period_label(period.0, month),
        None => period.0.to_string(),
    }
}

fn lookup(buckets: &[Bucket], name: &str) -> f64 {
    buckets
        .iter()
        .find(|b| b.key == name)
        .map(|b| b.total)
        .unwrap_or(0.0)
}

/// Change record for one subcategory, or `None` when there is nothing to
/// report. An exact 0% change is left out of the rankings.
fn change_entry(name: &str, previous: f64, current: f64) -> Option<TrendEntry> {
    let change_percent = if previous == 0.0 && current > 0.0 {
        f64::INFINITY
    } else if previous > 0.0 && current > 0.0 {
        let change = (current - previous) / previous * 100.0;
        if change == 0.0 {
            return None;
        }
        change
    } else if previous > 0.0 && current == 0.0 {
        -100.0
    } else {
        return None;
    };
    Some(TrendEntry {
        name: name.to_string(),
        change_percent,
        previous_value: previous,
        current_value: current,
    })
}

fn by_change_desc(a: &TrendEntry, b: &TrendEntry) -> Ordering {
    b.change_percent
        .partial_cmp(&a.change_percent)
        .unwrap_or(Ordering::Equal)
}

pub fn compute_trend_rankings(records: &[Record]) -> TrendOutcome {
    let periods: BTreeSet<PeriodKey> = records.iter().filter_map(period_of).collect();
    let mut latest = periods.iter().rev();
    let (Some(&current), Some(&previous)) = (latest.next(), latest.next()) else {
        debug!(periods = periods.len(), "Not enough periods for trend rankings");
        return TrendOutcome::InsufficientData;
    };

    let current_totals = totals_for(records, current);
    let previous_totals = totals_for(records, previous);

    let mut names: Vec<&str> = current_totals.iter().map(|b| b.key.as_str()).collect();
    for b in &previous_totals {
        if !names.contains(&b.key.as_str()) {
            names.push(b.key.as_str());
        }
    }

    let mut changes: Vec<TrendEntry> = names
        .into_iter()
        .filter_map(|name| {
            change_entry(
                name,
                lookup(&previous_totals, name),
                lookup(&current_totals, name),
            )
        })
        .collect();
    changes.sort_by(by_change_desc);

    let growing: Vec<TrendEntry> = changes
        .iter()
        .filter(|c| c.change_percent > 0.0)
        .take(RANKING_SIZE)
        .cloned()
        .collect();
    let mut declining: Vec<TrendEntry> = changes
        .into_iter()
        .filter(|c| c.change_percent < 0.0)
        .collect();
    declining.sort_by(|a, b| by_change_desc(b, a));
    declining.truncate(RANKING_SIZE);

    TrendOutcome::Ranked(TrendRankings {
        growing,
        declining,
        period1_label: label(previous),
        period2_label: label(current),
    })
}
