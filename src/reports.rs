// Turns engine results into display/export rows.
use crate::types::{
    Breakdown, Bucket, BreakdownRow, CategoryTotalRow, DashboardStats, MonthlyTrendRow, Record,
    RecordRow, SummaryReport, TrendEntry, TrendOutcome, TrendRow,
};
use crate::util::{format_change, format_currency, format_share};

const NOT_PROVIDED: &str = "Not provided";

pub fn category_rows(buckets: &[Bucket]) -> Vec<CategoryTotalRow> {
    buckets
        .iter()
        .enumerate()
        .map(|(idx, b)| CategoryTotalRow {
            rank: idx + 1,
            name: b.key.clone(),
            total: format_currency(b.total),
        })
        .collect()
}

pub fn monthly_rows(buckets: &[Bucket]) -> Vec<MonthlyTrendRow> {
    buckets
        .iter()
        .map(|b| MonthlyTrendRow {
            month: b.key.clone(),
            total: format_currency(b.total),
        })
        .collect()
}

fn trend_row(ranking: &str, entry: &TrendEntry) -> TrendRow {
    TrendRow {
        ranking: ranking.to_string(),
        name: entry.name.clone(),
        previous: format_currency(entry.previous_value),
        current: format_currency(entry.current_value),
        change: format_change(entry.change_percent),
    }
}

/// Growing entries first, then declining. Empty when data is insufficient.
pub fn trend_rows(outcome: &TrendOutcome) -> Vec<TrendRow> {
    match outcome {
        TrendOutcome::Ranked(rankings) => rankings
            .growing
            .iter()
            .map(|e| trend_row("Growing", e))
            .chain(rankings.declining.iter().map(|e| trend_row("Declining", e)))
            .collect(),
        TrendOutcome::InsufficientData => Vec::new(),
    }
}

pub fn breakdown_rows(breakdown: &Breakdown) -> Vec<BreakdownRow> {
    breakdown
        .buckets
        .iter()
        .zip(breakdown.shares())
        .map(|(b, share)| BreakdownRow {
            name: b.key.clone(),
            total: format_currency(b.total),
            share: format_share(share),
        })
        .collect()
}

fn or_not_provided(value: &str) -> String {
    if value.is_empty() {
        NOT_PROVIDED.to_string()
    } else {
        value.to_string()
    }
}

pub fn record_rows(records: &[Record]) -> Vec<RecordRow> {
    records
        .iter()
        .map(|r| RecordRow {
            category: or_not_provided(&r.category),
            subcategory: or_not_provided(&r.specific_subcategory),
            amount: format_currency(r.amount),
            city: or_not_provided(&r.city),
            date: or_not_provided(&r.date),
            status: or_not_provided(&r.status),
            indicator: r.indicator.marker().to_string(),
        })
        .collect()
}

pub fn generate_summary(
    stats: &DashboardStats,
    trends: &TrendOutcome,
    generated_at: String,
) -> SummaryReport {
    let (previous_period, current_period, growing, declining) = match trends {
        TrendOutcome::Ranked(r) => (
            Some(r.period1_label.clone()),
            Some(r.period2_label.clone()),
            r.growing.len(),
            r.declining.len(),
        ),
        TrendOutcome::InsufficientData => (None, None, 0, 0),
    };
    SummaryReport {
        generated_at,
        total_amount: stats.total_amount,
        record_count: stats.record_count,
        unique_categories: stats.unique_categories,
        previous_period,
        current_period,
        growing,
        declining,
    }
}
