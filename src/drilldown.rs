//! Two-level drill-down below a broad subcategory.
//!
//! Level 0 (overview) splits the broad subcategory into its specific
//! subcategories; level 1 (detail) splits one specific subcategory into
//! reference periods. Both levels sum positive amounts only.

use crate::aggregate::{group_sum, sort_by_total_desc, AmountPolicy};
use crate::types::{Breakdown, Record};
use tracing::debug;

/// Label for records with an empty grouping field.
pub const NOT_SPECIFIED: &str = "Not specified";

fn label_or_unspecified(value: &str) -> String {
    if value.is_empty() {
        NOT_SPECIFIED.to_string()
    } else {
        value.to_string()
    }
}

fn specific_matches(record: &Record, specific_subcategory: &str) -> bool {
    record.specific_subcategory == specific_subcategory
        || (specific_subcategory == NOT_SPECIFIED && record.specific_subcategory.is_empty())
}

/// Specific-subcategory totals within `broad_subcategory`, largest first.
/// Empty when nothing matches.
pub fn compute_drilldown(records: &[Record], broad_subcategory: &str) -> Breakdown {
    let mut buckets = group_sum(
        records,
        |r| {
            (r.broad_subcategory == broad_subcategory)
                .then(|| label_or_unspecified(&r.specific_subcategory))
        },
        |r| r.amount,
        AmountPolicy::PositiveOnly,
    );
    sort_by_total_desc(&mut buckets);
    Breakdown::from_buckets(buckets)
}

/// Reference-period totals for one (broad, specific) pair, largest first.
/// Selecting [`NOT_SPECIFIED`] matches records with no specific subcategory.
pub fn compute_reference_period_breakdown(
    records: &[Record],
    broad_subcategory: &str,
    specific_subcategory: &str,
) -> Breakdown {
    let mut buckets = group_sum(
        records,
        |r| {
            (r.broad_subcategory == broad_subcategory && specific_matches(r, specific_subcategory))
                .then(|| label_or_unspecified(&r.reference_period))
        },
        |r| r.amount,
        AmountPolicy::PositiveOnly,
    );
    sort_by_total_desc(&mut buckets);
    Breakdown::from_buckets(buckets)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum DrilldownLevel {
    Overview,
    Detail { specific_subcategory: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrilldownView {
    Overview(Breakdown),
    Detail {
        specific_subcategory: String,
        breakdown: Breakdown,
    },
}

/// State of one open drill-down. Dropping the session discards any
/// selection; a new session always starts at the overview.
#[derive(Debug, Clone)]
pub struct DrilldownSession {
    broad_subcategory: String,
    level: DrilldownLevel,
}

impl DrilldownSession {
    pub fn open(broad_subcategory: impl Into<String>) -> Self {
        let broad_subcategory = broad_subcategory.into();
        debug!(broad = %broad_subcategory, "Drill-down opened");
        Self {
            broad_subcategory,
            level: DrilldownLevel::Overview,
        }
    }

    pub fn broad_subcategory(&self) -> &str {
        &self.broad_subcategory
    }

    /// Move from the overview to the detail of `specific_subcategory`.
    /// Returns `false` (and changes nothing) when already in detail.
    pub fn select(&mut self, specific_subcategory: impl Into<String>) -> bool {
        if self.level != DrilldownLevel::Overview {
            return false;
        }
        self.level = DrilldownLevel::Detail {
            specific_subcategory: specific_subcategory.into(),
        };
        true
    }

    /// Return to the overview, clearing the detail selection.
    pub fn back(&mut self) {
        self.level = DrilldownLevel::Overview;
    }

    pub fn view(&self, records: &[Record]) -> DrilldownView {
        match &self.level {
            DrilldownLevel::Overview => {
                DrilldownView::Overview(compute_drilldown(records, &self.broad_subcategory))
            }
            DrilldownLevel::Detail {
                specific_subcategory,
            } => DrilldownView::Detail {
                specific_subcategory: specific_subcategory.clone(),
                breakdown: compute_reference_period_breakdown(
                    records,
                    &self.broad_subcategory,
                    specific_subcategory,
                ),
            },
        }
    }
}
