// Grouping primitive shared by every chart-style aggregate.
use crate::month::{calendar, month_index, parse_month, short_label};
use crate::types::{Bucket, DashboardStats, Record};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Which contributions take part in a sum. Each call site picks one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountPolicy {
    /// Only finite contributions greater than zero are summed.
    PositiveOnly,
    /// Every finite contribution is summed, zero and negative included.
    All,
}

impl AmountPolicy {
    fn admits(self, value: f64) -> bool {
        match self {
            AmountPolicy::PositiveOnly => value.is_finite() && value > 0.0,
            AmountPolicy::All => value.is_finite(),
        }
    }
}

/// Sum `value_fn` over `records` grouped by `key_fn`.
///
/// Records whose key is missing or empty never form a bucket. Buckets come
/// back in first-encounter order; callers pick the final ordering with
/// [`top_n`] or [`in_month_order`].
pub fn group_sum<K, V>(
    records: &[Record],
    key_fn: K,
    value_fn: V,
    policy: AmountPolicy,
) -> Vec<Bucket>
where
    K: Fn(&Record) -> Option<String>,
    V: Fn(&Record) -> f64,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut buckets: Vec<Bucket> = Vec::new();
    for r in records {
        let value = value_fn(r);
        if !policy.admits(value) {
            continue;
        }
        let Some(key) = key_fn(r).filter(|k| !k.is_empty()) else {
            continue;
        };
        match index.get(&key) {
            Some(&i) => buckets[i].total += value,
            None => {
                index.insert(key.clone(), buckets.len());
                buckets.push(Bucket::new(key, value));
            }
        }
    }
    buckets
}

/// Stable sort by descending total; equal totals keep their encounter order.
pub fn sort_by_total_desc(buckets: &mut [Bucket]) {
    buckets.sort_by(|a, b| b.total.partial_cmp(&a.total).unwrap_or(Ordering::Equal));
}

pub fn top_n(mut buckets: Vec<Bucket>, n: usize) -> Vec<Bucket> {
    sort_by_total_desc(&mut buckets);
    buckets.truncate(n);
    buckets
}

/// Re-emit month-keyed buckets as the twelve calendar months, January first,
/// labelled `Jan`, `Fev`, ... Months absent from the input get `0.0`; keys that
/// are not month names are ignored.
pub fn in_month_order(buckets: &[Bucket]) -> Vec<Bucket> {
    let mut totals = [0.0f64; 12];
    for b in buckets {
        if let Some(month) = parse_month(&b.key) {
            totals[month_index(month)] += b.total;
        }
    }
    calendar()
        .map(|m| Bucket::new(short_label(m), totals[month_index(m)]))
        .collect()
}

/// Top `n` broad subcategories by summed positive amount.
pub fn compute_top_category_totals(records: &[Record], n: usize) -> Vec<Bucket> {
    let buckets = group_sum(
        records,
        |r| Some(r.broad_subcategory.clone()),
        |r| r.amount,
        AmountPolicy::PositiveOnly,
    );
    top_n(buckets, n)
}

/// Positive amounts per calendar month; always twelve buckets.
pub fn compute_monthly_trend(records: &[Record]) -> Vec<Bucket> {
    let buckets = group_sum(
        records,
        |r| Some(r.month.to_lowercase()),
        |r| r.amount,
        AmountPolicy::PositiveOnly,
    );
    in_month_order(&buckets)
}

/// Headline numbers. The total includes every amount, negatives too.
pub fn compute_stats(records: &[Record]) -> DashboardStats {
    let categories: HashSet<&str> = records.iter().map(|r| r.category.as_str()).collect();
    DashboardStats {
        total_amount: records.iter().map(|r| r.amount).sum(),
        record_count: records.len(),
        unique_categories: categories.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Indicator;

    fn rec(broad: &str, month: &str, amount: f64) -> Record {
        Record {
            row_number: 0,
            category: "Despesas".into(),
            broad_subcategory: broad.into(),
            specific_subcategory: String::new(),
            responsible: String::new(),
            reference_period: String::new(),
            amount,
            indicator: Indicator::Unmarked,
            city: String::new(),
            year: Some(2024),
            month: month.into(),
            date: String::new(),
            status: String::new(),
        }
    }

    #[test]
    fn test_group_sum_conserves_total() {
        let data = vec![
            rec("A", "janeiro", 10.0),
            rec("B", "janeiro", 2.5),
            rec("A", "março", 7.5),
            rec("C", "abril", 30.0),
        ];
        let buckets = group_sum(
            &data,
            |r| Some(r.broad_subcategory.clone()),
            |r| r.amount,
            AmountPolicy::PositiveOnly,
        );
        let bucket_sum: f64 = buckets.iter().map(|b| b.total).sum();
        let input_sum: f64 = data.iter().map(|r| r.amount).sum();
        assert_eq!(bucket_sum, input_sum);
        assert_eq!(buckets[0], Bucket::new("A", 17.5));
    }

    #[test]
    fn test_group_sum_skips_empty_keys() {
        let data = vec![rec("", "janeiro", 10.0), rec("A", "janeiro", 1.0)];
        let buckets = group_sum(
            &data,
            |r| Some(r.broad_subcategory.clone()),
            |r| r.amount,
            AmountPolicy::All,
        );
        assert_eq!(buckets, vec![Bucket::new("A", 1.0)]);
    }

    #[test]
    fn test_policy_controls_non_positive_amounts() {
        let data = vec![
            rec("A", "janeiro", 10.0),
            rec("A", "janeiro", -4.0),
            rec("B", "janeiro", 0.0),
        ];
        let key = |r: &Record| Some(r.broad_subcategory.clone());

        let positive = group_sum(&data, key, |r| r.amount, AmountPolicy::PositiveOnly);
        assert_eq!(positive, vec![Bucket::new("A", 10.0)]);

        let all = group_sum(&data, key, |r| r.amount, AmountPolicy::All);
        assert_eq!(all, vec![Bucket::new("A", 6.0), Bucket::new("B", 0.0)]);
    }

    #[test]
    fn test_top_n_is_stable_on_ties() {
        let data = vec![
            rec("First", "janeiro", 5.0),
            rec("Big", "janeiro", 50.0),
            rec("Second", "janeiro", 5.0),
            rec("Third", "janeiro", 5.0),
        ];
        let top = compute_top_category_totals(&data, 3);
        let names: Vec<&str> = top.iter().map(|b| b.key.as_str()).collect();
        assert_eq!(names, vec!["Big", "First", "Second"]);
    }

    #[test]
    fn test_monthly_trend_has_twelve_calendar_buckets() {
        let data = vec![
            rec("A", "Dezembro", 3.0),
            rec("A", "MARÇO", 2.0),
            rec("A", "março", 1.0),
            rec("A", "janeiro", -9.0),
            rec("A", "", 4.0),
        ];
        let trend = compute_monthly_trend(&data);
        assert_eq!(trend.len(), 12);
        assert_eq!(trend[0], Bucket::new("Jan", 0.0));
        assert_eq!(trend[2], Bucket::new("Mar", 3.0));
        assert_eq!(trend[11], Bucket::new("Dez", 3.0));

        let empty = compute_monthly_trend(&[]);
        assert_eq!(empty.len(), 12);
        assert!(empty.iter().all(|b| b.total == 0.0));
    }

    #[test]
    fn test_stats_count_every_amount() {
        let mut other = rec("B", "janeiro", -5.0);
        other.category = "Receitas".into();
        let data = vec![rec("A", "janeiro", 20.0), other];
        let stats = compute_stats(&data);
        assert_eq!(stats.total_amount, 15.0);
        assert_eq!(stats.record_count, 2);
        assert_eq!(stats.unique_categories, 2);
    }
}
