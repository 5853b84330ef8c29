//! Filtering, searching and paging over the canonical record list.

use crate::types::Record;
use std::collections::BTreeSet;
use tracing::debug;

/// Independent equality constraints; `None` leaves a field unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    pub category: Option<String>,
    pub city: Option<String>,
    pub year: Option<i32>,
    /// Compared case-insensitively.
    pub month: Option<String>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_month(mut self, month: impl Into<String>) -> Self {
        self.month = Some(month.into());
        self
    }

    /// The same constraints minus the month. Trend rankings use this view so
    /// that picking a month still leaves two periods to compare.
    pub fn without_month(&self) -> Self {
        Self {
            month: None,
            ..self.clone()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.city.is_none() && self.year.is_none() && self.month.is_none()
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.category.as_ref().map_or(true, |c| record.category == *c)
            && self.city.as_ref().map_or(true, |c| record.city == *c)
            && self.year.map_or(true, |y| record.year == Some(y))
            && self
                .month
                .as_ref()
                .map_or(true, |m| same_month_name(&record.month, m))
    }

    pub fn describe(&self) -> String {
        if self.is_empty() {
            return "none".to_string();
        }
        let mut parts = Vec::new();
        if let Some(c) = &self.category {
            parts.push(format!("category={}", c));
        }
        if let Some(c) = &self.city {
            parts.push(format!("city={}", c));
        }
        if let Some(y) = self.year {
            parts.push(format!("year={}", y));
        }
        if let Some(m) = &self.month {
            parts.push(format!("month={}", m));
        }
        parts.join(", ")
    }
}

fn same_month_name(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// Order-preserving subsequence of `records` matching every constraint.
pub fn apply_filters(records: &[Record], filters: &FilterSet) -> Vec<Record> {
    let filtered: Vec<Record> = records
        .iter()
        .filter(|r| filters.matches(r))
        .cloned()
        .collect();
    debug!(
        filter = %filters.describe(),
        total = records.len(),
        filtered = filtered.len(),
        "Filters applied"
    );
    filtered
}

/// Values offered by the filter controls, taken from the full dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub categories: Vec<String>,
    pub cities: Vec<String>,
    /// Newest first.
    pub years: Vec<i32>,
}

impl FilterOptions {
    pub fn from_records(records: &[Record]) -> Self {
        let categories: BTreeSet<&str> = records
            .iter()
            .map(|r| r.category.as_str())
            .filter(|c| !c.is_empty())
            .collect();
        let cities: BTreeSet<&str> = records
            .iter()
            .map(|r| r.city.as_str())
            .filter(|c| !c.is_empty())
            .collect();
        let years: BTreeSet<i32> = records.iter().filter_map(|r| r.year).collect();
        Self {
            categories: categories.into_iter().map(String::from).collect(),
            cities: cities.into_iter().map(String::from).collect(),
            years: years.into_iter().rev().collect(),
        }
    }
}

fn searchable_fields(record: &Record) -> [String; 13] {
    [
        record.row_number.to_string(),
        record.category.clone(),
        record.broad_subcategory.clone(),
        record.specific_subcategory.clone(),
        record.responsible.clone(),
        record.reference_period.clone(),
        record.amount.to_string(),
        record.indicator.marker().to_string(),
        record.city.clone(),
        record.year.map(|y| y.to_string()).unwrap_or_default(),
        record.month.clone(),
        record.date.clone(),
        record.status.clone(),
    ]
}

/// Case-insensitive substring search across every field. An empty term
/// returns everything.
pub fn search(records: &[Record], term: &str) -> Vec<Record> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|r| {
            searchable_fields(r)
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a> {
    pub rows: &'a [Record],
    /// 1-based.
    pub page: usize,
    pub total_pages: usize,
}

/// Slice out one page. Out-of-range page numbers are clamped.
pub fn paginate(records: &[Record], page: usize, per_page: usize) -> Page<'_> {
    let per_page = per_page.max(1);
    let total_pages = records.len().div_ceil(per_page);
    let page = page.clamp(1, total_pages.max(1));
    let start = ((page - 1) * per_page).min(records.len());
    let end = (start + per_page).min(records.len());
    Page {
        rows: &records[start..end],
        page,
        total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Indicator;

    fn rec(row: i64, category: &str, city: &str, year: Option<i32>, month: &str) -> Record {
        Record {
            row_number: row,
            category: category.into(),
            broad_subcategory: "Moradia".into(),
            specific_subcategory: "Aluguel".into(),
            responsible: "Bruno".into(),
            reference_period: "Jan/24".into(),
            amount: 1250.5,
            indicator: Indicator::Down,
            city: city.into(),
            year,
            month: month.into(),
            date: "10/01/2024".into(),
            status: "mes bloqueado".into(),
        }
    }

    fn sample() -> Vec<Record> {
        vec![
            rec(1, "Despesas", "Recife", Some(2024), "janeiro"),
            rec(2, "Receitas", "Recife", Some(2024), "Janeiro"),
            rec(3, "Despesas", "Olinda", Some(2023), "dezembro"),
            rec(4, "Despesas", "Recife", Some(2024), "fevereiro"),
            rec(5, "Despesas", "", None, "JANEIRO"),
        ]
    }

    fn rows(records: &[Record]) -> Vec<i64> {
        records.iter().map(|r| r.row_number).collect()
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let data = sample();
        assert_eq!(apply_filters(&data, &FilterSet::new()), data);
        assert!(FilterSet::new().is_empty());
    }

    #[test]
    fn test_filters_compose_with_and() {
        let filters = FilterSet::new()
            .with_category("Despesas")
            .with_city("Recife")
            .with_year(2024);
        assert_eq!(rows(&apply_filters(&sample(), &filters)), vec![1, 4]);
    }

    #[test]
    fn test_month_is_case_insensitive() {
        let filters = FilterSet::new().with_month("JaNeIrO");
        assert_eq!(rows(&apply_filters(&sample(), &filters)), vec![1, 2, 5]);
    }

    #[test]
    fn test_month_filter_ignores_surrounding_whitespace() {
        let mut padded = rec(6, "Despesas", "Recife", Some(2024), " janeiro ");
        padded.amount = 10.0;
        let data = vec![padded];
        let filters = FilterSet::new().with_month("Janeiro ");
        assert_eq!(rows(&apply_filters(&data, &filters)), vec![6]);
        assert_eq!(crate::aggregate::compute_monthly_trend(&data)[0].total, 10.0);
    }

    #[test]
    fn test_unknown_year_never_matches_a_year_filter() {
        let filters = FilterSet::new().with_category("Despesas").with_year(2024);
        assert!(!rows(&apply_filters(&sample(), &filters)).contains(&5));
    }

    #[test]
    fn test_apply_filters_is_idempotent() {
        let filters = FilterSet::new().with_category("Despesas").with_month("janeiro");
        let once = apply_filters(&sample(), &filters);
        let twice = apply_filters(&once, &filters);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_without_month() {
        let filters = FilterSet::new().with_city("Recife").with_month("janeiro");
        let relaxed = filters.without_month();
        assert_eq!(relaxed, FilterSet::new().with_city("Recife"));
        assert_eq!(relaxed.describe(), "city=Recife");
        assert_eq!(FilterSet::new().describe(), "none");
    }

    #[test]
    fn test_filter_options() {
        let options = FilterOptions::from_records(&sample());
        assert_eq!(options.categories, vec!["Despesas", "Receitas"]);
        assert_eq!(options.cities, vec!["Olinda", "Recife"]);
        assert_eq!(options.years, vec![2024, 2023]);
    }

    #[test]
    fn test_search_matches_any_field() {
        let data = sample();
        assert_eq!(rows(&search(&data, "olinda")), vec![3]);
        assert_eq!(rows(&search(&data, "receitas")), vec![2]);
        assert_eq!(rows(&search(&data, "1250.5")).len(), 5);
        assert_eq!(rows(&search(&data, "2023")), vec![3]);
        assert_eq!(search(&data, "  ").len(), 5);
        assert!(search(&data, "zzz").is_empty());
    }

    #[test]
    fn test_paginate() {
        let data = sample();
        let first = paginate(&data, 1, 2);
        assert_eq!(rows(first.rows), vec![1, 2]);
        assert_eq!(first.total_pages, 3);

        let last = paginate(&data, 3, 2);
        assert_eq!(rows(last.rows), vec![5]);

        let clamped = paginate(&data, 99, 2);
        assert_eq!(clamped.page, 3);

        let empty = paginate(&[], 1, 10);
        assert!(empty.rows.is_empty());
        assert_eq!(empty.total_pages, 0);
        assert_eq!(empty.page, 1);
    }
}
