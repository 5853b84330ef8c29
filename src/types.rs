use serde::{Deserialize, Serialize};
use serde_json::Value;
use tabled::Tabled;

/// One record exactly as the endpoint sends it. Every field is kept loose
/// so a bad value can be repaired or rejected in the normalizer.
#[derive(Debug, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub row_number: Value,
    #[serde(rename = "categoria", default)]
    pub category: Value,
    #[serde(rename = "subcategoria ampla", default)]
    pub broad_subcategory: Value,
    #[serde(rename = "subcategoria especifica", default)]
    pub specific_subcategory: Value,
    #[serde(rename = "responsavel", default)]
    pub responsible: Value,
    #[serde(rename = "competencia / referencia", default)]
    pub reference_period: Value,
    #[serde(rename = "valor", default)]
    pub amount: Value,
    #[serde(rename = "indicador", default)]
    pub indicator: Value,
    #[serde(rename = "cidade", default)]
    pub city: Value,
    #[serde(rename = "ano", default)]
    pub year: Value,
    #[serde(rename = "mes", default)]
    pub month: Value,
    #[serde(rename = "data", default)]
    pub date: Value,
    #[serde(default)]
    pub status: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Indicator {
    Up,
    Down,
    Unmarked,
}

impl Indicator {
    pub fn from_marker(marker: &str) -> Self {
        match marker.trim() {
            "+" => Indicator::Up,
            "-" => Indicator::Down,
            _ => Indicator::Unmarked,
        }
    }

    pub fn marker(&self) -> &'static str {
        match self {
            Indicator::Up => "+",
            Indicator::Down => "-",
            Indicator::Unmarked => "",
        }
    }
}

/// Canonical record consumed by every aggregation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub row_number: i64,
    pub category: String,
    pub broad_subcategory: String,
    pub specific_subcategory: String,
    pub responsible: String,
    pub reference_period: String,
    pub amount: f64,
    pub indicator: Indicator,
    pub city: String,
    /// `None` when the source year could not be read as an integer.
    pub year: Option<i32>,
    pub month: String,
    pub date: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub key: String,
    pub total: f64,
}

impl Bucket {
    pub fn new(key: impl Into<String>, total: f64) -> Self {
        Self {
            key: key.into(),
            total,
        }
    }
}

/// Buckets of one drill-down level together with the level total.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Breakdown {
    pub buckets: Vec<Bucket>,
    pub total: f64,
}

impl Breakdown {
    pub fn from_buckets(buckets: Vec<Bucket>) -> Self {
        let total = buckets.iter().map(|b| b.total).sum();
        Self { buckets, total }
    }

    /// Share of the level total held by `bucket`, `0.0` when the total is zero.
    pub fn share_of(&self, bucket: &Bucket) -> f64 {
        if self.total > 0.0 {
            bucket.total / self.total
        } else {
            0.0
        }
    }

    pub fn shares(&self) -> Vec<f64> {
        self.buckets.iter().map(|b| self.share_of(b)).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendEntry {
    pub name: String,
    /// Percent change; `f64::INFINITY` marks a subcategory new in the current period.
    pub change_percent: f64,
    pub previous_value: f64,
    pub current_value: f64,
}

impl TrendEntry {
    pub fn is_new(&self) -> bool {
        self.change_percent == f64::INFINITY
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendRankings {
    pub growing: Vec<TrendEntry>,
    pub declining: Vec<TrendEntry>,
    /// Label of the previous period, e.g. `Fevereiro/2024`.
    pub period1_label: String,
    /// Label of the current (latest) period.
    pub period2_label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrendOutcome {
    Ranked(TrendRankings),
    InsufficientData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_amount: f64,
    pub record_count: usize,
    pub unique_categories: usize,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CategoryTotalRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "BroadSubcategory")]
    #[tabled(rename = "BroadSubcategory")]
    pub name: String,
    #[serde(rename = "Total")]
    #[tabled(rename = "Total")]
    pub total: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct MonthlyTrendRow {
    #[serde(rename = "Month")]
    #[tabled(rename = "Month")]
    pub month: String,
    #[serde(rename = "Total")]
    #[tabled(rename = "Total")]
    pub total: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct TrendRow {
    #[serde(rename = "Ranking")]
    #[tabled(rename = "Ranking")]
    pub ranking: String,
    #[serde(rename = "BroadSubcategory")]
    #[tabled(rename = "BroadSubcategory")]
    pub name: String,
    #[serde(rename = "Previous")]
    #[tabled(rename = "Previous")]
    pub previous: String,
    #[serde(rename = "Current")]
    #[tabled(rename = "Current")]
    pub current: String,
    #[serde(rename = "Change")]
    #[tabled(rename = "Change")]
    pub change: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct BreakdownRow {
    #[serde(rename = "Name")]
    #[tabled(rename = "Name")]
    pub name: String,
    #[serde(rename = "Total")]
    #[tabled(rename = "Total")]
    pub total: String,
    #[serde(rename = "Share")]
    #[tabled(rename = "Share")]
    pub share: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct RecordRow {
    #[serde(rename = "Category")]
    #[tabled(rename = "Category")]
    pub category: String,
    #[serde(rename = "Subcategory")]
    #[tabled(rename = "Subcategory")]
    pub subcategory: String,
    #[serde(rename = "Amount")]
    #[tabled(rename = "Amount")]
    pub amount: String,
    #[serde(rename = "City")]
    #[tabled(rename = "City")]
    pub city: String,
    #[serde(rename = "Date")]
    #[tabled(rename = "Date")]
    pub date: String,
    #[serde(rename = "Status")]
    #[tabled(rename = "Status")]
    pub status: String,
    #[serde(rename = "Indicator")]
    #[tabled(rename = "Indicator")]
    pub indicator: String,
}

#[derive(Debug, Serialize)]
pub struct SummaryReport {
    pub generated_at: String,
    pub total_amount: f64,
    pub record_count: usize,
    pub unique_categories: usize,
    pub previous_period: Option<String>,
    pub current_period: Option<String>,
    pub growing: usize,
    pub declining: usize,
}
