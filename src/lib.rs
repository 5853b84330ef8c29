pub mod aggregate;
pub mod config;
pub mod drilldown;
pub mod error;
pub mod filters;
pub mod loader;
pub mod month;
pub mod output;
pub mod reports;
pub mod trends;
pub mod types;
pub mod util;

pub use aggregate::{compute_monthly_trend, compute_stats, compute_top_category_totals, group_sum};
pub use drilldown::{compute_drilldown, compute_reference_period_breakdown, DrilldownSession};
pub use error::{DashboardError, DashboardResult};
pub use filters::{apply_filters, FilterSet};
pub use trends::compute_trend_rankings;
