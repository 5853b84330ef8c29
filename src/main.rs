// Entry point and high-level CLI flow.
//
// - Option [1] loads and normalizes the data file, printing diagnostics.
// - Option [2] sets the category/city/year/month filters.
// - Option [3] prints the dashboard and exports its reports.
// - Option [4] drills into one broad subcategory.
// - Option [5] searches all records, one page at a time.
use expense_dashboard::aggregate::{compute_monthly_trend, compute_stats, compute_top_category_totals};
use expense_dashboard::config::Config;
use expense_dashboard::drilldown::{DrilldownSession, DrilldownView};
use expense_dashboard::filters::{apply_filters, paginate, search, FilterOptions, FilterSet};
use expense_dashboard::loader;
use expense_dashboard::output;
use expense_dashboard::reports;
use expense_dashboard::trends::{compute_trend_rankings, RANKING_SIZE};
use expense_dashboard::types::{Breakdown, Bucket, Record, TrendOutcome};
use expense_dashboard::util;
use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// Loaded dataset and active filters. A new load replaces the dataset wholesale.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState::default()));

#[derive(Default)]
struct AppState {
    data: Option<Vec<Record>>,
    filters: FilterSet,
}

fn state() -> MutexGuard<'static, AppState> {
    APP_STATE.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Copy the dataset and filters out of the shared state, or explain why not.
fn snapshot() -> Option<(Vec<Record>, FilterSet)> {
    let state = state();
    match &state.data {
        Some(data) => Some((data.clone(), state.filters.clone())),
        None => {
            println!("Error: No data loaded. Please load the data file first (option 1).\n");
            None
        }
    }
}

fn prompt(label: &str) -> String {
    print!("{}: ", label);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    if let Ok(0) = io::stdin().read_line(&mut buf) {
        println!("\nExiting the program.");
        std::process::exit(0);
    }
    buf.trim().to_string()
}

fn read_choice() -> String {
    prompt("Enter choice")
}

/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        match prompt("Back to Main Menu (Y/N)").to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn init_logging(config: &Config) {
    // RUST_LOG wins over the configured default.
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(&config.log_filter)
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();
}

/// Reads and normalizes the configured data file, prints the load counts and
/// replaces the dataset held in `APP_STATE`. On failure the previous dataset is kept.
fn handle_load(config: &Config) {
    match loader::load_records(&config.data_path) {
        Ok((data, report)) => {
            println!(
                "Processing dataset... ({} rows received, {} kept)",
                util::format_int(report.total_rows),
                util::format_int(report.kept_rows)
            );
            if report.dropped_rows > 0 {
                println!(
                    "Note: {} rows skipped for a missing or invalid row number.",
                    util::format_int(report.dropped_rows)
                );
            }
            println!();
            state().data = Some(data);
        }
        Err(e) => {
            eprintln!("Failed to load {}: {}\n", config.data_path.display(), e);
        }
    }
}

/// Blank keeps the current value, `*` clears it.
fn ask_filter(label: &str, options: &[String], current: Option<&str>) -> Option<String> {
    println!("{} options: {}", label, options.join(", "));
    let answer = prompt(&format!(
        "{} [{}] (blank = keep, * = all)",
        label,
        current.unwrap_or("all")
    ));
    if answer.is_empty() {
        current.map(String::from)
    } else if answer == "*" {
        None
    } else {
        Some(answer)
    }
}

/// Prompts for each filter dimension and stores the result in `APP_STATE`.
fn handle_filters() {
    let Some((data, current)) = snapshot() else {
        return;
    };
    let options = FilterOptions::from_records(&data);
    let years: Vec<String> = options.years.iter().map(|y| y.to_string()).collect();
    let months: Vec<String> = expense_dashboard::month::MONTH_NAMES
        .iter()
        .map(|m| m.to_string())
        .collect();

    let mut filters = FilterSet::new();
    filters.category = ask_filter("Category", &options.categories, current.category.as_deref());
    filters.city = ask_filter("City", &options.cities, current.city.as_deref());
    let current_year = current.year.map(|y| y.to_string());
    filters.year = ask_filter("Year", &years, current_year.as_deref()).and_then(|y| {
        let parsed = y.parse::<i32>().ok();
        if parsed.is_none() {
            println!("Ignoring invalid year '{}'.", y);
        }
        parsed
    });
    filters.month = ask_filter("Month", &months, current.month.as_deref());

    let matched = apply_filters(&data, &filters).len();
    println!(
        "Active filters: {} ({} records)\n",
        filters.describe(),
        util::format_int(matched)
    );
    state().filters = filters;
}

fn export<T: serde::Serialize>(config: &Config, file: &str, rows: &[T]) {
    if let Err(e) = output::write_csv(&config.output_path(file), rows) {
        eprintln!("Write error: {}", e);
    }
}

/// Prints the dashboard for the active filters and writes `trend_rankings.csv`,
/// `top_broad_subcategories.csv`, `monthly_trend.csv` and `summary.json` into the
/// output directory, overwriting earlier runs.
fn handle_generate_reports(config: &Config) {
    let Some((data, filters)) = snapshot() else {
        return;
    };
    let filtered = apply_filters(&data, &filters);
    let trend_view = apply_filters(&data, &filters.without_month());

    println!("Generating dashboard... (filters: {})", filters.describe());
    println!("Outputs saved to individual files...\n");

    let stats = compute_stats(&filtered);
    println!("Total amount: {}", util::format_currency(stats.total_amount));
    println!("Records: {}", util::format_int(stats.record_count));
    println!("Categories: {}\n", util::format_int(stats.unique_categories));

    let trends = compute_trend_rankings(&trend_view);
    let trend_rows = reports::trend_rows(&trends);
    export(config, "trend_rankings.csv", &trend_rows);
    match &trends {
        TrendOutcome::Ranked(r) => {
            let note = format!("{} vs {}", r.period2_label, r.period1_label);
            output::preview_table("Trend Rankings", Some(note.as_str()), &trend_rows, 2 * RANKING_SIZE);
        }
        TrendOutcome::InsufficientData => println!(
            "Trend Rankings\nInsufficient data to compute trends (at least 2 months are needed).\n"
        ),
    }

    // Always written, even when empty.
    let top = compute_top_category_totals(&filtered, config.top_n);
    let top_rows = reports::category_rows(&top);
    export(config, "top_broad_subcategories.csv", &top_rows);
    let monthly = compute_monthly_trend(&filtered);
    let monthly_rows = reports::monthly_rows(&monthly);
    export(config, "monthly_trend.csv", &monthly_rows);

    if filtered.is_empty() {
        println!("No records match the active filters.\n");
    } else {
        output::preview_table(
            &format!("Top {} Broad Subcategories by Amount", config.top_n),
            Some("Use option 4 to drill down"),
            &top_rows,
            config.top_n,
        );
        if monthly.iter().any(|b| b.total > 0.0) {
            output::preview_table("Monthly Expense Trend", None, &monthly_rows, 12);
        } else {
            println!("Monthly Expense Trend\nNo data to show the monthly trend.\n");
        }
    }

    let summary = reports::generate_summary(&stats, &trends, chrono::Local::now().to_rfc3339());
    if let Err(e) = output::write_json(&config.output_path("summary.json"), &summary) {
        eprintln!("Write error: {}", e);
    }
    println!("(Full tables exported to {})\n", config.output_dir.display());
}

fn print_breakdown(title: &str, breakdown: &Breakdown) {
    println!(
        "{} (total {})",
        title,
        util::format_currency(breakdown.total)
    );
    println!();
    if breakdown.is_empty() {
        println!("(no rows)\n");
        return;
    }
    output::preview_table_rows(&reports::breakdown_rows(breakdown), breakdown.buckets.len());
}

/// Interactive drill-down over the filtered records. Prints only; nothing is
/// written and the shared state is left untouched.
fn handle_drilldown(config: &Config) {
    let Some((data, filters)) = snapshot() else {
        return;
    };
    let filtered = apply_filters(&data, &filters);
    let top = compute_top_category_totals(&filtered, config.top_n);
    if top.is_empty() {
        println!("No broad subcategories to drill into.\n");
        return;
    }
    output::preview_table_rows(&reports::category_rows(&top), top.len());
    let Some(broad) = pick(&prompt("Broad subcategory rank (blank to cancel)"), &top) else {
        println!();
        return;
    };

    let mut session = DrilldownSession::open(broad);
    loop {
        match session.view(&filtered) {
            DrilldownView::Overview(breakdown) => {
                print_breakdown(&format!("Breakdown of {}", session.broad_subcategory()), &breakdown);
                let answer = prompt("Specific subcategory number (blank to close)");
                match pick(&answer, &breakdown.buckets) {
                    Some(specific) => {
                        session.select(specific);
                    }
                    None => break,
                }
            }
            DrilldownView::Detail {
                specific_subcategory,
                breakdown,
            } => {
                print_breakdown(
                    &format!(
                        "{} / {} by reference period",
                        session.broad_subcategory(),
                        specific_subcategory
                    ),
                    &breakdown,
                );
                match prompt("[B]ack or blank to close").to_uppercase().as_str() {
                    "B" => session.back(),
                    _ => break,
                }
            }
        }
    }
    println!();
}

// 1-based pick from a listed set of buckets.
fn pick(answer: &str, buckets: &[Bucket]) -> Option<String> {
    let n: usize = answer.parse().ok()?;
    buckets.get(n.checked_sub(1)?).map(|b| b.key.clone())
}

/// Searches every loaded record, ignoring the filters, and pages through the matches on stdout.
fn handle_search(config: &Config) {
    let Some((data, _)) = snapshot() else {
        return;
    };
    let term = prompt("Search all fields");
    let found = search(&data, &term);
    let mut page = 1;
    loop {
        let current = paginate(&found, page, config.page_size);
        output::preview_table_rows(&reports::record_rows(current.rows), config.page_size);
        if current.total_pages <= 1 {
            break;
        }
        println!("Page {} of {}", current.page, current.total_pages);
        match prompt("[N]ext, [P]revious or blank to stop").to_uppercase().as_str() {
            "N" => page = (current.page + 1).min(current.total_pages),
            "P" => page = current.page.saturating_sub(1).max(1),
            _ => break,
        }
    }
    println!();
}

fn main() {
    let config = Config::from_env();
    init_logging(&config);

    loop {
        println!("Expense Dashboard:");
        println!("[1] Load the data file");
        println!("[2] Set filters");
        println!("[3] Generate dashboard");
        println!("[4] Drill down");
        println!("[5] Search records\n");
        match read_choice().as_str() {
            "1" => handle_load(&config),
            "2" => handle_filters(),
            "3" => {
                println!();
                handle_generate_reports(&config);
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            "4" => handle_drilldown(&config),
            "5" => handle_search(&config),
            _ => println!("Invalid choice. Please enter 1 to 5.\n"),
        }
    }
}
