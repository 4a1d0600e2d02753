use crate::error::{AppError, Result};
use crate::reports::{bar, plan_distribution, vendor_chart, RecordPage};
use crate::types::{DashboardStatistics, LeaderboardRow, RankedVendor, RecordRow, UpgradeRecord};
use crate::util::{format_currency, format_int, DisplayLocale};
use serde::Serialize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};
use tracing::info;

const MEDALS: [&str; 3] = ["🥇", "🥈", "🥉"];
const LEADERBOARD_BAR: usize = 20;

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    info!(path = %path.display(), rows = rows.len(), "wrote csv");
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s).map_err(|source| AppError::FileWrite {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "wrote json");
    Ok(())
}

/// Markdown table of `rows`, or a placeholder when there are none.
pub fn render_table<T: Tabled>(rows: Vec<T>) -> String {
    if rows.is_empty() {
        return "(no data)".to_string();
    }
    Table::new(rows).with(Style::markdown()).to_string()
}

pub fn record_rows(records: &[UpgradeRecord], locale: DisplayLocale) -> Vec<RecordRow> {
    records
        .iter()
        .map(|r| RecordRow {
            period: r.period.clone(),
            client: r.client.clone(),
            vendor: r.vendor.clone(),
            process: r.process.clone(),
            plan: r.plan.clone(),
            diff: format_currency(r.diff, locale),
        })
        .collect()
}

pub fn leaderboard_rows(vendors: &[RankedVendor], locale: DisplayLocale) -> Vec<LeaderboardRow> {
    vendors
        .iter()
        .zip(MEDALS)
        .map(|(v, medal)| LeaderboardRow {
            medal: medal.to_string(),
            vendor: v.name.clone(),
            total: format_currency(v.value, locale),
            bar: bar(v.percentage / 100.0, LEADERBOARD_BAR),
        })
        .collect()
}

/// The three summary cards: record count, total value and best seller.
pub fn render_summary(stats: &DashboardStatistics, locale: DisplayLocale) -> String {
    format!(
        "Total records:      {}\nTotal upgrade value: {}\nBest seller:        {} ({})",
        format_int(stats.total_records, locale),
        format_currency(stats.total_value, locale),
        stats.best_seller.name,
        format_currency(stats.best_seller.value, locale)
    )
}

pub fn print_dashboard(stats: &DashboardStatistics, locale: DisplayLocale) {
    println!("{}\n", render_summary(stats, locale));

    println!("Top 3 Vendors\n");
    println!("{}\n", render_table(leaderboard_rows(&stats.top3_vendors, locale)));

    println!("Total by Vendor\n");
    println!("{}\n", render_table(vendor_chart(stats, locale)));

    println!("Upgrades by Plan\n");
    println!("{}\n", render_table(plan_distribution(stats, locale)));
}

pub fn print_record_page(page: &RecordPage, locale: DisplayLocale) {
    println!("{}", render_table(record_rows(&page.rows, locale)));
    println!(
        "Page {} of {} ({} matching records)\n",
        page.page,
        page.total_pages.max(1),
        format_int(page.total_matches, locale)
    );
}
