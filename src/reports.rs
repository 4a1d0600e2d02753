use crate::types::{
    BestSeller, DashboardStatistics, PlanAggregate, PlanRow, RankedVendor, Tally, UpgradeRecord,
    VendorAggregate, VendorBarRow,
};
use crate::util::{format_currency, format_number, DisplayLocale};
use clap::ValueEnum;
use std::cmp::Ordering;

/// Placeholder name shown when there is no vendor at all.
pub const NO_VENDOR: &str = "—";

/// Size of the leaderboard.
pub const TOP_N: usize = 3;

const BAR_WIDTH: usize = 30;

pub const DEFAULT_PAGE_SIZE: usize = 10;

fn diff_of(r: &UpgradeRecord) -> f64 {
    if r.diff.is_finite() {
        r.diff
    } else {
        0.0
    }
}

/// Build the statistics snapshot for one parsed dataset.
pub fn aggregate(records: &[UpgradeRecord]) -> DashboardStatistics {
    let total_records = records.len();
    // `Sum for f64` starts from -0.0; an empty dataset must total +0.0.
    let total_value = records.iter().map(diff_of).fold(0.0, |acc, d| acc + d);

    let mut vendor_data: VendorAggregate = Tally::new();
    let mut plan_data: PlanAggregate = Tally::new();
    for r in records {
        vendor_data.add(&r.vendor, diff_of(r));
        plan_data.add(&r.plan, 1);
    }

    let ranked = rank_vendors(&vendor_data);
    let best_seller = match ranked.first() {
        Some((name, value)) => BestSeller {
            name: name.clone(),
            value: *value,
        },
        None => BestSeller {
            name: NO_VENDOR.to_string(),
            value: 0.0,
        },
    };

    let max_value = leader_value(&ranked);
    let top3_vendors = ranked
        .into_iter()
        .take(TOP_N)
        .map(|(name, value)| RankedVendor {
            name,
            value,
            percentage: (value / max_value) * 100.0,
        })
        .collect();

    DashboardStatistics {
        total_records,
        total_value,
        best_seller,
        top3_vendors,
        vendor_data,
        plan_data,
    }
}

/// Vendors by total, largest first. Ties keep the order vendors first appeared.
pub fn rank_vendors(vendor_data: &VendorAggregate) -> Vec<(String, f64)> {
    vendor_data.ranked()
}

// The top value normalizes every percentage; an empty or zero leader falls
// back to 1 so nothing divides by zero.
fn leader_value(ranked: &[(String, f64)]) -> f64 {
    match ranked.first() {
        Some((_, v)) if *v != 0.0 => *v,
        _ => 1.0,
    }
}

/// Text bar of `fraction` (0..=1) of the full width.
pub fn bar(fraction: f64, width: usize) -> String {
    let fraction = if fraction.is_finite() {
        fraction.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let filled = (fraction * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Every vendor with its total and a bar scaled to the leader.
pub fn vendor_chart(stats: &DashboardStatistics, locale: DisplayLocale) -> Vec<VendorBarRow> {
    let ranked = rank_vendors(&stats.vendor_data);
    let max_value = leader_value(&ranked);
    ranked
        .into_iter()
        .map(|(vendor, value)| VendorBarRow {
            vendor,
            total: format_currency(value, locale),
            bar: bar(value / max_value, BAR_WIDTH),
        })
        .collect()
}

/// Record count per plan and its share of all records, in first-seen order.
pub fn plan_distribution(stats: &DashboardStatistics, locale: DisplayLocale) -> Vec<PlanRow> {
    let total = stats.total_records.max(1) as f64;
    stats
        .plan_data
        .iter()
        .map(|(plan, count)| PlanRow {
            plan: plan.to_string(),
            records: count,
            share: format_number(count as f64 / total * 100.0, 1, locale),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SortField {
    Period,
    Client,
    Vendor,
    Process,
    Plan,
    #[default]
    Diff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Search, sort and page settings for browsing records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordQuery {
    pub search: String,
    pub sort: SortField,
    pub direction: SortDirection,
    /// 1-based.
    pub page: usize,
    pub page_size: usize,
}

impl Default for RecordQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            sort: SortField::default(),
            direction: SortDirection::default(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl RecordQuery {
    /// Sorting on the current field flips direction; a new field starts descending.
    pub fn toggle_sort(&mut self, field: SortField) {
        if self.sort == field {
            self.direction = self.direction.flipped();
        } else {
            self.sort = field;
            self.direction = SortDirection::Desc;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordPage {
    pub rows: Vec<UpgradeRecord>,
    /// The page actually shown, after clamping.
    pub page: usize,
    pub total_pages: usize,
    pub total_matches: usize,
}

fn matches_search(r: &UpgradeRecord, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    [
        r.period.as_str(),
        r.client.as_str(),
        r.vendor.as_str(),
        r.process.as_str(),
        r.plan.as_str(),
        r.raw_diff.as_str(),
    ]
    .iter()
    .any(|v| v.to_lowercase().contains(needle))
        || r.diff.to_string().contains(needle)
}

fn cmp_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

fn compare(a: &UpgradeRecord, b: &UpgradeRecord, field: SortField) -> Ordering {
    match field {
        SortField::Period => cmp_text(&a.period, &b.period),
        SortField::Client => cmp_text(&a.client, &b.client),
        SortField::Vendor => cmp_text(&a.vendor, &b.vendor),
        SortField::Process => cmp_text(&a.process, &b.process),
        SortField::Plan => cmp_text(&a.plan, &b.plan),
        SortField::Diff => a.diff.partial_cmp(&b.diff).unwrap_or(Ordering::Equal),
    }
}

/// Filter, sort and slice records for the table view.
pub fn query_records(records: &[UpgradeRecord], query: &RecordQuery) -> RecordPage {
    let needle = query.search.trim().to_lowercase();
    let mut matched: Vec<&UpgradeRecord> = records
        .iter()
        .filter(|r| matches_search(r, &needle))
        .collect();
    matched.sort_by(|a, b| {
        let ord = compare(a, b, query.sort);
        match query.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });

    let page_size = query.page_size.max(1);
    let total_matches = matched.len();
    let total_pages = total_matches.div_ceil(page_size);
    let page = query.page.clamp(1, total_pages.max(1));
    let rows = matched
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .cloned()
        .collect();

    RecordPage {
        rows,
        page,
        total_pages,
        total_matches,
    }
}
