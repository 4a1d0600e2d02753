// Entry point and high-level CLI flow.
//
// - [1] reads the export, parses it and builds the statistics.
// - [2] re-runs the pipeline on the text of the last successful load.
// - [3] prints the dashboard, [4] pages through the records.
// - [5] writes the records, the leaderboard and a JSON summary to disk.
use clap::{Parser, ValueEnum};
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;
use upgrade_report::args::Args;
use upgrade_report::loader::{parse_with_report, read_text};
use upgrade_report::reports::{aggregate, query_records, RecordQuery, SortField};
use upgrade_report::util::{format_int, DisplayLocale};
use upgrade_report::{output, DashboardStatistics, Result, UpgradeRecord};

/// What the session currently has loaded. Every load replaces all of it.
#[derive(Default)]
struct AppState {
    last_text: Option<String>,
    records: Vec<UpgradeRecord>,
    stats: Option<DashboardStatistics>,
}

impl AppState {
    /// Parse and aggregate `text`, replacing the current dataset.
    fn ingest(&mut self, text: String) -> usize {
        let (records, report) = parse_with_report(&text);
        if report.unparseable_diffs > 0 {
            info!(
                count = report.unparseable_diffs,
                "diff values that could not be read were counted as 0"
            );
        }
        debug!(
            skipped = report.blank_lines + report.empty_rows + report.blank_identity_rows,
            "lines without a record"
        );
        self.stats = Some(aggregate(&records));
        self.records = records;
        self.last_text = Some(text);
        info!(records = self.records.len(), "dataset loaded");
        self.records.len()
    }
}

/// Print `prompt` and read one trimmed line from stdin. `None` at end of input.
fn read_line(prompt: &str) -> Option<String> {
    print!("{prompt}");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

fn handle_load(state: &mut AppState, args: &Args) {
    println!("Reading file...");
    match read_text(args.file()) {
        Ok(text) => {
            let n = state.ingest(text);
            println!("File loaded: {} records\n", format_int(n, args.locale()));
        }
        Err(e) => {
            error!("{e}");
            println!("Error reading the file: {e}\n");
        }
    }
}

fn handle_reload(state: &mut AppState, args: &Args) {
    let Some(text) = state.last_text.take() else {
        println!("No file loaded yet.\n");
        return;
    };
    let n = state.ingest(text);
    println!("Reloaded: {} records\n", format_int(n, args.locale()));
}

fn handle_dashboard(state: &AppState, locale: DisplayLocale) {
    match &state.stats {
        Some(stats) => output::print_dashboard(stats, locale),
        None => println!("No file loaded. Upload a file first (option 1).\n"),
    }
}

fn handle_browse(state: &AppState, args: &Args) {
    if state.stats.is_none() {
        println!("No file loaded. Upload a file first (option 1).\n");
        return;
    }
    let mut query = RecordQuery {
        page_size: args.page_size(),
        ..Default::default()
    };
    loop {
        let page = query_records(&state.records, &query);
        query.page = page.page;
        output::print_record_page(&page, args.locale());
        println!("[n] next  [p] previous  [s <text>] search  [o <field>] sort  [q] back");
        let Some(input) = read_line("Enter choice: ") else {
            break;
        };
        let (cmd, rest) = input.split_once(' ').unwrap_or((input.as_str(), ""));
        match cmd {
            "n" => query.page = (page.page + 1).min(page.total_pages.max(1)),
            "p" => query.page = page.page.saturating_sub(1).max(1),
            "s" => {
                query.search = rest.trim().to_string();
                query.page = 1;
            }
            "o" => match SortField::from_str(rest.trim(), true) {
                Ok(field) => query.toggle_sort(field),
                Err(_) => println!(
                    "Unknown field. Use period, client, vendor, process, plan or diff.\n"
                ),
            },
            "q" => break,
            _ => println!("Invalid choice.\n"),
        }
    }
}

fn export_reports(state: &AppState, out_dir: &Path) -> Result<()> {
    let Some(stats) = &state.stats else {
        println!("No file loaded. Upload a file first (option 1).\n");
        return Ok(());
    };
    std::fs::create_dir_all(out_dir)?;
    let records_file = out_dir.join("upgrades_clean.csv");
    output::write_csv(&records_file, &state.records)?;
    let top_file = out_dir.join("top_vendors.csv");
    output::write_csv(&top_file, &stats.top3_vendors)?;
    let summary_file = out_dir.join("summary.json");
    output::write_json(&summary_file, stats)?;
    println!(
        "Reports exported to {}, {} and {}\n",
        records_file.display(),
        top_file.display(),
        summary_file.display()
    );
    Ok(())
}

fn handle_export(state: &AppState, args: &Args) {
    if let Err(e) = export_reports(state, args.out_dir()) {
        error!("{e}");
        println!("Write error: {e}\n");
    }
}

fn run_once(args: &Args) -> Result<()> {
    let mut state = AppState::default();
    let text = read_text(args.file())?;
    let n = state.ingest(text);
    println!("File loaded: {} records\n", format_int(n, args.locale()));
    handle_dashboard(&state, args.locale());
    if args.export() {
        export_reports(&state, args.out_dir())?;
    }
    Ok(())
}

fn run_menu(args: &Args) {
    let mut state = AppState::default();
    loop {
        println!("Upgrade Dashboard");
        println!("[1] Load the file");
        println!("[2] Reload last file");
        println!("[3] Show dashboard");
        println!("[4] Browse records");
        println!("[5] Export reports");
        println!("[0] Exit\n");
        let Some(choice) = read_line("Enter choice: ") else {
            break;
        };
        match choice.as_str() {
            "1" => handle_load(&mut state, args),
            "2" => handle_reload(&mut state, args),
            "3" => handle_dashboard(&state, args.locale()),
            "4" => handle_browse(&state, args),
            "5" => handle_export(&state, args),
            "0" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter a number from 0 to 5.\n"),
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logger(args.log_level());
    debug!("{args:?}");

    if args.interactive() {
        run_menu(&args);
        return ExitCode::SUCCESS;
    }
    match run_once(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initializes the tracing subscriber. `RUST_LOG` wins over `--log-level`.
fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => EnvFilter::from_default_env(),
        None => EnvFilter::new(format!("upgrade_report={level}")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
