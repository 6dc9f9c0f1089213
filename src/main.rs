// Entry point and interactive menu.
//
// - Option [1] loads and validates a sales CSV.
// - Option [2] picks the branch to show ("All" or one branch).
// - Option [3] recomputes the whole dashboard from the loaded rows and the
//   current selection, prints the metric cards and writes the charts.
mod chart;
mod dashboard;
mod error;
mod loader;
mod metrics;
mod output;
mod trend;
mod types;
mod util;
mod variation;

use clap::Parser;
use error::{DashboardError, Result};
use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use types::{BranchFilter, SalesRecord};

#[derive(Parser, Debug)]
#[command(author, version, about = "Per-branch, per-product sales dashboard", long_about = None)]
struct Cli {
    /// Sales CSV to load at startup
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Initial branch selection ("All" shows every branch)
    #[arg(short, long, default_value = types::ALL_BRANCHES)]
    branch: String,

    /// Directory for trend charts and exported tables
    #[arg(short, long, default_value = "dashboard_output")]
    out_dir: PathBuf,

    /// Render the dashboard once and exit (requires --file)
    #[arg(long)]
    report: bool,

    /// Log progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

// Loaded rows and the branch selection survive between menu actions; every
// dashboard render recomputes from them.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState::default()));

#[derive(Default)]
struct AppState {
    source: Option<PathBuf>,
    data: Option<Vec<SalesRecord>>,
    branch: BranchFilter,
}

fn state() -> MutexGuard<'static, AppState> {
    // A poisoned lock only means an earlier action panicked mid-update;
    // the state itself is still usable.
    APP_STATE.lock().unwrap_or_else(|e| e.into_inner())
}

/// Print `label` and read one trimmed line. `None` once stdin is closed.
fn prompt(label: &str) -> Option<String> {
    print!("{}", label);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

/// Option [1]: load, validate and clean a CSV file.
///
/// A validation failure leaves any previously loaded data untouched.
fn handle_load(path: &Path) -> Result<()> {
    let (data, report) = loader::load_from_path(path)?;
    println!(
        "Loaded {} ({} rows read, {} kept)",
        path.display(),
        util::format_int(report.total_rows as i64),
        util::format_int(report.kept_rows as i64)
    );
    if report.dropped_rows > 0 {
        println!(
            "Note: {} rows skipped because year or month was not a valid number.",
            util::format_int(report.dropped_rows as i64)
        );
    }
    if report.bad_amounts > 0 {
        println!(
            "Note: {} rows skipped because units, revenue or cost was not numeric.",
            util::format_int(report.bad_amounts as i64)
        );
    }
    println!();

    let mut st = state();
    // A branch that no longer exists in the new file falls back to "All".
    let stale = matches!(&st.branch, BranchFilter::Only(name) if !data.iter().any(|r| &r.branch == name));
    if stale {
        warn!(branch = %st.branch, "selected branch not present in new file");
        st.branch = BranchFilter::All;
    }
    st.source = Some(path.to_path_buf());
    st.data = Some(data);
    Ok(())
}

/// Option [2]: choose a branch from "All" plus the branches in the file.
fn handle_select_branch() {
    let options = {
        let st = state();
        let Some(data) = st.data.as_ref() else {
            println!("Upload a CSV file to begin (option 1).\n");
            return;
        };
        loader::branch_options(data)
    };

    println!("Select branch:");
    for (idx, name) in options.iter().enumerate() {
        println!("[{}] {}", idx + 1, name);
    }
    let choice = prompt("Enter choice: ").unwrap_or_default();
    match choice.parse::<usize>().ok().and_then(|n| options.get(n.wrapping_sub(1))) {
        Some(name) => {
            let filter = BranchFilter::from_choice(name);
            println!("Branch set to {}\n", filter);
            state().branch = filter;
        }
        None => println!("Invalid choice. Branch unchanged.\n"),
    }
}

/// Option [3]: rebuild and show the dashboard for the current selection.
fn handle_show_dashboard(out_dir: &Path) -> Result<()> {
    let (data, branch) = {
        let st = state();
        (st.data.clone(), st.branch.clone())
    };
    let Some(data) = data else {
        println!("Upload a CSV file to begin (option 1).\n");
        return Ok(());
    };

    std::fs::create_dir_all(out_dir)?;
    let dash = dashboard::build_dashboard(&data, &branch);
    info!(branch = %branch, products = dash.products.len(), "dashboard built");
    output::print_dashboard(&dash, out_dir);

    let (csv_path, json_path) = output::export_dashboard(&dash, out_dir)?;
    println!(
        "(Metrics exported to {} and {})\n",
        csv_path.display(),
        json_path.display()
    );
    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn run_report(cli: &Cli) -> Result<()> {
    let path = cli
        .file
        .as_deref()
        .ok_or_else(|| DashboardError::Input("--report requires --file".to_string()))?;
    handle_load(path)?;
    handle_show_dashboard(&cli.out_dir)
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    state().branch = BranchFilter::from_choice(&cli.branch);

    if cli.report {
        if let Err(e) = run_report(&cli) {
            error!(error = %e, "report failed");
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
        return;
    }

    if let Some(path) = cli.file.as_deref() {
        if let Err(e) = handle_load(path) {
            eprintln!("Error: {}\n", e);
        }
    }

    loop {
        {
            let st = state();
            let source = st
                .source
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(none)".to_string());
            println!("File: {} | Branch: {}", source, st.branch);
        }
        println!("[1] Load a CSV file");
        println!("[2] Select branch");
        println!("[3] Show dashboard");
        println!("[4] Exit\n");
        let Some(choice) = prompt("Enter choice: ") else {
            break;
        };
        match choice.as_str() {
            "1" => {
                let path = prompt("CSV path: ").unwrap_or_default();
                if path.is_empty() {
                    println!("No path given.\n");
                    continue;
                }
                if let Err(e) = handle_load(Path::new(&path)) {
                    eprintln!("Error: {}\n", e);
                }
            }
            "2" => handle_select_branch(),
            "3" => {
                println!();
                if let Err(e) = handle_show_dashboard(&cli.out_dir) {
                    eprintln!("Error: {}\n", e);
                }
            }
            "4" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter 1, 2, 3 or 4.\n"),
        }
    }
}
