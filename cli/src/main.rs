mod config;
mod dashboard;
mod logging;
mod table;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use config::Config;
use fleetdash_core::{
    apply_view, build_query, entity_report, expand_search_fields, parse_args, profile_report, to_csv, to_json,
    DashboardUseCase, FileFleetSource, Identified, Report, Searchable, SortStrategy, Tabular,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "fleetdash")]
#[command(about = "Fleet statistics, listings and exports", long_about = None)]
struct Cli {
    /// Directory holding vehicles.json, maintenances.json and users.json
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Config file (default: ~/.config/fleetdash/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Args)]
struct ViewArgs {
    /// Search terms and field filters (usage: vehicles toyota stat:disponible ty:voiture)
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,

    /// insertion, newest, oldest, cost-asc, cost-desc, mileage-asc, mileage-desc, name
    #[arg(long, default_value = "insertion")]
    sort: SortStrategy,

    /// Fields scanned by the search terms, comma separated (default: the record's text fields)
    #[arg(long = "search-in", value_delimiter = ',')]
    search_in: Vec<String>,

    /// Write the listing to a file (.json or .csv)
    #[arg(long)]
    export: Option<PathBuf>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Print the fleet summary tables
    Stats {
        /// Write the summary to a file (.json or .csv)
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Open the terminal dashboard
    Dashboard,
    /// List vehicles
    Vehicles(ViewArgs),
    /// List maintenance records
    Maintenances(ViewArgs),
    /// List users
    Users(ViewArgs),
    /// Cost profile of one vehicle, by id or plate
    Profile {
        vehicle: String,
    },
    /// Report records with missing or malformed required fields
    Check,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    logging::init_logging(config.log_level.as_deref());

    let source = FileFleetSource::new(cli.data_dir.clone().or_else(|| config.data_dir.clone()))?;
    info!(data_dir = %source.data_dir().display(), "using fleet data");
    let usecase = DashboardUseCase::new(&source);

    match cli.command {
        Some(Commands::Stats { export }) => {
            let report = usecase.get_summary_report(Utc::now())?;
            output(&report, export.as_deref(), &config)?;
        }
        Some(Commands::Vehicles(view)) => {
            let snapshot = usecase.snapshot()?;
            list("Véhicules", &snapshot.vehicles, view, &config)?;
        }
        Some(Commands::Maintenances(view)) => {
            let snapshot = usecase.snapshot()?;
            list("Maintenances", &snapshot.maintenances, view, &config)?;
        }
        Some(Commands::Users(view)) => {
            let snapshot = usecase.snapshot()?;
            list("Utilisateurs", &snapshot.users, view, &config)?;
        }
        Some(Commands::Profile { vehicle }) => {
            let (vehicle, profile) = usecase.get_vehicle_profile(&vehicle)?;
            table::print_report(&profile_report(&vehicle.display_name(), &profile));
        }
        Some(Commands::Check) => {
            let issues = usecase.snapshot()?.issues();
            if issues.is_empty() {
                println!("All records are valid.");
            } else {
                for issue in &issues {
                    println!("[{}] {}", issue.collection, issue.label);
                    for error in &issue.errors {
                        println!("  {}: {}", error.field, error.message);
                    }
                }
                println!("\n{} invalid record(s).", issues.len());
            }
        }
        Some(Commands::Dashboard) | None => {
            dashboard::run(usecase.get_summary(Utc::now())?)?;
        }
    }
    Ok(())
}

fn list<T>(title: &str, items: &[T], view: ViewArgs, config: &Config) -> Result<()>
where
    T: Searchable + Tabular + Clone,
{
    let mut query = build_query::<T>(parse_args(&view.args), view.sort)?;
    query.search_fields = expand_search_fields::<T>(&view.search_in)?;
    let selected: Vec<T> = apply_view(items, &query)?.into_iter().cloned().collect();
    if selected.is_empty() && view.export.is_none() {
        println!("No records found.");
        return Ok(());
    }
    output(&entity_report(title, &selected), view.export.as_deref(), config)
}

/// Prints the report, or writes it when an export file is given.
fn output(report: &Report, export: Option<&Path>, config: &Config) -> Result<()> {
    let Some(file) = export else {
        table::print_report(report);
        return Ok(());
    };

    let path = config.export_path(file);
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let content = if is_json { to_json(report)? } else { to_csv(report)? };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Could not create {}", parent.display()))?;
    }
    fs::write(&path, content).with_context(|| format!("Could not write {}", path.display()))?;
    println!("Exported to {}", path.display());
    Ok(())
}
