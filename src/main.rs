use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::Parser;
use rail_diagram::loader::{available_dates, daily_path, load_reference, load_routing, load_timetable};
use rail_diagram::projector::LineSelection;
use rail_diagram::{build_diagrams, BatchOptions, DataError, DiagramConfig};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// directory holding Route.json, SVG_Y_Axis.json, CarKind.json and optionally SVG_X_Axis.json
    #[arg(long, value_name = "DIR", default_value = "references")]
    reference: PathBuf,
    /// daily timetable file. takes precedence over --data/--date
    #[arg(long, value_name = "*.json")]
    timetable: Option<PathBuf>,
    /// directory of daily timetables named YYYYMMDD.json
    #[arg(long, value_name = "DIR", default_value = "data")]
    data: PathBuf,
    /// day to draw from --data, as YYYYMMDD. defaults to today
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,
    /// list the days available in --data and exit
    #[arg(long)]
    list_dates: bool,
    /// routing table JSON replacing the built-in network rules
    #[arg(long, value_name = "*.json")]
    routing: Option<PathBuf>,
    /// diagram configuration TOML file
    #[arg(long, value_name = "*.toml")]
    config: Option<PathBuf>,
    /// only draw this operational line, e.g. LINE_WN
    #[arg(long)]
    line: Option<String>,
    /// only draw this train
    #[arg(long)]
    train: Option<String>,
    /// pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
    /// debug logging unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y%m%d").map_err(|e| format!("expected YYYYMMDD: {e}"))
}

fn main() -> ExitCode {
    let args = CliArgs::parse();
    rail_diagram::logging::init(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn timetable_path(args: &CliArgs) -> PathBuf {
    if let Some(path) = &args.timetable {
        return path.clone();
    }
    let date = args.date.unwrap_or_else(|| chrono::Local::now().date_naive());
    daily_path(&args.data, date)
}

fn run(args: &CliArgs) -> Result<(), DataError> {
    if args.list_dates {
        let mut out = std::io::stdout().lock();
        for date in available_dates(&args.data)? {
            writeln!(out, "{}", date.format("%Y%m%d")).map_err(|source| DataError::Io {
                path: PathBuf::from("<stdout>"),
                source,
            })?;
        }
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => DiagramConfig::load(path)?,
        None => DiagramConfig::default(),
    };

    let mut reference = load_reference(&args.reference)?;
    if let Some(path) = &args.routing {
        reference.routing = load_routing(path)?;
    }

    let path = timetable_path(args);
    log::info!("Reading timetable {}", path.display());
    let timetable = load_timetable(&path)?;

    let options = BatchOptions {
        lines: args.line.clone().map_or(LineSelection::All, LineSelection::Only),
        train: args.train.clone(),
    };
    let batch = build_diagrams(&reference, &config, &timetable, &options);
    log::info!(
        "{} diagrams drawn, {} trains skipped",
        batch.diagrams.len(),
        batch.skipped.len()
    );

    let out = std::io::stdout().lock();
    if args.pretty {
        serde_json::to_writer_pretty(out, &batch)?;
    } else {
        serde_json::to_writer(out, &batch)?;
    }
    Ok(())
}
