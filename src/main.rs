mod catalog;
mod config;
mod error;
mod overtime;
mod pdf;
mod report;
mod schedule;
mod session;
mod storage;
mod store;
mod timeutil;

use chrono::{Datelike, Local, NaiveDate};
use clap::{Parser, Subcommand};
use colored::*;
use std::sync::Arc;

use error::{AppError, AppResult};
use session::Session;
use storage::{FileStorage, KvStorage};

#[derive(Parser)]
#[command(name = "otborang")]
#[command(about = "Overtime tracking form for delivery work")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record or overwrite a day's clock-in/clock-out times
    Clock {
        /// Date (YYYY-MM-DD)
        date: String,
        #[arg(long = "in", value_name = "HH:MM")]
        clock_in: Option<String>,
        #[arg(long = "out", value_name = "HH:MM")]
        clock_out: Option<String>,
    },
    /// Append a delivery trip to a day's record
    Trip {
        /// Date (YYYY-MM-DD)
        date: String,
        destination: String,
        /// Airway bill, used for KLIA Cargo runs
        #[arg(long)]
        awb: Option<String>,
    },
    /// Delete a day's record entirely
    Delete {
        /// Date (YYYY-MM-DD)
        date: String,
    },
    /// Print the monthly report
    Report {
        /// Month to show (YYYY-MM, default: current)
        #[arg(long)]
        month: Option<String>,
    },
    /// Export the monthly report as an A4 PDF
    Pdf {
        /// Month to export (YYYY-MM, default: current)
        #[arg(long)]
        month: Option<String>,
    },
    /// List known destinations, or add a new one
    Destinations {
        #[arg(long, value_name = "NAME")]
        add: Option<String>,
    },
    /// Show or set the supervisor name printed on the form
    Supervisor { name: Option<String> },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "[ERROR]".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> AppResult<()> {
    let storage: Arc<dyn KvStorage> = Arc::new(FileStorage::new()?);

    match cli.command {
        Commands::Clock {
            date,
            clock_in,
            clock_out,
        } => {
            let date = parse_date(&date)?;
            let session = Session::open(storage, date)?;
            let _autosave = session.start_autosave(session::AUTOSAVE_INTERVAL);
            session.upsert_clock(date, clock_in.as_deref(), clock_out.as_deref())?;
            println!(
                "Clock times for {} saved ({} - {}).",
                date,
                timeutil::format_time(clock_in.as_deref()),
                timeutil::format_time(clock_out.as_deref())
            );
        }
        Commands::Trip {
            date,
            destination,
            awb,
        } => {
            let date = parse_date(&date)?;
            let session = Session::open(storage, date)?;
            let _autosave = session.start_autosave(session::AUTOSAVE_INTERVAL);
            session.add_trip(date, &destination, awb.as_deref())?;
            println!("Trip to {} added for {}.", destination, date);
        }
        Commands::Delete { date } => {
            let date = parse_date(&date)?;
            let session = Session::open(storage, date)?;
            let _autosave = session.start_autosave(session::AUTOSAVE_INTERVAL);
            if session.delete_record(date)? {
                println!("Record for {} deleted.", date);
            } else {
                println!("No record for {}.", date);
            }
        }
        Commands::Report { month } => {
            let month = parse_month(month.as_deref())?;
            let session = Session::open(storage, month)?;
            report::print_report(
                &session.snapshot(),
                &session.month_key(),
                &session.supervisor_name(),
            )?;
        }
        Commands::Pdf { month } => {
            let month = parse_month(month.as_deref())?;
            let session = Session::open(storage, month)?;
            let config = config::load_config();
            let path = pdf::generate_pdf(
                &session.snapshot(),
                &config,
                &session.month_key(),
                &session.supervisor_name(),
            )?;
            println!("PDF written to {}", path.display());
        }
        Commands::Destinations { add } => {
            let today = Local::now().date_naive();
            let mut session = Session::open(storage, today)?;
            match add {
                Some(name) => {
                    session.add_destination(&name)?;
                    println!("New destination \"{}\" added.", name.trim());
                }
                None => {
                    for name in session.catalog().list() {
                        println!("{name}");
                    }
                }
            }
        }
        Commands::Supervisor { name } => {
            let today = Local::now().date_naive();
            let session = Session::open(storage, today)?;
            match name {
                Some(name) => {
                    session.set_supervisor_name(&name)?;
                    println!("Supervisor set to {}.", name.trim());
                }
                None => println!("{}", session.supervisor_name()),
            }
        }
    }

    Ok(())
}

fn parse_date(s: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| AppError::InvalidDate(s.to_string()))
}

/// "YYYY-MM" to the first day of that month; default is the current one.
fn parse_month(s: Option<&str>) -> AppResult<NaiveDate> {
    match s {
        None => {
            let today = Local::now().date_naive();
            Ok(today.with_day(1).unwrap_or(today))
        }
        Some(s) => NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d")
            .map_err(|_| AppError::InvalidDate(s.to_string())),
    }
}
