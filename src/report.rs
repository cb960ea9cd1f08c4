use chrono::NaiveDate;
use colored::*;
use std::collections::BTreeMap;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use crate::error::AppResult;
use crate::overtime::compute_ot;
use crate::schedule::{DayKind, day_kind};
use crate::store::DailyRecord;
use crate::timeutil::format_time;

pub const NO_TRIPS_PLACEHOLDER: &str = "No trips";

/// Sum of per-date OT over the whole snapshot.
pub fn monthly_total(records: &BTreeMap<NaiveDate, DailyRecord>) -> AppResult<f64> {
    let mut total = 0.0;
    for (date, record) in records {
        total += compute_ot(
            record.clock_in.as_deref(),
            record.clock_out.as_deref(),
            *date,
            &record.trips,
        )?;
    }
    Ok(total)
}

pub fn trips_cell(record: &DailyRecord) -> String {
    if record.trips.is_empty() {
        NO_TRIPS_PLACEHOLDER.to_string()
    } else {
        record
            .trips
            .iter()
            .map(|t| t.label.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

pub fn print_report(
    records: &BTreeMap<NaiveDate, DailyRecord>,
    month_key: &str,
    supervisor: &str,
) -> AppResult<()> {
    println!();
    println!(
        "{}",
        format!("OT REPORT - {month_key}").cyan().bold()
    );
    println!("Supervisor: {supervisor}");
    println!();

    if records.is_empty() {
        println!("{}", "No records for this month yet.".yellow());
        return Ok(());
    }

    print_daily_table(records)?;

    let total = monthly_total(records)?;
    println!();
    println!(
        "{}",
        format!("TOTAL OT THIS MONTH: {total:.2} h").cyan().bold()
    );
    Ok(())
}

fn print_daily_table(records: &BTreeMap<NaiveDate, DailyRecord>) -> AppResult<()> {
    #[derive(Tabled)]
    struct DayRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Trips")]
        trips: String,
        #[tabled(rename = "Clock-In")]
        clock_in: String,
        #[tabled(rename = "Clock-Out")]
        clock_out: String,
        #[tabled(rename = "OT Hours")]
        ot: String,
    }

    let mut rows = Vec::new();
    for (date, record) in records {
        let ot = compute_ot(
            record.clock_in.as_deref(),
            record.clock_out.as_deref(),
            *date,
            &record.trips,
        )?;

        let date_str = match day_kind(*date) {
            DayKind::Sunday => date.to_string().red().to_string(),
            DayKind::Saturday => date.to_string().yellow().to_string(),
            DayKind::Weekday => date.to_string(),
        };

        rows.push(DayRow {
            date: date_str,
            trips: trips_cell(record),
            clock_in: format_time(record.clock_in.as_deref()),
            clock_out: format_time(record.clock_out.as_deref()),
            ot: format!("{ot:.2}"),
        });
    }

    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..=4)).with(Alignment::center()))
        .to_string();

    println!("{table}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Trip, TripCategory};

    #[test]
    fn test_monthly_total_sums_per_date_ot() {
        let mut records: BTreeMap<NaiveDate, DailyRecord> = BTreeMap::new();
        // Monday with 2.5h, Sunday with 10h, cargo day with 0h
        records.insert(
            NaiveDate::from_ymd_opt(2025, 8, 4).unwrap(),
            DailyRecord {
                clock_in: Some("08:00".to_string()),
                clock_out: Some("19:30".to_string()),
                trips: vec![],
            },
        );
        records.insert(
            NaiveDate::from_ymd_opt(2025, 8, 10).unwrap(),
            DailyRecord {
                clock_in: Some("08:00".to_string()),
                clock_out: Some("18:00".to_string()),
                trips: vec![],
            },
        );
        records.insert(
            NaiveDate::from_ymd_opt(2025, 8, 11).unwrap(),
            DailyRecord {
                clock_in: Some("08:00".to_string()),
                clock_out: Some("23:00".to_string()),
                trips: vec![Trip {
                    label: "KLIA Cargo (AWB-1)".to_string(),
                    category: TripCategory::Cargo,
                }],
            },
        );

        assert_eq!(monthly_total(&records).unwrap(), 12.5);
    }

    #[test]
    fn test_trips_cell() {
        let empty = DailyRecord::default();
        assert_eq!(trips_cell(&empty), NO_TRIPS_PLACEHOLDER);

        let record = DailyRecord {
            trips: vec![
                Trip {
                    label: "MBG 163".to_string(),
                    category: TripCategory::Regular,
                },
                Trip {
                    label: "MBG Ampang".to_string(),
                    category: TripCategory::Regular,
                },
            ],
            ..Default::default()
        };
        assert_eq!(trips_cell(&record), "MBG 163, MBG Ampang");
    }
}
