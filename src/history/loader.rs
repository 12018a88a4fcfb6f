//! Load historical series from CSV
//!
//! Expected columns: `value` and, optionally, `date` (`YYYY-MM-DD`).
//! Other columns are ignored. Blank or non-numeric values are rejected rather
//! than skipped, since calibration requires a gap-free series.

use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::Reader;

use super::HistoricalSeries;
use crate::error::{EsgError, EsgResult};

/// Raw CSV row
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(default)]
    date: Option<String>,
    value: String,
}

/// Load a series from a CSV file
pub fn load_series<P: AsRef<Path>>(path: P, dt: f64) -> EsgResult<HistoricalSeries> {
    let reader = Reader::from_path(path.as_ref())?;
    let series = read_rows(reader, dt)?;
    log::info!(
        "Loaded {} observations from {}",
        series.len(),
        path.as_ref().display()
    );
    Ok(series)
}

/// Load a series from any reader (e.g. string buffer)
pub fn load_series_from_reader<R: Read>(reader: R, dt: f64) -> EsgResult<HistoricalSeries> {
    read_rows(Reader::from_reader(reader), dt)
}

fn read_rows<R: Read>(mut reader: Reader<R>, dt: f64) -> EsgResult<HistoricalSeries> {
    let mut values = Vec::new();
    let mut dates = Vec::new();
    let mut dated_rows = 0usize;

    for (i, result) in reader.deserialize().enumerate() {
        let row: CsvRow = result?;
        let line = i + 2; // header is line 1

        let raw = row.value.trim();
        let value: f64 = raw.parse().map_err(|_| {
            EsgError::invalid(format!("line {}", line), format!("non-numeric value '{}'", raw))
        })?;
        if !value.is_finite() {
            return Err(EsgError::invalid(format!("line {}", line), format!("non-finite value '{}'", raw)));
        }
        values.push(value);

        if let Some(date) = row.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|e| {
                EsgError::invalid(format!("line {}", line), format!("bad date '{}': {}", date, e))
            })?;
            dates.push(parsed);
            dated_rows += 1;
        }
    }

    if dated_rows == 0 {
        Ok(HistoricalSeries::new(values, dt))
    } else if dated_rows == values.len() {
        HistoricalSeries::with_dates(values, dates, dt)
    } else {
        Err(EsgError::invalid(
            "date",
            format!("{} of {} rows carry a date; use all or none", dated_rows, values.len()),
        ))
    }
}
