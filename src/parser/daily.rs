//! Daily forecast: date header row plus four column scans of the weather table.
//!
//! Only the first date label is parsed. Every later column is the previous
//! date plus one day, because the labels become ambiguous around month and
//! year boundaries.

use chrono::{Days, NaiveDate};
use chrono_tz::Tz;
use scraper::{ElementRef, Html};

use super::{find_first, local_datetime, parse_int_with_suffix, selector, text_of};
use crate::types::{DailyEntry, StructuralError};

const DATE_ROW: &str = "table#daterow";
const WEATHER_TABLE: &str = "table#weather";
const MAX_TEMPERATURE_ROW: &str = "tr.Maximum.Temperature";
const MIN_TEMPERATURE_ROW: &str = "tr.Minimum.Temperature";
const SUN_ROW: &str = "tr#sun_teaser";
const PRECIPITATION_ROW: &str = "tr#precipitation_teaser";

const DEGREE: &str = "°";
const HOURS_UNIT: &str = "Std.";
const PERCENT: &str = "%";

pub fn parse(document: &Html, tz: Tz, year: i32) -> Result<Vec<DailyEntry>, StructuralError> {
    let root = document.root_element();

    let date_row = find_first(root, DATE_ROW)?;
    let headers: Vec<_> = date_row.select(&selector("th")).collect();
    let first = headers.first().ok_or_else(|| StructuralError::MissingNode {
        selector: format!("{DATE_ROW} th"),
    })?;
    let first_day = parse_date_label(&text_of(find_first(*first, "span")?), year)?;
    let dates = (0..headers.len() as u64)
        .map(|offset| {
            let date = first_day.checked_add_days(Days::new(offset)).ok_or_else(|| {
                StructuralError::NonexistentLocalTime(format!("{first_day} + {offset} days"))
            })?;
            local_datetime(tz, date, 0)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let table = find_first(root, WEATHER_TABLE)?;
    let max_temperatures = scan_temperatures(table, MAX_TEMPERATURE_ROW, "maxTemperature")?;
    let min_temperatures = scan_temperatures(table, MIN_TEMPERATURE_ROW, "minTemperature")?;
    let sun_hours = scan_teaser(table, SUN_ROW, "sunHours", HOURS_UNIT)?;
    let precipitation = scan_teaser(table, PRECIPITATION_ROW, "precipitationProbability", PERCENT)?;

    for (row, found) in [
        (MAX_TEMPERATURE_ROW, max_temperatures.len()),
        (MIN_TEMPERATURE_ROW, min_temperatures.len()),
        (SUN_ROW, sun_hours.len()),
        (PRECIPITATION_ROW, precipitation.len()),
    ] {
        if found != dates.len() {
            return Err(StructuralError::ColumnCountMismatch {
                row,
                expected: dates.len(),
                found,
            });
        }
    }

    Ok(dates
        .into_iter()
        .enumerate()
        .map(|(i, datetime)| DailyEntry {
            datetime,
            max_temperature: max_temperatures[i],
            min_temperature: min_temperatures[i],
            sun_hours: sun_hours[i],
            precipitation_probability: precipitation[i],
        })
        .collect())
}

/// `"Mo, 5.6."` in `year` → 5 June. The weekday part is optional.
pub fn parse_date_label(label: &str, year: i32) -> Result<NaiveDate, StructuralError> {
    let day_month = match label.split_once(',') {
        Some((_, rest)) => rest,
        None => label,
    }
    .trim()
    .trim_end_matches('.');

    NaiveDate::parse_from_str(&format!("{day_month}.{year}"), "%d.%m.%Y").map_err(|_| {
        StructuralError::InvalidDateLabel {
            label: label.to_string(),
        }
    })
}

/// Temperature cells: the second `<span>` of each `<div>` holds `23°`.
fn scan_temperatures(
    table: ElementRef<'_>,
    row: &'static str,
    field: &'static str,
) -> Result<Vec<i32>, StructuralError> {
    let span = selector("span");
    find_first(table, row)?
        .select(&selector("div"))
        .map(|cell| {
            let value = cell.select(&span).nth(1).ok_or_else(|| StructuralError::MissingNode {
                selector: format!("{row} div span:nth-of-type(2)"),
            })?;
            parse_int_with_suffix(field, &text_of(value), DEGREE)
        })
        .collect()
}

/// Teaser cells: one `<span>` per day with a unit suffix.
fn scan_teaser(
    table: ElementRef<'_>,
    row: &'static str,
    field: &'static str,
    suffix: &str,
) -> Result<Vec<i32>, StructuralError> {
    find_first(table, row)?
        .select(&selector("span"))
        .map(|cell| parse_int_with_suffix(field, &text_of(cell), suffix))
        .collect()
}
