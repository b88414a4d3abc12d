//! Hourly forecast: one object literal per script in the hourly container.

use chrono::{DateTime, Days, Duration, FixedOffset, NaiveDate};
use chrono_tz::Tz;
use scraper::Html;
use std::collections::BTreeMap;
use tracing::warn;

use super::{find_first, literal, local_datetime, selector, text_of};
use crate::conditions::reconcile;
use crate::types::{DayBucket, HourlyEntry, ScriptValue, StructuralError};

const CONTAINER: &str = "div#hourly-container";

/// Raw key → stored key. Applied per line, so `windDirection` moves to
/// `windDirectionLong` before the short sector takes its place.
const KEY_RENAMES: &[(&str, &str)] = &[
    ("windGusts", "windGustsBft"),
    ("windDirection", "windDirectionLong"),
    ("windDirectionShortSector", "windDirection"),
];

const DROPPED_KEYS: &[&str] = &["docrootVersion"];

/// Keys the typed entry owns; never carried as passthrough.
const RESERVED_KEYS: &[&str] = &["datetime", "condition"];

pub fn parse(document: &Html, tz: Tz, today: NaiveDate) -> Result<Vec<HourlyEntry>, StructuralError> {
    let container = find_first(document.root_element(), CONTAINER)?;
    let scripts: Vec<_> = container.select(&selector("script")).collect();
    if scripts.is_empty() {
        return Err(StructuralError::MissingNode {
            selector: format!("{CONTAINER} script"),
        });
    }

    let mut forecast = Vec::with_capacity(scripts.len());
    let mut previous: Option<DateTime<FixedOffset>> = None;

    for script in scripts {
        let source = text_of(script);
        let payload = literal::extract_payload(&source)?;
        let record = normalize(literal::parse_object(payload)?);
        let mut entry = build_entry(record, tz, today)?;

        if let Some(prev) = previous {
            let expected = (prev + Duration::hours(1)).with_timezone(&tz).fixed_offset();
            if entry.datetime != expected {
                warn!(
                    found = %entry.datetime,
                    expected = %expected,
                    "Hourly entry out of sequence, assuming expected hour"
                );
                entry.datetime = expected;
                let offset = (expected.date_naive() - today).num_days();
                if let Some(day) = DayBucket::from_offset(offset) {
                    entry.day = day;
                }
            }
        }
        previous = Some(entry.datetime);
        forecast.push(entry);
    }

    Ok(forecast)
}

/// Apply the key renames and drop housekeeping keys.
pub fn normalize(pairs: Vec<(String, ScriptValue)>) -> BTreeMap<String, ScriptValue> {
    let mut record = BTreeMap::new();
    for (key, value) in pairs {
        if DROPPED_KEYS.contains(&key.as_str()) {
            continue;
        }
        let key = KEY_RENAMES
            .iter()
            .find(|(raw, _)| *raw == key)
            .map(|(_, renamed)| renamed.to_string())
            .unwrap_or(key);
        record.insert(key, value);
    }
    record
}

/// Lift the typed fields out of a normalized record.
pub fn build_entry(
    mut record: BTreeMap<String, ScriptValue>,
    tz: Tz,
    today: NaiveDate,
) -> Result<HourlyEntry, StructuralError> {
    let synonym = take_text(&mut record, "daySynonym")?;
    let day = DayBucket::from_synonym(&synonym).ok_or(StructuralError::UnknownDaySynonym(synonym))?;

    let hour = match record.remove("hour") {
        Some(ScriptValue::Int(hour)) => hour,
        Some(other) => {
            return Err(StructuralError::WrongFieldType {
                field: "hour",
                expected: "integer",
                found: other.kind(),
            })
        }
        None => return Err(StructuralError::MissingField { field: "hour" }),
    };
    let hour = u32::try_from(hour)
        .ok()
        .filter(|h| *h < 24)
        .ok_or(StructuralError::InvalidHour(hour))?;

    let date = today
        .checked_add_days(Days::new(day.offset_days()))
        .ok_or_else(|| StructuralError::NonexistentLocalTime(format!("{today} + {day}")))?;
    let datetime = local_datetime(tz, date, hour)?;

    let temperature = take_number(&mut record, "temperature")?;
    let apparent_temperature = take_number(&mut record, "apparentTemperature")?;
    let humidity = take_number(&mut record, "humidity")?;
    let symbol = take_text(&mut record, "symbol")?;
    let symbol_text = take_text(&mut record, "symbolText")?;
    let condition = reconcile(&symbol, &symbol_text);

    for key in RESERVED_KEYS {
        record.remove(*key);
    }

    Ok(HourlyEntry {
        datetime,
        day,
        temperature,
        apparent_temperature,
        humidity,
        symbol,
        symbol_text,
        condition,
        extra: record,
    })
}

fn take_text(record: &mut BTreeMap<String, ScriptValue>, field: &'static str) -> Result<String, StructuralError> {
    match record.remove(field) {
        Some(ScriptValue::Text(text)) => Ok(text),
        Some(other) => Err(StructuralError::WrongFieldType {
            field,
            expected: "string",
            found: other.kind(),
        }),
        None => Err(StructuralError::MissingField { field }),
    }
}

/// Numbers may arrive quoted; anything that does not parse to a finite
/// value is fatal.
fn take_number(record: &mut BTreeMap<String, ScriptValue>, field: &'static str) -> Result<f64, StructuralError> {
    match record.remove(field) {
        Some(ScriptValue::Text(raw)) => match raw.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(StructuralError::NotANumber { field, raw }),
        },
        Some(other) => match other.as_f64() {
            Some(v) if v.is_finite() => Ok(v),
            Some(v) => Err(StructuralError::NotANumber {
                field,
                raw: v.to_string(),
            }),
            None => Err(StructuralError::WrongFieldType {
                field,
                expected: "number",
                found: other.kind(),
            }),
        },
        None => Err(StructuralError::MissingField { field }),
    }
}
