//! Page parser.
//!
//! Turns one entity-decoded WetterOnline page into a `WeatherSnapshot`.
//! Any missing node, unknown token or non-numeric value fails the whole
//! parse; no partial snapshot is ever returned.
//!
//! Extraction strategies per section:
//! - current: labelled DOM nodes plus a loose `key: value` script
//! - hourly: one object literal per `<script>` in the hourly container
//! - daily: positional scan of the date row and the weather table columns

pub mod current;
pub mod daily;
pub mod hourly;
pub mod literal;

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::types::{StructuralError, WeatherSnapshot};

/// Parser scoped to a single response body.
pub struct PageParser {
    document: Html,
}

impl PageParser {
    pub fn new(decoded_html: &str) -> Self {
        Self {
            document: Html::parse_document(decoded_html),
        }
    }

    /// Extract the full snapshot. `now` fixes "today" and the current year.
    ///
    /// Current observations go first because they carry the time zone the
    /// hourly and daily timestamps are anchored to.
    pub fn parse(&self, now: DateTime<Utc>) -> Result<WeatherSnapshot, StructuralError> {
        let current_observations = current::parse(&self.document)?;
        let tz = current_observations.time_zone;
        let today = now.with_timezone(&tz).date_naive();

        let daily_forecast = daily::parse(&self.document, tz, today.year())?;
        let hourly_forecast = hourly::parse(&self.document, tz, today)?;

        debug!(
            time_zone = %tz,
            hourly = hourly_forecast.len(),
            daily = daily_forecast.len(),
            "Page parsed"
        );

        Ok(WeatherSnapshot {
            current_observations,
            hourly_forecast,
            daily_forecast,
        })
    }
}

/// Parse a decoded page in one call.
pub fn parse_page(decoded_html: &str, now: DateTime<Utc>) -> Result<WeatherSnapshot, StructuralError> {
    PageParser::new(decoded_html).parse(now)
}

// ---------------------------------------------------------------------------
// Helpers shared by the section parsers
// ---------------------------------------------------------------------------

/// Compile a selector written as a literal in this module tree.
fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("CSS selector literal should be valid")
}

/// First element under `scope` matching `css`.
fn find_first<'a>(scope: ElementRef<'a>, css: &str) -> Result<ElementRef<'a>, StructuralError> {
    scope
        .select(&selector(css))
        .next()
        .ok_or_else(|| StructuralError::MissingNode {
            selector: css.to_string(),
        })
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// Trim, drop an optional unit suffix, then parse as an integer.
pub fn parse_int_with_suffix(
    field: &'static str,
    raw: &str,
    suffix: &str,
) -> Result<i32, StructuralError> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_suffix(suffix).unwrap_or(trimmed).trim();
    digits.parse().map_err(|_| StructuralError::NotANumber {
        field,
        raw: raw.to_string(),
    })
}

/// `date` at `hour:00` in `tz`, as a fixed-offset timestamp.
///
/// Ambiguous hours take the earlier offset. An hour skipped by a DST jump
/// resolves to one hour after the preceding local hour, i.e. the instant
/// the clock jumped to.
fn local_datetime(tz: Tz, date: NaiveDate, hour: u32) -> Result<DateTime<FixedOffset>, StructuralError> {
    let naive = date
        .and_hms_opt(hour, 0, 0)
        .ok_or(StructuralError::InvalidHour(i64::from(hour)))?;
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| {
            let before = naive.checked_sub_signed(Duration::hours(1))?;
            let resolved = tz.from_local_datetime(&before).earliest()? + Duration::hours(1);
            Some(resolved)
        })
        .map(|dt| dt.fixed_offset())
        .ok_or_else(|| StructuralError::NonexistentLocalTime(format!("{naive} {tz}")))
}
