//! Shared types for the WetterOnline scraper.
//!
//! A `WeatherSnapshot` is built fresh on every fetch and never mutated
//! afterwards. The parser, the condition mapper and the dashboard all depend
//! on these types, so they carry no behaviour beyond formatting.

use chrono::{DateTime, FixedOffset};
use chrono_tz::Tz;
use reqwest::StatusCode;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use crate::conditions::ConditionReport;

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Everything recovered from one page fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherSnapshot {
    pub current_observations: CurrentObservations,
    /// Chronological, spanning today and tomorrow in the page's zone.
    pub hourly_forecast: Vec<HourlyEntry>,
    /// One entry per calendar day shown on the page.
    pub daily_forecast: Vec<DailyEntry>,
}

/// Current conditions from the nowcast card and the product display script.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentObservations {
    /// Degrees Celsius.
    pub temperature: i32,
    /// Anchor zone for every timestamp in the same snapshot.
    #[serde(rename = "timeZone")]
    pub time_zone: Tz,
    /// Present when the script carries a `symbol` code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<ConditionReport>,
    /// Raw key/value pairs scraped from the script, cleaned but untyped.
    #[serde(flatten)]
    pub fields: BTreeMap<String, String>,
}

/// Which calendar day an hourly record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DayBucket {
    #[serde(rename = "heute")]
    Today,
    #[serde(rename = "morgen")]
    Tomorrow,
}

impl DayBucket {
    /// Parse the page's day synonym. Anything but `heute`/`morgen` is `None`.
    pub fn from_synonym(token: &str) -> Option<Self> {
        match token {
            "heute" => Some(DayBucket::Today),
            "morgen" => Some(DayBucket::Tomorrow),
            _ => None,
        }
    }

    /// Days after the snapshot's anchor day.
    pub fn offset_days(self) -> u64 {
        match self {
            DayBucket::Today => 0,
            DayBucket::Tomorrow => 1,
        }
    }

    /// Inverse of [`offset_days`](Self::offset_days); outside the two-day
    /// window there is no synonym.
    pub fn from_offset(days: i64) -> Option<Self> {
        match days {
            0 => Some(DayBucket::Today),
            1 => Some(DayBucket::Tomorrow),
            _ => None,
        }
    }
}

impl fmt::Display for DayBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayBucket::Today => write!(f, "heute"),
            DayBucket::Tomorrow => write!(f, "morgen"),
        }
    }
}

/// One hour of forecast.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyEntry {
    pub datetime: DateTime<FixedOffset>,
    #[serde(rename = "daySynonym")]
    pub day: DayBucket,
    pub temperature: f64,
    pub apparent_temperature: f64,
    pub humidity: f64,
    /// Short machine code, e.g. `bws1__`.
    pub symbol: String,
    /// Human readable text, e.g. `leichter Regen`.
    pub symbol_text: String,
    pub condition: ConditionReport,
    /// Passthrough fields after key renames (wind speed, gusts, ...).
    #[serde(flatten)]
    pub extra: BTreeMap<String, ScriptValue>,
}

/// One calendar day of forecast.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyEntry {
    /// Local midnight of the day.
    pub datetime: DateTime<FixedOffset>,
    pub max_temperature: i32,
    pub min_temperature: i32,
    pub sun_hours: i32,
    pub precipitation_probability: i32,
}

/// A literal value read from an inline script.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScriptValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl ScriptValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ScriptValue::Int(i) => Some(*i as f64),
            ScriptValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ScriptValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Short type name for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ScriptValue::Null => "null",
            ScriptValue::Bool(_) => "bool",
            ScriptValue::Int(_) => "integer",
            ScriptValue::Float(_) => "float",
            ScriptValue::Text(_) => "string",
        }
    }
}

impl fmt::Display for ScriptValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptValue::Null => write!(f, "null"),
            ScriptValue::Bool(b) => write!(f, "{b}"),
            ScriptValue::Int(i) => write!(f, "{i}"),
            ScriptValue::Float(x) => write!(f, "{x}"),
            ScriptValue::Text(s) => write!(f, "{s:?}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// A failed fetch. Exactly two kinds cross the library boundary.
#[derive(Debug, thiserror::Error)]
pub enum WetterError {
    #[error("transport error fetching {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: TransportError,
    },

    #[error("page structure changed: {0}")]
    Structural(#[from] StructuralError),
}

impl WetterError {
    pub fn is_transport(&self) -> bool {
        matches!(self, WetterError::Transport { .. })
    }

    pub fn is_structural(&self) -> bool {
        matches!(self, WetterError::Structural(_))
    }
}

/// Network-level failure. Never retried here.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("redirected with {status} to {location:?}")]
    Redirected {
        status: StatusCode,
        location: Option<String>,
    },

    #[error("unexpected HTTP status {0}")]
    Status(StatusCode),

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// The page no longer matches the layout the parser expects.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StructuralError {
    #[error("missing node `{selector}`")]
    MissingNode { selector: String },

    #[error("no timeZone declaration in the current conditions script")]
    MissingTimeZone,

    #[error("unknown time zone {0:?}")]
    UnknownTimeZone(String),

    #[error("daySynonym {0:?} is neither \"heute\" nor \"morgen\"")]
    UnknownDaySynonym(String),

    #[error("missing field `{field}`")]
    MissingField { field: &'static str },

    #[error("field `{field}` should be {expected}, found {found}")]
    WrongFieldType {
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("field `{field}` is not a number: {raw:?}")]
    NotANumber { field: &'static str, raw: String },

    #[error("hour {0} is out of range")]
    InvalidHour(i64),

    #[error("local time {0} does not exist in the page's time zone")]
    NonexistentLocalTime(String),

    #[error("cannot parse date label {label:?}")]
    InvalidDateLabel { label: String },

    #[error("script line {line_no} ({line:?}): {reason}")]
    ScriptLine {
        line_no: usize,
        line: String,
        reason: String,
    },

    #[error("malformed script payload: {0}")]
    MalformedScript(String),

    #[error("row `{row}` has {found} columns, date row has {expected}")]
    ColumnCountMismatch {
        row: &'static str,
        expected: usize,
        found: usize,
    },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
