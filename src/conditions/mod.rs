//! Condition mapper.
//!
//! Translates the page's symbol codes and symbol texts into a small
//! canonical vocabulary. Two tables exist: the standard one with coarse
//! categories, and a custom refinement that keeps intensity and sky mix.
//! Lookups never fail: an unknown code is passed through verbatim.

mod tables;

use serde::{Serialize, Serializer};
use std::fmt;

/// Marker for a code that neither table knows.
pub const UNKNOWN: &str = "UNKNOWN";

// ---------------------------------------------------------------------------
// Vocabulary
// ---------------------------------------------------------------------------

/// Canonical weather condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    Sunny,
    ClearNight,
    Exceptional,
    PartlyCloudy,
    PartlyCloudyVariable,
    Cloudy,
    Rainy,
    RainyLight,
    RainyHeavy,
    RainyPartlyCloudy,
    RainyLightPartlyCloudy,
    RainyHeavyPartlyCloudy,
    Pouring,
    PouringLight,
    PouringHeavy,
    PouringPartlyCloudy,
    PouringLightPartlyCloudy,
    PouringHeavyPartlyCloudy,
    LightningRainy,
    Fog,
    FogPartly,
}

impl Condition {
    pub fn as_str(self) -> &'static str {
        match self {
            Condition::Sunny => "sunny",
            Condition::ClearNight => "clear-night",
            Condition::Exceptional => "exceptional",
            Condition::PartlyCloudy => "partlycloudy",
            Condition::PartlyCloudyVariable => "partlycloudy-variable",
            Condition::Cloudy => "cloudy",
            Condition::Rainy => "rainy",
            Condition::RainyLight => "rainy-light",
            Condition::RainyHeavy => "rainy-heavy",
            Condition::RainyPartlyCloudy => "rainy-partlycloudy",
            Condition::RainyLightPartlyCloudy => "rainy-light-partlycloudy",
            Condition::RainyHeavyPartlyCloudy => "rainy-heavy-partlycloudy",
            Condition::Pouring => "pouring",
            Condition::PouringLight => "pouring-light",
            Condition::PouringHeavy => "pouring-heavy",
            Condition::PouringPartlyCloudy => "pouring-partlycloudy",
            Condition::PouringLightPartlyCloudy => "pouring-light-partlycloudy",
            Condition::PouringHeavyPartlyCloudy => "pouring-heavy-partlycloudy",
            Condition::LightningRainy => "lightning-rainy",
            Condition::Fog => "fog",
            Condition::FogPartly => "fog-partly",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Condition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

type Table = &'static [(&'static str, Condition)];

/// The custom table is the standard one with its overrides taking priority.
const CUSTOM_CHAIN: &[Table] = &[tables::CUSTOM_OVERRIDES, tables::STANDARD];

fn find(chain: &[Table], code: &str) -> Option<Condition> {
    chain
        .iter()
        .flat_map(|table| table.iter())
        .find(|(key, _)| *key == code)
        .map(|(_, condition)| *condition)
}

/// Exact key first, then the key with all whitespace removed.
fn lookup(chain: &[Table], code: &str) -> Option<Condition> {
    if let Some(condition) = find(chain, code) {
        return Some(condition);
    }
    let compact: String = code.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.len() == code.len() || compact.is_empty() {
        return None;
    }
    find(chain, &compact)
}

pub fn lookup_standard(code: &str) -> Option<Condition> {
    lookup(&[tables::STANDARD], code)
}

pub fn lookup_custom(code: &str) -> Option<Condition> {
    lookup(CUSTOM_CHAIN, code)
}

/// Standard category, or `code` itself when unknown.
pub fn map_standard(code: &str) -> String {
    lookup_standard(code)
        .map(|c| c.as_str().to_string())
        .unwrap_or_else(|| code.to_string())
}

/// Custom category, or `code` itself when unknown.
pub fn map_custom(code: &str) -> String {
    lookup_custom(code)
        .map(|c| c.as_str().to_string())
        .unwrap_or_else(|| code.to_string())
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

/// Result of looking one raw code up in the custom table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Resolved(Condition),
    Unresolved,
}

impl Serialize for Resolution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Resolution::Resolved(c) => serializer.serialize_str(c.as_str()),
            Resolution::Unresolved => serializer.serialize_str(UNKNOWN),
        }
    }
}

/// Which of the two raw signals the custom table recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    Both,
    SymbolOnly,
    TextOnly,
    Neither,
}

/// All condition fields for one entry, computed in a single pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConditionReport {
    /// Standard category.
    pub condition: String,
    /// Custom category, preferring the symbol code.
    pub condition_custom: String,
    /// Custom resolution of the symbol code. Omitted when both signals agree.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition_custom_symbol: Option<Resolution>,
    /// Custom resolution of the symbol text. Omitted when both signals agree.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition_custom_symboltext: Option<Resolution>,
    pub outcome: MatchOutcome,
}

/// Map both raw signals of an entry.
///
/// The custom condition prefers the symbol code. When both codes resolve to
/// different categories, both resolutions are kept as diagnostics; when only
/// one resolves, the other is marked [`UNKNOWN`]; when neither resolves, the
/// raw symbol code is passed through.
pub fn reconcile(symbol: &str, symbol_text: &str) -> ConditionReport {
    let raw_fallback = if symbol_text.is_empty() { symbol } else { symbol_text };
    let condition = lookup_standard(symbol_text)
        .or_else(|| lookup_standard(symbol))
        .map(|c| c.as_str().to_string())
        .unwrap_or_else(|| raw_fallback.to_string());

    let (condition_custom, on_symbol, on_text, outcome) =
        match (lookup_custom(symbol), lookup_custom(symbol_text)) {
            (Some(s), Some(t)) if s == t => (s.as_str().to_string(), None, None, MatchOutcome::Both),
            (Some(s), Some(t)) => (
                s.as_str().to_string(),
                Some(Resolution::Resolved(s)),
                Some(Resolution::Resolved(t)),
                MatchOutcome::Both,
            ),
            (Some(s), None) => (
                s.as_str().to_string(),
                Some(Resolution::Resolved(s)),
                Some(Resolution::Unresolved),
                MatchOutcome::SymbolOnly,
            ),
            (None, Some(t)) => (
                t.as_str().to_string(),
                Some(Resolution::Unresolved),
                Some(Resolution::Resolved(t)),
                MatchOutcome::TextOnly,
            ),
            (None, None) => (
                symbol.to_string(),
                Some(Resolution::Unresolved),
                Some(Resolution::Unresolved),
                MatchOutcome::Neither,
            ),
        };

    ConditionReport {
        condition,
        condition_custom,
        condition_custom_symbol: on_symbol,
        condition_custom_symboltext: on_text,
        outcome,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
