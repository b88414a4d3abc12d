//! Current observations: nowcast temperature and the product display script.

use chrono_tz::Tz;
use scraper::Html;
use std::collections::BTreeMap;
use tracing::debug;

use super::{find_first, parse_int_with_suffix, text_of};
use crate::conditions::reconcile;
use crate::types::{CurrentObservations, StructuralError};

const TEMPERATURE_CARD: &str = "div#nowcast-card-temperature";
const TEMPERATURE_VALUE: &str = "div.value";
const SCRIPT_CONTAINER: &str = "div#product_display";

/// Lines starting with these carry no `key: value` data.
const SKIPPED_PREFIXES: &[&str] = &["WO", "//"];
const CLOSING_TOKENS: &[&str] = &["{", "}", "};"];

/// Script keys that would shadow typed fields.
const RESERVED_KEYS: &[&str] = &["temperature", "condition"];

pub fn parse(document: &Html) -> Result<CurrentObservations, StructuralError> {
    let root = document.root_element();

    let card = find_first(root, TEMPERATURE_CARD)?;
    let value = find_first(card, TEMPERATURE_VALUE)?;
    let temperature = parse_int_with_suffix("temperature", &text_of(value), "°")?;

    let container = find_first(root, SCRIPT_CONTAINER)?;
    let script = find_first(container, "script")?;
    let (time_zone, fields) = parse_script(&text_of(script))?;

    let condition = fields.get("symbol").map(|symbol| {
        let text = fields.get("symbolText").map(String::as_str).unwrap_or_default();
        reconcile(symbol, text)
    });

    Ok(CurrentObservations {
        temperature,
        time_zone,
        condition,
        fields,
    })
}

/// Read the assignment-style script: the time zone plus every `key: value` line.
pub fn parse_script(script: &str) -> Result<(Tz, BTreeMap<String, String>), StructuralError> {
    let mut zone_name = None;
    let mut fields = BTreeMap::new();

    for (idx, raw) in script.lines().enumerate() {
        let line = raw.trim();

        if line.contains("timeZone") {
            if let Some((_, value)) = line.split_once('=') {
                zone_name = Some(value.trim().trim_matches(|c| c == '"' || c == ';').to_string());
                continue;
            }
        }
        if line.is_empty()
            || CLOSING_TOKENS.contains(&line)
            || SKIPPED_PREFIXES.iter().any(|prefix| line.starts_with(prefix))
        {
            continue;
        }

        let (key, value) = line
            .split_once(':')
            .ok_or_else(|| StructuralError::ScriptLine {
                line_no: idx + 1,
                line: line.to_string(),
                reason: "expected `key: value`".into(),
            })?;
        let (key, value) = (clean(key), clean(value));

        if key == "timeZone" {
            zone_name = Some(value.to_string());
        } else if RESERVED_KEYS.contains(&key) {
            debug!(key, "Skipping script key that shadows a typed field");
        } else {
            fields.insert(key.to_string(), value.to_string());
        }
    }

    let name = zone_name.ok_or(StructuralError::MissingTimeZone)?;
    let tz = name
        .parse::<Tz>()
        .map_err(|_| StructuralError::UnknownTimeZone(name.clone()))?;
    Ok((tz, fields))
}

fn clean(s: &str) -> &str {
    s.trim().trim_matches(',').trim_matches('"')
}
