//! Static symbol tables.
//!
//! Keys are either the six-character symbol codes (`bws1__`) or the German
//! display texts. Some texts appear twice because the page sometimes emits
//! them with the spaces removed.
//!
//! Precipitation codes: `b`/`m` = day/night, `w`/`d` = with/without sun or
//! moon, `s`/`r` = showers/rain, then intensity 1–3.

use super::Condition::{self, *};

pub(super) const STANDARD: &[(&str, Condition)] = &[
    ("so____", Sunny),
    ("mo____", ClearNight),
    ("sonnig", Sunny),
    ("klar", ClearNight),
    // variable cloudiness
    ("wb____", Exceptional),
    ("mb____", Exceptional),
    ("wechselnd bewölkt", Exceptional),
    ("wechselndbewölkt", Exceptional),
    // partly cloudy
    ("bw____", PartlyCloudy),
    ("mw____", PartlyCloudy),
    ("bewölkt", PartlyCloudy),
    // showers, day
    ("bws1__", Rainy),
    ("bws2__", Rainy),
    ("bws3__", Rainy),
    ("bds1__", Rainy),
    ("bds2__", Rainy),
    ("bds3__", Rainy),
    // showers, night
    ("mws1__", Rainy),
    ("mws2__", Rainy),
    ("mws3__", Rainy),
    ("mds1__", Rainy),
    ("mds2__", Rainy),
    ("mds3__", Rainy),
    ("Schauer", Rainy),
    // rain, day
    ("bwr1__", Pouring),
    ("bwr2__", Pouring),
    ("bwr3__", Pouring),
    ("bdr1__", Pouring),
    ("bdr2__", Pouring),
    ("bdr3__", Pouring),
    // rain, night
    ("mwr1__", Pouring),
    ("mwr2__", Pouring),
    ("mwr3__", Pouring),
    ("mdr1__", Pouring),
    ("mdr2__", Pouring),
    ("mdr3__", Pouring),
    ("Regen", Pouring),
    ("leichterRegen", Pouring),
    // overcast
    ("bd____", Cloudy),
    ("md____", Cloudy),
    ("stark bewölkt", Cloudy),
    ("starkbewölkt", Cloudy),
    ("Gewitter", LightningRainy),
    // fog
    ("ns____", Fog),
    ("teils Nebel, teils Sonne", Fog),
    ("nb____", Fog),
    ("Nebel", Fog),
];

/// Applied on top of `STANDARD` to build the custom table.
pub(super) const CUSTOM_OVERRIDES: &[(&str, Condition)] = &[
    ("wb____", PartlyCloudyVariable),
    ("mb____", PartlyCloudyVariable),
    ("wechselnd bewölkt", PartlyCloudyVariable),
    ("wechselndbewölkt", PartlyCloudyVariable),
    // showers: `w` = partly cloudy sky, `d` = overcast
    ("bws1__", RainyLightPartlyCloudy),
    ("bws2__", RainyPartlyCloudy),
    ("bws3__", RainyHeavyPartlyCloudy),
    ("bds1__", RainyLight),
    ("bds2__", Rainy),
    ("bds3__", RainyHeavy),
    ("mws1__", RainyLightPartlyCloudy),
    ("mws2__", RainyPartlyCloudy),
    ("mws3__", RainyHeavyPartlyCloudy),
    ("mds1__", RainyLight),
    ("mds2__", Rainy),
    ("mds3__", RainyHeavy),
    ("bwr1__", PouringLightPartlyCloudy),
    ("bwr2__", PouringPartlyCloudy),
    ("bwr3__", PouringHeavyPartlyCloudy),
    ("bdr1__", PouringLight),
    ("bdr2__", Pouring),
    ("bdr3__", PouringHeavy),
    ("mwr1__", PouringLightPartlyCloudy),
    ("mwr2__", PouringPartlyCloudy),
    ("mwr3__", PouringHeavyPartlyCloudy),
    ("mdr1__", PouringLight),
    ("mdr2__", Pouring),
    ("mdr3__", PouringHeavy),
    ("leichterRegen", PouringLight),
    ("ns____", FogPartly),
    ("teils Nebel, teils Sonne", FogPartly),
];
