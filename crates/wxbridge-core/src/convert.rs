//! Unit and delta conversions applied while translating readings.
//!
//! Conversions come in two flavors: stateless unit scaling (Celsius to
//! Fahrenheit, hectopascals to inches of mercury, ...) and stateful delta
//! accumulation, which routes the raw counter value through a
//! [`TrackerRegistry`] tracker before scaling.
//!
//! Conversion failure is never an error for the caller: an unknown kind or
//! a non-numeric value logs a warning and passes the original value through
//! unchanged, so one bad field cannot drop a whole reading.

use chrono::{Local, TimeZone, Utc};
use serde_json::Value;

use crate::registry::TrackerRegistry;

/// Millimeters per inch, used by the rain conversions.
const MM_PER_INCH: f64 = 25.4;

/// Timestamp layout Weather Underground accepts for `dateutc`.
const UTC_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The closed set of recognized conversions.
///
/// Matched exhaustively in [`apply`]; adding a kind means adding a variant
/// here and one match arm there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversionKind {
    /// `v * 9/5 + 32`
    CelsiusToFahrenheit,
    /// `v * 2.237`
    MetersPerSecToMph,
    /// `v / 25.4`
    MillimetersToInches,
    /// `v * 0.02953`
    HectopascalsToInHg,
    /// Local epoch seconds rendered as a UTC calendar timestamp; falls back
    /// to the current UTC time for non-numeric input.
    LocalEpochToUtc,
    /// Windowed counter delta over 60 minutes, reported in inches.
    DeltaAccumulationHourly,
    /// Windowed counter delta over 24 hours, reported in inches.
    DeltaAccumulationDaily,
}

impl ConversionKind {
    /// Resolve a configured conversion name.
    ///
    /// Accepts both the canonical names and the short aliases used by
    /// existing deployment configs. Returns `None` for anything else.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "celsius_to_fahrenheit" | "c_to_f" => Some(Self::CelsiusToFahrenheit),
            "meters_per_sec_to_mph" | "ms_to_mph" => Some(Self::MetersPerSecToMph),
            "millimeters_to_inches" | "mm_to_in" => Some(Self::MillimetersToInches),
            "hectopascals_to_inHg" | "hpa_to_inhg" => Some(Self::HectopascalsToInHg),
            "local_epoch_to_utc_struct" | "local_to_utc" => Some(Self::LocalEpochToUtc),
            "delta_accumulation_hourly" | "delta_hour_mm_to_in" => {
                Some(Self::DeltaAccumulationHourly)
            }
            "delta_accumulation_daily" | "delta_day_mm_to_in" => {
                Some(Self::DeltaAccumulationDaily)
            }
            _ => None,
        }
    }

    /// Canonical name of this conversion.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CelsiusToFahrenheit => "celsius_to_fahrenheit",
            Self::MetersPerSecToMph => "meters_per_sec_to_mph",
            Self::MillimetersToInches => "millimeters_to_inches",
            Self::HectopascalsToInHg => "hectopascals_to_inHg",
            Self::LocalEpochToUtc => "local_epoch_to_utc_struct",
            Self::DeltaAccumulationHourly => "delta_accumulation_hourly",
            Self::DeltaAccumulationDaily => "delta_accumulation_daily",
        }
    }
}

impl std::fmt::Display for ConversionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Convert `value` using the conversion named `kind_name` for `field`.
///
/// Stateful kinds consult `registry`, creating the field's tracker on first
/// use with the window the kind dictates. Unknown kinds and values a kind
/// cannot digest degrade to the original value with a warning.
pub fn convert(
    value: &Value,
    kind_name: &str,
    field: &str,
    registry: &mut TrackerRegistry,
) -> Value {
    match ConversionKind::from_name(kind_name) {
        Some(kind) => apply(kind, value, field, registry),
        None => {
            log::warn!("unknown conversion '{kind_name}' for field '{field}', passing through");
            value.clone()
        }
    }
}

fn apply(kind: ConversionKind, value: &Value, field: &str, registry: &mut TrackerRegistry) -> Value {
    // The epoch conversion has its own non-numeric fallback.
    if let ConversionKind::LocalEpochToUtc = kind {
        return local_epoch_to_utc(value);
    }

    let Some(v) = value.as_f64() else {
        log::warn!(
            "cannot apply {kind} to non-numeric value {value} for field '{field}', passing through"
        );
        return value.clone();
    };

    let converted = match kind {
        ConversionKind::CelsiusToFahrenheit => v * 9.0 / 5.0 + 32.0,
        ConversionKind::MetersPerSecToMph => v * 2.237,
        ConversionKind::MillimetersToInches => v / MM_PER_INCH,
        ConversionKind::HectopascalsToInHg => v * 0.02953,
        ConversionKind::DeltaAccumulationHourly => {
            registry.get_or_create(field, 60).observe(v) / MM_PER_INCH
        }
        ConversionKind::DeltaAccumulationDaily => {
            registry.get_or_create(field, 1440).observe(v) / MM_PER_INCH
        }
        ConversionKind::LocalEpochToUtc => unreachable!("handled above"),
    };
    Value::from(converted)
}

/// Interpret a numeric value as local epoch seconds and render it as a UTC
/// timestamp; non-numeric input falls back to the current UTC time.
fn local_epoch_to_utc(value: &Value) -> Value {
    let utc = match value.as_f64().map(|secs| Local.timestamp_opt(secs as i64, 0)) {
        Some(chrono::LocalResult::Single(local)) => local.with_timezone(&Utc),
        _ => Utc::now(),
    };
    Value::from(utc.format(UTC_FORMAT).to_string())
}
