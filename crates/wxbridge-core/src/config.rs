//! Configuration loading and validation.
//!
//! One JSON document supplies everything: how to invoke the decoder, the
//! upload credentials, and the translation rule table. Example:
//!
//! ```json
//! {
//!   "rtl_sdr": { "frequency": "433.92M", "decoder_id": "113" },
//!   "wunderground": {
//!     "station_id": "KWASEATT123",
//!     "station_key": "secret",
//!     "translations": [
//!       { "rtl_field": "temperature_C", "field": "tempf",
//!         "conversion": "celsius_to_fahrenheit" },
//!       { "rtl_field": "humidity", "field": "humidity" }
//!     ]
//!   }
//! }
//! ```
//!
//! Configuration problems are the only fatal errors in the system; the
//! process exits before the read loop if the file is unreadable, is not
//! valid JSON, or omits the station credentials.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Configuration errors. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("could not read config at {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON or does not match the schema.
    #[error("could not parse config at {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// A required credential is missing or empty.
    #[error("missing required config value: {0}")]
    MissingCredential(&'static str),
}

/// How to invoke the radio decoder.
#[derive(Debug, Clone, Deserialize)]
pub struct DecoderConfig {
    /// Tuner frequency, passed straight to the decoder (e.g. `"433.92M"`).
    pub frequency: String,
    /// Protocol decoder to enable (rtl_433 `-R` argument).
    pub decoder_id: String,
}

/// Upload credentials for one weather station.
#[derive(Debug, Clone, Deserialize)]
pub struct StationCredentials {
    pub station_id: String,
    pub station_key: String,
}

/// One translation rule: copy `rtl_field` from the reading to `field` in
/// the outbound record, optionally converting on the way.
///
/// `conversion` stays a string here so that a config naming a conversion
/// this build does not know still loads; the engine degrades unknown names
/// to pass-through at conversion time.
#[derive(Debug, Clone, Deserialize)]
pub struct TranslationRule {
    pub rtl_field: String,
    pub field: String,
    #[serde(default)]
    pub conversion: Option<String>,
}

/// Upload endpoint section: credentials plus the rule table.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    #[serde(flatten)]
    pub station: StationCredentials,
    #[serde(default)]
    pub translations: Vec<TranslationRule>,
}

/// Top-level configuration document.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub rtl_sdr: DecoderConfig,
    pub wunderground: UploadConfig,
}

impl Config {
    /// Load and validate the configuration at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.wunderground.station.station_id.is_empty() {
            return Err(ConfigError::MissingCredential("wunderground.station_id"));
        }
        if self.wunderground.station.station_key.is_empty() {
            return Err(ConfigError::MissingCredential("wunderground.station_key"));
        }
        Ok(())
    }
}
