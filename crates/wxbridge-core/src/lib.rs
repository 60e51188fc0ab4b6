//! # wxbridge-core
//!
//! **Bridge a radio weather station to the cloud.**
//!
//! `wxbridge-core` is the library behind the `wxbridge` binary. It takes the
//! newline-delimited JSON readings an [rtl_433] decoder process emits,
//! translates each one through a configurable rule table (field renames and
//! unit conversions), and ships the result to the Weather Underground PWS
//! upload endpoint.
//!
//! The interesting part is the stateful delta subsystem: weather sensors
//! report rain as a lifetime counter, so the bridge keeps a sliding-window
//! [`DeltaTracker`] per counter field, turns the counter into an hourly or
//! daily accumulation, and persists the whole [`TrackerRegistry`] across
//! restarts.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use wxbridge_core::{translate, Config, TrackerRegistry, Uploader};
//!
//! let config = Config::load(Path::new("config.json")).unwrap();
//! let mut registry = TrackerRegistry::load(Path::new("trackers.json"));
//! let uploader = Uploader::new();
//!
//! let reading = serde_json::from_str(r#"{"temperature_C": 20, "humidity": 55}"#).unwrap();
//! let record = translate(
//!     &reading,
//!     &config.wunderground.translations,
//!     &config.wunderground.station,
//!     &mut registry,
//! );
//! uploader.upload(&record).unwrap();
//! ```
//!
//! ## Architecture
//!
//! Decoder line → Reading → Translator → Conversion engine (consulting the
//! tracker registry for stateful kinds) → OutboundRecord → Uploader.
//!
//! Everything runs on one thread. The registry is owned by the run loop and
//! passed by mutable reference into translation; no locking anywhere.
//! Failures along the pipeline degrade instead of stopping the loop: bad
//! lines are skipped, failed conversions pass the raw value through, failed
//! uploads drop the one reading.

pub mod config;
pub mod convert;
pub mod decoder;
pub mod registry;
pub mod tracker;
pub mod translate;
pub mod upload;

pub use config::{Config, ConfigError, DecoderConfig, StationCredentials, TranslationRule, UploadConfig};
pub use convert::{convert, ConversionKind};
pub use decoder::{Decoder, DecoderExit};
pub use registry::TrackerRegistry;
pub use tracker::DeltaTracker;
pub use translate::{translate, OutboundRecord, Reading};
pub use upload::{Uploader, UploadError, UPLOAD_URL};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
