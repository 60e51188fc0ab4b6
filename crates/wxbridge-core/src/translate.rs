//! Translation from decoded sensor readings to upload records.
//!
//! A reading is the JSON object one decoder line parses to. Translation
//! walks the configured rule table, copies each present source field to its
//! destination name (converting on the way), and wraps the result in the
//! fixed upload envelope Weather Underground expects.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::config::{StationCredentials, TranslationRule};
use crate::convert::convert;
use crate::registry::TrackerRegistry;

/// One decoded transmission: field name to numeric or string value.
pub type Reading = Map<String, Value>;

/// Outbound upload record, rendered as HTTP query parameters.
///
/// Holds the fixed envelope (`dateutc`, `action`), the station credentials,
/// and every translated field.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRecord {
    fields: BTreeMap<String, Value>,
}

impl OutboundRecord {
    /// The fixed envelope every record starts from, plus credentials.
    fn base(station: &StationCredentials) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert("dateutc".to_string(), Value::from("now"));
        fields.insert("action".to_string(), Value::from("updateraw"));
        fields.insert("ID".to_string(), Value::from(station.station_id.as_str()));
        fields.insert(
            "PASSWORD".to_string(),
            Value::from(station.station_key.as_str()),
        );
        Self { fields }
    }

    /// Value of `field`, if set.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Number of fields, envelope included.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record holds no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Render every field as a `(name, value)` query pair. Strings pass
    /// through verbatim; numbers and booleans use their display form.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .map(|(k, v)| (k.clone(), render(v)))
            .collect()
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Translate `reading` into an [`OutboundRecord`].
///
/// Rules whose source field is absent from the reading are skipped
/// silently. When a rule names a conversion, the value is routed through
/// [`convert`] (which consults `registry` for stateful kinds). If two rules
/// target the same destination field, the later rule in iteration order
/// wins — an accident of configuration, not a guarantee.
pub fn translate(
    reading: &Reading,
    rules: &[TranslationRule],
    station: &StationCredentials,
    registry: &mut TrackerRegistry,
) -> OutboundRecord {
    let mut record = OutboundRecord::base(station);

    for rule in rules {
        let Some(value) = reading.get(&rule.rtl_field) else {
            continue;
        };
        let value = match &rule.conversion {
            Some(kind) => convert(value, kind, &rule.rtl_field, registry),
            None => value.clone(),
        };
        record.fields.insert(rule.field.clone(), value);
    }

    record
}
